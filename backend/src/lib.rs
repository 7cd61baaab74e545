pub mod auth;
pub mod booking;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod identity;
pub mod openapi;
pub mod repository;
pub mod routes;
pub mod web_server;
