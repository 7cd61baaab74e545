// backend/tests/helpers.rs
#![allow(dead_code)]

use backend::{
    config::{AppConfig, JwtConfig},
    web_server::AppState,
};
use chrono::{Duration, NaiveDate, Utc};
use common::{HotelDto, ReservationDto, RoomDto};
use jsonwebtoken::{encode, EncodingKey, Header};
use once_cell::sync::Lazy;
use reqwest::StatusCode;
use serde_json::{json, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use tokio::net::TcpListener;

pub const TEST_JWT_SECRET: &str = "test-secret";

static TRACING: Lazy<()> = Lazy::new(|| {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_test_writer()
        .init();
});

pub fn init_tracing() {
    Lazy::force(&TRACING);
}

/// Spawn a test server with no reachable identity provider.
pub async fn spawn_app() -> (SocketAddr, reqwest::Client, SqlitePool) {
    spawn_app_with_identity("http://127.0.0.1:9").await
}

/// Spawn a test server that delegates auth to the identity provider at `server_url`.
pub async fn spawn_app_with_identity(server_url: &str) -> (SocketAddr, reqwest::Client, SqlitePool) {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (app_state, db_pool) = test_state(server_url).await;
    let app = backend::web_server::create_router(app_state);

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    (addr, client, db_pool)
}

/// App state over a fresh in-memory database, for driving the router directly.
pub async fn test_state(server_url: &str) -> (AppState, SqlitePool) {
    init_tracing();

    // Single connection so every query sees the same in-memory database.
    let connect_options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let db_pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(connect_options)
        .await
        .expect("Failed to create in-memory database pool.");

    backend::db::migrate(&db_pool)
        .await
        .expect("Failed to run migrations on test database.");

    let mut config = AppConfig::default();
    config.database.url = "sqlite::memory:".to_string();
    config.identity.server_url = server_url.to_string();
    config.identity.admin_password = "admin-secret".to_string();
    config.identity.connect_timeout_secs = 2;
    config.identity.read_timeout_secs = 5;
    config.jwt = JwtConfig {
        secret: Some(TEST_JWT_SECRET.to_string()),
        public_key_pem: None,
    };

    let app_state = AppState::new(db_pool.clone(), config).expect("Failed to build app state");
    (app_state, db_pool)
}

/// Access token shaped like the identity provider's, signed with the test secret.
pub fn bearer_token(sub: &str, roles: &[&str]) -> String {
    let claims = json!({
        "sub": sub,
        "exp": (Utc::now() + Duration::minutes(10)).timestamp(),
        "preferred_username": sub,
        "resource_access": { "hotel-app": { "roles": roles } },
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn days_from_today(days: i64) -> NaiveDate {
    Utc::now().date_naive() + Duration::days(days)
}

pub async fn create_hotel(
    addr: &SocketAddr,
    client: &reqwest::Client,
    name: &str,
    city: &str,
    total_rooms: i64,
) -> HotelDto {
    let response = client
        .post(format!("http://{addr}/api/hotels"))
        .json(&json!({
            "name": name,
            "city": city,
            "address": "1 Main Street",
            "pricePerNight": 100.0,
            "totalRooms": total_rooms,
        }))
        .send()
        .await
        .expect("Failed to create hotel");
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.unwrap()
}

pub async fn create_room(
    addr: &SocketAddr,
    client: &reqwest::Client,
    hotel_id: i64,
    room_number: &str,
    price: Option<f64>,
) -> RoomDto {
    let response = client
        .post(format!("http://{addr}/api/rooms"))
        .json(&json!({
            "roomNumber": room_number,
            "capacity": 2,
            "hotelId": hotel_id,
            "type": "DOUBLE",
            "pricePerNight": price,
            "hasWifi": true,
        }))
        .send()
        .await
        .expect("Failed to create room");
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.unwrap()
}

pub fn reservation_body(
    hotel_id: i64,
    room_id: Option<i64>,
    check_in: NaiveDate,
    check_out: NaiveDate,
    rooms: i64,
) -> Value {
    json!({
        "fullName": "Ada Lovelace",
        "email": "ada@example.com",
        "phone": "+44 20 7946 0000",
        "numberOfGuests": 2,
        "checkInDate": check_in,
        "checkOutDate": check_out,
        "numberOfRooms": rooms,
        "hotelId": hotel_id,
        "roomId": room_id,
    })
}

pub async fn create_reservation(
    addr: &SocketAddr,
    client: &reqwest::Client,
    body: &Value,
) -> ReservationDto {
    let response = client
        .post(format!("http://{addr}/api/reservations"))
        .json(body)
        .send()
        .await
        .expect("Failed to create reservation");
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.unwrap()
}

pub async fn get_hotel(addr: &SocketAddr, client: &reqwest::Client, id: i64) -> HotelDto {
    client
        .get(format!("http://{addr}/api/hotels/{id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}
