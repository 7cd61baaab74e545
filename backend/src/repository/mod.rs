//! SQL access, one module per table.
//!
//! Every function takes a plain connection so callers decide whether it runs
//! on a pooled connection or inside a transaction (`&mut *tx`).

pub mod activities;
pub mod activity_reservations;
pub mod hotels;
pub mod reservations;
pub mod rooms;

use chrono::{NaiveDateTime, Utc};

pub(crate) fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}
