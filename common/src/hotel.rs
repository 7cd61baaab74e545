use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::status::{RoomStatus, RoomType};

#[derive(FromRow, Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HotelDto {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub address: String,
    pub description: Option<String>,
    pub price_per_night: f64,
    pub total_rooms: i64,
    pub available_rooms: i64,
}

/// Body for creating or updating a hotel.
///
/// On update the room counters are ignored; they only move through bookings.
#[derive(Deserialize, Serialize, Clone, Debug, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HotelRequest {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "City must not be empty"))]
    pub city: String,
    #[validate(length(min = 1, message = "Address must not be empty"))]
    pub address: String,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price_per_night: f64,
    #[serde(default)]
    #[validate(range(min = 0, message = "Total rooms must not be negative"))]
    pub total_rooms: i64,
    #[validate(range(min = 0, message = "Available rooms must not be negative"))]
    pub available_rooms: Option<i64>,
}

#[derive(FromRow, Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomDto {
    pub id: i64,
    pub room_number: String,
    pub name: Option<String>,
    pub capacity: i64,
    #[serde(rename = "type")]
    pub room_type: Option<RoomType>,
    pub description: Option<String>,
    pub price_per_night: Option<f64>,
    pub has_wifi: bool,
    #[serde(rename = "hasTV")]
    pub has_tv: bool,
    pub has_balcony: bool,
    pub has_minibar: bool,
    pub floor_number: Option<i64>,
    pub bed_count: Option<i64>,
    pub status: RoomStatus,
    pub hotel_id: i64,
    pub hotel_name: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomRequest {
    #[validate(length(min = 1, message = "Room number must not be empty"))]
    pub room_number: String,
    pub name: Option<String>,
    #[validate(range(min = 1, message = "Capacity must be positive"))]
    pub capacity: i64,
    pub hotel_id: i64,
    #[serde(rename = "type")]
    pub room_type: Option<RoomType>,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price_per_night: Option<f64>,
    #[serde(default)]
    pub has_wifi: bool,
    #[serde(default, rename = "hasTV")]
    pub has_tv: bool,
    #[serde(default)]
    pub has_balcony: bool,
    #[serde(default)]
    pub has_minibar: bool,
    pub floor_number: Option<i64>,
    #[validate(range(min = 0, message = "Bed count must not be negative"))]
    pub bed_count: Option<i64>,
    #[serde(default)]
    pub status: RoomStatus,
}

#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
pub struct HotelCount {
    pub count: i64,
}

/// Result of checking a hotel for free rooms over a stay.
#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HotelAvailability {
    pub hotel_id: i64,
    pub hotel_name: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub available_rooms_count: usize,
    pub available_rooms: Vec<RoomDto>,
    pub is_available: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomAvailability {
    pub room_id: i64,
    pub available: bool,
    pub message: String,
}
