use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::status::{ActivityReservationStatus, ActivityStatus, PaymentStatus};
use crate::utils::default_one;

#[derive(FromRow, Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDto {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub capacity: i64,
    pub available_slots: i64,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub status: ActivityStatus,
    pub hotel_id: i64,
    pub hotel_name: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRequest {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: f64,
    #[validate(range(min = 1, message = "Capacity must be positive"))]
    pub capacity: i64,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub hotel_id: i64,
}

/// Partial update; absent fields keep their stored value.
#[derive(Deserialize, Serialize, Clone, Debug, Default, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityUpdate {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: Option<f64>,
    #[validate(range(min = 1, message = "Capacity must be positive"))]
    pub capacity: Option<i64>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
}

#[derive(FromRow, Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityReservationDto {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub number_of_participants: i64,
    pub special_requests: Option<String>,
    pub total_price: f64,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<String>,
    pub payment_transaction_id: Option<String>,
    pub status: ActivityReservationStatus,
    pub activity_id: i64,
    pub activity_name: String,
    pub hotel_reservation_id: Option<i64>,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityReservationRequest {
    #[validate(length(min = 1, message = "Full name must not be empty"))]
    pub full_name: String,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,
    pub phone: Option<String>,
    #[serde(default = "default_one")]
    #[validate(range(min = 1, message = "Number of participants must be at least 1"))]
    pub number_of_participants: i64,
    pub special_requests: Option<String>,
    pub payment_method: Option<String>,
    pub activity_id: i64,
    pub hotel_reservation_id: Option<i64>,
}
