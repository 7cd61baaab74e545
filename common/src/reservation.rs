use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::status::{PaymentStatus, ReservationStatus};
use crate::utils::default_one;

#[derive(FromRow, Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDto {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub number_of_guests: Option<i64>,
    pub special_requests: Option<String>,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub number_of_rooms: i64,
    pub total_price: f64,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<String>,
    pub payment_transaction_id: Option<String>,
    pub status: ReservationStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
    pub hotel_id: i64,
    pub hotel_name: String,
    pub room_id: Option<i64>,
    pub room_number: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    #[validate(length(min = 1, message = "Full name must not be empty"))]
    pub full_name: String,
    #[validate(
        length(min = 1, message = "Email must not be empty"),
        email(message = "Email must be a valid address")
    )]
    pub email: String,
    #[validate(length(min = 1, message = "Phone number must not be empty"))]
    pub phone: String,
    #[validate(range(min = 1, message = "Number of guests must be positive"))]
    pub number_of_guests: Option<i64>,
    pub special_requests: Option<String>,
    #[validate(custom(function = "in_future", message = "Check-in date must be in the future"))]
    pub check_in_date: NaiveDate,
    #[validate(custom(function = "in_future", message = "Check-out date must be in the future"))]
    pub check_out_date: NaiveDate,
    #[serde(default = "default_one")]
    #[validate(range(min = 1, message = "Number of rooms must be at least 1"))]
    pub number_of_rooms: i64,
    pub hotel_id: i64,
    pub room_id: Option<i64>,
    pub payment_method: Option<String>,
}

fn in_future(date: &NaiveDate) -> Result<(), ValidationError> {
    if *date > Utc::now().date_naive() {
        Ok(())
    } else {
        Err(ValidationError::new("future"))
    }
}

/// Query for recording a payment outcome against a booking.
#[derive(Deserialize, Serialize, Clone, Debug, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PaymentUpdateQuery {
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusResponse {
    pub reservation_id: i64,
    pub payment_status: PaymentStatus,
    pub reservation_status: String,
}

/// Response for check-in, check-out and completion.
#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeResponse {
    pub reservation_id: i64,
    pub status: String,
    pub message: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PaymentMethodQuery {
    pub payment_method: String,
}

/// Outcome of the mock payment gateway.
///
/// Business refusals ("already paid", "nothing to refund") come back with
/// `success == false` rather than as an HTTP error.
#[derive(Serialize, Deserialize, Clone, Debug, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation_status: Option<ReservationStatus>,
}
