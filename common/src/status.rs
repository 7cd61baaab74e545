use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, sqlx::Type, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomType {
    Single,
    Double,
    Twin,
    Triple,
    Suite,
    Deluxe,
    Family,
    Presidential,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, sqlx::Type, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    #[default]
    Available,
    Occupied,
    Maintenance,
    Cleaning,
}

/// Lifecycle of a hotel stay.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, sqlx::Type, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    #[default]
    Created,
    Confirmed,
    CheckedIn,
    CheckedOut,
    Cancelled,
}

/// Lifecycle of an activity booking. Ends in `Completed` rather than a check-out.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, sqlx::Type, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityReservationStatus {
    #[default]
    Created,
    Confirmed,
    CheckedIn,
    Completed,
    Cancelled,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, sqlx::Type, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Refunded,
    Failed,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, sqlx::Type, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityStatus {
    #[default]
    Active,
    Cancelled,
    Completed,
    Full,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Created => "CREATED",
            ReservationStatus::Confirmed => "CONFIRMED",
            ReservationStatus::CheckedIn => "CHECKED_IN",
            ReservationStatus::CheckedOut => "CHECKED_OUT",
            ReservationStatus::Cancelled => "CANCELLED",
        }
    }
}

impl ActivityReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityReservationStatus::Created => "CREATED",
            ActivityReservationStatus::Confirmed => "CONFIRMED",
            ActivityReservationStatus::CheckedIn => "CHECKED_IN",
            ActivityReservationStatus::Completed => "COMPLETED",
            ActivityReservationStatus::Cancelled => "CANCELLED",
        }
    }
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Refunded => "REFUNDED",
            PaymentStatus::Failed => "FAILED",
        }
    }
}
