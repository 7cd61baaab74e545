//! HTTP handlers, one module per resource.

pub mod activities;
pub mod activity_reservations;
pub mod hotels;
pub mod payments;
pub mod reservations;
pub mod rooms;

use axum::Router;
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::booking::StayRange;
use crate::error::AppError;
use crate::web_server::AppState;

/// Every booking resource, to be nested under `/api`.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/hotels", hotels::router())
        .nest("/rooms", rooms::router())
        .nest("/reservations", reservations::router())
        .nest("/payments", payments::router())
        .nest("/activities", activities::router())
        .nest("/activity-reservations", activity_reservations::router())
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct HotelIdQuery {
    pub hotel_id: i64,
}

/// A date range given as `startDate`/`endDate`.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DateRangeQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl DateRangeQuery {
    pub fn stay(&self) -> Result<StayRange, AppError> {
        Ok(StayRange::new(self.start_date, self.end_date)?)
    }
}
