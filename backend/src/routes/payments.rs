//! Mock payment gateway. Every charge succeeds; refusals are reported in the body.

use std::collections::HashMap;

use axum::{
    extract::State,
    routing::post,
    Json, Router,
};
use common::{PaymentMethodQuery, PaymentResult, PaymentStatus};
use uuid::Uuid;

use crate::booking;
use crate::error::AppError;
use crate::extractors::{ApiJson, ApiPath, ApiQuery};
use crate::repository::{self, reservations};
use crate::routes::reservations::load;
use crate::web_server::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/process/{reservation_id}", post(process_payment))
        .route("/refund/{reservation_id}", post(refund_payment))
}

fn refused(message: impl Into<String>) -> Json<PaymentResult> {
    Json(PaymentResult {
        success: false,
        message: message.into(),
        ..Default::default()
    })
}

#[utoipa::path(
    post,
    path = "/api/payments/process/{reservation_id}",
    tag = "payments",
    params(("reservation_id" = i64, Path, description = "Reservation id"), PaymentMethodQuery),
    request_body = HashMap<String, String>,
    responses(
        (status = 200, description = "Gateway outcome, check `success`", body = PaymentResult),
        (status = 404, description = "Reservation not found"),
    )
)]
pub async fn process_payment(
    State(state): State<AppState>,
    ApiPath(reservation_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<PaymentMethodQuery>,
    ApiJson(details): ApiJson<HashMap<String, String>>,
) -> Result<Json<PaymentResult>, AppError> {
    tracing::info!(
        "Processing {} payment for reservation {} ({} detail fields)",
        query.payment_method,
        reservation_id,
        details.len()
    );
    let mut tx = state.db_pool.begin().await?;

    let reservation = load(&mut *tx, reservation_id).await?;
    if reservation.payment_status == PaymentStatus::Paid {
        return Ok(refused("Payment already processed"));
    }

    let next = match booking::record_payment(
        reservation.status,
        reservation.payment_status,
        PaymentStatus::Paid,
    ) {
        Ok(next) => next,
        Err(e) => {
            tracing::warn!("Payment refused for reservation {}: {}", reservation_id, e);
            return Ok(refused(e.to_string()));
        }
    };

    let transaction_id = Uuid::new_v4().to_string();
    reservations::update_payment(
        &mut *tx,
        reservation_id,
        PaymentStatus::Paid,
        next,
        Some(&transaction_id),
        Some(&query.payment_method),
        repository::now(),
    )
    .await?;
    tx.commit().await?;

    Ok(Json(PaymentResult {
        success: true,
        message: "Payment processed successfully".to_string(),
        transaction_id: Some(transaction_id),
        reservation_status: Some(next),
    }))
}

#[utoipa::path(
    post,
    path = "/api/payments/refund/{reservation_id}",
    tag = "payments",
    params(("reservation_id" = i64, Path, description = "Reservation id")),
    responses(
        (status = 200, description = "Gateway outcome, check `success`", body = PaymentResult),
        (status = 404, description = "Reservation not found"),
    )
)]
pub async fn refund_payment(
    State(state): State<AppState>,
    ApiPath(reservation_id): ApiPath<i64>,
) -> Result<Json<PaymentResult>, AppError> {
    tracing::info!("Refunding payment for reservation {}", reservation_id);
    let mut tx = state.db_pool.begin().await?;

    let reservation = load(&mut *tx, reservation_id).await?;
    if reservation.payment_status != PaymentStatus::Paid {
        return Ok(refused("No payment to refund"));
    }

    let next = booking::record_payment(
        reservation.status,
        reservation.payment_status,
        PaymentStatus::Refunded,
    )?;
    reservations::update_payment(
        &mut *tx,
        reservation_id,
        PaymentStatus::Refunded,
        next,
        None,
        None,
        repository::now(),
    )
    .await?;
    tx.commit().await?;

    Ok(Json(PaymentResult {
        success: true,
        message: "Refund processed successfully".to_string(),
        reservation_status: Some(next),
        ..Default::default()
    }))
}
