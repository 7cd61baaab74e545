use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use common::{
    ActivityReservationDto, ActivityReservationRequest, ActivityStatus, MessageResponse,
    PaymentStatusResponse, PaymentUpdateQuery, StatusChangeResponse,
};
use validator::Validate;

use crate::booking::{self, BookingError};
use crate::db::DbConn;
use crate::error::AppError;
use crate::extractors::{ApiJson, ApiPath, ApiQuery};
use crate::repository::{self, activities, activity_reservations, reservations};
use crate::routes::activities::load as load_activity;
use crate::web_server::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_booking))
        .route("/{id}", get(get_booking).delete(cancel_booking))
        .route("/activity/{activity_id}", get(bookings_by_activity))
        .route(
            "/hotel-reservation/{hotel_reservation_id}",
            get(bookings_by_hotel_reservation),
        )
        .route("/{id}/payment", post(update_payment))
        .route("/{id}/check-in", post(check_in))
        .route("/{id}/complete", post(complete))
}

async fn load(conn: &mut DbConn, id: i64) -> Result<ActivityReservationDto, AppError> {
    activity_reservations::find_by_id(conn, id)
        .await?
        .ok_or_else(|| AppError::not_found("Activity reservation", id))
}

/// Moves `change` slots on the activity (negative books, positive releases).
async fn shift_slots(conn: &mut DbConn, activity_id: i64, change: i64) -> Result<(), AppError> {
    let activity = load_activity(&mut *conn, activity_id).await?;
    let update = booking::adjust_slots(
        activity.available_slots,
        activity.capacity,
        activity.status,
        change,
    )?;
    activities::set_slots(
        conn,
        activity_id,
        update.available_slots,
        update.status,
        repository::now(),
    )
    .await?;
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/activity-reservations",
    tag = "activity-reservations",
    request_body = ActivityReservationRequest,
    responses(
        (status = 201, description = "Activity booked", body = ActivityReservationDto),
        (status = 400, description = "Invalid booking data"),
        (status = 404, description = "Activity or hotel reservation not found"),
        (status = 409, description = "Activity not bookable or not enough slots"),
    )
)]
pub async fn create_booking(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ActivityReservationRequest>,
) -> Result<(StatusCode, Json<ActivityReservationDto>), AppError> {
    payload.validate()?;

    tracing::info!(
        "Booking activity {} for {} ({} participants)",
        payload.activity_id,
        payload.email,
        payload.number_of_participants
    );
    let mut tx = state.db_pool.begin().await?;

    let activity = load_activity(&mut *tx, payload.activity_id).await?;
    if activity.status != ActivityStatus::Active {
        return Err(BookingError::ActivityNotBookable.into());
    }
    if activity.available_slots < payload.number_of_participants {
        return Err(BookingError::NotEnoughSlots {
            requested: payload.number_of_participants,
            available: activity.available_slots,
        }
        .into());
    }
    if let Some(hotel_reservation_id) = payload.hotel_reservation_id {
        if !reservations::exists(&mut *tx, hotel_reservation_id).await? {
            return Err(AppError::not_found("Reservation", hotel_reservation_id));
        }
    }

    let total_price = booking::activity_price(activity.price, payload.number_of_participants);
    let id = activity_reservations::insert(&mut *tx, &payload, total_price, repository::now()).await?;
    shift_slots(&mut *tx, activity.id, -payload.number_of_participants).await?;
    let booked = load(&mut *tx, id).await?;

    tx.commit().await?;
    Ok((StatusCode::CREATED, Json(booked)))
}

#[utoipa::path(
    get,
    path = "/api/activity-reservations/{id}",
    tag = "activity-reservations",
    params(("id" = i64, Path, description = "Activity reservation id")),
    responses(
        (status = 200, description = "Booking found", body = ActivityReservationDto),
        (status = 404, description = "Booking not found"),
    )
)]
pub async fn get_booking(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ActivityReservationDto>, AppError> {
    let mut conn = state.db_pool.acquire().await?;
    Ok(Json(load(&mut conn, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/activity-reservations/activity/{activity_id}",
    tag = "activity-reservations",
    params(("activity_id" = i64, Path, description = "Activity id")),
    responses((status = 200, description = "Bookings of the activity", body = [ActivityReservationDto]))
)]
pub async fn bookings_by_activity(
    State(state): State<AppState>,
    ApiPath(activity_id): ApiPath<i64>,
) -> Result<Json<Vec<ActivityReservationDto>>, AppError> {
    let mut conn = state.db_pool.acquire().await?;
    Ok(Json(
        activity_reservations::list_by_activity(&mut conn, activity_id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/activity-reservations/hotel-reservation/{hotel_reservation_id}",
    tag = "activity-reservations",
    params(("hotel_reservation_id" = i64, Path, description = "Hotel reservation id")),
    responses((status = 200, description = "Bookings tied to the stay", body = [ActivityReservationDto]))
)]
pub async fn bookings_by_hotel_reservation(
    State(state): State<AppState>,
    ApiPath(hotel_reservation_id): ApiPath<i64>,
) -> Result<Json<Vec<ActivityReservationDto>>, AppError> {
    let mut conn = state.db_pool.acquire().await?;
    Ok(Json(
        activity_reservations::list_by_hotel_reservation(&mut conn, hotel_reservation_id).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/activity-reservations/{id}",
    tag = "activity-reservations",
    params(("id" = i64, Path, description = "Activity reservation id")),
    responses(
        (status = 200, description = "Booking cancelled", body = MessageResponse),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Booking can no longer be cancelled"),
    )
)]
pub async fn cancel_booking(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    tracing::info!("Cancelling activity reservation with id: {}", id);
    let mut tx = state.db_pool.begin().await?;

    let booked = load(&mut *tx, id).await?;
    let next = booking::cancel(booked.status)?;
    shift_slots(&mut *tx, booked.activity_id, booked.number_of_participants).await?;
    activity_reservations::update_status(&mut *tx, id, next, repository::now()).await?;

    tx.commit().await?;
    Ok(Json(MessageResponse {
        message: format!("Activity reservation {id} cancelled"),
    }))
}

#[utoipa::path(
    post,
    path = "/api/activity-reservations/{id}/payment",
    tag = "activity-reservations",
    params(("id" = i64, Path, description = "Activity reservation id"), PaymentUpdateQuery),
    responses(
        (status = 200, description = "Payment recorded", body = PaymentStatusResponse),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Payment change not allowed"),
    )
)]
pub async fn update_payment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<PaymentUpdateQuery>,
) -> Result<Json<PaymentStatusResponse>, AppError> {
    tracing::info!(
        "Recording payment {:?} for activity reservation {}",
        query.status,
        id
    );
    let mut tx = state.db_pool.begin().await?;

    let booked = load(&mut *tx, id).await?;
    let next = booking::record_payment(booked.status, booked.payment_status, query.status)?;
    activity_reservations::update_payment(
        &mut *tx,
        id,
        query.status,
        next,
        query.transaction_id.as_deref(),
        repository::now(),
    )
    .await?;

    tx.commit().await?;
    Ok(Json(PaymentStatusResponse {
        reservation_id: id,
        payment_status: query.status,
        reservation_status: next.as_str().to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/activity-reservations/{id}/check-in",
    tag = "activity-reservations",
    params(("id" = i64, Path, description = "Activity reservation id")),
    responses(
        (status = 200, description = "Participant checked in", body = StatusChangeResponse),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Booking is not confirmed and paid"),
    )
)]
pub async fn check_in(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<StatusChangeResponse>, AppError> {
    tracing::info!("Checking in activity reservation {}", id);
    let mut tx = state.db_pool.begin().await?;

    let booked = load(&mut *tx, id).await?;
    let next = booking::check_in(booked.status, booked.payment_status)?;
    activity_reservations::update_status(&mut *tx, id, next, repository::now()).await?;

    tx.commit().await?;
    Ok(Json(StatusChangeResponse {
        reservation_id: id,
        status: next.as_str().to_string(),
        message: "Check-in completed successfully".to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/activity-reservations/{id}/complete",
    tag = "activity-reservations",
    params(("id" = i64, Path, description = "Activity reservation id")),
    responses(
        (status = 200, description = "Booking completed", body = StatusChangeResponse),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Booking cannot be completed from its status"),
    )
)]
pub async fn complete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<StatusChangeResponse>, AppError> {
    tracing::info!("Completing activity reservation {}", id);
    let mut tx = state.db_pool.begin().await?;

    let booked = load(&mut *tx, id).await?;
    let next = booking::complete(booked.status)?;
    activity_reservations::update_status(&mut *tx, id, next, repository::now()).await?;

    tx.commit().await?;
    Ok(Json(StatusChangeResponse {
        reservation_id: id,
        status: next.as_str().to_string(),
        message: "Activity reservation completed".to_string(),
    }))
}
