use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use common::{
    MessageResponse, PaymentStatusResponse, PaymentUpdateQuery, ReservationDto,
    ReservationRequest, RoomStatus, StatusChangeResponse,
};
use validator::Validate;

use crate::booking::{self, BookingError, StayRange};
use crate::db::DbConn;
use crate::error::AppError;
use crate::extractors::{ApiJson, ApiPath, ApiQuery};
use crate::repository::{self, hotels, reservations, reservations::NewReservation, rooms};
use crate::web_server::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_reservation))
        .route("/{id}", get(get_reservation).delete(cancel_reservation))
        .route("/hotel/{hotel_id}", get(reservations_by_hotel))
        .route("/room/{room_id}", get(reservations_by_room))
        .route("/{id}/payment", post(update_payment))
        .route("/{id}/check-in", post(check_in))
        .route("/{id}/check-out", post(check_out))
}

pub(crate) async fn load(conn: &mut DbConn, id: i64) -> Result<ReservationDto, AppError> {
    reservations::find_by_id(conn, id)
        .await?
        .ok_or_else(|| AppError::not_found("Reservation", id))
}

/// Hands the reservation's rooms back to the hotel counter.
async fn release_rooms(conn: &mut DbConn, reservation: &ReservationDto) -> Result<(), AppError> {
    let hotel = hotels::find_by_id(&mut *conn, reservation.hotel_id)
        .await?
        .ok_or_else(|| AppError::not_found("Hotel", reservation.hotel_id))?;
    let available = booking::release_rooms(
        hotel.available_rooms,
        reservation.number_of_rooms,
        hotel.total_rooms,
    );
    hotels::set_available_rooms(conn, hotel.id, available).await?;
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/reservations",
    tag = "reservations",
    request_body = ReservationRequest,
    responses(
        (status = 201, description = "Reservation created", body = ReservationDto),
        (status = 400, description = "Invalid reservation data"),
        (status = 404, description = "Hotel or room not found"),
        (status = 409, description = "Room taken or not enough rooms left"),
    )
)]
pub async fn create_reservation(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ReservationRequest>,
) -> Result<(StatusCode, Json<ReservationDto>), AppError> {
    payload.validate()?;
    let stay = StayRange::new(payload.check_in_date, payload.check_out_date)?;

    tracing::info!(
        "Creating reservation in hotel {} for {} ({} rooms, {} nights)",
        payload.hotel_id,
        payload.email,
        payload.number_of_rooms,
        stay.nights()
    );
    let mut tx = state.db_pool.begin().await?;

    let hotel = hotels::find_by_id(&mut *tx, payload.hotel_id)
        .await?
        .ok_or_else(|| AppError::not_found("Hotel", payload.hotel_id))?;

    let mut nightly_price = hotel.price_per_night;
    if let Some(room_id) = payload.room_id {
        let room = rooms::find_by_id(&mut *tx, room_id)
            .await?
            .ok_or_else(|| AppError::not_found("Room", room_id))?;
        if room.hotel_id != hotel.id {
            return Err(BookingError::RoomNotInHotel.into());
        }
        let booked = rooms::booked_stays(&mut *tx, room_id).await?;
        if !booking::is_room_free(&stay, &booked) {
            return Err(BookingError::RoomUnavailable.into());
        }
        if let Some(price) = room.price_per_night {
            nightly_price = price;
        }
    }

    let available = booking::reserve_rooms(hotel.available_rooms, payload.number_of_rooms)?;
    hotels::set_available_rooms(&mut *tx, hotel.id, available).await?;

    let new = NewReservation {
        full_name: &payload.full_name,
        email: &payload.email,
        phone: &payload.phone,
        number_of_guests: payload.number_of_guests,
        special_requests: payload.special_requests.as_deref(),
        check_in_date: stay.check_in,
        check_out_date: stay.check_out,
        number_of_rooms: payload.number_of_rooms,
        total_price: booking::stay_price(nightly_price, &stay, payload.number_of_rooms),
        payment_method: payload.payment_method.as_deref(),
        hotel_id: hotel.id,
        room_id: payload.room_id,
        created_at: repository::now(),
    };
    let id = reservations::insert(&mut *tx, &new).await?;
    let reservation = load(&mut *tx, id).await?;

    tx.commit().await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

#[utoipa::path(
    get,
    path = "/api/reservations/{id}",
    tag = "reservations",
    params(("id" = i64, Path, description = "Reservation id")),
    responses(
        (status = 200, description = "Reservation found", body = ReservationDto),
        (status = 404, description = "Reservation not found"),
    )
)]
pub async fn get_reservation(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ReservationDto>, AppError> {
    let mut conn = state.db_pool.acquire().await?;
    Ok(Json(load(&mut conn, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/reservations/hotel/{hotel_id}",
    tag = "reservations",
    params(("hotel_id" = i64, Path, description = "Hotel id")),
    responses((status = 200, description = "Reservations of the hotel", body = [ReservationDto]))
)]
pub async fn reservations_by_hotel(
    State(state): State<AppState>,
    ApiPath(hotel_id): ApiPath<i64>,
) -> Result<Json<Vec<ReservationDto>>, AppError> {
    let mut conn = state.db_pool.acquire().await?;
    Ok(Json(reservations::list_by_hotel(&mut conn, hotel_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/reservations/room/{room_id}",
    tag = "reservations",
    params(("room_id" = i64, Path, description = "Room id")),
    responses((status = 200, description = "Reservations of the room", body = [ReservationDto]))
)]
pub async fn reservations_by_room(
    State(state): State<AppState>,
    ApiPath(room_id): ApiPath<i64>,
) -> Result<Json<Vec<ReservationDto>>, AppError> {
    let mut conn = state.db_pool.acquire().await?;
    Ok(Json(reservations::list_by_room(&mut conn, room_id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/reservations/{id}",
    tag = "reservations",
    params(("id" = i64, Path, description = "Reservation id")),
    responses(
        (status = 200, description = "Reservation cancelled", body = MessageResponse),
        (status = 404, description = "Reservation not found"),
        (status = 409, description = "Reservation can no longer be cancelled"),
    )
)]
pub async fn cancel_reservation(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    tracing::info!("Cancelling reservation with id: {}", id);
    let mut tx = state.db_pool.begin().await?;

    let reservation = load(&mut *tx, id).await?;
    let next = booking::cancel(reservation.status)?;
    release_rooms(&mut *tx, &reservation).await?;
    reservations::update_status(&mut *tx, id, next, repository::now()).await?;

    tx.commit().await?;
    Ok(Json(MessageResponse {
        message: format!("Reservation {id} cancelled"),
    }))
}

#[utoipa::path(
    post,
    path = "/api/reservations/{id}/payment",
    tag = "reservations",
    params(("id" = i64, Path, description = "Reservation id"), PaymentUpdateQuery),
    responses(
        (status = 200, description = "Payment recorded", body = PaymentStatusResponse),
        (status = 404, description = "Reservation not found"),
        (status = 409, description = "Payment change not allowed"),
    )
)]
pub async fn update_payment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<PaymentUpdateQuery>,
) -> Result<Json<PaymentStatusResponse>, AppError> {
    tracing::info!("Recording payment {:?} for reservation {}", query.status, id);
    let mut tx = state.db_pool.begin().await?;

    let reservation = load(&mut *tx, id).await?;
    let next = booking::record_payment(reservation.status, reservation.payment_status, query.status)?;
    reservations::update_payment(
        &mut *tx,
        id,
        query.status,
        next,
        query.transaction_id.as_deref(),
        None,
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
    path = "/api/reservations/{id}/check-in",
    tag = "reservations",
    params(("id" = i64, Path, description = "Reservation id")),
    responses(
        (status = 200, description = "Guest checked in", body = StatusChangeResponse),
        (status = 404, description = "Reservation not found"),
        (status = 409, description = "Reservation is not ready for check-in"),
    )
)]
pub async fn check_in(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<StatusChangeResponse>, AppError> {
    tracing::info!("Checking in reservation {}", id);
    let mut tx = state.db_pool.begin().await?;

    let reservation = load(&mut *tx, id).await?;
    let next = booking::check_in_stay(
        reservation.status,
        reservation.payment_status,
        reservation.check_in_date,
        Utc::now().date_naive(),
    )?;
    reservations::update_status(&mut *tx, id, next, repository::now()).await?;
    if let Some(room_id) = reservation.room_id {
        rooms::set_status(&mut *tx, room_id, RoomStatus::Occupied).await?;
    }

    tx.commit().await?;
    Ok(Json(StatusChangeResponse {
        reservation_id: id,
        status: next.as_str().to_string(),
        message: "Check-in completed successfully".to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/reservations/{id}/check-out",
    tag = "reservations",
    params(("id" = i64, Path, description = "Reservation id")),
    responses(
        (status = 200, description = "Guest checked out", body = StatusChangeResponse),
        (status = 404, description = "Reservation not found"),
        (status = 409, description = "Reservation is not checked in"),
    )
)]
pub async fn check_out(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<StatusChangeResponse>, AppError> {
    tracing::info!("Checking out reservation {}", id);
    let mut tx = state.db_pool.begin().await?;

    let reservation = load(&mut *tx, id).await?;
    let next = booking::check_out(reservation.status)?;
    release_rooms(&mut *tx, &reservation).await?;
    reservations::update_status(&mut *tx, id, next, repository::now()).await?;
    if let Some(room_id) = reservation.room_id {
        rooms::set_status(&mut *tx, room_id, RoomStatus::Cleaning).await?;
    }

    tx.commit().await?;
    Ok(Json(StatusChangeResponse {
        reservation_id: id,
        status: next.as_str().to_string(),
        message: "Check-out completed successfully".to_string(),
    }))
}
