use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use common::{RoomAvailability, RoomDto, RoomRequest};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::booking::{is_room_free, StayRange};
use crate::error::AppError;
use crate::extractors::{ApiJson, ApiPath, ApiQuery};
use crate::repository::{hotels, rooms};
use crate::routes::{hotels::free_rooms, DateRangeQuery};
use crate::web_server::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_room))
        .route("/available", get(available_rooms))
        .route("/hotel/{hotel_id}", get(rooms_by_hotel))
        .route(
            "/{id}",
            get(get_room).put(update_room).delete(delete_room),
        )
        .route("/{id}/availability", get(room_availability))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AvailableRoomsQuery {
    pub hotel_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[utoipa::path(
    post,
    path = "/api/rooms",
    tag = "rooms",
    request_body = RoomRequest,
    responses(
        (status = 201, description = "Room created", body = RoomDto),
        (status = 400, description = "Invalid room data"),
        (status = 404, description = "Hotel not found"),
    )
)]
pub async fn create_room(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RoomRequest>,
) -> Result<(StatusCode, Json<RoomDto>), AppError> {
    payload.validate()?;

    tracing::info!(
        "Creating room {} in hotel {}",
        payload.room_number,
        payload.hotel_id
    );
    let mut tx = state.db_pool.begin().await?;

    if hotels::find_by_id(&mut *tx, payload.hotel_id).await?.is_none() {
        return Err(AppError::not_found("Hotel", payload.hotel_id));
    }
    let id = rooms::insert(&mut *tx, &payload).await?;
    let room = rooms::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::not_found("Room", id))?;

    tx.commit().await?;
    Ok((StatusCode::CREATED, Json(room)))
}

#[utoipa::path(
    put,
    path = "/api/rooms/{id}",
    tag = "rooms",
    params(("id" = i64, Path, description = "Room id")),
    request_body = RoomRequest,
    responses(
        (status = 200, description = "Room updated", body = RoomDto),
        (status = 404, description = "Room or hotel not found"),
    )
)]
pub async fn update_room(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<RoomRequest>,
) -> Result<Json<RoomDto>, AppError> {
    payload.validate()?;

    tracing::info!("Updating room with id: {}", id);
    let mut tx = state.db_pool.begin().await?;

    if !rooms::exists(&mut *tx, id).await? {
        return Err(AppError::not_found("Room", id));
    }
    if hotels::find_by_id(&mut *tx, payload.hotel_id).await?.is_none() {
        return Err(AppError::not_found("Hotel", payload.hotel_id));
    }
    rooms::update(&mut *tx, id, &payload).await?;
    let room = rooms::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::not_found("Room", id))?;

    tx.commit().await?;
    Ok(Json(room))
}

#[utoipa::path(
    get,
    path = "/api/rooms/{id}",
    tag = "rooms",
    params(("id" = i64, Path, description = "Room id")),
    responses(
        (status = 200, description = "Room found", body = RoomDto),
        (status = 404, description = "Room not found"),
    )
)]
pub async fn get_room(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<RoomDto>, AppError> {
    let mut conn = state.db_pool.acquire().await?;
    let room = rooms::find_by_id(&mut conn, id)
        .await?
        .ok_or_else(|| AppError::not_found("Room", id))?;
    Ok(Json(room))
}

#[utoipa::path(
    get,
    path = "/api/rooms/hotel/{hotel_id}",
    tag = "rooms",
    params(("hotel_id" = i64, Path, description = "Hotel id")),
    responses((status = 200, description = "Rooms of the hotel", body = [RoomDto]))
)]
pub async fn rooms_by_hotel(
    State(state): State<AppState>,
    ApiPath(hotel_id): ApiPath<i64>,
) -> Result<Json<Vec<RoomDto>>, AppError> {
    let mut conn = state.db_pool.acquire().await?;
    Ok(Json(rooms::list_by_hotel(&mut conn, hotel_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/rooms/{id}/availability",
    tag = "rooms",
    params(("id" = i64, Path, description = "Room id"), DateRangeQuery),
    responses(
        (status = 200, description = "Room is free", body = RoomAvailability),
        (status = 404, description = "Room not found"),
        (status = 409, description = "Room is taken for some of the dates", body = RoomAvailability),
    )
)]
pub async fn room_availability(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<DateRangeQuery>,
) -> Result<(StatusCode, Json<RoomAvailability>), AppError> {
    let stay = query.stay()?;

    let mut conn = state.db_pool.acquire().await?;
    if !rooms::exists(&mut conn, id).await? {
        return Err(AppError::not_found("Room", id));
    }
    let booked = rooms::booked_stays(&mut conn, id).await?;

    let response = if is_room_free(&stay, &booked) {
        (
            StatusCode::OK,
            Json(RoomAvailability {
                room_id: id,
                available: true,
                message: "Room is available for the selected dates".to_string(),
            }),
        )
    } else {
        (
            StatusCode::CONFLICT,
            Json(RoomAvailability {
                room_id: id,
                available: false,
                message: "Room is not available for the selected dates".to_string(),
            }),
        )
    };
    Ok(response)
}

#[utoipa::path(
    get,
    path = "/api/rooms/available",
    tag = "rooms",
    params(AvailableRoomsQuery),
    responses(
        (status = 200, description = "Rooms free for the whole range", body = [RoomDto]),
        (status = 400, description = "End date is not after start date"),
    )
)]
pub async fn available_rooms(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AvailableRoomsQuery>,
) -> Result<Json<Vec<RoomDto>>, AppError> {
    let stay = StayRange::new(query.start_date, query.end_date)?;
    let mut conn = state.db_pool.acquire().await?;
    Ok(Json(free_rooms(&mut conn, query.hotel_id, &stay).await?))
}

#[utoipa::path(
    delete,
    path = "/api/rooms/{id}",
    tag = "rooms",
    params(("id" = i64, Path, description = "Room id")),
    responses(
        (status = 204, description = "Room deleted"),
        (status = 404, description = "Room not found"),
        (status = 409, description = "Room has reservations"),
    )
)]
pub async fn delete_room(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, AppError> {
    tracing::info!("Deleting room with id: {}", id);
    let mut tx = state.db_pool.begin().await?;

    if !rooms::exists(&mut *tx, id).await? {
        return Err(AppError::not_found("Room", id));
    }
    if rooms::has_reservations(&mut *tx, id).await? {
        return Err(AppError::Conflict(
            "Cannot delete room with existing reservations".to_string(),
        ));
    }
    rooms::delete(&mut *tx, id).await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
