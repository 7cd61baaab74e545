use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use common::{HotelAvailability, HotelCount, HotelDto, HotelRequest, RoomStatus};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::booking::{is_room_free, StayRange};
use crate::error::AppError;
use crate::extractors::{ApiJson, ApiPath, ApiQuery};
use crate::repository::{hotels, rooms};
use crate::web_server::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(search_hotels).post(create_hotel))
        .route("/count", get(count_hotels))
        .route(
            "/{id}",
            get(get_hotel).put(update_hotel).delete(delete_hotel),
        )
        .route("/{id}/availability", get(hotel_availability))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct HotelSearch {
    pub city: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CityQuery {
    pub city: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct StayQuery {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

#[utoipa::path(
    post,
    path = "/api/hotels",
    tag = "hotels",
    request_body = HotelRequest,
    responses(
        (status = 201, description = "Hotel created", body = HotelDto),
        (status = 400, description = "Invalid hotel data"),
    )
)]
pub async fn create_hotel(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<HotelRequest>,
) -> Result<(StatusCode, Json<HotelDto>), AppError> {
    payload.validate()?;

    let available_rooms = payload.available_rooms.unwrap_or(payload.total_rooms);
    if available_rooms > payload.total_rooms {
        return Err(AppError::BadRequest(
            "Available rooms cannot exceed total rooms".to_string(),
        ));
    }

    tracing::info!("Creating hotel: {} ({})", payload.name, payload.city);
    let mut conn = state.db_pool.acquire().await?;
    let hotel = hotels::insert(&mut conn, &payload, available_rooms).await?;

    Ok((StatusCode::CREATED, Json(hotel)))
}

#[utoipa::path(
    get,
    path = "/api/hotels",
    tag = "hotels",
    params(HotelSearch),
    responses((status = 200, description = "Matching hotels", body = [HotelDto]))
)]
pub async fn search_hotels(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<HotelSearch>,
) -> Result<Json<Vec<HotelDto>>, AppError> {
    tracing::info!("Searching hotels: {:?}", filter);
    let mut conn = state.db_pool.acquire().await?;
    let found = hotels::search(
        &mut conn,
        filter.city.as_deref(),
        filter.min_price,
        filter.max_price,
    )
    .await?;
    Ok(Json(found))
}

#[utoipa::path(
    get,
    path = "/api/hotels/count",
    tag = "hotels",
    params(CityQuery),
    responses((status = 200, description = "Number of hotels in the city", body = HotelCount))
)]
pub async fn count_hotels(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CityQuery>,
) -> Result<Json<HotelCount>, AppError> {
    let mut conn = state.db_pool.acquire().await?;
    let count = hotels::count_by_city(&mut conn, &query.city).await?;
    Ok(Json(HotelCount { count }))
}

#[utoipa::path(
    get,
    path = "/api/hotels/{id}",
    tag = "hotels",
    params(("id" = i64, Path, description = "Hotel id")),
    responses(
        (status = 200, description = "Hotel found", body = HotelDto),
        (status = 404, description = "Hotel not found"),
    )
)]
pub async fn get_hotel(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<HotelDto>, AppError> {
    let mut conn = state.db_pool.acquire().await?;
    let hotel = hotels::find_by_id(&mut conn, id)
        .await?
        .ok_or_else(|| AppError::not_found("Hotel", id))?;
    Ok(Json(hotel))
}

#[utoipa::path(
    put,
    path = "/api/hotels/{id}",
    tag = "hotels",
    params(("id" = i64, Path, description = "Hotel id")),
    request_body = HotelRequest,
    responses(
        (status = 200, description = "Hotel updated", body = HotelDto),
        (status = 404, description = "Hotel not found"),
    )
)]
pub async fn update_hotel(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<HotelRequest>,
) -> Result<Json<HotelDto>, AppError> {
    payload.validate()?;

    tracing::info!("Updating hotel with id: {}", id);
    let mut conn = state.db_pool.acquire().await?;
    let hotel = hotels::update_details(&mut conn, id, &payload)
        .await?
        .ok_or_else(|| AppError::not_found("Hotel", id))?;
    Ok(Json(hotel))
}

#[utoipa::path(
    delete,
    path = "/api/hotels/{id}",
    tag = "hotels",
    params(("id" = i64, Path, description = "Hotel id")),
    responses(
        (status = 204, description = "Hotel deleted"),
        (status = 404, description = "Hotel not found"),
        (status = 409, description = "Hotel still has rooms, reservations or activities"),
    )
)]
pub async fn delete_hotel(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, AppError> {
    tracing::info!("Deleting hotel with id: {}", id);
    let mut tx = state.db_pool.begin().await?;

    if hotels::find_by_id(&mut *tx, id).await?.is_none() {
        return Err(AppError::not_found("Hotel", id));
    }

    let dependents = hotels::dependents(&mut *tx, id).await?;
    if !dependents.is_empty() {
        return Err(AppError::Conflict(format!(
            "Hotel {id} still has {} rooms, {} reservations and {} activities",
            dependents.rooms, dependents.reservations, dependents.activities
        )));
    }

    hotels::delete(&mut *tx, id).await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/hotels/{id}/availability",
    tag = "hotels",
    params(("id" = i64, Path, description = "Hotel id"), StayQuery),
    responses(
        (status = 200, description = "Free rooms for the stay", body = HotelAvailability),
        (status = 400, description = "Check-out is not after check-in"),
        (status = 404, description = "Hotel not found"),
    )
)]
pub async fn hotel_availability(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<StayQuery>,
) -> Result<Json<HotelAvailability>, AppError> {
    let stay = StayRange::new(query.check_in, query.check_out)?;

    let mut conn = state.db_pool.acquire().await?;
    let hotel = hotels::find_by_id(&mut conn, id)
        .await?
        .ok_or_else(|| AppError::not_found("Hotel", id))?;

    let available_rooms = free_rooms(&mut conn, id, &stay).await?;

    Ok(Json(HotelAvailability {
        hotel_id: hotel.id,
        hotel_name: hotel.name,
        check_in_date: stay.check_in,
        check_out_date: stay.check_out,
        available_rooms_count: available_rooms.len(),
        is_available: !available_rooms.is_empty(),
        available_rooms,
    }))
}

/// Rooms of `hotel_id` with no active booking overlapping `stay`, skipping rooms under maintenance.
pub(crate) async fn free_rooms(
    conn: &mut crate::db::DbConn,
    hotel_id: i64,
    stay: &StayRange,
) -> Result<Vec<common::RoomDto>, AppError> {
    let candidates = rooms::list_by_hotel(&mut *conn, hotel_id).await?;
    let booked = rooms::booked_stays_in_hotel(&mut *conn, hotel_id).await?;

    Ok(candidates
        .into_iter()
        .filter(|room| room.status != RoomStatus::Maintenance)
        .filter(|room| {
            let taken: Vec<StayRange> = booked
                .iter()
                .filter(|(room_id, _)| *room_id == room.id)
                .map(|(_, stay)| *stay)
                .collect();
            is_room_free(stay, &taken)
        })
        .collect())
}
