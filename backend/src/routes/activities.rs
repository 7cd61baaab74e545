use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::NaiveDateTime;
use common::{ActivityDto, ActivityRequest, ActivityStatus, ActivityUpdate, MessageResponse};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::booking;
use crate::db::DbConn;
use crate::error::AppError;
use crate::extractors::{ApiJson, ApiPath, ApiQuery};
use crate::repository::{self, activities, hotels};
use crate::routes::HotelIdQuery;
use crate::web_server::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(activities_by_hotel).post(create_activity))
        .route("/available", get(available_activities))
        .route("/date-range", get(activities_in_range))
        .route(
            "/{id}",
            get(get_activity).put(update_activity).delete(cancel_activity),
        )
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ActivityRangeQuery {
    pub hotel_id: i64,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
}

pub(crate) async fn load(conn: &mut DbConn, id: i64) -> Result<ActivityDto, AppError> {
    activities::find_by_id(conn, id)
        .await?
        .ok_or_else(|| AppError::not_found("Activity", id))
}

#[utoipa::path(
    post,
    path = "/api/activities",
    tag = "activities",
    request_body = ActivityRequest,
    responses(
        (status = 201, description = "Activity created", body = ActivityDto),
        (status = 400, description = "Invalid activity data or schedule"),
        (status = 404, description = "Hotel not found"),
    )
)]
pub async fn create_activity(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ActivityRequest>,
) -> Result<(StatusCode, Json<ActivityDto>), AppError> {
    payload.validate()?;
    let now = repository::now();
    booking::validate_schedule(payload.start_time, payload.end_time, now)?;

    tracing::info!(
        "Creating activity '{}' for hotel {}",
        payload.name,
        payload.hotel_id
    );
    let mut tx = state.db_pool.begin().await?;

    if hotels::find_by_id(&mut *tx, payload.hotel_id).await?.is_none() {
        return Err(AppError::not_found("Hotel", payload.hotel_id));
    }
    let id = activities::insert(&mut *tx, &payload, now).await?;
    let activity = load(&mut *tx, id).await?;

    tx.commit().await?;
    Ok((StatusCode::CREATED, Json(activity)))
}

#[utoipa::path(
    get,
    path = "/api/activities",
    tag = "activities",
    params(HotelIdQuery),
    responses((status = 200, description = "Activities of the hotel", body = [ActivityDto]))
)]
pub async fn activities_by_hotel(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<HotelIdQuery>,
) -> Result<Json<Vec<ActivityDto>>, AppError> {
    let mut conn = state.db_pool.acquire().await?;
    Ok(Json(activities::list_by_hotel(&mut conn, query.hotel_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/activities/available",
    tag = "activities",
    params(HotelIdQuery),
    responses((status = 200, description = "Active upcoming activities with free slots", body = [ActivityDto]))
)]
pub async fn available_activities(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<HotelIdQuery>,
) -> Result<Json<Vec<ActivityDto>>, AppError> {
    let mut conn = state.db_pool.acquire().await?;
    let found = activities::list_available(&mut conn, query.hotel_id, repository::now()).await?;
    Ok(Json(found))
}

#[utoipa::path(
    get,
    path = "/api/activities/date-range",
    tag = "activities",
    params(ActivityRangeQuery),
    responses((status = 200, description = "Activities starting in the range", body = [ActivityDto]))
)]
pub async fn activities_in_range(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ActivityRangeQuery>,
) -> Result<Json<Vec<ActivityDto>>, AppError> {
    let mut conn = state.db_pool.acquire().await?;
    let found = activities::list_starting_between(
        &mut conn,
        query.hotel_id,
        query.start_time,
        query.end_time,
    )
    .await?;
    Ok(Json(found))
}

#[utoipa::path(
    get,
    path = "/api/activities/{id}",
    tag = "activities",
    params(("id" = i64, Path, description = "Activity id")),
    responses(
        (status = 200, description = "Activity found", body = ActivityDto),
        (status = 404, description = "Activity not found"),
    )
)]
pub async fn get_activity(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ActivityDto>, AppError> {
    let mut conn = state.db_pool.acquire().await?;
    Ok(Json(load(&mut conn, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/activities/{id}",
    tag = "activities",
    params(("id" = i64, Path, description = "Activity id")),
    request_body = ActivityUpdate,
    responses(
        (status = 200, description = "Activity updated", body = ActivityDto),
        (status = 400, description = "Invalid schedule"),
        (status = 404, description = "Activity not found"),
        (status = 409, description = "Capacity below places already booked"),
    )
)]
pub async fn update_activity(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<ActivityUpdate>,
) -> Result<Json<ActivityDto>, AppError> {
    payload.validate()?;

    tracing::info!("Updating activity with id: {}", id);
    let mut tx = state.db_pool.begin().await?;
    let mut activity = load(&mut *tx, id).await?;

    if let Some(name) = payload.name {
        activity.name = name;
    }
    if payload.description.is_some() {
        activity.description = payload.description;
    }
    if let Some(price) = payload.price {
        activity.price = price;
    }
    if let Some(capacity) = payload.capacity {
        let resized = booking::resize_capacity(
            activity.capacity,
            activity.available_slots,
            activity.status,
            capacity,
        )?;
        activity.capacity = capacity;
        activity.available_slots = resized.available_slots;
        activity.status = resized.status;
    }
    if let Some(start_time) = payload.start_time {
        activity.start_time = start_time;
    }
    if let Some(end_time) = payload.end_time {
        activity.end_time = end_time;
    }

    let now = repository::now();
    booking::validate_schedule(activity.start_time, activity.end_time, now)?;
    activities::update(&mut *tx, &activity, now).await?;

    tx.commit().await?;
    Ok(Json(activity))
}

#[utoipa::path(
    delete,
    path = "/api/activities/{id}",
    tag = "activities",
    params(("id" = i64, Path, description = "Activity id")),
    responses(
        (status = 200, description = "Activity cancelled", body = MessageResponse),
        (status = 404, description = "Activity not found"),
    )
)]
pub async fn cancel_activity(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    tracing::info!("Cancelling activity with id: {}", id);
    let mut tx = state.db_pool.begin().await?;

    let activity = load(&mut *tx, id).await?;
    activities::set_slots(
        &mut *tx,
        id,
        activity.available_slots,
        ActivityStatus::Cancelled,
        repository::now(),
    )
    .await?;

    tx.commit().await?;
    Ok(Json(MessageResponse {
        message: format!("Activity {id} cancelled"),
    }))
}
