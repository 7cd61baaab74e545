use chrono::NaiveDateTime;
use common::{ActivityDto, ActivityRequest, ActivityStatus};

use crate::db::DbConn;

macro_rules! select_activity {
    ($tail:literal) => {
        concat!(
            "SELECT a.id, a.name, a.description, a.price, a.capacity, a.available_slots, \
             a.start_time, a.end_time, a.status, a.hotel_id, h.name AS hotel_name \
             FROM activities a JOIN hotels h ON h.id = a.hotel_id ",
            $tail
        )
    };
}

pub async fn find_by_id(conn: &mut DbConn, id: i64) -> Result<Option<ActivityDto>, sqlx::Error> {
    sqlx::query_as::<_, ActivityDto>(select_activity!("WHERE a.id = ?"))
        .bind(id)
        .fetch_optional(conn)
        .await
}

pub async fn list_by_hotel(conn: &mut DbConn, hotel_id: i64) -> Result<Vec<ActivityDto>, sqlx::Error> {
    sqlx::query_as::<_, ActivityDto>(select_activity!("WHERE a.hotel_id = ? ORDER BY a.start_time, a.id"))
        .bind(hotel_id)
        .fetch_all(conn)
        .await
}

/// Bookable right now: active, with free slots, and not yet started.
pub async fn list_available(
    conn: &mut DbConn,
    hotel_id: i64,
    now: NaiveDateTime,
) -> Result<Vec<ActivityDto>, sqlx::Error> {
    sqlx::query_as::<_, ActivityDto>(select_activity!(
        "WHERE a.hotel_id = ? AND a.status = ? AND a.available_slots > 0 AND a.start_time > ?
         ORDER BY a.start_time, a.id"
    ))
    .bind(hotel_id)
    .bind(ActivityStatus::Active)
    .bind(now)
    .fetch_all(conn)
    .await
}

/// Activities starting within `[from, to]`.
pub async fn list_starting_between(
    conn: &mut DbConn,
    hotel_id: i64,
    from: NaiveDateTime,
    to: NaiveDateTime,
) -> Result<Vec<ActivityDto>, sqlx::Error> {
    sqlx::query_as::<_, ActivityDto>(select_activity!(
        "WHERE a.hotel_id = ? AND a.start_time >= ? AND a.start_time <= ?
         ORDER BY a.start_time, a.id"
    ))
    .bind(hotel_id)
    .bind(from)
    .bind(to)
    .fetch_all(conn)
    .await
}

pub async fn insert(
    conn: &mut DbConn,
    activity: &ActivityRequest,
    created_at: NaiveDateTime,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        INSERT INTO activities (name, description, price, capacity, available_slots, start_time, end_time,
                                status, created_at, hotel_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&activity.name)
    .bind(&activity.description)
    .bind(activity.price)
    .bind(activity.capacity)
    .bind(activity.capacity)
    .bind(activity.start_time)
    .bind(activity.end_time)
    .bind(ActivityStatus::Active)
    .bind(created_at)
    .bind(activity.hotel_id)
    .fetch_one(conn)
    .await
}

/// Persists every mutable column of `activity` as it stands.
pub async fn update(
    conn: &mut DbConn,
    activity: &ActivityDto,
    updated_at: NaiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE activities
        SET name = ?, description = ?, price = ?, capacity = ?, available_slots = ?,
            start_time = ?, end_time = ?, status = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&activity.name)
    .bind(&activity.description)
    .bind(activity.price)
    .bind(activity.capacity)
    .bind(activity.available_slots)
    .bind(activity.start_time)
    .bind(activity.end_time)
    .bind(activity.status)
    .bind(updated_at)
    .bind(activity.id)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn set_slots(
    conn: &mut DbConn,
    id: i64,
    available_slots: i64,
    status: ActivityStatus,
    updated_at: NaiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE activities SET available_slots = ?, status = ?, updated_at = ? WHERE id = ?")
        .bind(available_slots)
        .bind(status)
        .bind(updated_at)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}
