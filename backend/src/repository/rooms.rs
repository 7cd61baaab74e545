use chrono::NaiveDate;
use common::{ReservationStatus, RoomDto, RoomRequest, RoomStatus};

use crate::booking::StayRange;
use crate::db::DbConn;

macro_rules! select_room {
    ($tail:literal) => {
        concat!(
            "SELECT r.id, r.room_number, r.name, r.capacity, r.room_type, r.description, r.price_per_night, \
             r.has_wifi, r.has_tv, r.has_balcony, r.has_minibar, r.floor_number, r.bed_count, r.status, \
             r.hotel_id, h.name AS hotel_name \
             FROM rooms r JOIN hotels h ON h.id = r.hotel_id ",
            $tail
        )
    };
}

pub async fn find_by_id(conn: &mut DbConn, id: i64) -> Result<Option<RoomDto>, sqlx::Error> {
    sqlx::query_as::<_, RoomDto>(select_room!("WHERE r.id = ?"))
        .bind(id)
        .fetch_optional(conn)
        .await
}

pub async fn list_by_hotel(conn: &mut DbConn, hotel_id: i64) -> Result<Vec<RoomDto>, sqlx::Error> {
    sqlx::query_as::<_, RoomDto>(select_room!("WHERE r.hotel_id = ? ORDER BY r.id"))
        .bind(hotel_id)
        .fetch_all(conn)
        .await
}

pub async fn exists(conn: &mut DbConn, id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM rooms WHERE id = ?)")
        .bind(id)
        .fetch_one(conn)
        .await
}

pub async fn insert(conn: &mut DbConn, room: &RoomRequest) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        INSERT INTO rooms (room_number, name, capacity, room_type, description, price_per_night,
                           has_wifi, has_tv, has_balcony, has_minibar, floor_number, bed_count, status, hotel_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&room.room_number)
    .bind(&room.name)
    .bind(room.capacity)
    .bind(room.room_type)
    .bind(&room.description)
    .bind(room.price_per_night)
    .bind(room.has_wifi)
    .bind(room.has_tv)
    .bind(room.has_balcony)
    .bind(room.has_minibar)
    .bind(room.floor_number)
    .bind(room.bed_count)
    .bind(room.status)
    .bind(room.hotel_id)
    .fetch_one(conn)
    .await
}

pub async fn update(conn: &mut DbConn, id: i64, room: &RoomRequest) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE rooms
        SET room_number = ?, name = ?, capacity = ?, room_type = ?, description = ?, price_per_night = ?,
            has_wifi = ?, has_tv = ?, has_balcony = ?, has_minibar = ?, floor_number = ?, bed_count = ?,
            status = ?, hotel_id = ?
        WHERE id = ?
        "#,
    )
    .bind(&room.room_number)
    .bind(&room.name)
    .bind(room.capacity)
    .bind(room.room_type)
    .bind(&room.description)
    .bind(room.price_per_night)
    .bind(room.has_wifi)
    .bind(room.has_tv)
    .bind(room.has_balcony)
    .bind(room.has_minibar)
    .bind(room.floor_number)
    .bind(room.bed_count)
    .bind(room.status)
    .bind(room.hotel_id)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn set_status(conn: &mut DbConn, id: i64, status: RoomStatus) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE rooms SET status = ? WHERE id = ?")
        .bind(status)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn has_reservations(conn: &mut DbConn, id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM reservations WHERE room_id = ?)")
        .bind(id)
        .fetch_one(conn)
        .await
}

pub async fn delete(conn: &mut DbConn, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM rooms WHERE id = ?")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Stays still holding the room, i.e. every reservation that was not cancelled.
pub async fn booked_stays(conn: &mut DbConn, room_id: i64) -> Result<Vec<StayRange>, sqlx::Error> {
    let rows: Vec<(NaiveDate, NaiveDate)> = sqlx::query_as(
        "SELECT check_in_date, check_out_date FROM reservations WHERE room_id = ? AND status != ?",
    )
    .bind(room_id)
    .bind(ReservationStatus::Cancelled)
    .fetch_all(conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(check_in, check_out)| StayRange {
            check_in,
            check_out,
        })
        .collect())
}

/// Same as [`booked_stays`] for every room the hotel owns now, keyed by room id.
///
/// Goes through `rooms.hotel_id`: a room moved between hotels keeps its old
/// reservations, whose own `hotel_id` still names the previous hotel.
pub async fn booked_stays_in_hotel(
    conn: &mut DbConn,
    hotel_id: i64,
) -> Result<Vec<(i64, StayRange)>, sqlx::Error> {
    let rows: Vec<(i64, NaiveDate, NaiveDate)> = sqlx::query_as(
        r#"
        SELECT room_id, check_in_date, check_out_date
        FROM reservations
        WHERE room_id IN (SELECT id FROM rooms WHERE hotel_id = ?) AND status != ?
        "#,
    )
    .bind(hotel_id)
    .bind(ReservationStatus::Cancelled)
    .fetch_all(conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(room_id, check_in, check_out)| {
            (
                room_id,
                StayRange {
                    check_in,
                    check_out,
                },
            )
        })
        .collect())
}
