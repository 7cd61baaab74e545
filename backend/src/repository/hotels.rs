use common::{HotelDto, HotelRequest};

use crate::db::DbConn;

macro_rules! select_hotel {
    ($tail:literal) => {
        concat!(
            "SELECT id, name, city, address, description, price_per_night, total_rooms, available_rooms FROM hotels ",
            $tail
        )
    };
}

/// Rows that keep a hotel from being deleted.
#[derive(sqlx::FromRow, Debug, Default, PartialEq)]
pub struct Dependents {
    pub rooms: i64,
    pub reservations: i64,
    pub activities: i64,
}

impl Dependents {
    pub fn is_empty(&self) -> bool {
        self.rooms == 0 && self.reservations == 0 && self.activities == 0
    }
}

pub async fn find_by_id(conn: &mut DbConn, id: i64) -> Result<Option<HotelDto>, sqlx::Error> {
    sqlx::query_as::<_, HotelDto>(select_hotel!("WHERE id = ?"))
        .bind(id)
        .fetch_optional(conn)
        .await
}

/// Every filter is optional; the city match ignores case.
pub async fn search(
    conn: &mut DbConn,
    city: Option<&str>,
    min_price: Option<f64>,
    max_price: Option<f64>,
) -> Result<Vec<HotelDto>, sqlx::Error> {
    sqlx::query_as::<_, HotelDto>(select_hotel!(
        "WHERE (?1 IS NULL OR LOWER(city) = LOWER(?1))
           AND (?2 IS NULL OR price_per_night >= ?2)
           AND (?3 IS NULL OR price_per_night <= ?3)
         ORDER BY id"
    ))
    .bind(city)
    .bind(min_price)
    .bind(max_price)
    .fetch_all(conn)
    .await
}

pub async fn count_by_city(conn: &mut DbConn, city: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM hotels WHERE LOWER(city) = LOWER(?)")
        .bind(city)
        .fetch_one(conn)
        .await
}

pub async fn insert(
    conn: &mut DbConn,
    hotel: &HotelRequest,
    available_rooms: i64,
) -> Result<HotelDto, sqlx::Error> {
    sqlx::query_as::<_, HotelDto>(
        r#"
        INSERT INTO hotels (name, city, address, description, price_per_night, total_rooms, available_rooms)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING id, name, city, address, description, price_per_night, total_rooms, available_rooms
        "#,
    )
    .bind(&hotel.name)
    .bind(&hotel.city)
    .bind(&hotel.address)
    .bind(&hotel.description)
    .bind(hotel.price_per_night)
    .bind(hotel.total_rooms)
    .bind(available_rooms)
    .fetch_one(conn)
    .await
}

/// Updates the descriptive fields only; room counters move through bookings.
pub async fn update_details(
    conn: &mut DbConn,
    id: i64,
    hotel: &HotelRequest,
) -> Result<Option<HotelDto>, sqlx::Error> {
    sqlx::query_as::<_, HotelDto>(
        r#"
        UPDATE hotels
        SET name = ?, city = ?, address = ?, description = ?, price_per_night = ?
        WHERE id = ?
        RETURNING id, name, city, address, description, price_per_night, total_rooms, available_rooms
        "#,
    )
    .bind(&hotel.name)
    .bind(&hotel.city)
    .bind(&hotel.address)
    .bind(&hotel.description)
    .bind(hotel.price_per_night)
    .bind(id)
    .fetch_optional(conn)
    .await
}

pub async fn set_available_rooms(
    conn: &mut DbConn,
    id: i64,
    available_rooms: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE hotels SET available_rooms = ? WHERE id = ?")
        .bind(available_rooms)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn dependents(conn: &mut DbConn, id: i64) -> Result<Dependents, sqlx::Error> {
    sqlx::query_as::<_, Dependents>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM rooms WHERE hotel_id = ?1) AS rooms,
            (SELECT COUNT(*) FROM reservations WHERE hotel_id = ?1) AS reservations,
            (SELECT COUNT(*) FROM activities WHERE hotel_id = ?1) AS activities
        "#,
    )
    .bind(id)
    .fetch_one(conn)
    .await
}

pub async fn delete(conn: &mut DbConn, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM hotels WHERE id = ?")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}
