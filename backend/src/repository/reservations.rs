use chrono::NaiveDateTime;
use common::{PaymentStatus, ReservationDto, ReservationStatus};

use crate::db::DbConn;

macro_rules! select_reservation {
    ($tail:literal) => {
        concat!(
            "SELECT r.id, r.full_name, r.email, r.phone, r.number_of_guests, r.special_requests, \
             r.check_in_date, r.check_out_date, r.number_of_rooms, r.total_price, r.payment_status, \
             r.payment_method, r.payment_transaction_id, r.status, r.created_at, r.updated_at, \
             r.hotel_id, h.name AS hotel_name, r.room_id, rm.room_number \
             FROM reservations r \
             JOIN hotels h ON h.id = r.hotel_id \
             LEFT JOIN rooms rm ON rm.id = r.room_id ",
            $tail
        )
    };
}

/// Column values for a new reservation, resolved by the route from the request.
#[derive(Debug, Clone)]
pub struct NewReservation<'a> {
    pub full_name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub number_of_guests: Option<i64>,
    pub special_requests: Option<&'a str>,
    pub check_in_date: chrono::NaiveDate,
    pub check_out_date: chrono::NaiveDate,
    pub number_of_rooms: i64,
    pub total_price: f64,
    pub payment_method: Option<&'a str>,
    pub hotel_id: i64,
    pub room_id: Option<i64>,
    pub created_at: NaiveDateTime,
}

pub async fn find_by_id(conn: &mut DbConn, id: i64) -> Result<Option<ReservationDto>, sqlx::Error> {
    sqlx::query_as::<_, ReservationDto>(select_reservation!("WHERE r.id = ?"))
        .bind(id)
        .fetch_optional(conn)
        .await
}

pub async fn exists(conn: &mut DbConn, id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM reservations WHERE id = ?)")
        .bind(id)
        .fetch_one(conn)
        .await
}

pub async fn list_by_hotel(
    conn: &mut DbConn,
    hotel_id: i64,
) -> Result<Vec<ReservationDto>, sqlx::Error> {
    sqlx::query_as::<_, ReservationDto>(select_reservation!("WHERE r.hotel_id = ? ORDER BY r.id"))
        .bind(hotel_id)
        .fetch_all(conn)
        .await
}

pub async fn list_by_room(
    conn: &mut DbConn,
    room_id: i64,
) -> Result<Vec<ReservationDto>, sqlx::Error> {
    sqlx::query_as::<_, ReservationDto>(select_reservation!("WHERE r.room_id = ? ORDER BY r.id"))
        .bind(room_id)
        .fetch_all(conn)
        .await
}

pub async fn insert(conn: &mut DbConn, new: &NewReservation<'_>) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        INSERT INTO reservations (full_name, email, phone, number_of_guests, special_requests,
                                  check_in_date, check_out_date, number_of_rooms, total_price,
                                  payment_status, payment_method, status, created_at, hotel_id, room_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(new.full_name)
    .bind(new.email)
    .bind(new.phone)
    .bind(new.number_of_guests)
    .bind(new.special_requests)
    .bind(new.check_in_date)
    .bind(new.check_out_date)
    .bind(new.number_of_rooms)
    .bind(new.total_price)
    .bind(PaymentStatus::Pending)
    .bind(new.payment_method)
    .bind(ReservationStatus::Created)
    .bind(new.created_at)
    .bind(new.hotel_id)
    .bind(new.room_id)
    .fetch_one(conn)
    .await
}

pub async fn update_status(
    conn: &mut DbConn,
    id: i64,
    status: ReservationStatus,
    updated_at: NaiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE reservations SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(updated_at)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Writes a payment outcome. A missing transaction id or method keeps the stored one.
pub async fn update_payment(
    conn: &mut DbConn,
    id: i64,
    payment_status: PaymentStatus,
    status: ReservationStatus,
    transaction_id: Option<&str>,
    payment_method: Option<&str>,
    updated_at: NaiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE reservations
        SET payment_status = ?,
            status = ?,
            payment_transaction_id = COALESCE(?, payment_transaction_id),
            payment_method = COALESCE(?, payment_method),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(payment_status)
    .bind(status)
    .bind(transaction_id)
    .bind(payment_method)
    .bind(updated_at)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(())
}
