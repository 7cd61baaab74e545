use chrono::NaiveDateTime;
use common::{ActivityReservationDto, ActivityReservationRequest, ActivityReservationStatus, PaymentStatus};

use crate::db::DbConn;

macro_rules! select_booking {
    ($tail:literal) => {
        concat!(
            "SELECT b.id, b.full_name, b.email, b.phone, b.number_of_participants, b.special_requests, \
             b.total_price, b.payment_status, b.payment_method, b.payment_transaction_id, b.status, \
             b.activity_id, a.name AS activity_name, b.hotel_reservation_id, b.created_at, b.updated_at \
             FROM activity_reservations b JOIN activities a ON a.id = b.activity_id ",
            $tail
        )
    };
}

pub async fn find_by_id(
    conn: &mut DbConn,
    id: i64,
) -> Result<Option<ActivityReservationDto>, sqlx::Error> {
    sqlx::query_as::<_, ActivityReservationDto>(select_booking!("WHERE b.id = ?"))
        .bind(id)
        .fetch_optional(conn)
        .await
}

pub async fn list_by_activity(
    conn: &mut DbConn,
    activity_id: i64,
) -> Result<Vec<ActivityReservationDto>, sqlx::Error> {
    sqlx::query_as::<_, ActivityReservationDto>(select_booking!("WHERE b.activity_id = ? ORDER BY b.id"))
        .bind(activity_id)
        .fetch_all(conn)
        .await
}

pub async fn list_by_hotel_reservation(
    conn: &mut DbConn,
    hotel_reservation_id: i64,
) -> Result<Vec<ActivityReservationDto>, sqlx::Error> {
    sqlx::query_as::<_, ActivityReservationDto>(select_booking!(
        "WHERE b.hotel_reservation_id = ? ORDER BY b.id"
    ))
    .bind(hotel_reservation_id)
    .fetch_all(conn)
    .await
}

pub async fn insert(
    conn: &mut DbConn,
    booking: &ActivityReservationRequest,
    total_price: f64,
    created_at: NaiveDateTime,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        INSERT INTO activity_reservations (full_name, email, phone, number_of_participants, special_requests,
                                           total_price, payment_status, payment_method, status, created_at,
                                           activity_id, hotel_reservation_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&booking.full_name)
    .bind(&booking.email)
    .bind(&booking.phone)
    .bind(booking.number_of_participants)
    .bind(&booking.special_requests)
    .bind(total_price)
    .bind(PaymentStatus::Pending)
    .bind(&booking.payment_method)
    .bind(ActivityReservationStatus::Created)
    .bind(created_at)
    .bind(booking.activity_id)
    .bind(booking.hotel_reservation_id)
    .fetch_one(conn)
    .await
}

pub async fn update_status(
    conn: &mut DbConn,
    id: i64,
    status: ActivityReservationStatus,
    updated_at: NaiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE activity_reservations SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(updated_at)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn update_payment(
    conn: &mut DbConn,
    id: i64,
    payment_status: PaymentStatus,
    status: ActivityReservationStatus,
    transaction_id: Option<&str>,
    updated_at: NaiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE activity_reservations
        SET payment_status = ?,
            status = ?,
            payment_transaction_id = COALESCE(?, payment_transaction_id),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(payment_status)
    .bind(status)
    .bind(transaction_id)
    .bind(updated_at)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(())
}
