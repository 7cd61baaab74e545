use chrono::{Duration, NaiveDateTime, Utc};
use common::{
    ActivityDto, ActivityReservationDto, ActivityReservationStatus, ActivityStatus, HotelDto,
    PaymentStatusResponse, StatusChangeResponse,
};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::net::SocketAddr;

mod helpers;
use helpers::{create_hotel, create_reservation, days_from_today, reservation_body};

fn hours_from_now(hours: i64) -> NaiveDateTime {
    Utc::now().naive_utc() + Duration::hours(hours)
}

fn query_time(time: NaiveDateTime) -> String {
    time.format("%Y-%m-%dT%H:%M:%S").to_string()
}

async fn create_activity(
    addr: &SocketAddr,
    client: &reqwest::Client,
    hotel: &HotelDto,
    name: &str,
    capacity: i64,
    starts_in_hours: i64,
) -> ActivityDto {
    let response = client
        .post(format!("http://{addr}/api/activities"))
        .json(&json!({
            "name": name,
            "description": "Bring a towel",
            "price": 25.0,
            "capacity": capacity,
            "startTime": hours_from_now(starts_in_hours),
            "endTime": hours_from_now(starts_in_hours + 2),
            "hotelId": hotel.id,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.unwrap()
}

fn booking_body(activity_id: i64, participants: i64) -> Value {
    json!({
        "fullName": "Grace Hopper",
        "email": "grace@example.com",
        "numberOfParticipants": participants,
        "activityId": activity_id,
    })
}

async fn book(
    addr: &SocketAddr,
    client: &reqwest::Client,
    body: &Value,
) -> reqwest::Response {
    client
        .post(format!("http://{addr}/api/activity-reservations"))
        .json(body)
        .send()
        .await
        .unwrap()
}

async fn get_activity(addr: &SocketAddr, client: &reqwest::Client, id: i64) -> ActivityDto {
    client
        .get(format!("http://{addr}/api/activities/{id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_activity_crud() {
    let (addr, client, _db_pool) = helpers::spawn_app().await;
    let hotel = create_hotel(&addr, &client, "Spa Resort", "Merano", 10).await;

    // 1. Create
    let yoga = create_activity(&addr, &client, &hotel, "Sunrise Yoga", 10, 24).await;
    assert_eq!(yoga.available_slots, 10);
    assert_eq!(yoga.status, ActivityStatus::Active);
    assert_eq!(yoga.hotel_name, "Spa Resort");
    create_activity(&addr, &client, &hotel, "Wine Tasting", 8, 72).await;

    // 2. Start in the past, and end before start
    let response = client
        .post(format!("http://{addr}/api/activities"))
        .json(&json!({
            "name": "Yesterday",
            "price": 0.0,
            "capacity": 1,
            "startTime": hours_from_now(-5),
            "endTime": hours_from_now(-3),
            "hotelId": hotel.id,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .post(format!("http://{addr}/api/activities"))
        .json(&json!({
            "name": "Backwards",
            "price": 0.0,
            "capacity": 1,
            "startTime": hours_from_now(5),
            "endTime": hours_from_now(3),
            "hotelId": hotel.id,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // 3. Listings
    let all: Vec<ActivityDto> = client
        .get(format!("http://{addr}/api/activities"))
        .query(&[("hotelId", hotel.id)])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    let in_range: Vec<ActivityDto> = client
        .get(format!("http://{addr}/api/activities/date-range"))
        .query(&[
            ("hotelId", hotel.id.to_string()),
            ("startTime", query_time(hours_from_now(12))),
            ("endTime", query_time(hours_from_now(48))),
        ])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(in_range.len(), 1);
    assert_eq!(in_range[0].id, yoga.id);

    // 4. Partial update keeps untouched fields
    let response = client
        .put(format!("http://{addr}/api/activities/{}", yoga.id))
        .json(&json!({ "price": 30.0, "capacity": 12 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated: ActivityDto = response.json().await.unwrap();
    assert_eq!(updated.name, "Sunrise Yoga");
    assert_eq!(updated.price, 30.0);
    assert_eq!(updated.capacity, 12);
    assert_eq!(updated.available_slots, 12);

    // 5. Cancelling hides it from the bookable list
    let response = client
        .delete(format!("http://{addr}/api/activities/{}", yoga.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        get_activity(&addr, &client, yoga.id).await.status,
        ActivityStatus::Cancelled
    );

    let available: Vec<ActivityDto> = client
        .get(format!("http://{addr}/api/activities/available"))
        .query(&[("hotelId", hotel.id)])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].name, "Wine Tasting");

    let response = book(&addr, &client, &booking_body(yoga.id, 1)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_slots_fill_and_free_up() {
    let (addr, client, _db_pool) = helpers::spawn_app().await;
    let hotel = create_hotel(&addr, &client, "Cliff Hotel", "Amalfi", 10).await;
    let tour = create_activity(&addr, &client, &hotel, "Boat Tour", 4, 48).await;

    // 1. Book three of four places
    let response = book(&addr, &client, &booking_body(tour.id, 3)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let first: ActivityReservationDto = response.json().await.unwrap();
    assert_eq!(first.total_price, 75.0);
    assert_eq!(first.activity_name, "Boat Tour");
    assert_eq!(get_activity(&addr, &client, tour.id).await.available_slots, 1);

    // 2. Two more do not fit
    let response = book(&addr, &client, &booking_body(tour.id, 2)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // 3. The last place fills the activity
    let response = book(&addr, &client, &booking_body(tour.id, 1)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let full = get_activity(&addr, &client, tour.id).await;
    assert_eq!(full.available_slots, 0);
    assert_eq!(full.status, ActivityStatus::Full);

    // 4. Capacity cannot drop below what is booked
    let response = client
        .put(format!("http://{addr}/api/activities/{}", tour.id))
        .json(&json!({ "capacity": 3 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // 5. Cancelling the first booking reopens the activity
    let response = client
        .delete(format!(
            "http://{addr}/api/activity-reservations/{}",
            first.id
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let reopened = get_activity(&addr, &client, tour.id).await;
    assert_eq!(reopened.available_slots, 3);
    assert_eq!(reopened.status, ActivityStatus::Active);

    let bookings: Vec<ActivityReservationDto> = client
        .get(format!(
            "http://{addr}/api/activity-reservations/activity/{}",
            tour.id
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(bookings.len(), 2);
}

#[tokio::test]
async fn test_activity_booking_lifecycle() {
    let (addr, client, _db_pool) = helpers::spawn_app().await;
    let hotel = create_hotel(&addr, &client, "Golf Club", "Verona", 10).await;
    let lesson = create_activity(&addr, &client, &hotel, "Golf Lesson", 6, 30).await;

    // 1. Link the booking to a hotel stay
    let stay = create_reservation(
        &addr,
        &client,
        &reservation_body(hotel.id, None, days_from_today(1), days_from_today(3), 1),
    )
    .await;
    let mut body = booking_body(lesson.id, 2);
    body["hotelReservationId"] = json!(stay.id);
    let response = book(&addr, &client, &body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let booked: ActivityReservationDto = response.json().await.unwrap();
    assert_eq!(booked.hotel_reservation_id, Some(stay.id));
    let id = booked.id;

    // An unknown stay is rejected
    let mut body = booking_body(lesson.id, 1);
    body["hotelReservationId"] = json!(424242);
    let response = book(&addr, &client, &body).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let linked: Vec<ActivityReservationDto> = client
        .get(format!(
            "http://{addr}/api/activity-reservations/hotel-reservation/{}",
            stay.id
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(linked.len(), 1);

    // 2. Check-in requires payment
    let response = client
        .post(format!("http://{addr}/api/activity-reservations/{id}/check-in"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // 3. A failed payment can be retried
    let response = client
        .post(format!("http://{addr}/api/activity-reservations/{id}/payment"))
        .query(&[("status", "FAILED")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let payment: PaymentStatusResponse = response.json().await.unwrap();
    assert_eq!(payment.reservation_status, "CREATED");

    let response = client
        .post(format!("http://{addr}/api/activity-reservations/{id}/payment"))
        .query(&[("status", "PAID"), ("transactionId", "tx-golf")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let payment: PaymentStatusResponse = response.json().await.unwrap();
    assert_eq!(payment.reservation_status, "CONFIRMED");

    // 4. Check in, then complete
    let response = client
        .post(format!("http://{addr}/api/activity-reservations/{id}/check-in"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let change: StatusChangeResponse = response.json().await.unwrap();
    assert_eq!(change.status, "CHECKED_IN");

    let response = client
        .post(format!("http://{addr}/api/activity-reservations/{id}/complete"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let stored: ActivityReservationDto = client
        .get(format!("http://{addr}/api/activity-reservations/{id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stored.status, ActivityReservationStatus::Completed);
    assert_eq!(stored.payment_transaction_id.as_deref(), Some("tx-golf"));

    // 5. A completed booking can no longer be cancelled
    let response = client
        .delete(format!("http://{addr}/api/activity-reservations/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
