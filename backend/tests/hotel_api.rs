use common::{HotelAvailability, HotelCount, HotelDto, RoomAvailability, RoomDto};
use reqwest::StatusCode;
use serde_json::{json, Value};

mod helpers;
use helpers::{create_hotel, create_reservation, create_room, days_from_today, reservation_body};

#[tokio::test]
async fn test_hotel_crud_and_search() {
    let (addr, client, _db_pool) = helpers::spawn_app().await;

    // 1. Create two hotels in Rome and one in Milan
    let budget = create_hotel(&addr, &client, "Budget Inn", "Rome", 10).await;
    assert_eq!(budget.available_rooms, 10, "availableRooms defaults to totalRooms");
    create_hotel(&addr, &client, "Grand Hotel", "Rome", 50).await;
    create_hotel(&addr, &client, "Duomo Suites", "Milan", 5).await;

    // 2. City search ignores case
    let found: Vec<HotelDto> = client
        .get(format!("http://{addr}/api/hotels"))
        .query(&[("city", "rome")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(found.len(), 2);

    // 3. Price filters combine with the city
    let found: Vec<HotelDto> = client
        .get(format!("http://{addr}/api/hotels"))
        .query(&[("city", "Rome"), ("maxPrice", "50")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(found.is_empty());

    let all: Vec<HotelDto> = client
        .get(format!("http://{addr}/api/hotels"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all.len(), 3);

    // 4. Count by city
    let count: HotelCount = client
        .get(format!("http://{addr}/api/hotels/count"))
        .query(&[("city", "ROME")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(count.count, 2);

    // 5. Update keeps the counters
    let response = client
        .put(format!("http://{addr}/api/hotels/{}", budget.id))
        .json(&json!({
            "name": "Budget Inn Deluxe",
            "city": "Rome",
            "address": "2 Side Street",
            "pricePerNight": 80.0,
            "totalRooms": 999,
            "availableRooms": 999,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated: HotelDto = response.json().await.unwrap();
    assert_eq!(updated.name, "Budget Inn Deluxe");
    assert_eq!(updated.price_per_night, 80.0);
    assert_eq!(updated.total_rooms, 10);
    assert_eq!(updated.available_rooms, 10);

    // 6. Delete, then it is gone
    let response = client
        .delete(format!("http://{addr}/api/hotels/{}", budget.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client
        .get(format!("http://{addr}/api/hotels/{}", budget.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["error"],
        format!("Hotel not found with id: {}", budget.id)
    );
}

#[tokio::test]
async fn test_hotel_validation() {
    let (addr, client, _db_pool) = helpers::spawn_app().await;

    // Empty name
    let response = client
        .post(format!("http://{addr}/api/hotels"))
        .json(&json!({
            "name": "",
            "city": "Rome",
            "address": "1 Main Street",
            "pricePerNight": 100.0,
            "totalRooms": 3,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["details"]["name"].is_array());

    // More free rooms than rooms
    let response = client
        .post(format!("http://{addr}/api/hotels"))
        .json(&json!({
            "name": "Odd Hotel",
            "city": "Rome",
            "address": "1 Main Street",
            "pricePerNight": 100.0,
            "totalRooms": 3,
            "availableRooms": 4,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_hotel_with_rooms_cannot_be_deleted() {
    let (addr, client, _db_pool) = helpers::spawn_app().await;

    let hotel = create_hotel(&addr, &client, "Busy Hotel", "Turin", 4).await;
    let room = create_room(&addr, &client, hotel.id, "101", None).await;

    let response = client
        .delete(format!("http://{addr}/api/hotels/{}", hotel.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Removing the room unblocks the hotel
    let response = client
        .delete(format!("http://{addr}/api/rooms/{}", room.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client
        .delete(format!("http://{addr}/api/hotels/{}", hotel.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_room_crud() {
    let (addr, client, _db_pool) = helpers::spawn_app().await;

    let hotel = create_hotel(&addr, &client, "Lake View", "Como", 5).await;
    let other = create_hotel(&addr, &client, "Hill Top", "Como", 5).await;

    // 1. Defaults on creation
    let room = create_room(&addr, &client, hotel.id, "201", Some(150.0)).await;
    assert_eq!(room.hotel_name, "Lake View");
    assert!(room.has_wifi);
    assert!(!room.has_tv);
    assert_eq!(room.status, common::RoomStatus::Available);

    // 2. Unknown hotel
    let response = client
        .post(format!("http://{addr}/api/rooms"))
        .json(&json!({ "roomNumber": "1", "capacity": 1, "hotelId": 9999 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // 3. Zero capacity is rejected
    let response = client
        .post(format!("http://{addr}/api/rooms"))
        .json(&json!({ "roomNumber": "1", "capacity": 0, "hotelId": hotel.id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // 4. Move the room to the other hotel and put it under maintenance
    let response = client
        .put(format!("http://{addr}/api/rooms/{}", room.id))
        .json(&json!({
            "roomNumber": "201B",
            "capacity": 3,
            "hotelId": other.id,
            "hasTV": true,
            "status": "MAINTENANCE",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let moved: RoomDto = response.json().await.unwrap();
    assert_eq!(moved.room_number, "201B");
    assert_eq!(moved.hotel_id, other.id);
    assert!(moved.has_tv);
    assert_eq!(moved.status, common::RoomStatus::Maintenance);

    let rooms: Vec<RoomDto> = client
        .get(format!("http://{addr}/api/rooms/hotel/{}", hotel.id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(rooms.is_empty());

    // 5. Missing room
    let response = client
        .get(format!("http://{addr}/api/rooms/424242"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_availability_respects_existing_stays() {
    let (addr, client, _db_pool) = helpers::spawn_app().await;

    let hotel = create_hotel(&addr, &client, "Sea Breeze", "Naples", 5).await;
    let booked_room = create_room(&addr, &client, hotel.id, "1", None).await;
    let free_room = create_room(&addr, &client, hotel.id, "2", None).await;

    // Nights 10..15 on room 1
    let check_in = days_from_today(10);
    let check_out = days_from_today(15);
    create_reservation(
        &addr,
        &client,
        &reservation_body(hotel.id, Some(booked_room.id), check_in, check_out, 1),
    )
    .await;

    // 1. Overlapping range: room 1 is taken
    let response = client
        .get(format!(
            "http://{addr}/api/rooms/{}/availability",
            booked_room.id
        ))
        .query(&[
            ("startDate", days_from_today(12).to_string()),
            ("endDate", days_from_today(13).to_string()),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let availability: RoomAvailability = response.json().await.unwrap();
    assert!(!availability.available);

    // 2. Arriving on the previous guest's departure day is fine
    let response = client
        .get(format!(
            "http://{addr}/api/rooms/{}/availability",
            booked_room.id
        ))
        .query(&[
            ("startDate", check_out.to_string()),
            ("endDate", days_from_today(17).to_string()),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // 3. Room listing for the overlapping range only has room 2
    let rooms: Vec<RoomDto> = client
        .get(format!("http://{addr}/api/rooms/available"))
        .query(&[
            ("hotelId", hotel.id.to_string()),
            ("startDate", days_from_today(11).to_string()),
            ("endDate", days_from_today(20).to_string()),
        ])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].id, free_room.id);

    // 4. Same through the hotel endpoint
    let availability: HotelAvailability = client
        .get(format!("http://{addr}/api/hotels/{}/availability", hotel.id))
        .query(&[
            ("checkIn", days_from_today(11).to_string()),
            ("checkOut", days_from_today(20).to_string()),
        ])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(availability.is_available);
    assert_eq!(availability.available_rooms_count, 1);
    assert_eq!(availability.hotel_name, "Sea Breeze");

    // 5. Backwards range
    let response = client
        .get(format!("http://{addr}/api/hotels/{}/availability", hotel.id))
        .query(&[
            ("checkIn", days_from_today(20).to_string()),
            ("checkOut", days_from_today(11).to_string()),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // 6. A room with reservations cannot be deleted
    let response = client
        .delete(format!("http://{addr}/api/rooms/{}", booked_room.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_rooms_under_maintenance_are_not_offered() {
    let (addr, client, _db_pool) = helpers::spawn_app().await;

    let hotel = create_hotel(&addr, &client, "Old Mill", "Bergamo", 2).await;
    let room = create_room(&addr, &client, hotel.id, "7", None).await;

    let response = client
        .put(format!("http://{addr}/api/rooms/{}", room.id))
        .json(&json!({
            "roomNumber": "7",
            "capacity": 2,
            "hotelId": hotel.id,
            "status": "MAINTENANCE",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let availability: HotelAvailability = client
        .get(format!("http://{addr}/api/hotels/{}/availability", hotel.id))
        .query(&[
            ("checkIn", days_from_today(1).to_string()),
            ("checkOut", days_from_today(2).to_string()),
        ])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!availability.is_available);
    assert!(availability.available_rooms.is_empty());
}

#[tokio::test]
async fn test_hotel_with_bookings_or_activities_cannot_be_deleted() {
    let (addr, client, _db_pool) = helpers::spawn_app().await;

    // 1. A stay without an assigned room still ties the hotel down
    let booked = create_hotel(&addr, &client, "Lake View", "Como", 3).await;
    create_reservation(
        &addr,
        &client,
        &reservation_body(booked.id, None, days_from_today(2), days_from_today(4), 1),
    )
    .await;

    let response = client
        .delete(format!("http://{addr}/api/hotels/{}", booked.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // 2. So does a scheduled activity
    let hosting = create_hotel(&addr, &client, "Ski Lodge", "Cortina", 3).await;
    let start = chrono::Utc::now().naive_utc() + chrono::Duration::days(3);
    let response = client
        .post(format!("http://{addr}/api/activities"))
        .json(&json!({
            "name": "Night Skiing",
            "price": 40.0,
            "capacity": 10,
            "startTime": start,
            "endTime": start + chrono::Duration::hours(2),
            "hotelId": hosting.id,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = client
        .delete(format!("http://{addr}/api/hotels/{}", hosting.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_moved_room_keeps_its_bookings() {
    let (addr, client, _db_pool) = helpers::spawn_app().await;

    // 1. Book a room, then move it to a sister hotel
    let old_home = create_hotel(&addr, &client, "Harbour Inn", "Genoa", 4).await;
    let new_home = create_hotel(&addr, &client, "Harbour Annex", "Genoa", 4).await;
    let room = create_room(&addr, &client, old_home.id, "12", None).await;
    create_reservation(
        &addr,
        &client,
        &reservation_body(
            old_home.id,
            Some(room.id),
            days_from_today(5),
            days_from_today(8),
            1,
        ),
    )
    .await;

    let response = client
        .put(format!("http://{addr}/api/rooms/{}", room.id))
        .json(&json!({ "roomNumber": "12", "capacity": 2, "hotelId": new_home.id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // 2. The new hotel does not offer it over the booked nights
    let stay = [
        ("startDate", days_from_today(6).to_string()),
        ("endDate", days_from_today(7).to_string()),
    ];
    let free: Vec<RoomDto> = client
        .get(format!("http://{addr}/api/rooms/available"))
        .query(&[("hotelId", new_home.id.to_string())])
        .query(&stay)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(free.is_empty());

    let availability: HotelAvailability = client
        .get(format!("http://{addr}/api/hotels/{}/availability", new_home.id))
        .query(&[
            ("checkIn", days_from_today(6).to_string()),
            ("checkOut", days_from_today(7).to_string()),
        ])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!availability.is_available);

    let response = client
        .get(format!("http://{addr}/api/rooms/{}/availability", room.id))
        .query(&stay)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // 3. Outside the booked nights it is on offer again
    let free: Vec<RoomDto> = client
        .get(format!("http://{addr}/api/rooms/available"))
        .query(&[
            ("hotelId", new_home.id.to_string()),
            ("startDate", days_from_today(8).to_string()),
            ("endDate", days_from_today(10).to_string()),
        ])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(free.len(), 1);
    assert_eq!(free[0].id, room.id);
}
