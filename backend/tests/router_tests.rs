use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt; // for .collect()
use serde_json::{json, Value};
use tower::ServiceExt; // for .oneshot()

use backend::web_server::create_router;
use common::HotelCount;

mod helpers;

async fn test_router() -> Router {
    let (app_state, _db_pool) = helpers::test_state("http://127.0.0.1:9").await;
    create_router(app_state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body_bytes).expect("Failed to deserialize response body")
}

#[tokio::test]
async fn test_count_on_empty_database() {
    // ARRANGE
    let app = test_router().await;

    // ACT
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/hotels/count?city=Rome")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // ASSERT
    assert_eq!(response.status(), StatusCode::OK);
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let count: HotelCount = serde_json::from_slice(&body_bytes).unwrap();
    assert_eq!(count.count, 0);
}

#[tokio::test]
async fn test_malformed_parameters_get_json_errors() {
    // ARRANGE
    let app = test_router().await;

    // ACT
    let missing_city = app
        .clone()
        .oneshot(Request::builder().uri("/api/hotels/count").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let bad_id = app
        .clone()
        .oneshot(Request::builder().uri("/api/hotels/abc").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let bad_status = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/reservations/1/payment?status=MAYBE")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let broken_body = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/hotels")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"name\": "))
                .unwrap(),
        )
        .await
        .unwrap();

    // ASSERT
    for response in [missing_city, bad_id, bad_status, broken_body] {
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].is_string(), "unexpected body: {body}");
    }
}

#[tokio::test]
async fn test_missing_hotel_error_body() {
    // ARRANGE
    let app = test_router().await;

    // ACT
    let response = app
        .oneshot(Request::builder().uri("/api/hotels/99").body(Body::empty()).unwrap())
        .await
        .unwrap();

    // ASSERT
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Hotel not found with id: 99");
}

#[tokio::test]
async fn test_validation_errors_carry_field_details() {
    // ARRANGE
    let app = test_router().await;
    let payload = json!({
        "name": "",
        "city": "Rome",
        "address": "Via Roma 1",
        "pricePerNight": 80.0,
        "totalRooms": 5,
    });

    // ACT
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/hotels")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    // ASSERT
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().starts_with("Input validation failed"));
    assert_eq!(body["details"]["name"][0]["message"], "Name must not be empty");
}

#[tokio::test]
async fn test_request_id_is_generated_and_propagated() {
    // ARRANGE
    let app = test_router().await;

    // ACT
    let generated = app
        .clone()
        .oneshot(Request::builder().uri("/api/hotels").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let propagated = app
        .oneshot(
            Request::builder()
                .uri("/api/hotels")
                .header("x-request-id", "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // ASSERT
    assert!(generated.headers().contains_key("x-request-id"));
    assert_eq!(propagated.headers()["x-request-id"], "req-42");
}

#[tokio::test]
async fn test_openapi_document_lists_routes() {
    // ARRANGE
    let app = test_router().await;

    // ACT
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // ASSERT
    assert_eq!(response.status(), StatusCode::OK);
    let doc = body_json(response).await;
    let paths = doc["paths"].as_object().unwrap();
    for path in [
        "/api/hotels",
        "/api/rooms/{id}/availability",
        "/api/reservations/{id}/check-in",
        "/api/payments/process/{reservation_id}",
        "/api/activity-reservations/{id}/complete",
        "/api/auth/login",
        "/api/v1/owner/profile",
    ] {
        assert!(paths.contains_key(path), "missing {path}");
    }
    assert!(doc["components"]["securitySchemes"]["bearer_auth"].is_object());
}
