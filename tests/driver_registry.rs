mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{create_test_app, driver_payload};

#[tokio::test]
async fn test_create_driver_returns_created_record() {
    let app = create_test_app();
    let (status, body) = app
        .post("/api/v1/drivers", driver_payload("  Ana Torres ", " +34600000001 "))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["driver_id"], 1);
    assert_eq!(body["name"], "Ana Torres");
    assert_eq!(body["status"], "active");
    assert_eq!(body["contact_info"]["phone"], "+34600000001");
    assert_eq!(body["vehicle_details"]["type"], "van");
    assert!(body["registration_date"].is_string());
}

#[tokio::test]
async fn test_create_driver_validation() {
    let app = create_test_app();

    let mut payload = driver_payload("A", "+34600000001");
    let (status, body) = app.post("/api/v1/drivers", payload.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    payload["name"] = json!("Ana Torres");
    payload["contact_info"]["phone"] = json!("0123");
    let (status, _) = app.post("/api/v1/drivers", payload.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    payload["contact_info"]["phone"] = json!("+34600000001");
    payload["vehicle_details"]["plate_number"] = json!("AB");
    let (status, body) = app.post("/api/v1/drivers", payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (_, listing) = app.get("/api/v1/drivers").await;
    assert_eq!(listing["total"], 0);
}

#[tokio::test]
async fn test_duplicate_phone_is_rejected() {
    let app = create_test_app();
    let first = app.create_driver("+34600000001").await;

    let (status, body) = app
        .post("/api/v1/drivers", driver_payload("Otro Nombre", "+34600000001"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Driver with this phone number already exists");

    let (status, original) = app.get(&format!("/api/v1/drivers/{}", first)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(original["name"], "Ana Torres");

    let (_, listing) = app.get("/api/v1/drivers").await;
    assert_eq!(listing["total"], 1);
}

#[tokio::test]
async fn test_pagination_metadata() {
    let app = create_test_app();
    for i in 0..25 {
        app.create_driver(&format!("+346000000{:02}", i)).await;
    }

    let (status, body) = app.get("/api/v1/drivers?skip=0&limit=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 25);
    assert_eq!(body["page"], 1);
    assert_eq!(body["pages"], 3);
    assert_eq!(body["items"].as_array().unwrap().len(), 10);
    assert_eq!(body["items"][0]["driver_id"], 1);

    let (_, last) = app.get("/api/v1/drivers?skip=20&limit=10").await;
    assert_eq!(last["page"], 3);
    assert_eq!(last["items"].as_array().unwrap().len(), 5);
    assert_eq!(last["items"][0]["driver_id"], 21);
}

#[tokio::test]
async fn test_pagination_rejects_bad_window() {
    let app = create_test_app();
    let (status, _) = app.get("/api/v1/drivers?limit=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get("/api/v1/drivers?skip=-5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_status_filter_counts_only_matches() {
    let app = create_test_app();
    let first = app.create_driver("+34600000001").await;
    app.create_driver("+34600000002").await;
    app.create_driver("+34600000003").await;

    let (status, _) = app
        .patch(&format!("/api/v1/drivers/{}/status", first), json!({ "status": "suspended" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, suspended) = app.get("/api/v1/drivers?status=suspended").await;
    assert_eq!(suspended["total"], 1);
    assert_eq!(suspended["items"][0]["driver_id"], first);

    let (_, active) = app.get("/api/v1/drivers?status=active&limit=1").await;
    assert_eq!(active["total"], 2);
    assert_eq!(active["pages"], 2);
}

#[tokio::test]
async fn test_empty_status_filter_lists_everything() {
    let app = create_test_app();
    let first = app.create_driver("+34600000001").await;
    app.create_driver("+34600000002").await;
    app.delete(&format!("/api/v1/drivers/{}", first)).await;

    let (status, body) = app.get("/api/v1/drivers?status=").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);

    let (status, body) = app.get("/api/v1/drivers?status=retired").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_huge_limit_does_not_overflow_page_count() {
    let app = create_test_app();
    app.create_driver("+34600000001").await;

    let (status, body) = app.get("/api/v1/drivers?limit=9223372036854775807").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["page"], 1);
    assert_eq!(body["pages"], 1);
}

#[tokio::test]
async fn test_update_replaces_profile() {
    let app = create_test_app();
    let driver_id = app.create_driver("+34600000001").await;

    let mut payload = driver_payload("Ana María Torres", "+34600000009");
    payload["vehicle_details"]["color"] = json!(null);
    let (status, body) = app.put(&format!("/api/v1/drivers/{}", driver_id), payload).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ana María Torres");
    assert_eq!(body["contact_info"]["phone"], "+34600000009");
    assert!(body["vehicle_details"]["color"].is_null());
}

#[tokio::test]
async fn test_update_keeping_own_phone_is_allowed() {
    let app = create_test_app();
    let driver_id = app.create_driver("+34600000001").await;

    let (status, _) = app
        .put(&format!("/api/v1/drivers/{}", driver_id), driver_payload("Ana T.", "+34600000001"))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_update_to_taken_phone_is_rejected() {
    let app = create_test_app();
    app.create_driver("+34600000001").await;
    let second = app.create_driver("+34600000002").await;

    let (status, body) = app
        .put(&format!("/api/v1/drivers/{}", second), driver_payload("Luis", "+34600000001"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_unknown_driver_is_not_found() {
    let app = create_test_app();

    let (status, _) = app.get("/api/v1/drivers/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .put("/api/v1/drivers/99", driver_payload("Nadie", "+34600000001"))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .patch("/api/v1/drivers/99/status", json!({ "status": "inactive" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete("/api/v1/drivers/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_status_value_is_rejected() {
    let app = create_test_app();
    let driver_id = app.create_driver("+34600000001").await;

    let (status, _) = app
        .patch(&format!("/api/v1/drivers/{}/status", driver_id), json!({ "status": "retired" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_is_soft_deactivation() {
    let app = create_test_app();
    let driver_id = app.create_driver("+34600000001").await;

    let (status, body) = app.delete(&format!("/api/v1/drivers/{}", driver_id)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, driver) = app.get(&format!("/api/v1/drivers/{}", driver_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(driver["status"], "inactive");
}

#[tokio::test]
async fn test_legacy_records_are_presentable() {
    let app = create_test_app();
    let driver_id = app
        .store
        .insert_raw_driver(
            "Registro Antiguo",
            json!({ "phone": "+34699999999" }),
            json!({ "make": "Seat", "plate": "OLD-1234" }),
        )
        .await;

    let (status, body) = app.get(&format!("/api/v1/drivers/{}", driver_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["contact_info"]["email"], "user@example.com");
    assert_eq!(body["contact_info"]["address"], "Address not provided");
    assert_eq!(body["vehicle_details"]["type"], "");
    assert_eq!(body["vehicle_details"]["make"], "Seat");
    assert_eq!(body["vehicle_details"]["year"], 2000);
    assert_eq!(body["vehicle_details"]["plate_number"], "OLD-1234");

    let (_, listing) = app.get("/api/v1/drivers").await;
    assert_eq!(listing["items"][0]["vehicle_details"]["plate_number"], "OLD-1234");
}

#[tokio::test]
async fn test_legacy_record_with_mistyped_year_keeps_other_fields() {
    let app = create_test_app();
    let driver_id = app
        .store
        .insert_raw_driver(
            "Registro Antiguo",
            json!({ "phone": "+34699999998", "email": "old@example.com" }),
            json!({ "type": "van", "make": "Iveco", "model": "Daily", "year": "2015", "plate": "OLD-1234" }),
        )
        .await;

    let (status, body) = app.get(&format!("/api/v1/drivers/{}", driver_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vehicle_details"]["make"], "Iveco");
    assert_eq!(body["vehicle_details"]["model"], "Daily");
    assert_eq!(body["vehicle_details"]["type"], "van");
    assert_eq!(body["vehicle_details"]["year"], 2015);
    assert_eq!(body["vehicle_details"]["plate_number"], "OLD-1234");
    assert_eq!(body["contact_info"]["email"], "old@example.com");
}
