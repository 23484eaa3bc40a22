//! Helpers compartidos por los tests de integración

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use transit_tracking::config::EnvironmentConfig;
use transit_tracking::repositories::MemoryStore;
use transit_tracking::routes::create_app;
use transit_tracking::state::AppState;

pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
}

pub fn create_test_app() -> TestApp {
    let store = MemoryStore::new();
    let state = AppState::in_memory(store.clone(), EnvironmentConfig::default());
    TestApp {
        router: create_app(state),
        store,
    }
}

impl TestApp {
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(payload) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }

    /// Registra un conductor válido y devuelve su id
    pub async fn create_driver(&self, phone: &str) -> i64 {
        let (status, body) = self.post("/api/v1/drivers", driver_payload("Ana Torres", phone)).await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["driver_id"].as_i64().unwrap()
    }

    /// Registra un conductor y le abre una sesión; devuelve el id de sesión
    pub async fn start_session_for_new_driver(&self, phone: &str) -> i64 {
        let driver_id = self.create_driver(phone).await;
        let (status, body) = self
            .post("/api/v1/sessions/start", json!({ "driver_id": driver_id }))
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        body["session_id"].as_i64().unwrap()
    }
}

pub fn driver_payload(name: &str, phone: &str) -> Value {
    json!({
        "name": name,
        "contact_info": {
            "phone": phone,
            "email": "ana.torres@example.com",
            "address": "Calle Mayor 12, Madrid"
        },
        "vehicle_details": {
            "type": "van",
            "make": "Renault",
            "model": "Kangoo",
            "year": 2021,
            "plate_number": "1234-KLM",
            "color": "white"
        }
    })
}

pub fn coordinate_payload(session_id: i64, latitude: f64, longitude: f64) -> Value {
    json!({
        "session_id": session_id,
        "latitude": latitude,
        "longitude": longitude,
        "speed": 32.5
    })
}
