#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, Response, StatusCode},
    Router,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use serde_json::Value;
use tower::ServiceExt;

use registrations::config::{RegistrationsConfig, StoreConfig};
use registrations::contract::model::NewRegistration;
use registrations::domain::ports::Clock;
use registrations::Registrations;

/// Clock that starts at a fixed instant and advances one second per reading.
pub struct StepClock {
    now: Mutex<DateTime<Utc>>,
}

impl StepClock {
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// 2025-06-01T12:00:00Z
    pub fn default_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }
}

impl Clock for StepClock {
    fn now(&self) -> DateTime<Utc> {
        let mut now = self.now.lock();
        let current = *now;
        *now = current + Duration::seconds(1);
        current
    }
}

/// Module backed by a fresh in-memory store and a stepping clock
pub async fn create_test_module() -> Registrations {
    let cfg = RegistrationsConfig {
        store: StoreConfig::in_memory(),
        ..RegistrationsConfig::default()
    };
    let clock = Arc::new(StepClock::starting_at(StepClock::default_start()));
    Registrations::init_with_clock(cfg, clock)
        .await
        .expect("Failed to init registrations module")
}

pub fn ana_lee() -> NewRegistration {
    NewRegistration {
        first_name: Some("Ana".into()),
        last_name: Some("Lee".into()),
        date_of_birth: Some("1990-01-01".into()),
        email: Some("ana@x.com".into()),
        phone: Some("+12345678".into()),
        city: Some("Riyadh".into()),
    }
}

pub fn ana_lee_json() -> Value {
    serde_json::json!({
        "firstName": "Ana",
        "lastName": "Lee",
        "dateOfBirth": "1990-01-01",
        "email": "ana@x.com",
        "phone": "+12345678",
        "city": "Riyadh"
    })
}

pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();
    router.clone().oneshot(req).await.unwrap()
}

pub async fn body_json(resp: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn send_json(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let resp = send(router, method, uri, body).await;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
