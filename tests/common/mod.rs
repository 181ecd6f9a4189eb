//! Shared test utilities and fixtures

#![allow(dead_code)]

use std::time::Duration;

use capquiz_engine::App;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const COUNTRIES_PATH: &str = "/v3.1/all";

/// Eight countries, one without a capital.
pub fn countries_body() -> serde_json::Value {
    serde_json::json!([
        { "cca3": "ARG", "name": { "common": "Argentina" }, "capital": ["Buenos Aires"] },
        { "cca3": "AUS", "name": { "common": "Australia" }, "capital": ["Canberra"] },
        { "cca3": "BRA", "name": { "common": "Brazil" }, "capital": ["Brasília"] },
        { "cca3": "EGY", "name": { "common": "Egypt" }, "capital": ["Cairo"] },
        { "cca3": "IND", "name": { "common": "India" }, "capital": ["New Delhi"] },
        { "cca3": "KEN", "name": { "common": "Kenya" }, "capital": ["Nairobi"] },
        { "cca3": "NOR", "name": { "common": "Norway" }, "capital": ["Oslo"] },
        { "cca3": "ATA", "name": { "common": "Antarctica" }, "capital": [] }
    ])
}

pub async fn start_countries_mock() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(COUNTRIES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(countries_body()))
        .mount(&server)
        .await;
    server
}

pub fn countries_url(server: &MockServer) -> String {
    format!("{}{COUNTRIES_PATH}", server.uri())
}

/// Ticks the app until the fetch settles. Panics after five seconds.
pub async fn wait_until_loaded(app: &mut App) {
    for _ in 0..500 {
        app.tick();
        if !app.is_loading() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("country fetch did not settle");
}
