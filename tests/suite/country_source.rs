//! Fetching a round from a live HTTP source.

use std::collections::HashSet;
use std::sync::Arc;

use capquiz_engine::{App, QuizSettings, RoundView, TileKind};
use capquiz_providers::RestCountries;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{COUNTRIES_PATH, countries_url, start_countries_mock, wait_until_loaded};

fn app_for(url: String, sample_size: usize) -> App {
    let settings = QuizSettings {
        sample_size,
        countries_url: url.clone(),
        ..QuizSettings::default()
    };
    App::new(settings, Arc::new(RestCountries::new(url).unwrap()))
}

#[tokio::test]
async fn round_is_built_from_five_fetched_countries() {
    let server = start_countries_mock().await;
    let mut app = app_for(countries_url(&server), 5);
    wait_until_loaded(&mut app).await;

    let machine = app.machine().expect("round ready");
    let tiles = machine.tiles();
    assert_eq!(tiles.len(), 10);
    assert_eq!(machine.total_pairs(), 5);

    let countries: Vec<_> = tiles
        .iter()
        .filter(|tile| tile.kind() == TileKind::Country)
        .collect();
    assert_eq!(countries.len(), 5);
    let codes: HashSet<&str> = countries.iter().map(|tile| tile.code()).collect();
    assert_eq!(codes.len(), 5, "sample has no duplicates");
    assert!(!codes.contains("ATA"), "capital-less countries are skipped");

    for country in countries {
        let capital_code = format!("{}_capital", country.code());
        assert!(
            tiles.iter().any(|tile| tile.code() == capital_code),
            "{} has its capital on the board",
            country.name()
        );
    }
}

#[tokio::test]
async fn request_asks_only_for_needed_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(COUNTRIES_PATH))
        .and(query_param("fields", "cca3,name,capital"))
        .respond_with(ResponseTemplate::new(200).set_body_json(crate::common::countries_body()))
        .expect(1)
        .mount(&server)
        .await;

    let mut app = app_for(countries_url(&server), 3);
    wait_until_loaded(&mut app).await;
    assert_eq!(app.machine().unwrap().tiles().len(), 6);
}

#[tokio::test]
async fn http_error_fails_the_round_without_tiles() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(COUNTRIES_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .expect(2)
        .mount(&server)
        .await;

    let mut app = app_for(countries_url(&server), 5);
    wait_until_loaded(&mut app).await;

    match app.round_view() {
        RoundView::Failed(message) => {
            assert!(message.contains("500"), "{message}");
            assert!(message.contains("upstream down"), "{message}");
        }
        other => panic!("expected a failed round, got {other:?}"),
    }
    assert!(app.machine().is_none());

    assert!(app.restart(), "a failed round can be retried");
    wait_until_loaded(&mut app).await;
    assert!(matches!(app.round_view(), RoundView::Failed(_)));
    assert_eq!(app.round(), 2);
}

#[tokio::test]
async fn garbage_body_fails_the_round() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(COUNTRIES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let mut app = app_for(countries_url(&server), 5);
    wait_until_loaded(&mut app).await;
    assert!(matches!(app.round_view(), RoundView::Failed(_)));
}
