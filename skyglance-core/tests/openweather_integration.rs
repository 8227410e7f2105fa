//! Integration tests for the OpenWeather adapter using wiremock.

use std::time::Duration;

use skyglance_core::{
    FetchError, LocationQuery, Units, WeatherProvider, provider::openweather::OpenWeatherProvider,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(server: &MockServer) -> OpenWeatherProvider {
    OpenWeatherProvider::new("TEST_KEY".into(), &server.uri(), Units::Metric, Duration::from_secs(5))
        .expect("client should build")
}

fn current_body() -> serde_json::Value {
    serde_json::json!({
        "name": "London",
        "dt": 1704103200,
        "main": { "temp": 7.3, "feels_like": 4.9, "humidity": 87, "pressure": 1009 },
        "weather": [{ "id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d" }],
        "wind": { "speed": 4.12, "deg": 230 }
    })
}

fn forecast_entry(dt_txt: &str, temp: f64, id: u16, main: &str) -> serde_json::Value {
    serde_json::json!({
        "dt": 0,
        "dt_txt": dt_txt,
        "main": {
            "temp": temp,
            "feels_like": temp - 1.0,
            "temp_min": temp - 0.5,
            "temp_max": temp + 0.5,
            "humidity": 70
        },
        "weather": [{ "id": id, "main": main, "description": main.to_lowercase() }],
        "wind": { "speed": 3.3 }
    })
}

#[tokio::test]
async fn current_by_name_sends_query_units_and_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "London"))
        .and(query_param("units", "metric"))
        .and(query_param("appid", "TEST_KEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
        .expect(1)
        .mount(&server)
        .await;

    let snapshot = provider(&server)
        .current(&LocationQuery::Name("London".into()))
        .await
        .expect("current conditions");

    assert_eq!(snapshot.place_name, "London");
    assert_eq!(snapshot.humidity_pct, 87);
    assert_eq!(snapshot.summary, "Clouds");
    assert_eq!(snapshot.description, "broken clouds");
    assert_eq!(snapshot.condition_code, 803);
    assert_eq!(snapshot.observed_at.timestamp(), 1704103200);
}

#[tokio::test]
async fn current_by_coordinates_sends_lat_lon() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "51.5"))
        .and(query_param("lon", "-0.12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
        .expect(1)
        .mount(&server)
        .await;

    let result = provider(&server)
        .current(&LocationQuery::Coordinates { lat: 51.5, lon: -0.12 })
        .await;

    assert!(result.is_ok(), "unexpected error: {result:?}");
}

#[tokio::test]
async fn forecast_parses_series_in_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("q", "London"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "cod": "200",
            "cnt": 3,
            "list": [
                forecast_entry("2024-01-01 03:00:00", 5.0, 500, "Rain"),
                forecast_entry("2024-01-01 06:00:00", 6.0, 803, "Clouds"),
                forecast_entry("2024-01-02 00:00:00", 2.0, 800, "Clear"),
            ],
            "city": { "name": "London", "country": "GB" }
        })))
        .mount(&server)
        .await;

    let series = provider(&server)
        .forecast(&LocationQuery::Name("London".into()))
        .await
        .expect("forecast series");

    assert_eq!(series.len(), 3);
    assert_eq!(series[0].timestamp.to_string(), "2024-01-01 03:00:00");
    assert_eq!(series[0].summary, "Rain");
    assert_eq!(series[2].condition_code, 800);

    let dates = skyglance_core::forecast::unique_dates(&series);
    assert_eq!(dates.len(), 2);
}

#[tokio::test]
async fn empty_location_is_still_requested() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", ""))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "cod": "400",
            "message": "Nothing to geocode"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = provider(&server).current(&LocationQuery::Name(String::new())).await.unwrap_err();

    assert_eq!(err.status().map(|s| s.as_u16()), Some(400));
    assert!(err.to_string().contains("Nothing to geocode"));
}

#[tokio::test]
async fn unauthorized_maps_to_status_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "cod": 401,
            "message": "Invalid API key."
        })))
        .mount(&server)
        .await;

    let err = provider(&server).forecast(&LocationQuery::Name("London".into())).await.unwrap_err();

    assert!(matches!(err, FetchError::Status { status, .. } if status.as_u16() == 401));
}

#[tokio::test]
async fn malformed_body_maps_to_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = provider(&server).current(&LocationQuery::Name("London".into())).await.unwrap_err();

    assert!(matches!(err, FetchError::Decode { endpoint: "weather", .. }));
}
