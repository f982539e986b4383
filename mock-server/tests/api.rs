use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with, AutocompleteResponse, DetailsResponse, MockState};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

async fn autocomplete(query: &str) -> (StatusCode, AutocompleteResponse) {
    let resp = app()
        .oneshot(get(&format!("/maps/api/place/autocomplete/json?{query}")))
        .await
        .unwrap();
    let status = resp.status();
    (status, body_json(resp).await)
}

async fn details(query: &str) -> DetailsResponse {
    let resp = app()
        .oneshot(get(&format!("/maps/api/place/details/json?{query}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await
}

fn ids(body: &AutocompleteResponse) -> Vec<&str> {
    body.predictions.iter().map(|p| p.place_id.as_str()).collect()
}

// --- autocomplete ---

#[tokio::test]
async fn autocomplete_matches_substring_case_insensitively() {
    let (status, body) = autocomplete("input=MAIN&key=test-key&types=").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.status, "OK");
    assert_eq!(ids(&body), vec!["p-1-main-st", "p-main-plaza", "p-mainz"]);
}

#[tokio::test]
async fn autocomplete_filters_by_type_token() {
    let (_, body) = autocomplete("input=main&key=test-key&types=%28cities%29").await;
    assert_eq!(ids(&body), vec!["p-mainz"]);

    let (_, body) = autocomplete("input=main&key=test-key&types=address").await;
    assert_eq!(ids(&body), vec!["p-1-main-st"]);
}

#[tokio::test]
async fn autocomplete_filters_by_country() {
    let (_, body) =
        autocomplete("components=country%3ADE&input=main&key=test-key&types=").await;
    assert_eq!(ids(&body), vec!["p-mainz"]);
}

#[tokio::test]
async fn autocomplete_orders_by_location_bias() {
    let (_, body) = autocomplete(
        "input=main&key=test-key&location=29.42%2C-98.49&radius=20000000&types=",
    )
    .await;
    assert_eq!(ids(&body)[0], "p-main-plaza");
}

#[tokio::test]
async fn autocomplete_zero_results() {
    let (status, body) = autocomplete("input=atlantis&key=test-key&types=").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.status, "ZERO_RESULTS");
    assert!(body.predictions.is_empty());
}

#[tokio::test]
async fn autocomplete_rejects_bad_key() {
    let (_, body) = autocomplete("input=main&key=nope&types=").await;
    assert_eq!(body.status, "REQUEST_DENIED");
    assert_eq!(
        body.error_message.as_deref(),
        Some("The provided API key is invalid.")
    );

    let (_, body) = autocomplete("input=main&types=").await;
    assert_eq!(body.status, "REQUEST_DENIED");
}

#[tokio::test]
async fn autocomplete_requires_input() {
    let (_, body) = autocomplete("input=&key=test-key&types=").await;
    assert_eq!(body.status, "INVALID_REQUEST");
}

#[tokio::test]
async fn autocomplete_fault_inputs() {
    let (status, body) = autocomplete("input=__http_500").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body.status, "OK");

    let resp = app()
        .oneshot(get("/maps/api/place/autocomplete/json?input=__malformed"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    assert!(serde_json::from_slice::<serde_json::Value>(&bytes).is_err());
}

#[tokio::test]
async fn custom_key_and_fixture() {
    let state = MockState::new("other", Vec::new());
    let resp = app_with(state)
        .oneshot(get("/maps/api/place/autocomplete/json?input=main&key=other"))
        .await
        .unwrap();
    let body: AutocompleteResponse = body_json(resp).await;
    assert_eq!(body.status, "ZERO_RESULTS");
}

// --- details ---

#[tokio::test]
async fn details_with_viewport() {
    let body = details("key=test-key&placeid=p-paris").await;
    assert_eq!(body.status, "OK");
    let result = body.result.unwrap();
    assert_eq!(result.name, "Paris");
    assert_eq!(result.geometry.location.lat, 48.8566);
    let viewport = result.geometry.viewport.unwrap();
    assert_eq!(viewport.northeast.lat, 48.9022);
}

#[tokio::test]
async fn details_without_viewport() {
    let body = details("key=test-key&placeid=p-1-main-st").await;
    let result = body.result.unwrap();
    assert!(result.geometry.viewport.is_none());
}

#[tokio::test]
async fn details_unknown_place() {
    let body = details("key=test-key&placeid=p-nowhere").await;
    assert_eq!(body.status, "NOT_FOUND");
    assert!(body.result.is_none());
}

#[tokio::test]
async fn details_requires_key_and_placeid() {
    assert_eq!(details("key=&placeid=p-paris").await.status, "REQUEST_DENIED");
    assert_eq!(details("key=test-key").await.status, "INVALID_REQUEST");
}

#[tokio::test]
async fn unknown_path_is_404() {
    let resp = app().oneshot(get("/maps/api/place/nearby/json")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
