#![allow(dead_code)]

use coda_alfred::{CodaClient, Config};
use serde_json::{Value, json};
use wiremock::MockServer;

pub const TEST_TOKEN: &str = "test-token";
pub const API_PREFIX: &str = "/apis/v1";

pub fn mock_config(server: &MockServer) -> Config {
    Config {
        api_base: format!("{}{API_PREFIX}", server.uri()),
        max_pages: 10,
        ..Config::default()
    }
}

pub fn mock_client(server: &MockServer) -> CodaClient {
    CodaClient::new(TEST_TOKEN, &mock_config(server)).expect("Failed to build client")
}

/// Full request path for an API path such as `/docs`
pub fn api_path(path: &str) -> String {
    format!("{API_PREFIX}{path}")
}

/// A listing response body with an optional continuation token
pub fn listing_page(items: Value, next_page_token: Option<&str>) -> Value {
    match next_page_token {
        Some(token) => json!({ "items": items, "nextPageToken": token }),
        None => json!({ "items": items }),
    }
}

pub fn sample_docs() -> Value {
    json!([
        {
            "id": "AbCDeFGH",
            "type": "doc",
            "href": "https://coda.io/apis/v1/docs/AbCDeFGH",
            "browserLink": "https://coda.io/d/_dAbCDeFGH",
            "name": "Product Launch Hub"
        },
        {
            "id": "IjKLmNOP",
            "type": "doc",
            "href": "https://coda.io/apis/v1/docs/IjKLmNOP",
            "browserLink": "https://coda.io/d/_dIjKLmNOP",
            "name": "Team Wiki"
        }
    ])
}

pub fn sample_pages() -> Value {
    json!([
        {
            "id": "canvas-1",
            "type": "page",
            "browserLink": "https://coda.io/d/_dAbCDeFGH/_suAbc",
            "name": "Launch Status"
        }
    ])
}
