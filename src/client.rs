// Coda API HTTP client.
// Handles bearer authentication, status mapping and pagination.

use crate::config::Config;
use crate::error::{CodaError, ErrorContext, Result};
use crate::projection::Record;
use reqwest::{
    Client, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue},
};
use serde_json::Value;
use std::time::Duration;

pub mod endpoints;

pub use endpoints::Table;

const TOKEN_ENV: &str = "CODA_TOKEN";
const PAGE_TOKEN_PARAM: &str = "pageToken";

/// Authenticated client for the Coda REST API
#[derive(Debug, Clone)]
pub struct CodaClient {
    client: Client,
    docs_url: String,
    max_pages: usize,
}

impl CodaClient {
    /// Create a client that sends `token` as a bearer credential
    pub fn new(token: &str, config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .coda_config_err("Invalid CODA_TOKEN value")?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("coda-alfred/", env!("CARGO_PKG_VERSION")))
            .build()
            .coda_network_err("Failed to create HTTP client")?;

        Ok(Self {
            client,
            docs_url: config.docs_url(),
            max_pages: config.max_pages,
        })
    }

    /// Create a client from the CODA_TOKEN environment variable
    pub fn from_env(config: &Config) -> Result<Self> {
        let token = std::env::var(TOKEN_ENV)
            .ok()
            .filter(|token| !token.trim().is_empty())
            .ok_or(CodaError::MissingToken)?;
        Self::new(&token, config)
    }

    pub fn docs_url(&self) -> &str {
        &self.docs_url
    }

    /// Make a single GET request and parse the JSON body
    pub async fn get_json(&self, url: &str, params: &[(String, String)]) -> Result<Value> {
        tracing::debug!(%url, ?params, "GET");

        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .coda_network_err(format!("Request to {url} failed"))?;

        let response = check_response(response).await?;
        let body = response
            .text()
            .await
            .coda_network_err("Failed to read response body")?;

        serde_json::from_str(&body).coda_parse_err(format!("Invalid JSON from {url}"))
    }

    /// GET a listing and follow `nextPageToken` until the API stops sending one.
    ///
    /// Items are concatenated in request order. At most `max_pages` requests
    /// are issued; a token still present after that is an error.
    pub async fn get_all(&self, url: &str, params: &[(&str, &str)]) -> Result<Vec<Record>> {
        let mut params: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let mut body = self.get_json(url, &params).await?;
        let mut items = take_items(&mut body, url)?;
        let mut requests = 1;

        while let Some(token) = next_page_token(&body) {
            if requests >= self.max_pages {
                tracing::warn!(%url, limit = self.max_pages, "pagination limit reached");
                return Err(CodaError::PaginationExceeded {
                    limit: self.max_pages,
                });
            }

            params.retain(|(key, _)| key != PAGE_TOKEN_PARAM);
            params.push((PAGE_TOKEN_PARAM.to_string(), token));

            body = self.get_json(url, &params).await?;
            items.extend(take_items(&mut body, url)?);
            requests += 1;
        }

        tracing::debug!(%url, requests, items = items.len(), "collected listing");
        Ok(items)
    }
}

/// Check response status and convert errors
async fn check_response(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    match status {
        StatusCode::UNAUTHORIZED => Err(CodaError::Unauthorized),
        StatusCode::NOT_FOUND => Err(CodaError::NotFound(url)),
        StatusCode::TOO_MANY_REQUESTS => Err(CodaError::RateLimited(url)),
        status => Err(CodaError::Http {
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        }),
    }
}

/// Remove the `items` array from a listing body
fn take_items(body: &mut Value, url: &str) -> Result<Vec<Record>> {
    let items = match body.get_mut("items").map(Value::take) {
        Some(Value::Array(items)) => items,
        _ => {
            return Err(CodaError::Payload(format!(
                "response from {url} has no `items` array"
            )));
        }
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::Object(record) => Ok(record),
            other => Err(CodaError::Payload(format!(
                "expected an object in `items` from {url}, got {other}"
            ))),
        })
        .collect()
}

fn next_page_token(body: &Value) -> Option<String> {
    body.get("nextPageToken")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}
