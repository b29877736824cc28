use anyhow::Context;
use reqwest::header::CONTENT_TYPE;
use reqwest::{multipart, Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::auth::TokenManager;
use crate::error::{CliError, Result};
use crate::models::ApiErrorBody;
use crate::store::Store;

/// Overall timeout for a single HTTP request, in seconds
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Connect timeout, in seconds
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Build the shared HTTP client
pub fn build_http_client() -> anyhow::Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .user_agent(concat!("meerkat-cli/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to create HTTP client")
}

/// Request body. The two variants are mutually exclusive per request.
pub enum RequestBody {
    /// Serialized as JSON with `Content-Type: application/json`
    Json(serde_json::Value),

    /// Sent as-is; the transport sets the multipart boundary
    Multipart(multipart::Form),
}

/// Per-request options
#[derive(Default)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<RequestBody>,
    pub headers: Vec<(String, String)>,

    /// Skip the bearer token
    pub no_auth: bool,

    /// Print method/URL and status to stderr
    pub verbose: bool,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post_json(body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(RequestBody::Json(body)),
            ..Self::default()
        }
    }

    pub fn post_multipart(form: multipart::Form) -> Self {
        Self {
            method: Method::POST,
            body: Some(RequestBody::Multipart(form)),
            ..Self::default()
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn no_auth(mut self) -> Self {
        self.no_auth = true;
        self
    }
}

/// Authenticated client for the receipt service
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// Shared HTTP client
    client: Client,

    /// Source of the server URL
    store: Store,

    /// Source of bearer tokens
    tokens: TokenManager,
}

impl ApiClient {
    pub fn new(store: Store, client: Client) -> Self {
        let tokens = TokenManager::new(store.clone(), client.clone());
        Self {
            client,
            store,
            tokens,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn token_manager(&self) -> &TokenManager {
        &self.tokens
    }

    /// GET `path` and decode the JSON response
    pub async fn get<T: DeserializeOwned>(&self, path: &str, verbose: bool) -> Result<T> {
        self.request(path, RequestOptions::get().verbose(verbose))
            .await
    }

    /// Issue a request against `server_url + path` and decode the JSON response
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T> {
        let config = self
            .store
            .load_config()
            .await
            .ok_or_else(CliError::config_missing)?;

        let url = format!("{}{}", config.server_url, path);
        let method = options.method;

        let json_body = matches!(options.body, Some(RequestBody::Json(_)));

        let mut builder = self.client.request(method.clone(), &url);
        for (name, value) in &options.headers {
            // JSON bodies always go out as application/json
            if json_body && name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()) {
                continue;
            }
            builder = builder.header(name.as_str(), value.as_str());
        }

        if !options.no_auth {
            let token = self.tokens.get_valid_token().await?;
            builder = builder.bearer_auth(token);
        }

        builder = match options.body {
            Some(RequestBody::Multipart(form)) => builder.multipart(form),
            Some(RequestBody::Json(value)) => {
                let bytes = serde_json::to_vec(&value).context("Failed to encode request body")?;
                builder.header(CONTENT_TYPE, "application/json").body(bytes)
            }
            None => builder,
        };

        if options.verbose {
            eprintln!("[verbose] {} {}", method, url);
        }
        tracing::debug!(method = %method, url = %url, "Sending HTTP request");

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(url = %url, error = %e, "HTTP request error");
            CliError::Http(e)
        })?;

        let status = response.status();
        if options.verbose {
            eprintln!(
                "[verbose] {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            );
        }
        tracing::debug!(status = %status, "Received HTTP response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(status, &body);
            tracing::warn!(
                status = status.as_u16(),
                url = %url,
                "HTTP request failed with error response"
            );
            return Err(CliError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await?;
        let data = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse response from {url}"))?;
        Ok(data)
    }
}

/// Error message for a non-2xx response: the `detail` field when the body is
/// a JSON object carrying one, `HTTP <status>: <reason>` otherwise
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.detail)
        .filter(|detail| !detail.is_empty())
        .unwrap_or_else(|| {
            format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            )
        })
}
