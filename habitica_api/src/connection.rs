//! Authenticated request dispatcher for the Habitica API.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::Method;
use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    errors::{format_error, truncate_body, ConnectionFailure, RawFailure},
    options::RequestOptions,
    route::{normalize_endpoint, route_url, DEFAULT_ENDPOINT, DEFAULT_PLATFORM},
    Error,
};

/// Request timeout applied by the underlying HTTP client.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const CLIENT_HEADER: &str = "x-client";
pub const USER_ID_HEADER: &str = "x-api-user";
pub const API_KEY_HEADER: &str = "x-api-key";

/// Transforms every formatted error before it is returned to the caller.
pub type ErrorHandler = Arc<dyn Fn(Error) -> Error + Send + Sync>;

/// Snapshot of a connection's configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub id: Option<String>,
    pub api_key: Option<String>,
    /// Base URL without a trailing slash.
    pub endpoint: String,
    /// Value of the `x-client` header.
    pub platform: String,
}

impl ConnectionConfig {
    /// Credentials to send, present only when both the id and the key are set.
    fn credentials(&self) -> Option<(&str, &str)> {
        match (self.id.as_deref(), self.api_key.as_deref()) {
            (Some(id), Some(key)) if !id.is_empty() && !key.is_empty() => Some((id, key)),
            _ => None,
        }
    }

    /// Whether requests made with this configuration are authenticated.
    pub(crate) fn has_credentials(&self) -> bool {
        self.credentials().is_some()
    }
}

/// A partial configuration update.
///
/// Only fields that are `Some` overwrite the stored configuration. For the
/// credentials and the error handler, `Some(None)` clears the stored value.
#[derive(Clone, Default)]
pub struct ConfigUpdate {
    pub id: Option<Option<String>>,
    pub api_key: Option<Option<String>>,
    pub endpoint: Option<String>,
    pub platform: Option<String>,
    pub error_handler: Option<Option<ErrorHandler>>,
}

impl ConfigUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(Some(id.into()));
        self
    }

    pub fn clear_id(mut self) -> Self {
        self.id = Some(None);
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(Some(api_key.into()));
        self
    }

    pub fn clear_api_key(mut self) -> Self {
        self.api_key = Some(None);
        self
    }

    /// Sets both the user id and the API key.
    pub fn credentials(self, id: impl Into<String>, api_key: impl Into<String>) -> Self {
        self.id(id).api_key(api_key)
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    /// Installs a handler that maps every error the connection returns.
    pub fn error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(Error) -> Error + Send + Sync + 'static,
    {
        self.error_handler = Some(Some(Arc::new(handler)));
        self
    }

    pub fn clear_error_handler(mut self) -> Self {
        self.error_handler = Some(None);
        self
    }
}

impl fmt::Debug for ConfigUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigUpdate")
            .field("id", &self.id)
            .field("api_key", &self.api_key.as_ref().map(|k| k.as_ref().map(|_| "***")))
            .field("endpoint", &self.endpoint)
            .field("platform", &self.platform)
            .field(
                "error_handler",
                &self.error_handler.as_ref().map(|h| h.is_some()),
            )
            .finish()
    }
}

#[derive(Clone)]
struct Settings {
    config: ConnectionConfig,
    error_handler: Option<ErrorHandler>,
}

impl Settings {
    fn apply(&mut self, update: ConfigUpdate) {
        if let Some(id) = update.id {
            self.config.id = id;
        }
        if let Some(api_key) = update.api_key {
            self.config.api_key = api_key;
        }
        if let Some(endpoint) = update.endpoint {
            self.config.endpoint = normalize_endpoint(&endpoint);
        }
        if let Some(platform) = update.platform {
            self.config.platform = platform;
        }
        if let Some(error_handler) = update.error_handler {
            self.error_handler = error_handler;
        }
    }
}

/// Single authenticated request dispatcher.
///
/// Every verb method sends exactly one request. The configuration is captured
/// when the request is built, so [`Connection::configure`] never affects a
/// request that is already in flight.
pub struct Connection {
    http: reqwest::Client,
    settings: Mutex<Settings>,
}

impl Connection {
    /// Creates a connection to the production endpoint with the default platform,
    /// then applies `update`.
    pub fn new(update: ConfigUpdate) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::UnknownConnection(ConnectionFailure::Transport(e))
            })?;
        let mut settings = Settings {
            config: ConnectionConfig {
                id: None,
                api_key: None,
                endpoint: DEFAULT_ENDPOINT.to_string(),
                platform: DEFAULT_PLATFORM.to_string(),
            },
            error_handler: None,
        };
        settings.apply(update);
        Ok(Self {
            http,
            settings: Mutex::new(settings),
        })
    }

    /// Creates an unauthenticated connection to the production endpoint.
    pub fn with_defaults() -> Result<Self, Error> {
        Self::new(ConfigUpdate::default())
    }

    /// Applies a partial configuration update.
    pub fn configure(&self, update: ConfigUpdate) {
        self.lock().apply(update);
    }

    /// Returns the current configuration.
    pub fn config(&self) -> ConnectionConfig {
        self.lock().config.clone()
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        route: &str,
        options: Option<RequestOptions>,
    ) -> Result<T, Error> {
        self.request(Method::GET, route, options).await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        route: &str,
        options: Option<RequestOptions>,
    ) -> Result<T, Error> {
        self.request(Method::POST, route, options).await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        route: &str,
        options: Option<RequestOptions>,
    ) -> Result<T, Error> {
        self.request(Method::PUT, route, options).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        route: &str,
        options: Option<RequestOptions>,
    ) -> Result<T, Error> {
        self.request(Method::DELETE, route, options).await
    }

    /// Sends one request and normalizes any failure.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        route: &str,
        options: Option<RequestOptions>,
    ) -> Result<T, Error> {
        let settings = self.lock().clone();
        let options = options.unwrap_or_default();

        match self.dispatch(&settings.config, method, route, &options).await {
            Ok(body) => Ok(body),
            Err(failure) => {
                let err = format_error(failure);
                match &settings.error_handler {
                    Some(handler) => Err(handler(err)),
                    None => Err(err),
                }
            }
        }
    }

    async fn dispatch<T: DeserializeOwned>(
        &self,
        config: &ConnectionConfig,
        method: Method,
        route: &str,
        options: &RequestOptions,
    ) -> Result<T, RawFailure> {
        let url = route_url(&config.endpoint, route);
        let url = Url::parse(&url).map_err(|source| {
            tracing::error!("Invalid URL constructed: {}", source);
            RawFailure::Connection(ConnectionFailure::InvalidUrl { url, source })
        })?;
        let url = options.add_to_url(&url);
        tracing::debug!("{} {}", method, url);

        let mut request = self
            .http
            .request(method.clone(), url)
            .header(ACCEPT, "application/json")
            .header(CLIENT_HEADER, config.platform.as_str());
        if let Some((id, api_key)) = config.credentials() {
            request = request
                .header(USER_ID_HEADER, id)
                .header(API_KEY_HEADER, api_key);
        }
        if let Some(body) = &options.send {
            request = request.json(body);
        }

        let resp = request.send().await.map_err(|e| {
            tracing::error!("Failed to send {} {}: {}", method, route, e);
            RawFailure::from(e)
        })?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            RawFailure::from(e)
        })?;

        if !status.is_success() {
            tracing::warn!(
                "{} {} failed with status {}: {}",
                method,
                route,
                status,
                truncate_body(&text)
            );
            return Err(RawFailure::Response {
                status: status.as_u16(),
                text,
            });
        }

        decode_body(&text)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Settings> {
        self.settings.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = self.config();
        f.debug_struct("Connection")
            .field("id", &config.id)
            .field("endpoint", &config.endpoint)
            .field("platform", &config.platform)
            .finish_non_exhaustive()
    }
}

/// Decodes a successful response body. An empty body decodes as JSON `null`.
fn decode_body<T: DeserializeOwned>(text: &str) -> Result<T, RawFailure> {
    let text = if text.trim().is_empty() { "null" } else { text };
    serde_json::from_str::<T>(text).map_err(|source| {
        let body = truncate_body(text);
        tracing::error!("Failed to parse response: {} | body: {}", source, body);
        RawFailure::Connection(ConnectionFailure::MalformedBody { body, source })
    })
}
