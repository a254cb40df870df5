//! Oak HTTP client

pub mod auth;
pub mod config;
pub mod error;
pub mod interceptor;
pub mod inventory;
pub mod reports;
pub mod routes;

use crate::session::{LogOnly, SessionExpiryHandler};
use crate::token::{MemoryTokenStore, TokenStore};
use config::ClientConfig;
use error::ClientError;
use interceptor::{BearerAuth, CallContext, SessionGuard};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, ClientBuilder, Method, RequestBuilder, Response};
use routes::DEFAULT_AUTH_PREFIX;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const DEFAULT_USER_AGENT: &str = concat!("oak-client/", env!("CARGO_PKG_VERSION"));

/// Extra knobs for a single call
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    headers: HeaderMap,
    query: Vec<(String, String)>,
    timeout: Option<Duration>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn apply(self, mut request: RequestBuilder) -> RequestBuilder {
        if !self.headers.is_empty() {
            request = request.headers(self.headers);
        }
        if !self.query.is_empty() {
            request = request.query(&self.query);
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        request
    }
}

/// API client bound to one backend origin.
///
/// Clones share the HTTP connection pool, the token store and the expiry
/// handler.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth_prefix: String,
    store: Arc<dyn TokenStore>,
    bearer: BearerAuth,
    guard: SessionGuard,
}

impl ApiClient {
    /// Create a new client with default configuration
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth_prefix(&self) -> &str {
        &self.auth_prefix
    }

    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.call(Method::GET, path, None::<&()>, CallOptions::default())
            .await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.call(Method::POST, path, Some(body), CallOptions::default())
            .await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.call(Method::PUT, path, Some(body), CallOptions::default())
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.call(Method::DELETE, path, None::<&()>, CallOptions::default())
            .await
    }

    /// Issue a call through both interceptors and decode the JSON payload.
    ///
    /// An empty success body decodes as JSON `null`, so `()` and `Option<T>`
    /// work for endpoints that answer with no content.
    pub async fn call<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        options: CallOptions,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let ctx = CallContext::new(method, path, &self.auth_prefix);

        let mut builder = self
            .client
            .request(ctx.method.clone(), format!("{}{}", self.base_url, ctx.path));
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let mut request = options
            .apply(builder)
            .build()
            .map_err(ClientError::InvalidRequest)?;

        let authorized = self.bearer.apply(&ctx, &mut request);
        debug!(
            method = %ctx.method,
            path = %ctx.path,
            route = ?ctx.route,
            authorized,
            "Sending request"
        );

        let outcome = self.client.execute(request).await;
        let response = self.guard.inspect(&ctx, outcome).await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let bytes = response.bytes().await?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        Ok(serde_json::from_slice(b"null")?)
    } else {
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Builder for ApiClient
pub struct ApiClientBuilder {
    base_url: Option<String>,
    auth_prefix: String,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    store: Arc<dyn TokenStore>,
    handler: Arc<dyn SessionExpiryHandler>,
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            auth_prefix: DEFAULT_AUTH_PREFIX.to_string(),
            timeout: None,
            user_agent: None,
            store: Arc::new(MemoryTokenStore::new()),
            handler: Arc::new(LogOnly),
        }
    }
}

impl ApiClientBuilder {
    /// Seed the builder from loaded configuration
    pub fn from_config(config: &ClientConfig) -> Self {
        let builder = Self::default()
            .base_url(config.base_url.clone())
            .auth_prefix(config.auth_prefix.clone());
        let builder = match config.timeout() {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        };
        match &config.user_agent {
            Some(agent) => builder.user_agent(agent.clone()),
            None => builder,
        }
    }

    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the prefix that marks login/registration routes
    pub fn auth_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.auth_prefix = prefix.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn token_store(self, store: impl TokenStore + 'static) -> Self {
        self.shared_token_store(Arc::new(store))
    }

    pub fn shared_token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.store = store;
        self
    }

    /// Register the subscriber for session-expiry events
    pub fn on_session_expired(self, handler: impl SessionExpiryHandler + 'static) -> Self {
        self.shared_expiry_handler(Arc::new(handler))
    }

    pub fn shared_expiry_handler(mut self, handler: Arc<dyn SessionExpiryHandler>) -> Self {
        self.handler = handler;
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::Configuration(format!(
                "base_url must be an http(s) origin, got {base_url:?}"
            )));
        }

        if !self.auth_prefix.starts_with('/') {
            return Err(ClientError::Configuration(format!(
                "auth_prefix must start with '/', got {:?}",
                self.auth_prefix
            )));
        }

        let mut client_builder = ClientBuilder::new()
            .user_agent(self.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()));

        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder.build()?;

        Ok(ApiClient {
            client,
            base_url,
            auth_prefix: self.auth_prefix,
            bearer: BearerAuth::new(self.store.clone()),
            guard: SessionGuard::new(self.store.clone(), self.handler),
            store: self.store,
        })
    }
}
