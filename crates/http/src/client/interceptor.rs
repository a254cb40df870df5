//! Request and response interceptors
//!
//! Every call made through [`ApiClient`](super::ApiClient) passes through
//! [`BearerAuth`] before it is sent and through [`SessionGuard`] once a
//! response (or transport failure) comes back. Both read the same
//! [`CallContext`], so route classification is computed exactly once.

use super::error::ClientError;
use super::routes::RouteClass;
use crate::session::{SessionExpired, SessionExpiryHandler};
use crate::token::TokenStore;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Method, Request, Response};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Per-call facts shared by both interceptors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    pub method: Method,
    pub path: String,
    pub route: RouteClass,
}

impl CallContext {
    pub fn new(method: Method, path: impl Into<String>, auth_prefix: &str) -> Self {
        let path = path.into();
        let route = RouteClass::classify(&path, auth_prefix);
        Self {
            method,
            path,
            route,
        }
    }
}

/// Attaches `Authorization: Bearer <token>` to protected calls
#[derive(Clone)]
pub struct BearerAuth {
    store: Arc<dyn TokenStore>,
}

impl BearerAuth {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    /// Returns whether a credential was attached
    pub fn apply(&self, ctx: &CallContext, request: &mut Request) -> bool {
        if ctx.route.is_auth() {
            return false;
        }

        let Some(token) = self.store.get() else {
            return false;
        };

        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                request.headers_mut().insert(AUTHORIZATION, value);
                true
            }
            Err(_) => {
                warn!(path = %ctx.path, "Stored token is not a valid header value; sending without it");
                false
            }
        }
    }
}

/// Classifies responses and runs the session-expiry transition
#[derive(Clone)]
pub struct SessionGuard {
    store: Arc<dyn TokenStore>,
    handler: Arc<dyn SessionExpiryHandler>,
}

impl SessionGuard {
    pub fn new(store: Arc<dyn TokenStore>, handler: Arc<dyn SessionExpiryHandler>) -> Self {
        Self { store, handler }
    }

    /// Pass successes through, turn everything else into a [`ClientError`].
    ///
    /// A 401/403 on a protected route clears the store and waits for the
    /// expiry handler before the error is returned. Nothing is retried.
    pub async fn inspect(
        &self,
        ctx: &CallContext,
        outcome: Result<Response, reqwest::Error>,
    ) -> Result<Response, ClientError> {
        let response = outcome?;
        let status = response.status();
        debug!(method = %ctx.method, path = %ctx.path, status = status.as_u16(), "Response received");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = ClientError::from_body(status, &body);

        if err.is_auth_failure() && !ctx.route.is_auth() {
            self.expire(ctx, &err).await;
        }

        Err(err)
    }

    async fn expire(&self, ctx: &CallContext, err: &ClientError) {
        let status = err.status().unwrap_or_default();
        warn!(method = %ctx.method, path = %ctx.path, status, "Session expired");

        if let Err(e) = self.store.clear() {
            error!(error = %e, "Failed to clear session token");
        }

        let event = SessionExpired::new(
            ctx.method.clone(),
            ctx.path.clone(),
            status,
            err.message().unwrap_or_default(),
        );
        self.handler.on_session_expired(&event).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::routes::DEFAULT_AUTH_PREFIX;
    use crate::token::MemoryTokenStore;

    fn request(ctx: &CallContext) -> Request {
        let url = format!("http://localhost:8080{}", ctx.path);
        Request::new(ctx.method.clone(), url.parse().unwrap())
    }

    #[test]
    fn protected_call_gets_bearer_header() {
        let auth = BearerAuth::new(Arc::new(MemoryTokenStore::with_token("abc123")));
        let ctx = CallContext::new(Method::GET, "/api/produtos", DEFAULT_AUTH_PREFIX);
        let mut req = request(&ctx);

        assert!(auth.apply(&ctx, &mut req));
        assert_eq!(req.headers()[AUTHORIZATION], "Bearer abc123");
        assert!(req.headers()[AUTHORIZATION].is_sensitive());
    }

    #[test]
    fn auth_route_never_gets_header() {
        let auth = BearerAuth::new(Arc::new(MemoryTokenStore::with_token("abc123")));
        let ctx = CallContext::new(Method::POST, "/api/auth/login", DEFAULT_AUTH_PREFIX);
        let mut req = request(&ctx);

        assert!(!auth.apply(&ctx, &mut req));
        assert!(req.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn missing_token_leaves_headers_alone() {
        let auth = BearerAuth::new(Arc::new(MemoryTokenStore::new()));
        let ctx = CallContext::new(Method::GET, "/api/categorias", DEFAULT_AUTH_PREFIX);
        let mut req = request(&ctx);

        assert!(!auth.apply(&ctx, &mut req));
        assert!(req.headers().is_empty());
    }

    #[test]
    fn context_classifies_once() {
        let ctx = CallContext::new(Method::DELETE, "/api/produtos/7", DEFAULT_AUTH_PREFIX);
        assert_eq!(ctx.route, RouteClass::Protected);
        let ctx = CallContext::new(Method::POST, "/api/auth/register", DEFAULT_AUTH_PREFIX);
        assert_eq!(ctx.route, RouteClass::Auth);
    }
}
