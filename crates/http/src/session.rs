//! Session-expiry event
//!
//! When a protected call is rejected with 401 or 403 the client clears the
//! token store and emits a single [`SessionExpired`] event to the registered
//! [`SessionExpiryHandler`]. The client awaits the handler before handing the
//! original error back to the caller. Notification and navigation policy live
//! in the application; [`ExpiryFlow`] composes the usual "show a blocking
//! notice, then go to the login screen" sequence.
//!
//! Concurrent calls that fail after expiry each emit their own event. Handlers
//! may therefore see duplicates; clearing and navigating are idempotent.

use async_trait::async_trait;
use reqwest::Method;

/// Route the application returns to after the session ends
pub const LOGIN_ROUTE: &str = "/";

pub const EXPIRED_TITLE: &str = "Session expired";
pub const EXPIRED_TEXT: &str = "Please log in again to continue.";

/// Emitted once per protected call rejected with 401/403
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionExpired {
    pub method: Method,
    pub path: String,
    pub status: u16,
    pub message: String,
    pub redirect_to: String,
}

impl SessionExpired {
    pub fn new(method: Method, path: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            status,
            message: message.into(),
            redirect_to: LOGIN_ROUTE.to_string(),
        }
    }
}

/// Subscriber for session-expiry events
#[async_trait]
pub trait SessionExpiryHandler: Send + Sync {
    /// Resolves once the application has finished reacting to the expiry
    async fn on_session_expired(&self, event: &SessionExpired);
}

/// Presents the expiry notice to the user
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Must not resolve until the notice has been acknowledged
    async fn notify(&self, title: &str, text: &str);
}

/// Moves the application to another screen, discarding current state
#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Notify, then navigate to the login route
pub struct ExpiryFlow<N, R> {
    notifier: N,
    navigator: R,
}

impl<N: Notifier, R: Navigator> ExpiryFlow<N, R> {
    pub fn new(notifier: N, navigator: R) -> Self {
        Self {
            notifier,
            navigator,
        }
    }
}

#[async_trait]
impl<N: Notifier, R: Navigator> SessionExpiryHandler for ExpiryFlow<N, R> {
    async fn on_session_expired(&self, event: &SessionExpired) {
        self.notifier.notify(EXPIRED_TITLE, EXPIRED_TEXT).await;
        self.navigator.navigate(&event.redirect_to);
    }
}

/// Default handler: records the expiry in the log and nothing else
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOnly;

#[async_trait]
impl SessionExpiryHandler for LogOnly {
    async fn on_session_expired(&self, event: &SessionExpired) {
        tracing::warn!(
            method = %event.method,
            path = %event.path,
            status = event.status,
            "Session expired; no expiry handler registered"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::{Sequence, predicate::eq};

    fn event() -> SessionExpired {
        SessionExpired::new(Method::GET, "/api/produtos", 403, "Forbidden")
    }

    #[test]
    fn event_redirects_to_login() {
        let event = event();
        assert_eq!(event.redirect_to, LOGIN_ROUTE);
        assert_eq!(event.status, 403);
    }

    #[tokio::test]
    async fn flow_notifies_before_navigating() {
        let mut seq = Sequence::new();

        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .with(eq(EXPIRED_TITLE), eq(EXPIRED_TEXT))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| ());

        let mut navigator = MockNavigator::new();
        navigator
            .expect_navigate()
            .with(eq("/"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| ());

        ExpiryFlow::new(notifier, navigator)
            .on_session_expired(&event())
            .await;
    }

    #[tokio::test]
    async fn log_only_handler_completes() {
        LogOnly.on_session_expired(&event()).await;
    }
}
