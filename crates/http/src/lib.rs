//! Oak HTTP client
//!
//! Authenticated access to the Oak System inventory backend. Every call goes
//! through [`client::ApiClient`], which attaches the stored bearer token to
//! protected routes and turns 401/403 on those routes into a session-expiry
//! event after clearing the [`token::TokenStore`].

pub mod client;
pub mod session;
pub mod token;
pub mod types;

pub use client::config::ClientConfig;
pub use client::error::ClientError;
pub use client::routes::RouteClass;
pub use client::{ApiClient, ApiClientBuilder, CallOptions};
pub use session::{ExpiryFlow, LogOnly, Navigator, Notifier, SessionExpired, SessionExpiryHandler};
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore, TokenStoreError};
