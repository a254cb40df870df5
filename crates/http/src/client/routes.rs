//! Route classification

/// Reserved prefix for login and registration endpoints
pub const DEFAULT_AUTH_PREFIX: &str = "/api/auth";

/// Whether a call targets the authentication endpoints or a protected one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Login/registration: no bearer token, no session-expiry handling
    Auth,
    Protected,
}

impl RouteClass {
    /// Classify a call path (as passed to the client, before the base URL is
    /// prepended) against the auth prefix.
    ///
    /// The prefix must end on a path segment: `/api/auth/login` is an auth
    /// route, `/api/authors` is not.
    pub fn classify(path: &str, auth_prefix: &str) -> Self {
        let prefix = auth_prefix.trim_end_matches('/');
        match path.strip_prefix(prefix) {
            Some(rest) if rest.is_empty() || rest.starts_with(['/', '?']) => Self::Auth,
            _ => Self::Protected,
        }
    }

    pub fn is_auth(self) -> bool {
        self == Self::Auth
    }
}
