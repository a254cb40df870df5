//! Authentication API client methods

use super::{ApiClient, ClientError};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    #[serde(rename = "senha")]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "senha")]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Registration may or may not log the new user in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub token: Option<String>,
}

impl ApiClient {
    fn auth_path(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.auth_prefix())
    }

    /// Log in and persist the returned session token
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ClientError> {
        let response: LoginResponse = self.post(&self.auth_path("login"), request).await?;
        self.token_store().set(&response.token)?;
        info!(email = %request.email, "Logged in");
        Ok(response)
    }

    /// Create an account; a returned token is stored as the active session
    pub async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<RegisterResponse, ClientError> {
        let response: RegisterResponse = self.post(&self.auth_path("register"), request).await?;
        if let Some(token) = response.token.as_deref().filter(|t| !t.trim().is_empty()) {
            self.token_store().set(token)?;
            info!(email = %request.email, "Registered and logged in");
        } else {
            info!(email = %request.email, "Registered");
        }
        Ok(response)
    }

    /// Drop the local session. Safe to call when already logged out.
    pub fn logout(&self) -> Result<(), ClientError> {
        self.token_store().clear()?;
        info!("Logged out");
        Ok(())
    }

    pub fn is_logged_in(&self) -> bool {
        self.token_store().is_present()
    }
}
