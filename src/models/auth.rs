// Authentication payloads and the stored session
use serde::{Deserialize, Serialize};

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful login response from the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
}

/// Body of `POST /auth/signup`.
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Authentication status for the host UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatus {
    pub is_authenticated: bool,
    pub username: Option<String>,
}

/// Bearer session persisted between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub username: String,
    /// ISO timestamp when the session was saved
    pub saved_at: String,
}

impl StoredSession {
    pub fn new(token: String, username: String) -> Self {
        Self {
            token,
            username,
            saved_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
