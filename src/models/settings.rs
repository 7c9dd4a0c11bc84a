// Settings data model
use serde::{Deserialize, Serialize};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080/api";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL of the backend API, e.g. `http://localhost:8080/api`.
    pub server_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: String::from(DEFAULT_SERVER_URL),
        }
    }
}
