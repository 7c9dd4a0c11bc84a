// Backend REST client
//
// Wraps the warranty backend's HTTP API (auth, record listing, bill
// scan, deletion) using [`reqwest`]. The engine consumes it through the
// [`WarrantyService`] trait so tests can substitute a fake service.

pub mod session;

use async_trait::async_trait;
use log::{debug, info, warn};
use parking_lot::RwLock;
use serde::Deserialize;
use url::Url;

use crate::error::WalletError;
use crate::models::{
    AuthStatus, LoginRequest, LoginResponse, Settings, SignupRequest, StoredSession,
    WarrantyRecord,
};

/// Abstract contract over the persistence and extraction services.
///
/// All calls are non-blocking suspension points; a 401 from any of them
/// invalidates the session and is never retried here.
#[async_trait]
pub trait WarrantyService: Send + Sync {
    /// Full record set, in server display order.
    async fn fetch_all(&self) -> Result<Vec<WarrantyRecord>, WalletError>;

    /// Server-side status-filtered variants.
    async fn fetch_active(&self) -> Result<Vec<WarrantyRecord>, WalletError>;
    async fn fetch_expired(&self) -> Result<Vec<WarrantyRecord>, WalletError>;

    /// Submit a bill image to the extraction service; returns the
    /// registered record on success.
    async fn scan_bill(
        &self,
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    ) -> Result<WarrantyRecord, WalletError>;

    async fn delete(&self, id: &str) -> Result<(), WalletError>;
}

/// Structured error payload the backend returns on failures.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP client for the warranty backend.
pub struct WarrantyApi {
    client: reqwest::Client,
    base_url: String,
    session: RwLock<Option<StoredSession>>,
}

impl WarrantyApi {
    /// Create a client against the configured server.
    ///
    /// The URL is validated up front so a typo in settings fails here
    /// rather than on the first request.
    pub fn new(settings: &Settings) -> Result<Self, WalletError> {
        let parsed = Url::parse(&settings.server_url).map_err(|e| {
            WalletError::Validation(format!(
                "Invalid server URL {:?}: {}",
                settings.server_url, e
            ))
        })?;

        Ok(Self {
            client: reqwest::Client::new(),
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            session: RwLock::new(None),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Load a previously persisted session into memory, if present.
    pub fn restore_session(&self) -> AuthStatus {
        let restored = session::load_session();
        if let Some(ref s) = restored {
            debug!("Restored session for {}", s.username);
        }
        *self.session.write() = restored;
        self.auth_status()
    }

    pub fn auth_status(&self) -> AuthStatus {
        let guard = self.session.read();
        AuthStatus {
            is_authenticated: guard.is_some(),
            username: guard.as_ref().map(|s| s.username.clone()),
        }
    }

    fn bearer_token(&self) -> Option<String> {
        self.session.read().as_ref().map(|s| s.token.clone())
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.bearer_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Drop the in-memory session and the stored file.
    fn teardown_session(&self) {
        *self.session.write() = None;
        session::clear_session();
    }

    /// Authenticate and initialize the session.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthStatus, WalletError> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        let response = self
            .client
            .post(self.endpoint("/auth/login"))
            .json(&body)
            .send()
            .await?;

        let response = self.guard_response(response).await?;
        let login: LoginResponse = response.json().await?;

        let stored = StoredSession::new(login.token, login.username);
        if let Err(e) = session::save_session(&stored) {
            warn!("Failed to persist session: {}", e);
        }
        *self.session.write() = Some(stored);

        info!("Logged in as {}", username);
        Ok(self.auth_status())
    }

    pub async fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), WalletError> {
        let body = SignupRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = self
            .client
            .post(self.endpoint("/auth/signup"))
            .json(&body)
            .send()
            .await?;

        self.guard_response(response).await?;
        Ok(())
    }

    /// Tear down the session locally. The backend keeps no server-side
    /// session state for bearer tokens.
    pub fn logout(&self) {
        self.teardown_session();
        info!("Logged out");
    }

    /// Map a response to an error unless it is 2xx. A 401 tears down
    /// the session; `{"error": "..."}` bodies surface their message
    /// verbatim.
    async fn guard_response(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, WalletError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            warn!("Server returned 401; invalidating session");
            self.teardown_session();
            return Err(WalletError::Unauthorized);
        }

        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorBody>(&body) {
            Ok(payload) => Err(WalletError::Service(payload.error)),
            Err(_) => Err(WalletError::Service(format!(
                "Server error {}: {}",
                status.as_u16(),
                body
            ))),
        }
    }

    async fn fetch_records(&self, path: &str) -> Result<Vec<WarrantyRecord>, WalletError> {
        let response = self
            .authorized(self.client.get(self.endpoint(path)))
            .send()
            .await?;
        let response = self.guard_response(response).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl WarrantyService for WarrantyApi {
    async fn fetch_all(&self) -> Result<Vec<WarrantyRecord>, WalletError> {
        self.fetch_records("/warranties").await
    }

    async fn fetch_active(&self) -> Result<Vec<WarrantyRecord>, WalletError> {
        self.fetch_records("/warranties/active").await
    }

    async fn fetch_expired(&self) -> Result<Vec<WarrantyRecord>, WalletError> {
        self.fetch_records("/warranties/expired").await
    }

    async fn scan_bill(
        &self,
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    ) -> Result<WarrantyRecord, WalletError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(&content_type)
            .map_err(|_| {
                WalletError::Validation(format!("Unsupported content type: {}", content_type))
            })?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .authorized(self.client.post(self.endpoint("/warranties/scan")))
            .multipart(form)
            .send()
            .await?;

        let response = self.guard_response(response).await?;
        Ok(response.json().await?)
    }

    async fn delete(&self, id: &str) -> Result<(), WalletError> {
        let response = self
            .authorized(
                self.client
                    .delete(self.endpoint(&format!("/warranties/{}", id))),
            )
            .send()
            .await?;

        self.guard_response(response).await?;
        debug!("Deleted warranty {}", id);
        Ok(())
    }
}
