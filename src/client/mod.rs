//! HTTP client for the dispatch backend.
//!
//! All outbound traffic goes through [`ApiClient`]. Each request passes the
//! configured [`RequestStage`] pipeline (by default just [`BearerAuth`]) and
//! each response is classified into success, [`ApiError::Auth`] (401) or
//! [`ApiError::Transport`] (everything else).

mod records;
mod stage;


pub use records::{decode_vehicles, DriverRecord, LocationRecord, LoginResponse};
pub use stage::{BearerAuth, RequestStage};

use crate::fleet::{Coordinates, FilterSelection, ValidationError, VehicleEntity};
use crate::session::{Credential, SessionStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Gateway address used when nothing is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// API client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Request timeout; None leaves reqwest's default
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    "fleet-sync/0.1".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: None,
        }
    }
}

/// Classified request failure
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// 401 from any endpoint, or rejected login
    Auth(String),
    /// Network failure, non-auth HTTP error or undecodable body
    Transport(String),
    /// Input rejected before the request was sent
    Validation(ValidationError),
}

impl ApiError {
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Auth(_))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Auth(msg) => write!(f, "Authentication failed: {}", msg),
            ApiError::Transport(msg) => write!(f, "Transport error: {}", msg),
            ApiError::Validation(e) => write!(f, "Invalid input: {}", e),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation(e)
    }
}

/// Query side of the backend used by the snapshot controller
#[async_trait]
pub trait FleetApi: Send + Sync {
    async fn query_nearby(
        &self,
        observer: Coordinates,
        filter: FilterSelection,
    ) -> Result<Vec<VehicleEntity>, ApiError>;
}

/// `GET /drivers/nearby` query string; `taxiType` is omitted for `All`
#[derive(Debug, Serialize)]
struct NearbyQuery {
    lat: f64,
    lon: f64,
    #[serde(rename = "taxiType", skip_serializing_if = "Option::is_none")]
    taxi_type: Option<&'static str>,
}

/// HTTP client for the dispatch backend
pub struct ApiClient {
    http_client: Client,
    base_url: String,
    stages: Vec<Arc<dyn RequestStage>>,
}

impl ApiClient {
    /// Create a client whose pipeline attaches the session credential
    pub fn new(config: &ApiConfig, session: Arc<SessionStore>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            stages: vec![Arc::new(BearerAuth::new(session))],
        })
    }

    /// Append a stage to the request pipeline (runs after existing stages)
    pub fn with_stage(mut self, stage: Arc<dyn RequestStage>) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Exchange username/password for a bearer credential.
    ///
    /// The body is form-encoded (`application/x-www-form-urlencoded`).
    /// Any non-2xx status is an auth failure.
    pub async fn login(&self, username: &str, password: &str) -> Result<Credential, ApiError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(ValidationError::MissingCredentials.into());
        }

        let url = format!("{}/login", self.base_url);
        let request = self
            .http_client
            .post(&url)
            .form(&[("username", username), ("password", password)]);
        let response = self.send(request).await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Login rejected");
            return Err(ApiError::Auth(format!("login rejected with status {}", status)));
        }

        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Transport(format!("failed to parse login response: {}", e)))?;
        if body.token.is_empty() {
            return Err(ApiError::Transport("login response carried an empty token".to_string()));
        }

        Ok(Credential::new(body.token))
    }

    /// Paginated vehicle listing (`GET /drivers`)
    pub async fn list_drivers(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<VehicleEntity>, ApiError> {
        if page == 0 {
            return Err(ValidationError::InvalidPage(page).into());
        }
        if page_size == 0 {
            return Err(ValidationError::InvalidPageSize(page_size).into());
        }

        let url = format!("{}/drivers?page={}&pageSize={}", self.base_url, page, page_size);
        let response = self.send(self.http_client.get(&url)).await?;
        check_response_status(&response)?;
        decode_response(response).await
    }

    /// Vehicles near `observer`, optionally restricted to one class
    pub async fn query_nearby(
        &self,
        observer: Coordinates,
        filter: FilterSelection,
    ) -> Result<Vec<VehicleEntity>, ApiError> {
        observer.validate()?;

        let query = serde_urlencoded::to_string(NearbyQuery {
            lat: observer.lat,
            lon: observer.lon,
            taxi_type: filter.tag(),
        })
        .map_err(|e| ApiError::Transport(format!("failed to encode query: {}", e)))?;
        let url = format!("{}/drivers/nearby?{}", self.base_url, query);

        debug!(url = %url, filter = %filter, "Querying nearby vehicles");
        let response = self.send(self.http_client.get(&url)).await?;
        check_response_status(&response)?;
        decode_response(response).await
    }

    /// Run the request pipeline and send
    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let request = self
            .stages
            .iter()
            .fold(request, |request, stage| stage.apply(request));

        request
            .send()
            .await
            .map_err(|e| ApiError::Transport(format!("request failed: {}", e)))
    }
}

#[async_trait]
impl FleetApi for ApiClient {
    async fn query_nearby(
        &self,
        observer: Coordinates,
        filter: FilterSelection,
    ) -> Result<Vec<VehicleEntity>, ApiError> {
        ApiClient::query_nearby(self, observer, filter).await
    }
}

/// Classify a response status.
///
/// - 401 → auth error, identical for every endpoint
/// - Other non-2xx → transport error
fn check_response_status(response: &Response) -> Result<(), ApiError> {
    match response.status() {
        StatusCode::UNAUTHORIZED => Err(ApiError::Auth(
            "session expired or invalid".to_string(),
        )),
        s if !s.is_success() => Err(ApiError::Transport(format!("backend returned {}", s))),
        _ => Ok(()),
    }
}

async fn decode_response(response: Response) -> Result<Vec<VehicleEntity>, ApiError> {
    let body = response
        .bytes()
        .await
        .map_err(|e| ApiError::Transport(format!("failed to read response body: {}", e)))?;
    decode_vehicles(&body)
        .map_err(|e| ApiError::Transport(format!("failed to parse vehicle list: {}", e)))
}
