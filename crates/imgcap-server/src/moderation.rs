//! Content moderation gate.
//!
//! Uploads are screened by a remote classifier before any image work is
//! done. The gate never fails: every outcome is folded into a
//! [`ModerationVerdict`].
//!
//! * No credentials configured: allowed, the check is skipped.
//! * Transport or protocol failure (network error, timeout, non-success
//!   status, unreadable body): denied, the image could not be verified.
//!
//! A single attempt is made; there is no retry.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{Config, Credentials};

/// Scores strictly above this deny the upload.
pub const SCORE_THRESHOLD: f64 = 0.5;

pub const REASON_SKIPPED: &str = "moderation skipped";
pub const REASON_APPROVED: &str = "image approved";
pub const REASON_UNVERIFIED: &str = "could not verify image";
pub const REASON_EXPLICIT: &str = "image contains explicit content";
pub const REASON_WEAPON: &str = "image contains weapons";
pub const REASON_OFFENSIVE: &str = "image contains offensive content";

/// Connect timeout ceiling; the overall request timeout comes from [`Config`].
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of screening one upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModerationVerdict {
    pub allowed: bool,
    pub reason: String,
}

impl ModerationVerdict {
    pub fn allow(reason: impl Into<String>) -> Self {
        Self {
            allowed: true,
            reason: reason.into(),
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
        }
    }
}

/// Something that can screen image bytes.
#[async_trait]
pub trait Moderator: Send + Sync {
    /// Screen `image`. Never fails; failures become verdicts.
    async fn check(&self, image: &[u8]) -> ModerationVerdict;
}

/// Errors talking to the moderation service.
///
/// These never reach a caller of [`Moderator::check`]; they are logged and
/// turned into a denial.
#[derive(Debug, Error)]
pub enum ModerationError {
    /// HTTP client could not be built
    #[error("Failed to build moderation client: {0}")]
    Build(#[source] reqwest::Error),

    /// Network failure, timeout, bad status or undecodable body
    #[error("Moderation request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered but reported a failure
    #[error("Moderation service error: {0}")]
    Service(String),
}

/// Classifier scores as returned by the service.
///
/// Absent keys score 0.0.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModerationResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub nudity: NudityScores,
    #[serde(default)]
    pub weapon: f64,
    #[serde(default)]
    pub offensive: OffensiveScores,
    #[serde(default)]
    pub error: Option<ServiceError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NudityScores {
    #[serde(default)]
    pub raw: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OffensiveScores {
    #[serde(default)]
    pub prob: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceError {
    #[serde(default)]
    pub message: String,
}

impl ModerationResponse {
    /// Map scores to a verdict. Explicit content is checked first, then
    /// weapons, then offensiveness; the first score over the threshold wins.
    pub fn verdict(&self) -> ModerationVerdict {
        if self.nudity.raw > SCORE_THRESHOLD {
            ModerationVerdict::deny(REASON_EXPLICIT)
        } else if self.weapon > SCORE_THRESHOLD {
            ModerationVerdict::deny(REASON_WEAPON)
        } else if self.offensive.prob > SCORE_THRESHOLD {
            ModerationVerdict::deny(REASON_OFFENSIVE)
        } else {
            ModerationVerdict::allow(REASON_APPROVED)
        }
    }

    fn is_success(&self) -> bool {
        self.status.as_deref().map_or(true, |status| status == "success")
    }
}

/// HTTP client for the remote classifier.
pub struct ModerationClient {
    http: reqwest::Client,
    endpoint: String,
    models: String,
    credentials: Option<Credentials>,
}

impl ModerationClient {
    /// Create a client from configuration.
    pub fn new(config: &Config) -> Result<Self, ModerationError> {
        let timeout = config.moderation_timeout();
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .user_agent(format!("imgcap/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ModerationError::Build)?;

        Ok(Self {
            http,
            endpoint: config.moderation_endpoint.clone(),
            models: config.moderation_models.clone(),
            credentials: config.moderation_credentials(),
        })
    }

    /// Whether uploads will actually be sent to the service.
    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    async fn classify(
        &self,
        credentials: &Credentials,
        image: &[u8],
    ) -> Result<ModerationResponse, ModerationError> {
        let form = Form::new()
            .text("models", self.models.clone())
            .text("api_user", credentials.api_user.clone())
            .text("api_secret", credentials.api_secret.clone())
            .part("media", Part::bytes(image.to_vec()).file_name("upload"));

        let response = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;

        let body: ModerationResponse = response.json().await?;

        if !body.is_success() {
            let message = body
                .error
                .map(|e| e.message)
                .unwrap_or_else(|| "unknown failure".to_string());
            return Err(ModerationError::Service(message));
        }

        Ok(body)
    }
}

#[async_trait]
impl Moderator for ModerationClient {
    async fn check(&self, image: &[u8]) -> ModerationVerdict {
        let Some(credentials) = &self.credentials else {
            debug!("moderation credentials not configured, skipping");
            return ModerationVerdict::allow(REASON_SKIPPED);
        };

        match self.classify(credentials, image).await {
            Ok(scores) => {
                let verdict = scores.verdict();
                info!(
                    allowed = verdict.allowed,
                    reason = %verdict.reason,
                    nudity = scores.nudity.raw,
                    weapon = scores.weapon,
                    offensive = scores.offensive.prob,
                    "moderation verdict"
                );
                verdict
            }
            Err(e) => {
                warn!(error = %e, "moderation check failed, denying upload");
                ModerationVerdict::deny(REASON_UNVERIFIED)
            }
        }
    }
}
