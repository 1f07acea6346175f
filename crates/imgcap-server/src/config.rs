//! Process configuration.
//!
//! Built once at startup from command-line flags, each backed by an
//! environment variable (a `.env` file is loaded first), then shared
//! read-only behind an `Arc`.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use imgcap_core::SizeBudget;

/// Default listen address.
pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

/// Default request body ceiling for uploads (25 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Default moderation endpoint.
pub const DEFAULT_MODERATION_ENDPOINT: &str = "https://api.sightengine.com/1.0/check.json";

/// Classifier models requested from the moderation service.
pub const DEFAULT_MODERATION_MODELS: &str = "nudity,wad,offensive";

/// Default bound on the whole moderation round trip.
pub const DEFAULT_MODERATION_TIMEOUT_SECS: u64 = 10;

/// Server configuration.
#[derive(Clone, Parser)]
#[command(author, version, about)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "IMGCAP_BIND", default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,

    /// Maximum size of a returned image, in kilobytes
    #[arg(
        long,
        env = "IMGCAP_MAX_SIZE_KB",
        default_value_t = SizeBudget::DEFAULT_KILOBYTES,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_size_kb: u32,

    /// Maximum accepted request body, in bytes
    #[arg(long, env = "IMGCAP_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    /// Moderation service user; moderation is skipped unless both credentials are set
    #[arg(long, env = "MODERATION_API_USER")]
    pub moderation_api_user: Option<String>,

    /// Moderation service secret
    #[arg(long, env = "MODERATION_API_SECRET", hide_env_values = true)]
    pub moderation_api_secret: Option<String>,

    /// Moderation endpoint URL
    #[arg(long, env = "MODERATION_ENDPOINT", default_value = DEFAULT_MODERATION_ENDPOINT)]
    pub moderation_endpoint: String,

    /// Comma-separated classifier models
    #[arg(long, env = "MODERATION_MODELS", default_value = DEFAULT_MODERATION_MODELS)]
    pub moderation_models: String,

    /// Timeout for the moderation call, in seconds
    #[arg(
        long,
        env = "MODERATION_TIMEOUT_SECS",
        default_value_t = DEFAULT_MODERATION_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub moderation_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            max_size_kb: SizeBudget::DEFAULT_KILOBYTES,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            moderation_api_user: None,
            moderation_api_secret: None,
            moderation_endpoint: DEFAULT_MODERATION_ENDPOINT.to_string(),
            moderation_models: DEFAULT_MODERATION_MODELS.to_string(),
            moderation_timeout_secs: DEFAULT_MODERATION_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Size ceiling for returned images.
    pub fn budget(&self) -> SizeBudget {
        SizeBudget::from_kilobytes(self.max_size_kb)
    }

    /// Timeout applied to the moderation call.
    pub fn moderation_timeout(&self) -> Duration {
        Duration::from_secs(self.moderation_timeout_secs)
    }

    /// Moderation credentials, present only when both halves are non-empty.
    pub fn moderation_credentials(&self) -> Option<Credentials> {
        let user = self.moderation_api_user.as_deref().map(str::trim)?;
        let secret = self.moderation_api_secret.as_deref().map(str::trim)?;

        if user.is_empty() || secret.is_empty() {
            return None;
        }

        Some(Credentials {
            api_user: user.to_string(),
            api_secret: secret.to_string(),
        })
    }

    /// Set both moderation credentials
    pub fn with_moderation_credentials(
        mut self,
        api_user: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        self.moderation_api_user = Some(api_user.into());
        self.moderation_api_secret = Some(api_secret.into());
        self
    }

    /// Set moderation endpoint
    pub fn with_moderation_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.moderation_endpoint = endpoint.into();
        self
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind", &self.bind)
            .field("max_size_kb", &self.max_size_kb)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("moderation_api_user", &self.moderation_api_user)
            .field(
                "moderation_api_secret",
                &self.moderation_api_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("moderation_endpoint", &self.moderation_endpoint)
            .field("moderation_models", &self.moderation_models)
            .field("moderation_timeout_secs", &self.moderation_timeout_secs)
            .finish()
    }
}

/// Credential pair sent with every moderation request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_user: String,
    pub api_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_user", &self.api_user)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}
