//! Storehub configuration management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main Storehub configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HubConfig {
    /// HTTP gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Durable storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Image attachment limits
    #[serde(default)]
    pub images: ImagesConfig,

    /// Text augmentation endpoint
    #[serde(default)]
    pub augment: AugmentConfig,

    /// Initial site identity
    #[serde(default)]
    pub site: SiteConfig,
}

impl HubConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("{}: {}", path.display(), e)))
    }
}

/// Gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Allowed CORS origins (empty = any)
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Environment variable holding the operator bearer token
    pub admin_token_ref: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 18450,
            cors_origins: Vec::new(),
            admin_token_ref: "STOREHUB_ADMIN_TOKEN".to_string(),
        }
    }
}

/// Storage backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// One JSON file per key (default)
    #[default]
    File,

    /// Process memory only, lost on exit
    Memory,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend type
    pub backend: StorageBackend,

    /// Directory for the file backend
    pub data_dir: PathBuf,

    /// Total byte budget across all keys (None = unlimited)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota_bytes: Option<u64>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            data_dir: dirs_next::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".storehub")
                .join("data"),
            quota_bytes: None,
        }
    }
}

/// Image attachment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Largest accepted raw image, in bytes
    pub max_bytes: usize,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            max_bytes: crate::attachment::MAX_IMAGE_BYTES,
        }
    }
}

/// Text augmentation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentConfig {
    /// Enable calls to the text-generation endpoint
    pub enabled: bool,

    /// Endpoint base URL
    pub base_url: String,

    /// Model identifier
    pub model: String,

    /// Environment variable holding the API key
    pub api_key_ref: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-3-flash-preview".to_string(),
            api_key_ref: "GEMINI_API_KEY".to_string(),
            timeout_secs: 15,
        }
    }
}

/// Initial site identity, used until an operator saves settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub name: String,
    pub tagline: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Alfamart Citaringgul X450".to_string(),
            tagline: "Digital Memories Album".to_string(),
        }
    }
}

/// Resolve a secret from the environment: exact name first, then UPPER_CASE
pub fn resolve_secret(secret_ref: &str) -> Option<String> {
    std::env::var(secret_ref)
        .or_else(|_| std::env::var(secret_ref.to_uppercase()))
        .ok()
        .filter(|v| !v.trim().is_empty())
}
