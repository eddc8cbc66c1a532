//! Settings wire types
//!
//! Site identity with camelCase JSON serialization.

use crate::config::SiteConfig;
use serde::{Deserialize, Serialize};

/// Site identity shown in the page header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    pub site_name: String,
    pub tagline: String,
}

impl From<&SiteConfig> for SiteSettings {
    fn from(config: &SiteConfig) -> Self {
        Self {
            site_name: config.name.clone(),
            tagline: config.tagline.clone(),
        }
    }
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self::from(&SiteConfig::default())
    }
}

/// Partial update request
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    pub site_name: Option<String>,
    pub tagline: Option<String>,
}

/// Settings plus an optional persistence warning
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    #[serde(flatten)]
    pub settings: SiteSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persist_warning: Option<String>,
}

/// AI domain name suggestions
#[derive(Debug, Serialize)]
pub struct DomainSuggestions {
    pub domains: Vec<String>,
}
