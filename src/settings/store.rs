//! Site settings persistence

use super::types::{SiteSettings, UpdateSettingsRequest};
use crate::error::{Error, Result};
use crate::kv::KvStore;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};

/// Durable-store key of the settings object
pub const SETTINGS_KEY: &str = "x450_site_settings";

/// Current site settings, mirrored to the durable store
pub struct SettingsStore {
    kv: Arc<dyn KvStore>,
    defaults: SiteSettings,
    current: RwLock<SiteSettings>,
    site_name: watch::Sender<String>,
}

impl SettingsStore {
    /// Load saved settings, falling back to `defaults`
    pub async fn open(kv: Arc<dyn KvStore>, defaults: SiteSettings) -> Self {
        let current = match kv.load(SETTINGS_KEY).await {
            Ok(Some(bytes)) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse stored site settings: {}", e);
                defaults.clone()
            }),
            Ok(None) => defaults.clone(),
            Err(e) => {
                tracing::warn!("Failed to load site settings: {}", e);
                defaults.clone()
            }
        };

        let (site_name, _) = watch::channel(current.site_name.clone());
        Self {
            kv,
            defaults,
            current: RwLock::new(current),
            site_name,
        }
    }

    /// Follows the current site name across updates and resets
    pub fn watch_site_name(&self) -> watch::Receiver<String> {
        self.site_name.subscribe()
    }

    pub async fn get(&self) -> SiteSettings {
        self.current.read().await.clone()
    }

    /// Apply a partial update in memory. A blank site name is rejected.
    pub async fn update(&self, request: UpdateSettingsRequest) -> Result<SiteSettings> {
        if request
            .site_name
            .as_deref()
            .map_or(false, |name| name.trim().is_empty())
        {
            return Err(Error::Validation {
                entity: "site settings",
                fields: vec!["siteName"],
            });
        }

        let mut current = self.current.write().await;
        if let Some(name) = request.site_name {
            current.site_name = name.trim().to_string();
        }
        if let Some(tagline) = request.tagline {
            current.tagline = tagline.trim().to_string();
        }
        self.site_name.send_replace(current.site_name.clone());
        tracing::info!(site_name = %current.site_name, "Updated site settings");
        Ok(current.clone())
    }

    /// Write the current settings to the durable store
    pub async fn save(&self) -> Result<()> {
        let bytes = serde_json::to_vec(&*self.current.read().await)?;
        self.kv.save(SETTINGS_KEY, &bytes).await
    }

    /// Forget saved settings and go back to the configured defaults
    pub async fn reset(&self) -> Result<SiteSettings> {
        let mut current = self.current.write().await;
        self.kv.remove(SETTINGS_KEY).await?;
        *current = self.defaults.clone();
        self.site_name.send_replace(current.site_name.clone());
        Ok(current.clone())
    }
}
