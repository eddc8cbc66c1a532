//! Augmentation service with fallback and single-flight slots

use super::generator::{GeminiGenerator, OfflineGenerator, TextGenerator};
use super::PromptKind;
use crate::config::AugmentConfig;
use crate::error::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};

/// Generates text for a prompt kind. Never fails.
#[derive(Clone)]
pub struct AugmentService {
    generator: Arc<dyn TextGenerator>,
    store_name: watch::Receiver<String>,
}

impl AugmentService {
    pub fn new(generator: Arc<dyn TextGenerator>, store_name: impl Into<String>) -> Self {
        let (_, store_name) = watch::channel(store_name.into());
        Self {
            generator,
            store_name,
        }
    }

    /// Build prompts with whatever name `names` currently holds
    pub fn with_store_name(mut self, names: watch::Receiver<String>) -> Self {
        self.store_name = names;
        self
    }

    /// Store name the next prompt will use
    pub fn store_name(&self) -> String {
        self.store_name.borrow().clone()
    }

    /// Service backed by the configured endpoint, or offline when disabled
    pub fn from_config(config: &AugmentConfig, store_name: &str) -> Result<Self> {
        let generator: Arc<dyn TextGenerator> = if config.enabled {
            Arc::new(GeminiGenerator::from_config(config)?)
        } else {
            Arc::new(OfflineGenerator)
        };
        Ok(Self::new(generator, store_name))
    }

    /// Model text for `kind`, or the kind's fallback on any failure
    pub async fn generate(&self, kind: &PromptKind) -> String {
        if let PromptKind::TeamSynergy { names } = kind {
            if names.is_empty() {
                return kind.fallback().to_string();
            }
        }

        let prompt = kind.prompt(&self.store_name());
        match self.generator.generate(&prompt).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                tracing::warn!(kind = kind.label(), "Empty generated text, using fallback");
                kind.fallback().to_string()
            }
            Err(e) => {
                tracing::warn!(
                    kind = kind.label(),
                    generator = self.generator.name(),
                    "Generation failed, using fallback: {}",
                    e
                );
                kind.fallback().to_string()
            }
        }
    }
}

/// Outcome of [`AugmentSlot::refresh`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refresh {
    Updated(String),
    /// A refresh was already running; nothing was requested
    Busy,
}

/// Latest generated value for one UI spot, with at most one request in flight
#[derive(Default)]
pub struct AugmentSlot {
    busy: AtomicBool,
    latest: RwLock<Option<Generated>>,
}

/// Text plus the prompt it answered
struct Generated {
    kind: PromptKind,
    text: String,
}

impl AugmentSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn refresh(&self, service: &AugmentService, kind: &PromptKind) -> Refresh {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Refresh::Busy;
        }
        let _guard = BusyGuard(&self.busy);

        let text = service.generate(kind).await;
        *self.latest.write().await = Some(Generated {
            kind: kind.clone(),
            text: text.clone(),
        });
        Refresh::Updated(text)
    }

    pub async fn latest(&self) -> Option<String> {
        self.latest.read().await.as_ref().map(|g| g.text.clone())
    }

    /// True when the held text was generated for exactly `kind`
    pub async fn is_current(&self, kind: &PromptKind) -> bool {
        self.latest
            .read()
            .await
            .as_ref()
            .map_or(false, |g| &g.kind == kind)
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Clears the busy flag even if the refresh future is dropped
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
