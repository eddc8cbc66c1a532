//! Content hub: every store and service of a running site, wired from config

use crate::augment::{AugmentService, AugmentSlot};
use crate::config::HubConfig;
use crate::content::{Entity, EntityStore, GuestMessage, Memory, NewsItem, TeamMember};
use crate::error::Result;
use crate::kv::{self, KvStore};
use crate::settings::{SettingsStore, SiteSettings};
use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Content collection selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Team,
    Memories,
    News,
    Guestbook,
}

impl Collection {
    pub const ALL: [Collection; 4] = [Self::Team, Self::Memories, Self::News, Self::Guestbook];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Team => "team",
            Self::Memories => "memories",
            Self::News => "news",
            Self::Guestbook => "guestbook",
        }
    }

    /// HTTP base path of the collection
    pub fn base_path(&self) -> String {
        format!("/api/v1/{}", self.as_str())
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "team" | "members" => Ok(Self::Team),
            "memories" | "gallery" => Ok(Self::Memories),
            "news" => Ok(Self::News),
            "guestbook" => Ok(Self::Guestbook),
            other => Err(format!(
                "unknown collection '{}' (expected team, memories, news or guestbook)",
                other
            )),
        }
    }
}

/// All stores and services of one site
pub struct ContentHub {
    pub config: HubConfig,
    pub kv: Arc<dyn KvStore>,
    pub team: Arc<EntityStore<TeamMember>>,
    pub memories: Arc<EntityStore<Memory>>,
    pub news: Arc<EntityStore<NewsItem>>,
    pub guestbook: Arc<EntityStore<GuestMessage>>,
    pub settings: Arc<SettingsStore>,
    pub augment: AugmentService,
    pub team_vibe: Arc<AugmentSlot>,
}

impl ContentHub {
    /// Open the configured durable store and load every collection
    pub async fn open(config: HubConfig) -> Result<Self> {
        let kv = kv::open(&config.storage).await?;
        let augment = AugmentService::from_config(&config.augment, &config.site.name)?;
        Ok(Self::with_parts(config, kv, augment).await)
    }

    /// Build a hub over an existing store and augmentation service
    pub async fn with_parts(config: HubConfig, kv: Arc<dyn KvStore>, augment: AugmentService) -> Self {
        let (team, memories, news, guestbook, settings) = tokio::join!(
            EntityStore::<TeamMember>::open(kv.clone()),
            EntityStore::<Memory>::open(kv.clone()),
            EntityStore::<NewsItem>::open(kv.clone()),
            EntityStore::<GuestMessage>::open(kv.clone()),
            SettingsStore::open(kv.clone(), SiteSettings::from(&config.site)),
        );

        let max_image = config.images.max_bytes;
        let augment = augment.with_store_name(settings.watch_site_name());

        tracing::info!(
            team = team.len().await,
            memories = memories.len().await,
            news = news.len().await,
            guestbook = guestbook.len().await,
            "Content hub ready"
        );

        Self {
            config,
            kv,
            team: Arc::new(team.with_image_limit(max_image)),
            memories: Arc::new(memories.with_image_limit(max_image)),
            news: Arc::new(news.with_image_limit(max_image)),
            guestbook: Arc::new(guestbook.with_image_limit(max_image)),
            settings: Arc::new(settings),
            augment,
            team_vibe: Arc::new(AugmentSlot::new()),
        }
    }

    /// Write every collection and the settings now.
    ///
    /// All writes are attempted; the first failure is returned.
    pub async fn flush_all(&self) -> Result<()> {
        let flushes: Vec<(&'static str, BoxFuture<'_, Result<()>>)> = vec![
            (TeamMember::KIND, self.team.flush().boxed()),
            (Memory::KIND, self.memories.flush().boxed()),
            (NewsItem::KIND, self.news.flush().boxed()),
            (GuestMessage::KIND, self.guestbook.flush().boxed()),
            ("site settings", self.settings.save().boxed()),
        ];
        let (kinds, futures): (Vec<_>, Vec<_>) = flushes.into_iter().unzip();

        let mut first_error = None;
        for (kind, result) in kinds.into_iter().zip(join_all(futures).await) {
            if let Err(e) = result {
                tracing::warn!("Failed to flush {}: {}", kind, e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Delete by id from the selected collection
    pub async fn delete(&self, collection: Collection, id: &str) -> bool {
        match collection {
            Collection::Team => self.team.delete(id).await,
            Collection::Memories => self.memories.delete(id).await,
            Collection::News => self.news.delete(id).await,
            Collection::Guestbook => self.guestbook.delete(id).await,
        }
    }

    /// Restore the seed content of the selected collection
    pub async fn reset(&self, collection: Collection) -> Result<()> {
        match collection {
            Collection::Team => self.team.reset().await,
            Collection::Memories => self.memories.reset().await,
            Collection::News => self.news.reset().await,
            Collection::Guestbook => self.guestbook.reset().await,
        }
    }
}
