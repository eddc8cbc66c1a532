//! Generic entity store with seed fallback and snapshot persistence
//!
//! The in-memory `Vec` is authoritative for the running process. Every
//! mutation schedules a background save of the whole collection; saves are
//! numbered and funneled through a per-store write lane, so an older
//! snapshot can never overwrite a newer one. [`EntityStore::flush`] writes
//! the current snapshot immediately and reports the outcome.

use super::filter::{project, CategoryFilter};
use super::ids::IdClock;
use super::{Categorized, Entity};
use crate::attachment::{self, MAX_IMAGE_BYTES};
use crate::error::{Error, Result};
use crate::kv::KvStore;
use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// In-memory ordered collection of one entity type, mirrored to a [`KvStore`]
pub struct EntityStore<E: Entity> {
    kv: Arc<dyn KvStore>,
    items: Arc<RwLock<Vec<E>>>,
    ids: IdClock,
    lane: Arc<SaveLane<E>>,
    max_image_bytes: usize,
}

impl<E: Entity> EntityStore<E> {
    /// Open the collection, falling back to the seed dataset when the
    /// durable store has nothing usable under `E::KEY`
    pub async fn open(kv: Arc<dyn KvStore>) -> Self {
        let items = match kv.load(E::KEY).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<Vec<E>>(&bytes) {
                Ok(items) => dedupe_ids(items),
                Err(e) => {
                    tracing::warn!("Failed to parse stored {} collection: {}", E::KIND, e);
                    E::seed()
                }
            },
            Ok(None) => {
                tracing::debug!("No stored {} collection, using seed data", E::KIND);
                E::seed()
            }
            Err(e) => {
                tracing::warn!("Failed to load {} collection: {}", E::KIND, e);
                E::seed()
            }
        };

        let ids = IdClock::after(items.iter().map(|e| e.id()));

        Self {
            kv,
            items: Arc::new(RwLock::new(items)),
            ids,
            lane: Arc::new(SaveLane::new()),
            max_image_bytes: MAX_IMAGE_BYTES,
        }
    }

    /// Largest decoded image accepted in a draft
    pub fn with_image_limit(mut self, max_bytes: usize) -> Self {
        self.max_image_bytes = max_bytes;
        self
    }

    /// Snapshot of the collection, newest first
    pub async fn list(&self) -> Vec<E> {
        self.items.read().await.clone()
    }

    /// Get an entity by id
    pub async fn get(&self, id: &str) -> Option<E> {
        self.items.read().await.iter().find(|e| e.id() == id).cloned()
    }

    /// Number of entities
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    /// Validate a draft and prepend the new entity
    pub async fn create(&self, draft: E::Draft) -> Result<E> {
        validate::<E>(&draft)?;
        self.check_image(&draft).await?;

        let mut items = self.items.write().await;
        let entity = E::build(self.ids.next_id(), draft, None);
        items.insert(0, entity.clone());
        self.schedule_save(&items);
        drop(items);

        tracing::info!(id = entity.id(), "Created {}", E::KIND);
        Ok(entity)
    }

    /// Replace the entity with `id` in place
    pub async fn update(&self, id: &str, draft: E::Draft) -> Result<E> {
        // Decoding runs before the write lock is taken
        self.check_image(&draft).await?;

        let mut items = self.items.write().await;

        let index = items
            .iter()
            .position(|e| e.id() == id)
            .ok_or_else(|| Error::NotFound {
                entity: E::KIND,
                id: id.to_string(),
            })?;

        validate::<E>(&draft)?;

        let entity = E::build(id.to_string(), draft, Some(&items[index]));
        items[index] = entity.clone();
        self.schedule_save(&items);
        drop(items);

        tracing::info!(id, "Updated {}", E::KIND);
        Ok(entity)
    }

    /// Remove the entity with `id`. Deleting a missing id is a no-op.
    ///
    /// Returns whether an entity was removed.
    pub async fn delete(&self, id: &str) -> bool {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|e| e.id() != id);
        let removed = items.len() != before;
        self.schedule_save(&items);
        drop(items);

        if removed {
            tracing::info!(id, "Deleted {}", E::KIND);
        } else {
            tracing::debug!(id, "Delete of absent {} ignored", E::KIND);
        }
        removed
    }

    /// Write the current snapshot now
    pub async fn flush(&self) -> Result<()> {
        let (generation, bytes) = {
            let items = self.items.read().await;
            (self.lane.next_generation(), serde_json::to_vec(&*items)?)
        };
        self.lane.write(self.kv.as_ref(), generation, bytes).await
    }

    /// Message of the last failed save, cleared by the next successful one
    pub fn persist_error(&self) -> Option<String> {
        self.lane.last_error()
    }

    /// Drop the stored collection and go back to the seed dataset
    pub async fn reset(&self) -> Result<()> {
        let mut items = self.items.write().await;
        self.lane.invalidate().await;
        self.kv.remove(E::KEY).await?;
        *items = E::seed();
        tracing::info!("Reset {} collection to seed data", E::KIND);
        Ok(())
    }

    async fn check_image(&self, draft: &E::Draft) -> Result<()> {
        match E::draft_image(draft) {
            Some(image) => attachment::verify(image, self.max_image_bytes).await,
            None => Ok(()),
        }
    }

    fn schedule_save(&self, items: &[E]) {
        let generation = self.lane.next_generation();
        let bytes = match serde_json::to_vec(items) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Failed to serialize {} collection: {}", E::KIND, e);
                return;
            }
        };

        let kv = self.kv.clone();
        let lane = self.lane.clone();
        tokio::spawn(async move {
            if let Err(e) = lane.write(kv.as_ref(), generation, bytes).await {
                tracing::warn!("Failed to persist {} collection: {}", E::KIND, e);
            }
        });
    }
}

impl<E: Categorized> EntityStore<E> {
    /// Snapshot restricted to one category, order preserved
    pub async fn list_filtered(&self, filter: &CategoryFilter<E::Category>) -> Vec<E> {
        let items = self.items.read().await;
        project(items.as_slice(), filter)
    }
}

fn validate<E: Entity>(draft: &E::Draft) -> Result<()> {
    let fields = E::missing_fields(draft);
    if fields.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation {
            entity: E::KIND,
            fields,
        })
    }
}

/// Keep the first entity for every id
fn dedupe_ids<E: Entity>(items: Vec<E>) -> Vec<E> {
    let mut seen = HashSet::new();
    let before = items.len();
    let items: Vec<E> = items
        .into_iter()
        .filter(|e| seen.insert(e.id().to_string()))
        .collect();
    if items.len() != before {
        tracing::warn!(
            "Dropped {} {} records with duplicate ids",
            before - items.len(),
            E::KIND
        );
    }
    items
}

/// Orders snapshot writes for one collection
struct SaveLane<E> {
    issued: AtomicU64,
    written: Mutex<u64>,
    last_error: std::sync::Mutex<Option<String>>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> SaveLane<E> {
    fn new() -> Self {
        Self {
            issued: AtomicU64::new(0),
            written: Mutex::new(0),
            last_error: std::sync::Mutex::new(None),
            _entity: PhantomData,
        }
    }

    fn next_generation(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Make every snapshot issued so far stale
    async fn invalidate(&self) {
        let generation = self.next_generation();
        *self.written.lock().await = generation;
    }

    async fn write(&self, kv: &dyn KvStore, generation: u64, bytes: Vec<u8>) -> Result<()> {
        let mut written = self.written.lock().await;
        if generation <= *written {
            tracing::trace!(generation, "Skipping stale {} snapshot", E::KIND);
            return Ok(());
        }

        match kv.save(E::KEY, &bytes).await {
            Ok(()) => {
                *written = generation;
                self.set_error(None);
                Ok(())
            }
            Err(e) => {
                self.set_error(Some(e.to_string()));
                Err(e)
            }
        }
    }

    fn set_error(&self, error: Option<String>) {
        let mut slot = self.last_error.lock().unwrap_or_else(|e| e.into_inner());
        *slot = error;
    }

    fn last_error(&self) -> Option<String> {
        self.last_error
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
