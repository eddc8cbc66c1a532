//! Content collections: team roster, memory gallery, news feed, guestbook
//!
//! Each content type implements [`Entity`] and is managed by its own
//! [`EntityStore`]. The store owns the ordered collection (newest first),
//! validates drafts, assigns ids and mirrors every change to the durable
//! key-value store as a full JSON snapshot.

pub mod filter;
pub mod gallery;
pub mod guestbook;
pub mod handler;
pub mod ids;
pub mod news;
pub mod store;
pub mod team;

pub use filter::{project, CategoryFilter};
pub use gallery::{Memory, MemoryCategory, MemoryDraft};
pub use guestbook::{GuestMessage, GuestMessageDraft};
pub use handler::{categorized_router, entity_router, ContentState};
pub use news::{NewsCategory, NewsDraft, NewsItem};
pub use store::EntityStore;
pub use team::{TeamMember, TeamMemberDraft};

use crate::attachment::ImageRef;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Display;
use std::str::FromStr;

/// Label given to records created in the current session
pub const JUST_NOW: &str = "Baru saja";

/// A record type managed by an [`EntityStore`]
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Operator-submitted field values for create and edit
    type Draft: DeserializeOwned + Send + Sync + 'static;

    /// Durable-store key of the collection
    const KEY: &'static str;

    /// Human-readable kind, used in errors and logs
    const KIND: &'static str;

    fn id(&self) -> &str;

    /// Names of required draft fields that are empty
    fn missing_fields(draft: &Self::Draft) -> Vec<&'static str>;

    /// Image attached to a draft, if any
    fn draft_image(draft: &Self::Draft) -> Option<&ImageRef>;

    /// Build the stored record from a validated draft.
    ///
    /// `previous` is the record being replaced on edit, `None` on create.
    fn build(id: String, draft: Self::Draft, previous: Option<&Self>) -> Self;

    /// Compiled-in content used when nothing has been persisted yet
    fn seed() -> Vec<Self>;
}

/// An entity with an enumerated category that views can filter on
pub trait Categorized: Entity {
    type Category: Copy + PartialEq + FromStr + Display + Send + Sync + 'static;

    fn category(&self) -> Self::Category;

    /// Every category, in display order
    fn categories() -> &'static [Self::Category];
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub(crate) fn image_missing(image: &Option<ImageRef>) -> bool {
    image.as_ref().map_or(true, |i| !i.is_usable())
}

/// Unicode-aware trim + uppercase
pub(crate) fn normalize_upper(value: &str) -> String {
    value.trim().to_uppercase()
}
