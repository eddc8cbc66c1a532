//! Storehub - content hub for a retail outlet
//!
//! Storehub keeps four independently managed content collections for a
//! store's community page: the team roster, a photo memory gallery, a news
//! feed and a guestbook. Operators create, edit and delete entries; every
//! change is mirrored to a durable key-value store and survives restarts.
//! Short flavor texts (ticker headlines, a team motivation line, domain name
//! ideas) come from an external text-generation model and always fall back to
//! static text when the model is unavailable.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                         HTTP API (axum)                        │
//! │   content routers · images · augment · settings · Operator    │
//! └───────────────┬───────────────────────────────┬───────────────┘
//!                 │                               │
//! ┌───────────────▼───────────────┐   ┌───────────▼───────────────┐
//! │        EntityStore<E>         │   │      AugmentService       │
//! │  validate · ids · save lane   │   │  TextGenerator + fallback │
//! └───────────────┬───────────────┘   └───────────────────────────┘
//!                 │ JSON snapshots
//! ┌───────────────▼───────────────┐
//! │       KvStore (file/memory)   │
//! └───────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`kv`]: Durable key-value store
//! - [`attachment`]: Image validation and data-URL embedding
//! - [`content`]: Entity types, generic store, category filters, HTTP routes
//! - [`augment`]: Generated text with fallbacks
//! - [`settings`]: Site identity
//! - [`session`]: Operator capability for mutating routes
//! - [`hub`]: Wiring of all stores from configuration
//! - [`api`]: Combined HTTP application
//! - [`config`]: Configuration management

pub mod api;
pub mod attachment;
pub mod augment;
pub mod config;
pub mod content;
pub mod error;
pub mod hub;
pub mod kv;
pub mod session;
pub mod settings;

pub use config::HubConfig;
pub use error::{Error, Result};
pub use hub::ContentHub;
