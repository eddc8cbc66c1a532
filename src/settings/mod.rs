//! Settings module: site identity management
//!
//! Provides REST endpoints for reading, updating, and resetting the site
//! name and tagline, plus AI-suggested domain names.

pub mod handler;
pub mod store;
pub mod types;

pub use handler::{settings_router, SettingsState};
pub use store::SettingsStore;
pub use types::{SiteSettings, UpdateSettingsRequest};
