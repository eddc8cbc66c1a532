//! Text augmentation: generated flavor text with static fallbacks
//!
//! Callers ask [`AugmentService`] for a [`PromptKind`] and always get text
//! back: either the model's answer or a fixed Indonesian fallback. The
//! network client sits behind the [`TextGenerator`] trait so tests and
//! offline deployments can swap it out.

pub mod generator;
pub mod handler;
pub mod service;

pub use generator::{GeminiGenerator, OfflineGenerator, TextGenerator};
pub use handler::{augment_router, headlines, AugmentState};
pub use service::{AugmentService, AugmentSlot, Refresh};

/// What to generate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptKind {
    /// Three short rotating headlines for the news ticker
    FlashNews,
    /// One motivational sentence naming the current team
    TeamSynergy { names: Vec<String> },
    /// Domain name ideas for the site settings page
    DomainSuggestions,
}

impl PromptKind {
    /// Short name for logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::FlashNews => "flash_news",
            Self::TeamSynergy { .. } => "team_synergy",
            Self::DomainSuggestions => "domain_suggestions",
        }
    }

    /// Prompt sent to the model
    pub fn prompt(&self, store_name: &str) -> String {
        match self {
            Self::FlashNews => format!(
                "Buat 3 judul berita singkat dan ceria untuk papan informasi toko {}. \
                 Satu judul per baris, tanpa nomor dan tanpa tanda kutip.",
                store_name
            ),
            Self::TeamSynergy { names } => format!(
                "Tulis satu kalimat motivasi yang hangat untuk tim toko {} yang beranggotakan: {}. \
                 Maksimal 25 kata, tanpa tanda kutip.",
                store_name,
                names.join(", ")
            ),
            Self::DomainSuggestions => format!(
                "Berikan 5 saran nama domain unik dan profesional untuk website album kenangan {}. \
                 Gunakan akhiran .id, .com, atau .site. Berikan hanya daftar namanya saja.",
                store_name
            ),
        }
    }

    /// Text used whenever generation fails
    pub fn fallback(&self) -> &'static str {
        match self {
            Self::FlashNews => {
                "Promo hemat minggu ini, cek rak depan!\n\
                 Toko buka setiap hari pukul 07.00 - 22.00 WIB.\n\
                 Terima kasih sudah berbelanja di X450!"
            }
            Self::TeamSynergy { .. } => {
                "Satu tim, satu semangat: melayani dengan senyum setiap hari!"
            }
            Self::DomainSuggestions => {
                "citaringgulx450.id\nalfamartx450.com\nkenangan-x450.site"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallbacks_non_empty() {
        for kind in [
            PromptKind::FlashNews,
            PromptKind::TeamSynergy { names: vec![] },
            PromptKind::DomainSuggestions,
        ] {
            assert!(!kind.fallback().trim().is_empty(), "{}", kind.label());
        }
        assert_eq!(PromptKind::FlashNews.fallback().lines().count(), 3);
    }

    #[test]
    fn test_team_prompt_lists_names() {
        let kind = PromptKind::TeamSynergy {
            names: vec!["ENCEP".to_string(), "RINA".to_string()],
        };
        let prompt = kind.prompt("Alfamart X450");
        assert!(prompt.contains("ENCEP, RINA"));
        assert!(prompt.contains("Alfamart X450"));
    }
}
