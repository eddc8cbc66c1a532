//! Memory gallery

use super::{image_missing, is_blank, Categorized, Entity};
use crate::attachment::ImageRef;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Gallery category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MemoryCategory {
    Event,
    #[default]
    Daily,
    Achievement,
}

impl MemoryCategory {
    pub const ALL: [MemoryCategory; 3] = [Self::Event, Self::Daily, Self::Achievement];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Event => "Event",
            Self::Daily => "Daily",
            Self::Achievement => "Achievement",
        }
    }
}

impl fmt::Display for MemoryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemoryCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown memory category: {}", s))
    }
}

/// A captured moment in the store's history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memory {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Free-text label such as "Agustus 2024"
    pub date: String,
    pub category: MemoryCategory,
    pub image_url: ImageRef,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemoryDraft {
    pub title: String,
    pub description: String,
    pub date: String,
    pub category: MemoryCategory,
    pub image_url: Option<ImageRef>,
}

impl Entity for Memory {
    type Draft = MemoryDraft;

    const KEY: &'static str = "x450_memories";
    const KIND: &'static str = "memory";

    fn id(&self) -> &str {
        &self.id
    }

    fn missing_fields(draft: &MemoryDraft) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if is_blank(&draft.title) {
            fields.push("title");
        }
        if is_blank(&draft.description) {
            fields.push("description");
        }
        if is_blank(&draft.date) {
            fields.push("date");
        }
        if image_missing(&draft.image_url) {
            fields.push("image");
        }
        fields
    }

    fn draft_image(draft: &MemoryDraft) -> Option<&ImageRef> {
        draft.image_url.as_ref()
    }

    fn build(id: String, draft: MemoryDraft, _previous: Option<&Self>) -> Self {
        Self {
            id,
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            date: draft.date.trim().to_string(),
            category: draft.category,
            image_url: draft.image_url.unwrap_or_else(|| ImageRef::url("")),
        }
    }

    fn seed() -> Vec<Self> {
        use MemoryCategory::*;
        [
            ("1", "Grand Opening X450", "Hari pertama toko dibuka untuk warga Citaringgul.", "Januari 2023", Event),
            ("2", "Briefing Pagi", "Rutinitas apel pagi sebelum toko dibuka.", "Setiap Hari", Daily),
            ("3", "Toko Terbaik Area", "Penghargaan toko dengan pelayanan terbaik se-area.", "Desember 2023", Achievement),
            ("4", "Lomba 17 Agustus", "Keseruan tim merayakan hari kemerdekaan.", "Agustus 2024", Event),
            ("5", "Stock Opname", "Kerja sama tim menghitung stok sampai tuntas.", "Maret 2024", Daily),
        ]
        .into_iter()
        .map(|(id, title, description, date, category)| Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            date: date.to_string(),
            category,
            image_url: ImageRef::url(format!("https://picsum.photos/seed/x450-memory-{}/800/600", id)),
        })
        .collect()
    }
}

impl Categorized for Memory {
    type Category = MemoryCategory;

    fn category(&self) -> MemoryCategory {
        self.category
    }

    fn categories() -> &'static [MemoryCategory] {
        &MemoryCategory::ALL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse() {
        assert_eq!("event".parse::<MemoryCategory>().unwrap(), MemoryCategory::Event);
        assert_eq!(" Achievement ".parse::<MemoryCategory>().unwrap(), MemoryCategory::Achievement);
        assert!("Promo".parse::<MemoryCategory>().is_err());
    }

    #[test]
    fn test_draft_defaults_to_daily() {
        let draft: MemoryDraft = serde_json::from_str(r#"{"title":"x"}"#).unwrap();
        assert_eq!(draft.category, MemoryCategory::Daily);
    }

    #[test]
    fn test_missing_fields() {
        assert_eq!(
            Memory::missing_fields(&MemoryDraft::default()),
            vec!["title", "description", "date", "image"]
        );
    }

    #[test]
    fn test_seed_covers_every_category() {
        let seed = Memory::seed();
        for category in MemoryCategory::ALL {
            assert!(seed.iter().any(|m| m.category == category));
        }
    }

    #[test]
    fn test_category_serializes_as_name() {
        let json = serde_json::to_value(&Memory::seed()[2]).unwrap();
        assert_eq!(json["category"], "Achievement");
    }
}
