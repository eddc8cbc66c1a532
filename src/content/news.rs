//! News feed

use super::{image_missing, is_blank, Categorized, Entity, JUST_NOW};
use crate::attachment::ImageRef;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NewsCategory {
    #[default]
    Promo,
    #[serde(rename = "Store Info")]
    StoreInfo,
    Internal,
}

impl NewsCategory {
    pub const ALL: [NewsCategory; 3] = [Self::Promo, Self::StoreInfo, Self::Internal];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Promo => "Promo",
            Self::StoreInfo => "Store Info",
            Self::Internal => "Internal",
        }
    }
}

impl fmt::Display for NewsCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NewsCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "promo" => Ok(Self::Promo),
            "store info" | "store_info" | "store-info" => Ok(Self::StoreInfo),
            "internal" => Ok(Self::Internal),
            _ => Err(format!("unknown news category: {}", s)),
        }
    }
}

/// A store announcement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    /// Card text, also shown as the full body in the detail view
    pub summary: String,
    pub category: NewsCategory,
    pub date: String,
    pub image_url: ImageRef,
}

impl NewsItem {
    pub fn body(&self) -> &str {
        &self.summary
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewsDraft {
    pub title: String,
    pub summary: String,
    pub category: NewsCategory,
    pub date: Option<String>,
    pub image_url: Option<ImageRef>,
}

impl Entity for NewsItem {
    type Draft = NewsDraft;

    const KEY: &'static str = "x450_news";
    const KIND: &'static str = "news item";

    fn id(&self) -> &str {
        &self.id
    }

    fn missing_fields(draft: &NewsDraft) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if is_blank(&draft.title) {
            fields.push("title");
        }
        if is_blank(&draft.summary) {
            fields.push("summary");
        }
        if image_missing(&draft.image_url) {
            fields.push("image");
        }
        fields
    }

    fn draft_image(draft: &NewsDraft) -> Option<&ImageRef> {
        draft.image_url.as_ref()
    }

    fn build(id: String, draft: NewsDraft, previous: Option<&Self>) -> Self {
        let date = draft
            .date
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .or_else(|| previous.map(|p| p.date.clone()))
            .unwrap_or_else(|| JUST_NOW.to_string());

        Self {
            id,
            title: draft.title.trim().to_string(),
            summary: draft.summary.trim().to_string(),
            category: draft.category,
            date,
            image_url: draft.image_url.unwrap_or_else(|| ImageRef::url("")),
        }
    }

    fn seed() -> Vec<Self> {
        use NewsCategory::*;
        [
            ("1", "Promo Gajian Hemat", "Diskon hingga 30% untuk kebutuhan pokok selama akhir bulan.", Promo, "2 hari yang lalu"),
            ("2", "Jam Operasional Baru", "Mulai bulan ini toko buka pukul 07.00 sampai 22.00 WIB.", StoreInfo, "1 minggu yang lalu"),
            ("3", "Jadwal Shift Pekan Depan", "Jadwal shift sudah dibagikan, mohon dicek di papan informasi.", Internal, "3 hari yang lalu"),
        ]
        .into_iter()
        .map(|(id, title, summary, category, date)| Self {
            id: id.to_string(),
            title: title.to_string(),
            summary: summary.to_string(),
            category,
            date: date.to_string(),
            image_url: ImageRef::url(format!("https://picsum.photos/seed/x450-news-{}/800/450", id)),
        })
        .collect()
    }
}

impl Categorized for NewsItem {
    type Category = NewsCategory;

    fn category(&self) -> NewsCategory {
        self.category
    }

    fn categories() -> &'static [NewsCategory] {
        &NewsCategory::ALL
    }
}
