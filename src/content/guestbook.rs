//! Guestbook

use super::{is_blank, Entity, JUST_NOW};
use crate::attachment::ImageRef;
use serde::{Deserialize, Serialize};

/// A visitor's message, optionally with a photo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestMessage {
    pub id: String,
    pub sender: String,
    pub content: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<ImageRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GuestMessageDraft {
    pub sender: String,
    pub content: String,
    pub image_url: Option<ImageRef>,
}

impl Entity for GuestMessage {
    type Draft = GuestMessageDraft;

    const KEY: &'static str = "x450_guestbook";
    const KIND: &'static str = "guest message";

    fn id(&self) -> &str {
        &self.id
    }

    fn missing_fields(draft: &GuestMessageDraft) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if is_blank(&draft.sender) {
            fields.push("sender");
        }
        if is_blank(&draft.content) {
            fields.push("content");
        }
        fields
    }

    fn draft_image(draft: &GuestMessageDraft) -> Option<&ImageRef> {
        draft.image_url.as_ref()
    }

    fn build(id: String, draft: GuestMessageDraft, previous: Option<&Self>) -> Self {
        Self {
            id,
            sender: draft.sender.trim().to_string(),
            content: draft.content.trim().to_string(),
            timestamp: previous
                .map(|p| p.timestamp.clone())
                .unwrap_or_else(|| JUST_NOW.to_string()),
            image_url: draft.image_url.filter(ImageRef::is_usable),
        }
    }

    fn seed() -> Vec<Self> {
        vec![Self {
            id: "1".to_string(),
            sender: "Pak RT Mulyadi".to_string(),
            content: "Luar biasa pelayanannya. Toko Alfamart paling rapi di wilayah kita. Sukses terus!"
                .to_string(),
            timestamp: "2 jam yang lalu".to_string(),
            image_url: None,
        }]
    }
}
