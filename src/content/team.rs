//! Team roster

use super::{image_missing, is_blank, normalize_upper, Entity};
use crate::attachment::ImageRef;
use serde::{Deserialize, Serialize};

/// Quote shown for members who did not supply one
pub const DEFAULT_QUOTE: &str = "Semangat melayani!";

/// A store employee
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    pub role: String,
    pub quote: String,
    pub image_url: ImageRef,
}

/// Submitted fields for adding or editing a member
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamMemberDraft {
    pub name: String,
    pub role: String,
    pub quote: String,
    pub image_url: Option<ImageRef>,
}

impl Entity for TeamMember {
    type Draft = TeamMemberDraft;

    const KEY: &'static str = "x450_team_members";
    const KIND: &'static str = "team member";

    fn id(&self) -> &str {
        &self.id
    }

    fn missing_fields(draft: &TeamMemberDraft) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if is_blank(&draft.name) {
            fields.push("name");
        }
        if is_blank(&draft.role) {
            fields.push("role");
        }
        if image_missing(&draft.image_url) {
            fields.push("image");
        }
        fields
    }

    fn draft_image(draft: &TeamMemberDraft) -> Option<&ImageRef> {
        draft.image_url.as_ref()
    }

    fn build(id: String, draft: TeamMemberDraft, _previous: Option<&Self>) -> Self {
        let quote = draft.quote.trim();
        Self {
            id,
            name: normalize_upper(&draft.name),
            role: normalize_upper(&draft.role),
            quote: if quote.is_empty() {
                DEFAULT_QUOTE.to_string()
            } else {
                quote.to_string()
            },
            // Validated non-missing before build is called
            image_url: draft.image_url.unwrap_or_else(|| ImageRef::url("")),
        }
    }

    fn seed() -> Vec<Self> {
        [
            ("1", "ENCEP ABDU ROHMAN", "CHIEF OF STORE", "Pelayanan terbaik dimulai dari senyuman."),
            ("2", "RINA MARLINA", "ASSISTANT OF STORE", "Rapi, bersih, dan selalu siap membantu."),
            ("3", "DEDI SUPRIADI", "MERCHANDISER", "Rak penuh, pelanggan senang."),
            ("4", "SITI AMINAH", "KASIR", DEFAULT_QUOTE),
        ]
        .into_iter()
        .map(|(id, name, role, quote)| Self {
            id: id.to_string(),
            name: name.to_string(),
            role: role.to_string(),
            quote: quote.to_string(),
            image_url: ImageRef::url(format!("https://picsum.photos/seed/x450-team-{}/400/400", id)),
        })
        .collect()
    }
}
