//! HTTP handlers for generated text
//!
//! - GET  /api/v1/augment/flash-news - fresh ticker headlines
//! - GET  /api/v1/augment/team-vibe  - team sentence, regenerated when the roster changed
//! - POST /api/v1/augment/team-vibe  - regenerate the team sentence

use super::{AugmentService, AugmentSlot, PromptKind, Refresh};
use crate::content::{EntityStore, TeamMember};
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;

/// Shared state for augmentation handlers
#[derive(Clone)]
pub struct AugmentState {
    pub service: AugmentService,
    pub team: Arc<EntityStore<TeamMember>>,
    pub team_vibe: Arc<AugmentSlot>,
}

pub fn augment_router(state: AugmentState) -> Router {
    Router::new()
        .route("/api/v1/augment/flash-news", get(flash_news))
        .route(
            "/api/v1/augment/team-vibe",
            get(get_team_vibe).post(refresh_team_vibe),
        )
        .with_state(state)
}

/// Split generated text into display lines, dropping list markers and blanks
pub fn headlines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| {
            let line = line
                .trim()
                .trim_start_matches(|c: char| matches!(c, '-' | '*' | '•'))
                .trim_start();
            strip_numbering(line).trim().to_string()
        })
        .filter(|line| !line.is_empty())
        .collect()
}

/// `"1. x450.id"` -> `"x450.id"`; anything else is returned as is
fn strip_numbering(line: &str) -> &str {
    let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == line.len() {
        return line;
    }
    rest.strip_prefix('.').map_or(line, str::trim_start)
}

#[derive(Debug, Serialize)]
struct FlashNewsResponse {
    headlines: Vec<String>,
}

#[derive(Debug, Serialize)]
struct TeamVibeResponse {
    text: Option<String>,
    busy: bool,
}

/// GET /api/v1/augment/flash-news
async fn flash_news(State(state): State<AugmentState>) -> Json<FlashNewsResponse> {
    let text = state.service.generate(&PromptKind::FlashNews).await;
    Json(FlashNewsResponse {
        headlines: headlines(&text),
    })
}

/// GET /api/v1/augment/team-vibe
async fn get_team_vibe(State(state): State<AugmentState>) -> Json<TeamVibeResponse> {
    let kind = team_synergy(&state.team).await;
    if state.team_vibe.is_current(&kind).await {
        return Json(TeamVibeResponse {
            text: state.team_vibe.latest().await,
            busy: state.team_vibe.is_busy(),
        });
    }
    Json(refresh(&state, &kind).await)
}

/// POST /api/v1/augment/team-vibe
async fn refresh_team_vibe(State(state): State<AugmentState>) -> Json<TeamVibeResponse> {
    let kind = team_synergy(&state.team).await;
    Json(refresh(&state, &kind).await)
}

async fn team_synergy(team: &EntityStore<TeamMember>) -> PromptKind {
    let names = team.list().await.into_iter().map(|m| m.name).collect();
    PromptKind::TeamSynergy { names }
}

async fn refresh(state: &AugmentState, kind: &PromptKind) -> TeamVibeResponse {
    match state.team_vibe.refresh(&state.service, kind).await {
        Refresh::Updated(text) => TeamVibeResponse {
            text: Some(text),
            busy: false,
        },
        Refresh::Busy => TeamVibeResponse {
            text: state.team_vibe.latest().await,
            busy: true,
        },
    }
}
