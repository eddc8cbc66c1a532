//! HTTP handlers for the Settings API
//!
//! Provides 4 REST endpoints:
//! - GET    /api/v1/settings         - current site settings
//! - PUT    /api/v1/settings         - update settings (operator)
//! - POST   /api/v1/settings/reset   - back to configured defaults (operator)
//! - GET    /api/v1/settings/domains - AI domain name suggestions (operator)

use super::store::SettingsStore;
use super::types::*;
use crate::api::ApiError;
use crate::augment::{headlines, AugmentService, PromptKind};
use crate::session::{AdminToken, Operator};
use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

/// Shared state for settings handlers
#[derive(Clone)]
pub struct SettingsState {
    pub store: Arc<SettingsStore>,
    pub augment: AugmentService,
    pub auth: AdminToken,
}

impl FromRef<SettingsState> for AdminToken {
    fn from_ref(state: &SettingsState) -> Self {
        state.auth.clone()
    }
}

/// Create the settings router with all REST endpoints
pub fn settings_router(state: SettingsState) -> Router {
    Router::new()
        .route("/api/v1/settings", get(get_settings).put(update_settings))
        .route("/api/v1/settings/reset", post(reset_settings))
        .route("/api/v1/settings/domains", get(suggest_domains))
        .with_state(state)
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /api/v1/settings
async fn get_settings(State(state): State<SettingsState>) -> Json<SiteSettings> {
    Json(state.store.get().await)
}

/// PUT /api/v1/settings
async fn update_settings(
    _operator: Operator,
    State(state): State<SettingsState>,
    Json(request): Json<UpdateSettingsRequest>,
) -> Result<Json<SettingsResponse>, ApiError> {
    let settings = state.store.update(request).await?;
    let persist_warning = match state.store.save().await {
        Ok(()) => None,
        Err(e) => {
            tracing::warn!("Site settings kept in memory only: {}", e);
            Some(e.to_string())
        }
    };
    Ok(Json(SettingsResponse {
        settings,
        persist_warning,
    }))
}

/// POST /api/v1/settings/reset
async fn reset_settings(
    _operator: Operator,
    State(state): State<SettingsState>,
) -> Result<Json<SiteSettings>, ApiError> {
    Ok(Json(state.store.reset().await?))
}

/// GET /api/v1/settings/domains
async fn suggest_domains(
    _operator: Operator,
    State(state): State<SettingsState>,
) -> Json<DomainSuggestions> {
    let text = state.augment.generate(&PromptKind::DomainSuggestions).await;
    Json(DomainSuggestions {
        domains: headlines(&text),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::augment::OfflineGenerator;
    use crate::kv::{KvStore, MemoryKvStore};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn make_app_with(kv: Arc<dyn KvStore>) -> Router {
        let store = Arc::new(SettingsStore::open(kv, SiteSettings::default()).await);
        settings_router(SettingsState {
            store,
            augment: AugmentService::new(Arc::new(OfflineGenerator), "Alfamart Citaringgul X450"),
            auth: AdminToken::new("t0ken"),
        })
    }

    async fn make_app() -> Router {
        make_app_with(Arc::new(MemoryKvStore::new())).await
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 1024 * 64)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn put(body: serde_json::Value, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("PUT")
            .uri("/api/v1/settings")
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_get_settings() {
        let resp = make_app()
            .await
            .oneshot(
                Request::builder()
                    .uri("/api/v1/settings")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["siteName"], "Alfamart Citaringgul X450");
        assert_eq!(json["tagline"], "Digital Memories Album");
    }

    #[tokio::test]
    async fn test_update_settings() {
        let app = make_app().await;
        let resp = app
            .clone()
            .oneshot(put(serde_json::json!({"tagline": "Album Kenangan"}), Some("t0ken")))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["tagline"], "Album Kenangan");
        assert_eq!(json["siteName"], "Alfamart Citaringgul X450");
        assert!(json.get("persistWarning").is_none());
    }

    #[tokio::test]
    async fn test_update_requires_operator() {
        let resp = make_app()
            .await
            .oneshot(put(serde_json::json!({"tagline": "x"}), Some("wrong")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(resp).await;
        assert_eq!(json["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_update_blank_name_is_422() {
        let resp = make_app()
            .await
            .oneshot(put(serde_json::json!({"siteName": " "}), Some("t0ken")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_update_reports_persist_warning() {
        let app = make_app_with(Arc::new(MemoryKvStore::new().with_quota(Some(8)))).await;
        let resp = app
            .oneshot(put(serde_json::json!({"tagline": "Album"}), Some("t0ken")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["tagline"], "Album");
        assert!(json["persistWarning"].is_string());
    }

    #[tokio::test]
    async fn test_domains_fall_back() {
        let resp = make_app()
            .await
            .oneshot(
                Request::builder()
                    .uri("/api/v1/settings/domains")
                    .header("authorization", "Bearer t0ken")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(
            json["domains"],
            serde_json::json!(["citaringgulx450.id", "alfamartx450.com", "kenangan-x450.site"])
        );
    }
}
