//! Unified API router for Storehub
//!
//! Merges all module routers into a single axum `Router` with CORS,
//! request tracing and consistent error handling.
//!
//! ## Endpoint Map
//!
//! | Prefix                   | Module   | Description                      |
//! |--------------------------|----------|----------------------------------|
//! | `/health`                | api      | Health probe                     |
//! | `/api/v1/team/*`         | content  | Team roster                      |
//! | `/api/v1/memories/*`     | content  | Memory gallery (`?category=`)    |
//! | `/api/v1/news/*`         | content  | News feed (`?category=`)         |
//! | `/api/v1/guestbook/*`    | content  | Guestbook (public create)        |
//! | `/api/v1/images`         | api      | Image upload → embedded data URL |
//! | `/api/v1/augment/*`      | augment  | Generated text                   |
//! | `/api/v1/settings/*`     | settings | Site identity                    |

use crate::attachment;
use crate::augment::{augment_router, AugmentState};
use crate::content::{categorized_router, entity_router, ContentState};
use crate::error::Error;
use crate::hub::{Collection, ContentHub};
use crate::session::{AdminToken, Operator};
use crate::settings::{settings_router, SettingsState};
use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the complete Storehub HTTP application
pub fn build_app(hub: Arc<ContentHub>, auth: AdminToken) -> Router {
    let cors = build_cors(&hub.config.gateway.cors_origins);
    // Embedded images travel as base64 inside JSON bodies
    let body_limit = hub.config.images.max_bytes * 2;

    let content = Router::new()
        .merge(entity_router(
            &Collection::Team.base_path(),
            ContentState::new(hub.team.clone(), auth.clone()),
        ))
        .merge(categorized_router(
            &Collection::Memories.base_path(),
            ContentState::new(hub.memories.clone(), auth.clone()),
        ))
        .merge(categorized_router(
            &Collection::News.base_path(),
            ContentState::new(hub.news.clone(), auth.clone()),
        ))
        .merge(entity_router(
            &Collection::Guestbook.base_path(),
            ContentState::new(hub.guestbook.clone(), auth.clone()).with_public_create(),
        ));

    let augment = augment_router(AugmentState {
        service: hub.augment.clone(),
        team: hub.team.clone(),
        team_vibe: hub.team_vibe.clone(),
    });

    let settings = settings_router(SettingsState {
        store: hub.settings.clone(),
        augment: hub.augment.clone(),
        auth: auth.clone(),
    });

    let images = Router::new()
        .route("/api/v1/images", post(upload_image))
        .with_state(ImagesState {
            max_bytes: hub.config.images.max_bytes,
            auth,
        });

    Router::new()
        .route("/health", get(health_check))
        .merge(content)
        .merge(images)
        .merge(augment)
        .merge(settings)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

// =============================================================================
// Errors
// =============================================================================

/// JSON error envelope: `{ "error": { "code", "message" } }`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ApiErrorBody,
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

/// API error detail
#[derive(Debug, Serialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    /// Missing draft fields on validation errors
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiErrorBody {
                error: ApiErrorDetail {
                    code: code.into(),
                    message: message.into(),
                    fields: Vec::new(),
                },
            },
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn detail(&self) -> &ApiErrorDetail {
        &self.body.error
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match &err {
            Error::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::ImageTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Error::ImageUnreadable(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", err);
        }

        let mut api = Self::new(status, err.code(), err.to_string());
        if let Error::Validation { fields, .. } = &err {
            api.body.error.fields = fields.iter().map(|f| f.to_string()).collect();
        }
        api
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

// =============================================================================
// Root handlers
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Clone)]
struct ImagesState {
    max_bytes: usize,
    auth: AdminToken,
}

impl axum::extract::FromRef<ImagesState> for AdminToken {
    fn from_ref(state: &ImagesState) -> Self {
        state.auth.clone()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageResponse {
    image_url: String,
}

/// POST /api/v1/images: raw image bytes in, embeddable data URL out
async fn upload_image(
    _operator: Operator,
    State(state): State<ImagesState>,
    body: Bytes,
) -> Result<Json<ImageResponse>, ApiError> {
    let image = attachment::embed(body.to_vec(), state.max_bytes).await?;
    tracing::debug!("Embedded {}", image);
    Ok(Json(ImageResponse {
        image_url: image.as_str().to_string(),
    }))
}

// =============================================================================
// CORS
// =============================================================================

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let parsed: Vec<_> = origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachment::tests::sample_image;
    use crate::augment::{AugmentService, OfflineGenerator};
    use crate::config::HubConfig;
    use crate::kv::MemoryKvStore;
    use axum::body::Body;
    use axum::http::Request;
    use image::ImageFormat;
    use tower::ServiceExt;

    async fn make_app() -> Router {
        let augment = AugmentService::new(Arc::new(OfflineGenerator), "X450");
        let hub = ContentHub::with_parts(
            HubConfig::default(),
            Arc::new(MemoryKvStore::new()),
            augment,
        )
        .await;
        build_app(Arc::new(hub), AdminToken::new("t0ken"))
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn upload(bytes: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/images")
            .header("authorization", "Bearer t0ken")
            .header("content-type", "application/octet-stream")
            .body(Body::from(bytes))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let resp = health_check().await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_every_collection_is_mounted() {
        let app = make_app().await;
        for collection in Collection::ALL {
            let resp = app
                .clone()
                .oneshot(
                    Request::builder()
                        .uri(collection.base_path())
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::OK, "{}", collection);
        }
    }

    #[tokio::test]
    async fn test_upload_image() {
        let resp = make_app()
            .await
            .oneshot(upload(sample_image(ImageFormat::Png)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert!(json["imageUrl"]
            .as_str()
            .unwrap()
            .starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn test_upload_oversized_image_is_413() {
        let resp = make_app()
            .await
            .oneshot(upload(vec![0u8; attachment::MAX_IMAGE_BYTES + 1]))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let json = body_json(resp).await;
        assert_eq!(json["error"]["code"], "IMAGE_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_upload_garbage_is_415() {
        let resp = make_app()
            .await
            .oneshot(upload(b"hello".to_vec()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_upload_requires_operator() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/images")
            .body(Body::from(sample_image(ImageFormat::Png)))
            .unwrap();
        let resp = make_app().await.oneshot(request).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_anonymous_guestbook_post_with_oversized_image_is_413() {
        use base64::Engine as _;
        let payload = base64::engine::general_purpose::STANDARD
            .encode(vec![0xABu8; attachment::MAX_IMAGE_BYTES + attachment::MAX_IMAGE_BYTES / 4]);
        let body = serde_json::json!({
            "sender": "Anon",
            "content": "Halo semua",
            "imageUrl": format!("data:image/png;base64,{}", payload),
        });
        let app = make_app().await;

        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/guestbook")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/guestbook")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(body_json(resp).await.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_team_create_with_fake_embedded_image_is_415() {
        let body = serde_json::json!({
            "name": "budi",
            "role": "staff",
            "imageUrl": "data:image/png;base64,aGVsbG8gd29ybGQ=",
        });
        let resp = make_app()
            .await
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/team")
                    .header("authorization", "Bearer t0ken")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[test]
    fn test_error_mapping() {
        let err = ApiError::from(Error::Validation {
            entity: "memory",
            fields: vec!["title", "date"],
        });
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.detail().code, "VALIDATION_ERROR");
        assert_eq!(err.detail().fields, vec!["title", "date"]);

        let err = ApiError::from(Error::Persistence("quota exceeded".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.detail().code, "PERSISTENCE_FAILURE");
    }

    #[test]
    fn test_build_cors_with_origins() {
        let _cors = build_cors(&[
            "http://localhost:5173".to_string(),
            "https://x450.example.com".to_string(),
        ]);
    }
}
