//! HTTP handlers for the content collections
//!
//! Every collection gets the same route set under its base path:
//! - GET    {base}          - list (with `?category=` for categorized collections)
//! - GET    {base}/:id      - detail
//! - POST   {base}          - create
//! - PUT    {base}/:id      - edit
//! - DELETE {base}/:id      - delete (idempotent)
//! - POST   {base}/reset    - restore seed content
//!
//! Mutations flush the collection before responding. A failed flush does not
//! fail the request; it is reported as `persistWarning` next to the result.

use super::{Categorized, CategoryFilter, Entity, EntityStore};
use crate::api::ApiError;
use crate::session::{AdminToken, Operator, Session};
use axum::{
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared state for one collection's handlers
pub struct ContentState<E: Entity> {
    pub store: Arc<EntityStore<E>>,
    pub auth: AdminToken,
    /// Allow creation without an operator token (guestbook)
    pub public_create: bool,
}

impl<E: Entity> ContentState<E> {
    pub fn new(store: Arc<EntityStore<E>>, auth: AdminToken) -> Self {
        Self {
            store,
            auth,
            public_create: false,
        }
    }

    pub fn with_public_create(mut self) -> Self {
        self.public_create = true;
        self
    }
}

impl<E: Entity> Clone for ContentState<E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            auth: self.auth.clone(),
            public_create: self.public_create,
        }
    }
}

impl<E: Entity> FromRef<ContentState<E>> for AdminToken {
    fn from_ref(state: &ContentState<E>) -> Self {
        state.auth.clone()
    }
}

/// Router for a collection without categories
pub fn entity_router<E: Entity>(base: &str, state: ContentState<E>) -> Router {
    crud_routes::<E>(base)
        .route(base, get(list_all::<E>))
        .with_state(state)
}

/// Router for a collection that can be filtered by category
pub fn categorized_router<E: Categorized>(base: &str, state: ContentState<E>) -> Router {
    crud_routes::<E>(base)
        .route(base, get(list_by_category::<E>))
        .with_state(state)
}

fn crud_routes<E: Entity>(base: &str) -> Router<ContentState<E>> {
    Router::new()
        .route(base, post(create::<E>))
        .route(&format!("{}/reset", base), post(reset::<E>))
        .route(
            &format!("{}/:id", base),
            get(get_one::<E>).put(update::<E>).delete(remove::<E>),
        )
}

// =============================================================================
// Response types
// =============================================================================

/// Mutated entity plus an optional persistence warning
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Mutation<T> {
    #[serde(flatten)]
    entity: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    persist_warning: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Deleted {
    deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    persist_warning: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CategoryQuery {
    category: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

async fn list_all<E: Entity>(State(state): State<ContentState<E>>) -> Json<Vec<E>> {
    Json(state.store.list().await)
}

async fn list_by_category<E: Categorized>(
    State(state): State<ContentState<E>>,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<Vec<E>>, ApiError> {
    let raw = query.category.as_deref().unwrap_or("All");
    let filter: CategoryFilter<E::Category> = raw
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Unknown category '{}'", raw)))?;
    Ok(Json(state.store.list_filtered(&filter).await))
}

async fn get_one<E: Entity>(
    State(state): State<ContentState<E>>,
    Path(id): Path<String>,
) -> Result<Json<E>, ApiError> {
    state
        .store
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("{} '{}' not found", E::KIND, id)))
}

async fn create<E: Entity>(
    session: Session,
    State(state): State<ContentState<E>>,
    Json(draft): Json<E::Draft>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.public_create && session.operator().is_none() {
        return Err(ApiError::unauthorized("Operator token required"));
    }

    let entity = state.store.create(draft).await?;
    let persist_warning = flush_warning(&state.store).await;
    Ok((
        StatusCode::CREATED,
        Json(Mutation {
            entity,
            persist_warning,
        }),
    ))
}

async fn update<E: Entity>(
    _operator: Operator,
    State(state): State<ContentState<E>>,
    Path(id): Path<String>,
    Json(draft): Json<E::Draft>,
) -> Result<Json<Mutation<E>>, ApiError> {
    let entity = state.store.update(&id, draft).await?;
    let persist_warning = flush_warning(&state.store).await;
    Ok(Json(Mutation {
        entity,
        persist_warning,
    }))
}

async fn remove<E: Entity>(
    _operator: Operator,
    State(state): State<ContentState<E>>,
    Path(id): Path<String>,
) -> Json<Deleted> {
    let deleted = state.store.delete(&id).await;
    let persist_warning = flush_warning(&state.store).await;
    Json(Deleted {
        deleted,
        persist_warning,
    })
}

async fn reset<E: Entity>(
    _operator: Operator,
    State(state): State<ContentState<E>>,
) -> Result<Json<Vec<E>>, ApiError> {
    state.store.reset().await?;
    Ok(Json(state.store.list().await))
}

async fn flush_warning<E: Entity>(store: &EntityStore<E>) -> Option<String> {
    match store.flush().await {
        Ok(()) => None,
        Err(e) => {
            tracing::warn!("{} change kept in memory only: {}", E::KIND, e);
            Some(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{GuestMessage, Memory, NewsItem, TeamMember};
    use crate::kv::{KvStore, MemoryKvStore};
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    const TOKEN: &str = "t0ken";

    async fn state<E: Entity>(kv: Arc<dyn KvStore>) -> ContentState<E> {
        let store = Arc::new(EntityStore::<E>::open(kv).await);
        ContentState::new(store, AdminToken::new(TOKEN))
    }

    async fn team_app() -> Router {
        entity_router("/api/v1/team", state::<TeamMember>(Arc::new(MemoryKvStore::new())).await)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 1024 * 64)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value, auth: bool) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if auth {
            builder = builder.header("authorization", format!("Bearer {}", TOKEN));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn member_body(name: &str) -> serde_json::Value {
        serde_json::json!({
            "name": name,
            "role": "kasir",
            "imageUrl": "https://example.com/p.jpg"
        })
    }

    #[tokio::test]
    async fn test_list_returns_seed() {
        let resp = team_app()
            .await
            .oneshot(Request::builder().uri("/api/v1/team").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json.as_array().unwrap().len(), TeamMember::seed().len());
        assert_eq!(json[0]["name"], "ENCEP ABDU ROHMAN");
    }

    #[tokio::test]
    async fn test_get_missing_is_404() {
        let resp = team_app()
            .await
            .oneshot(
                Request::builder()
                    .uri("/api/v1/team/does-not-exist")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let json = body_json(resp).await;
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_create_requires_operator() {
        let resp = team_app()
            .await
            .oneshot(json_request("POST", "/api/v1/team", member_body("budi"), false))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_as_operator() {
        let resp = team_app()
            .await
            .oneshot(json_request("POST", "/api/v1/team", member_body("budi"), true))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let json = body_json(resp).await;
        assert_eq!(json["name"], "BUDI");
        assert_eq!(json["quote"], "Semangat melayani!");
        assert!(json.get("persistWarning").is_none());
    }

    #[tokio::test]
    async fn test_create_validation_is_422() {
        let resp = team_app()
            .await
            .oneshot(json_request(
                "POST",
                "/api/v1/team",
                serde_json::json!({"name": "budi"}),
                true,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(resp).await;
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(json["error"]["fields"], serde_json::json!(["role", "image"]));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let app = team_app().await;

        let resp = app
            .clone()
            .oneshot(json_request("PUT", "/api/v1/team/2", member_body("rina"), true))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["id"], "2");

        let resp = app
            .clone()
            .oneshot(json_request("PUT", "/api/v1/team/2", member_body("rina"), false))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        for expected in [true, false] {
            let resp = app
                .clone()
                .oneshot(json_request("DELETE", "/api/v1/team/2", serde_json::json!({}), true))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
            assert_eq!(body_json(resp).await["deleted"], expected);
        }
    }

    #[tokio::test]
    async fn test_update_missing_is_404() {
        let resp = team_app()
            .await
            .oneshot(json_request("PUT", "/api/v1/team/404", member_body("x"), true))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_guestbook_create_is_public() {
        let state = state::<GuestMessage>(Arc::new(MemoryKvStore::new()))
            .await
            .with_public_create();
        let app = entity_router("/api/v1/guestbook", state);
        let resp = app
            .oneshot(json_request(
                "POST",
                "/api/v1/guestbook",
                serde_json::json!({"sender": "Bu Ani", "content": "Bersih!"}),
                false,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(body_json(resp).await["timestamp"], "Baru saja");
    }

    #[tokio::test]
    async fn test_category_filter_query() {
        let app = categorized_router(
            "/api/v1/news",
            state::<NewsItem>(Arc::new(MemoryKvStore::new())).await,
        );

        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/news?category=Store%20Info")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        let items = json.as_array().unwrap();
        assert!(!items.is_empty());
        assert!(items.iter().all(|i| i["category"] == "Store Info"));

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/news?category=Gossip")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_persist_warning_on_quota_failure() {
        let kv: Arc<dyn KvStore> = Arc::new(MemoryKvStore::new().with_quota(Some(16)));
        let app = categorized_router("/api/v1/memories", state::<Memory>(kv).await);
        let resp = app
            .oneshot(json_request(
                "POST",
                "/api/v1/memories",
                serde_json::json!({
                    "title": "Buka Puasa Bersama",
                    "description": "Tim berbuka bersama",
                    "date": "Maret 2025",
                    "category": "Event",
                    "imageUrl": "https://example.com/m.jpg"
                }),
                true,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let json = body_json(resp).await;
        assert_eq!(json["title"], "Buka Puasa Bersama");
        assert!(json["persistWarning"].as_str().unwrap().contains("quota"));
    }

    #[tokio::test]
    async fn test_reset_restores_seed() {
        let app = team_app().await;
        app.clone()
            .oneshot(json_request("POST", "/api/v1/team", member_body("budi"), true))
            .await
            .unwrap();

        let resp = app
            .oneshot(json_request("POST", "/api/v1/team/reset", serde_json::json!({}), true))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json.as_array().unwrap().len(), TeamMember::seed().len());
    }
}
