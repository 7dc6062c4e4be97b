use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::get, Json, Router};
use bsearch_core::{collect_documents, DocId, Error, SearchEngine, TokenizerConfig};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer, AllowOrigin};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub name: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub query: String,
    pub error: String,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SearchEngine>,
}

/// Index the corpus once and build the router over the read-only engine.
pub fn build_app(corpus: &str, ext: Option<&str>, config: TokenizerConfig) -> Result<Router> {
    let paths = collect_documents(corpus, ext)?;
    let engine = SearchEngine::open(&paths, config)?;
    tracing::info!(num_docs = engine.index().num_docs(), corpus, "index ready");
    Ok(router(engine))
}

pub fn router(engine: SearchEngine) -> Router {
    let app_state = AppState { engine: Arc::new(engine) };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// A malformed query matches nothing: 200 with empty `results` and the
/// parse error in `error`. Negation the engine cannot resolve is a 422.
pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, (StatusCode, Json<ErrorResponse>)> {
    let start = std::time::Instant::now();
    let index = state.engine.index();
    let (ids, error) = match state.engine.search_ids(&params.q) {
        Ok(ids) => (ids, None),
        Err(e @ Error::QuerySyntax { .. }) => {
            tracing::warn!(query = %params.q, error = %e, "failed to parse query");
            (Vec::new(), Some(e.to_string()))
        }
        Err(e) => {
            tracing::warn!(query = %params.q, error = %e, "query rejected");
            let body = ErrorResponse { query: params.q, error: e.to_string() };
            return Err((status_for(&e), Json(body)));
        }
    };

    let results: Vec<SearchHit> = ids
        .into_iter()
        .filter_map(|doc_id| {
            let name = index.document_name(doc_id)?.to_string();
            Some(SearchHit { doc_id, name })
        })
        .collect();
    let elapsed = start.elapsed();
    Ok(Json(SearchResponse {
        query: params.q,
        took_s: elapsed.as_secs_f64(),
        total_hits: results.len(),
        results,
        error,
    }))
}

fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::QuerySyntax { .. } => StatusCode::BAD_REQUEST,
        Error::UnsupportedNegation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        Error::DocumentRead { .. } | Error::InvalidPattern { .. } | Error::EmptyOperands(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub async fn doc_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<DocId>,
) -> (StatusCode, Json<serde_json::Value>) {
    match state.engine.index().document(doc_id) {
        Some(meta) => {
            let obj = serde_json::json!({
                "doc_id": doc_id,
                "name": meta.name,
                "path": meta.path.as_ref().map(|p| p.display().to_string()),
            });
            (StatusCode::OK, Json(obj))
        }
        None => (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "not found" }))),
    }
}
