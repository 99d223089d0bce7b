use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::body::Bytes;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Search response: at most `top_k` entries, descending by similarity.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
}

/// One result: the full product metadata record plus its score.
#[derive(Debug, Serialize)]
pub struct SearchHit {
    pub product: Value,
    pub similarity: f32,
}

/// Find catalog products visually similar to the uploaded image.
///
/// The request body is the raw image bytes (POST /find-similar-products).
/// Pipeline per request: decode → convert to RGB → embed once → rank the
/// whole index → join ranked ids with product metadata.
///
/// Ranked ids with no metadata record are silently dropped — a ranking
/// result is only useful if the catalog can describe it — so the response
/// may hold fewer than `top_k` entries even when the index is larger.
pub async fn find_similar(
    State(state): State<Arc<ServerState>>,
    body: Bytes,
) -> ServerResult<impl IntoResponse> {
    if body.is_empty() {
        return Err(ServerError::InvalidImage("empty request body".into()));
    }

    let decoded = image::load_from_memory(&body)
        .map_err(|err| ServerError::InvalidImage(err.to_string()))?;
    let rgb = decoded.to_rgb8();

    // The provider call is the one slow step per query; keep it off the
    // async reactor.
    let embedder = state.embedder.clone();
    let query = tokio::task::spawn_blocking(move || embedder.embed(&rgb))
        .await
        .map_err(|err| ServerError::Internal(format!("embed task failed: {err}")))??;

    let ranked = rank::rank(&query, &state.index, state.config.top_k)?;
    debug!(candidates = ranked.len(), "ranking complete");

    let results: Vec<SearchHit> = ranked
        .into_iter()
        .filter_map(|hit| {
            state.metadata.get(&hit.id).map(|product| SearchHit {
                product: product.clone(),
                similarity: hit.score,
            })
        })
        .collect();

    Ok(Json(SearchResponse { results }))
}
