//! Integration tests for the query service: drive the real router with
//! `tower::ServiceExt::oneshot` against an isolated `ServerState`.

use std::io::Cursor;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use catalog::MetadataCatalog;
use embed::EmbedConfig;
use http_body_util::BodyExt;
use index::{VectorIndex, VectorRecord};
use serde_json::{json, Value};
use server::{build_router, ServerConfig, ServerError, ServerState};
use tower::ServiceExt;

const DIM: usize = 8;

fn test_state(index_records: Vec<VectorRecord>, metadata: Vec<Value>) -> Arc<ServerState> {
    let mut config = ServerConfig::default();
    config.embed.dimension = DIM;

    let embedder = embed::build_embedder(&EmbedConfig {
        dimension: DIM,
        ..Default::default()
    })
    .unwrap();
    let index = VectorIndex::from_records(index_records).unwrap();
    let metadata = MetadataCatalog::from_records(metadata).unwrap();

    Arc::new(ServerState::from_parts(config, index, metadata, embedder).unwrap())
}

fn record(id: &str, seed: f32) -> VectorRecord {
    VectorRecord {
        id: id.to_string(),
        vector: (0..DIM).map(|i| seed + i as f32 * 0.01).collect(),
    }
}

fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(6, 6, image::Rgb([120, 40, 200]));
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

async fn post_image(state: Arc<ServerState>, body: Vec<u8>) -> (StatusCode, Value) {
    let response = build_router(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/find-similar-products")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn undecodable_payload_is_a_client_error() {
    let state = test_state(
        vec![record("p1", 0.1)],
        vec![json!({"id": "p1", "name": "Lamp"})],
    );

    let (status, body) = post_image(state, b"definitely not an image".to_vec()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_IMAGE");
}

#[tokio::test]
async fn empty_payload_is_a_client_error() {
    let state = test_state(vec![record("p1", 0.1)], vec![json!({"id": "p1"})]);

    let (status, body) = post_image(state, Vec::new()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_IMAGE");
}

#[tokio::test]
async fn valid_query_returns_ranked_results() {
    let state = test_state(
        vec![record("p1", 0.1), record("p2", 0.5), record("p3", 0.9)],
        vec![
            json!({"id": "p1", "name": "Lamp"}),
            json!({"id": "p2", "name": "Mug"}),
            json!({"id": "p3", "name": "Chair"}),
        ],
    );

    let (status, body) = post_image(state, png_bytes()).await;

    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);

    // Every hit carries the full metadata record and a score, and the
    // ordering is non-increasing by similarity.
    let scores: Vec<f64> = results
        .iter()
        .map(|hit| hit["similarity"].as_f64().unwrap())
        .collect();
    for pair in scores.windows(2) {
        assert!(pair[0] >= pair[1]);
    }
    assert!(results.iter().all(|hit| hit["product"]["name"].is_string()));
}

#[tokio::test]
async fn ranked_id_without_metadata_is_dropped() {
    let state = test_state(
        vec![record("p1", 0.1), record("ghost", 0.5), record("p2", 0.9)],
        vec![json!({"id": "p1"}), json!({"id": "p2"})],
    );

    let (status, body) = post_image(state, png_bytes()).await;

    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert!(results
        .iter()
        .all(|hit| hit["product"]["id"] != json!("ghost")));
}

#[tokio::test]
async fn results_are_capped_at_top_k() {
    let mut config = ServerConfig::default();
    config.embed.dimension = DIM;
    config.top_k = 2;

    let embedder = embed::build_embedder(&config.embed).unwrap();
    let index = VectorIndex::from_records(vec![
        record("p1", 0.1),
        record("p2", 0.3),
        record("p3", 0.5),
        record("p4", 0.7),
    ])
    .unwrap();
    let metadata = MetadataCatalog::from_records(vec![
        json!({"id": "p1"}),
        json!({"id": "p2"}),
        json!({"id": "p3"}),
        json!({"id": "p4"}),
    ])
    .unwrap();
    let state = Arc::new(ServerState::from_parts(config, index, metadata, embedder).unwrap());

    let (status, body) = post_image(state, png_bytes()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn repeated_queries_return_identical_rankings() {
    let state = test_state(
        vec![record("a", 0.2), record("b", 0.2), record("c", 0.8)],
        vec![json!({"id": "a"}), json!({"id": "b"}), json!({"id": "c"})],
    );

    let (_, first) = post_image(state.clone(), png_bytes()).await;
    let (_, second) = post_image(state, png_bytes()).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn health_and_ready_respond() {
    let state = test_state(vec![record("p1", 0.1)], vec![json!({"id": "p1"})]);
    let router = build_router(state);

    let health = router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);

    let ready = router
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(ready.status(), StatusCode::OK);
    let bytes = ready.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["components"]["index"]["entries"], json!(1));
}

/// Provider that always fails at inference time; stands in for a model
/// backend falling over under a healthy index.
struct ExplodingEmbedder;

impl embed::ImageEmbedder for ExplodingEmbedder {
    fn dimension(&self) -> usize {
        DIM
    }

    fn embed(&self, _image: &image::RgbImage) -> Result<Vec<f32>, embed::EmbedError> {
        Err(embed::EmbedError::Inference("model crashed".into()))
    }
}

#[tokio::test]
async fn provider_failure_is_a_server_error_not_a_partial_result() {
    let mut config = ServerConfig::default();
    config.embed.dimension = DIM;
    let index = VectorIndex::from_records(vec![record("p1", 0.1)]).unwrap();
    let metadata = MetadataCatalog::from_records(vec![json!({"id": "p1"})]).unwrap();
    let state = Arc::new(
        ServerState::from_parts(config, index, metadata, Arc::new(ExplodingEmbedder)).unwrap(),
    );

    let (status, body) = post_image(state, png_bytes()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "EMBED_ERROR");
    assert!(body.get("results").is_none());
}

#[tokio::test]
async fn state_loads_from_published_files_and_serves() {
    let dir = tempfile::tempdir().unwrap();
    let vectors_file = dir.path().join("product_vectors.json");
    let metadata_file = dir.path().join("metadata.json");
    std::fs::write(
        &vectors_file,
        serde_json::to_vec(&json!([
            {"id": "p1", "vector": [1.0, 0.0]},
            {"id": "p2", "vector": [0.0, 1.0]}
        ]))
        .unwrap(),
    )
    .unwrap();
    std::fs::write(
        &metadata_file,
        serde_json::to_vec(&json!([
            {"id": "p1", "name": "Lamp"},
            {"id": "p2", "name": "Mug"}
        ]))
        .unwrap(),
    )
    .unwrap();

    let mut config = ServerConfig::default();
    config.embed.dimension = 2;
    config.vectors_file = vectors_file;
    config.metadata_file = metadata_file;

    let state = Arc::new(ServerState::new(config).unwrap());
    let (status, body) = post_image(state, png_bytes()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn startup_refuses_malformed_vector_file() {
    let dir = tempfile::tempdir().unwrap();
    let vectors_file = dir.path().join("product_vectors.json");
    let metadata_file = dir.path().join("metadata.json");
    std::fs::write(&vectors_file, b"{\"not\": \"an array\"}").unwrap();
    std::fs::write(&metadata_file, b"[]").unwrap();

    let mut config = ServerConfig::default();
    config.vectors_file = vectors_file;
    config.metadata_file = metadata_file;

    let err = ServerState::new(config).unwrap_err();
    assert!(matches!(err, ServerError::Index(_)));
}

#[tokio::test]
async fn unknown_route_is_404() {
    let state = test_state(vec![record("p1", 0.1)], vec![json!({"id": "p1"})]);

    let response = build_router(state)
        .oneshot(
            Request::builder()
                .uri("/does-not-exist")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
