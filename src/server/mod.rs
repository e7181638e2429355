//! HTTP API for the analysis pipeline.
//!
//! - `POST /api/analytics/:file_id` runs or returns the cached analysis
//! - `GET /api/analytics/:file_id` reads a stored analysis only
//! - `GET /api/images/:key` serves a rendered word cloud
//! - `GET /health`

mod handlers;
mod routes;

pub use handlers::{status_for, AnalysisResponse, ErrorBody};
pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::analysis::AnalysisOrchestrator;
use crate::config::Settings;
use crate::services::ArtifactReader;
use crate::storage::ArtifactBackend;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: AnalysisOrchestrator,
    pub artifacts: Arc<dyn ArtifactReader>,
    pub bucket: String,
}

impl AppState {
    pub fn new(
        orchestrator: AnalysisOrchestrator,
        artifacts: Arc<dyn ArtifactReader>,
    ) -> Self {
        let bucket = orchestrator.config().bucket.clone();
        Self {
            orchestrator,
            artifacts,
            bucket,
        }
    }

    /// Wire production collaborators from settings.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let ctx = settings.create_db_context()?;
        let backend = ArtifactBackend::from_settings(settings)?;

        let orchestrator =
            AnalysisOrchestrator::from_settings(settings, Arc::new(ctx.analyses()), backend.store)?;

        Ok(Self::new(orchestrator, backend.reader))
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::from_settings(settings)?;
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::OrchestratorConfig;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tempfile::tempdir;
    use tower::ServiceExt;

    use crate::models::{AnalysisRecord, FileId, SourceFile};
    use crate::repository::MemoryAnalysisRepository;
    use crate::services::{
        AnalysisRecordStore, ImageArtifactGenerator, RecordStoreError, SourceFileFetcher,
        UpstreamError,
    };
    use crate::storage::FilesystemArtifactStore;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake";

    struct NamedFile(&'static str, &'static [u8]);

    #[async_trait]
    impl SourceFileFetcher for NamedFile {
        async fn fetch(&self, _file_id: FileId) -> Result<SourceFile, UpstreamError> {
            Ok(SourceFile::new(self.0, self.1.to_vec()))
        }
    }

    struct Unreachable;

    #[async_trait]
    impl SourceFileFetcher for Unreachable {
        async fn fetch(&self, _file_id: FileId) -> Result<SourceFile, UpstreamError> {
            Err(UpstreamError::Status {
                url: "http://files/api/files/x".into(),
                status: 503,
            })
        }
    }

    struct FixedImage;

    #[async_trait]
    impl ImageArtifactGenerator for FixedImage {
        async fn generate(&self, _text: &str) -> Result<Vec<u8>, UpstreamError> {
            Ok(PNG.to_vec())
        }
    }

    /// Always reports that another writer got there first.
    struct AlwaysTaken;

    #[async_trait]
    impl AnalysisRecordStore for AlwaysTaken {
        async fn find(&self, _: FileId) -> Result<Option<AnalysisRecord>, RecordStoreError> {
            Ok(None)
        }

        async fn insert(&self, record: &AnalysisRecord) -> Result<(), RecordStoreError> {
            Err(RecordStoreError::UniqueViolation(record.file_id()))
        }
    }

    fn setup_test_app(
        records: Arc<dyn AnalysisRecordStore>,
        fetcher: Arc<dyn SourceFileFetcher>,
    ) -> (axum::Router, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let artifacts = Arc::new(FilesystemArtifactStore::new(dir.path()));
        let orchestrator = AnalysisOrchestrator::new(
            records,
            fetcher,
            Arc::new(FixedImage),
            artifacts.clone(),
            OrchestratorConfig::default(),
        );
        (create_router(AppState::new(orchestrator, artifacts)), dir)
    }

    fn text_app() -> (axum::Router, tempfile::TempDir) {
        setup_test_app(
            Arc::new(MemoryAnalysisRepository::new()),
            Arc::new(NamedFile("story.txt", b"Once upon a time.\n\nThe end.")),
        )
    }

    fn request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_analyze_then_query_then_image() {
        let (app, _dir) = text_app();
        let file_id = FileId::generate();
        let uri = format!("/api/analytics/{file_id}");

        let response = app.clone().oneshot(request("POST", &uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["fileId"], file_id.to_string());
        assert_eq!(json["paragraphCount"], 2);
        assert_eq!(json["wordCount"], 6);
        assert_eq!(json["characterCount"], 27);
        assert_eq!(json["imageLocation"], format!("{file_id}.png"));
        assert_eq!(json["imageUrl"], format!("/api/images/{file_id}.png"));

        let response = app.clone().oneshot(request("GET", &uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let queried = json_body(response).await;
        assert_eq!(queried["createdAtUtc"], json["createdAtUtc"]);

        let response = app
            .oneshot(request("GET", json["imageUrl"].as_str().unwrap()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "image/png"
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], PNG);
    }

    #[tokio::test]
    async fn test_query_unknown_file_is_not_found() {
        let (app, _dir) = text_app();
        let response = app
            .oneshot(request("GET", &format!("/api/analytics/{}", FileId::generate())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_and_nil_ids_are_bad_requests() {
        let (app, _dir) = text_app();
        for id in ["not-a-uuid", "00000000-0000-0000-0000-000000000000"] {
            let response = app
                .clone()
                .oneshot(request("POST", &format!("/api/analytics/{id}")))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "id {id}");
        }
    }

    #[tokio::test]
    async fn test_unsupported_format_is_client_error() {
        let (app, _dir) = setup_test_app(
            Arc::new(MemoryAnalysisRepository::new()),
            Arc::new(NamedFile("photo.jpg", b"\xff\xd8")),
        );
        let response = app
            .oneshot(request("POST", &format!("/api/analytics/{}", FileId::generate())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["stage"], "validate");
    }

    #[tokio::test]
    async fn test_upstream_failure_is_bad_gateway() {
        let (app, _dir) = setup_test_app(
            Arc::new(MemoryAnalysisRepository::new()),
            Arc::new(Unreachable),
        );
        let response = app
            .oneshot(request("POST", &format!("/api/analytics/{}", FileId::generate())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(json_body(response).await["stage"], "fetch");
    }

    #[tokio::test]
    async fn test_lost_race_is_conflict() {
        let (app, _dir) = setup_test_app(
            Arc::new(AlwaysTaken),
            Arc::new(NamedFile("a.txt", b"words")),
        );
        let response = app
            .oneshot(request("POST", &format!("/api/analytics/{}", FileId::generate())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(json_body(response).await["stage"], "persist");
    }

    #[tokio::test]
    async fn test_missing_image_and_health() {
        let (app, _dir) = text_app();
        let response = app
            .clone()
            .oneshot(request("GET", "/api/images/missing.png"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app.oneshot(request("GET", "/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
