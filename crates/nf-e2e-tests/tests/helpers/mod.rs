//! Shared test harness for E2E integration tests.
//!
//! Writes the sample archive into a temp dir, wires an `ArchiveSource`
//! into a real `AgentContext`, and drives the Axum router in-process.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use nf_agent_api::agent::AgentContext;
use nf_agent_api::inference::{MockGenerator, TextGenerator};
use nf_agent_api::router::QueryRouter;
use nf_agent_api::routes::build_router;
use nf_agent_api::state::AppState;
use nf_tabular::mock;
use nf_tabular::{ArchiveSource, DatasetSource};

/// A second, smaller dataset for reload tests.
pub const ALT_HEADER_CSV: &str = "CHAVE DE ACESSO,RAZÃO SOCIAL EMITENTE,UF EMITENTE,DATA EMISSÃO,VALOR NOTA FISCAL\n\
NF-100,Nova Bahia Comércio SA,BA,2024-02-01 10:00:00,999.99\n";
pub const ALT_ITEM_CSV: &str = "CHAVE DE ACESSO,DESCRIÇÃO DO PRODUTO/SERVIÇO,QUANTIDADE\n\
NF-100,Cadeira,4\n";

/// Header file without the access-key column.
pub const BROKEN_HEADER_CSV: &str = "RAZÃO SOCIAL EMITENTE,UF EMITENTE,DATA EMISSÃO,VALOR NOTA FISCAL\n\
Sem Chave LTDA,SP,2024-01-02 08:00:00,10.00\n";

/// End-to-end harness: archive on disk, real agent, in-process router.
pub struct TestHarness {
    /// Temp dir holding the archive and the extraction directory.
    pub dir: TempDir,
    pub archive_path: PathBuf,
    pub agent: AgentContext,
    pub state: AppState,
    pub router: Router,
}

impl TestHarness {
    /// Sample archive on disk, agent not loaded yet.
    pub fn with_archive(fallback: Arc<dyn TextGenerator>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let archive_path = dir.path().join("202401_NFs.zip");
        mock::write_sample_archive(&archive_path).unwrap();

        let source = ArchiveSource::new(
            vec![dir.path().join("missing.zip"), archive_path.clone()],
            dir.path().join("data"),
        );
        Self::with_source(dir, archive_path, Arc::new(source), fallback)
    }

    /// Harness over an arbitrary dataset source.
    pub fn with_source(
        dir: TempDir,
        archive_path: PathBuf,
        source: Arc<dyn DatasetSource>,
        fallback: Arc<dyn TextGenerator>,
    ) -> Self {
        let agent = AgentContext::new(source, QueryRouter::new(fallback));
        let state = AppState::new(agent.clone());
        let router = build_router(state.clone());
        Self {
            dir,
            archive_path,
            agent,
            state,
            router,
        }
    }

    /// Sample archive, loaded, with a recording mock fallback.
    pub async fn loaded_with_mock(reply: &str) -> (Self, Arc<MockGenerator>) {
        let generator = Arc::new(MockGenerator::replying(reply));
        let harness = Self::with_archive(generator.clone());
        harness.load().await;
        (harness, generator)
    }

    /// Run one load to completion, panicking on failure.
    pub async fn load(&self) {
        self.agent
            .reload()
            .expect("no load should be in flight")
            .wait()
            .await
            .expect("sample archive should load");
    }

    pub fn extract_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    /// Replace the archive on disk with the given header and item files.
    pub fn rewrite_archive(&self, header_csv: &str, item_csv: &str) {
        mock::write_archive(
            &self.archive_path,
            &[
                (mock::SAMPLE_HEADER_FILE, header_csv),
                (mock::SAMPLE_ITEM_FILE, item_csv),
            ],
        )
        .unwrap();
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        self.send(
            Request::post(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
    }

    pub async fn post_empty(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        self.send(Request::post(uri).body(Body::empty()).unwrap()).await
    }

    /// POST /api/query with `question`.
    pub async fn ask(&self, question: &str) -> (StatusCode, serde_json::Value) {
        self.post_json("/api/query", serde_json::json!({ "question": question }))
            .await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, json)
    }
}
