//! Test helpers: build AppState and router for integration tests.
//!
//! Storage is a `LocalStorage` under a temp dir and the encoder is a shell
//! script that writes a placeholder MP4, so no ffmpeg or S3 is needed.

use std::collections::HashMap;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum_test::TestServer;
use slidereel_api::setup::{pipeline, routes, storage};
use slidereel_api::{AdmissionGate, AppState};
use slidereel_core::Config;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

pub const MEDIA_BASE_URL: &str = "http://media.test/videos-bucket";

/// Test application: server, state, and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub scratch_dir: PathBuf,
    pub media_dir: PathBuf,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn scratch_is_empty(&self) -> bool {
        std::fs::read_dir(&self.scratch_dir)
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(true)
    }
}

fn write_fake_ffmpeg(dir: &Path) -> PathBuf {
    let path = dir.join("ffmpeg");
    std::fs::write(
        &path,
        "#!/bin/sh\nfor last; do :; done\necho 'frame=1' >&2\nprintf 'fake-mp4' > \"$last\"\n",
    )
    .expect("Failed to write fake ffmpeg");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("Failed to make fake ffmpeg executable");
    path
}

/// Setup test app with local storage and a fake encoder. `overrides` are
/// applied on top of the default test environment.
pub async fn setup_test_app(overrides: &[(&str, &str)]) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let scratch_dir = temp_dir.path().join("scratch");
    let media_dir = temp_dir.path().join("media");
    let ffmpeg = write_fake_ffmpeg(temp_dir.path());

    let mut env: HashMap<String, String> = HashMap::from([
        ("STORAGE_BACKEND".to_string(), "local".to_string()),
        (
            "LOCAL_STORAGE_PATH".to_string(),
            media_dir.to_string_lossy().to_string(),
        ),
        ("LOCAL_STORAGE_BASE_URL".to_string(), MEDIA_BASE_URL.to_string()),
        ("FFMPEG_PATH".to_string(), ffmpeg.to_string_lossy().to_string()),
        (
            "SCRATCH_DIR".to_string(),
            scratch_dir.to_string_lossy().to_string(),
        ),
        ("FETCH_TIMEOUT_SECS".to_string(), "5".to_string()),
    ]);
    for (key, value) in overrides {
        env.insert(key.to_string(), value.to_string());
    }

    let config = Config::from_lookup(|key| env.get(key).cloned()).expect("Invalid test config");

    let storage = storage::setup_storage(&config)
        .await
        .expect("Failed to create local storage");
    let orchestrator = pipeline::setup_orchestrator(&config, storage.clone())
        .expect("Failed to build orchestrator");

    let state = Arc::new(AppState {
        admission: AdmissionGate::new(config.max_concurrent_jobs(), config.admission_timeout()),
        shutdown: CancellationToken::new(),
        orchestrator: Arc::new(orchestrator),
        storage,
        config,
    });

    let router = routes::setup_routes(state.clone()).expect("Failed to build routes");
    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp {
        server,
        state,
        scratch_dir,
        media_dir,
        _temp_dir: temp_dir,
    }
}
