//! Common test utilities for integration tests.
//!
//! The router runs with the real document extractor and a scripted
//! completion provider, so no network access is needed.

pub mod fixtures;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum_test::TestServer;
use tempfile::TempDir;

use quizgen_backend::config::{AppConfig, LlmCredentials};
use quizgen_backend::services::completion::{
    CompletionError, CompletionProvider, ProviderFactory,
};
use quizgen_backend::services::extraction::DocumentExtractor;
use quizgen_backend::AppState;
use quizgen_core::ResponseFormat;

/// Everything the scripted provider was asked to do.
#[derive(Default)]
pub struct CallLog {
    pub credentials: Mutex<Vec<LlmCredentials>>,
    pub prompts: Mutex<Vec<String>>,
    pub images: Mutex<Vec<String>>,
}

impl CallLog {
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn credentials(&self) -> Vec<LlmCredentials> {
        self.credentials.lock().unwrap().clone()
    }
}

struct ScriptedProvider {
    reply: Option<String>,
    log: Arc<CallLog>,
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self.log.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().ok_or(CompletionError::Empty)
    }

    async fn describe_image(
        &self,
        file_name: &str,
        _mime: &str,
        _bytes: &[u8],
    ) -> Result<String, CompletionError> {
        self.log.images.lock().unwrap().push(file_name.to_string());
        Ok(format!("Text read from {}", file_name))
    }
}

struct ScriptedFactory {
    reply: Option<String>,
    log: Arc<CallLog>,
}

impl ProviderFactory for ScriptedFactory {
    fn provider(&self, credentials: &LlmCredentials) -> Arc<dyn CompletionProvider> {
        self.log
            .credentials
            .lock()
            .unwrap()
            .push(credentials.clone());
        Arc::new(ScriptedProvider {
            reply: self.reply.clone(),
            log: self.log.clone(),
        })
    }
}

/// Test context holding the router, the call log and the export directory.
pub struct TestContext {
    pub log: Arc<CallLog>,
    pub export_dir: TempDir,
    app: Router,
}

impl TestContext {
    /// Context whose provider always answers `reply`.
    pub fn replying(reply: &str) -> Self {
        Self::build(Some(reply.to_string()), |_| {})
    }

    /// Context whose provider always fails with an empty reply.
    pub fn failing() -> Self {
        Self::build(None, |_| {})
    }

    /// Context with a customized configuration.
    pub fn with_config(reply: &str, customize: impl FnOnce(&mut AppConfig)) -> Self {
        Self::build(Some(reply.to_string()), customize)
    }

    fn build(reply: Option<String>, customize: impl FnOnce(&mut AppConfig)) -> Self {
        let export_dir = tempfile::tempdir().expect("Failed to create export dir");
        let mut config = AppConfig {
            llm_api_key: Some("env-key".to_string()),
            llm_api_base: Some("http://llm.invalid/v1".to_string()),
            export_dir: export_dir.path().to_path_buf(),
            response_format: ResponseFormat::Numbered,
            ..AppConfig::default()
        };
        customize(&mut config);

        let log = Arc::new(CallLog::default());
        let state = AppState {
            config: Arc::new(config),
            extractor: Arc::new(DocumentExtractor::new()),
            providers: Arc::new(ScriptedFactory {
                reply,
                log: log.clone(),
            }),
        };

        Self {
            log,
            export_dir,
            app: quizgen_backend::router(state),
        }
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.app.clone()).expect("Failed to create test server")
    }
}
