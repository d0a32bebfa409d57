use std::sync::Arc;

use crate::builder::parser::ResumeParser;
use crate::config::Config;
use crate::kv::KeyValueStore;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    pub config: Config,
    /// Sessions and finalized portfolios. Redis or in-process, per `REDIS_URL`.
    pub store: Arc<dyn KeyValueStore>,
    /// Pluggable resume parser. Default: `LlmResumeParser`.
    pub parser: Arc<dyn ResumeParser>,
}
