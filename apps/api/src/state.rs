use crate::analysis::service::AnalysisService;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds no per-request data; every request owns its upload and prompt.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub analysis: AnalysisService,
}
