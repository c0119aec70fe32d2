use metrics_exporter_prometheus::PrometheusHandle;
use retention_agent::config::{AppConfig, KnowledgeConfig};
use retention_agent::error::AppError;
use retention_agent::workflows::retention::{
    GeminiClient, InMemoryVectorIndex, ProfileDirectory, RetentionPipeline, EMBEDDING_DIMENSIONS,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Profile table from the configured CSV export, or the built-in roster.
pub(crate) fn load_profiles(knowledge: &KnowledgeConfig) -> Result<ProfileDirectory, AppError> {
    match &knowledge.profiles_csv {
        Some(path) => {
            let directory = ProfileDirectory::from_path(path)?;
            info!(path = %path.display(), profiles = directory.len(), "loaded profile export");
            Ok(directory)
        }
        None => Ok(ProfileDirectory::standard()),
    }
}

pub(crate) fn load_index(knowledge: &KnowledgeConfig) -> Result<InMemoryVectorIndex, AppError> {
    let index = InMemoryVectorIndex::load(&knowledge.index_path, EMBEDDING_DIMENSIONS)?;
    info!(
        path = %knowledge.index_path.display(),
        documents = index.len(),
        "loaded complaint knowledge snapshot"
    );
    Ok(index)
}

/// Wire the live Gemini backend, profile table, and knowledge snapshot into one pipeline.
pub(crate) fn build_pipeline(config: &AppConfig) -> Result<RetentionPipeline, AppError> {
    let gemini = Arc::new(GeminiClient::from_config(&config.gemini)?);
    let profiles = Arc::new(load_profiles(&config.knowledge)?);
    let index = Arc::new(load_index(&config.knowledge)?);

    Ok(RetentionPipeline::new(
        profiles,
        gemini.clone(),
        gemini,
        index,
    ))
}
