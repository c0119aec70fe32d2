use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::workflows::retention::backend::{BackendError, EmbeddingModel, GenerativeModel};
use crate::workflows::retention::knowledge::{InMemoryVectorIndex, StoredDocument};
use crate::workflows::retention::pipeline::RetentionPipeline;
use crate::workflows::retention::profiles::ProfileDirectory;

pub(super) const SUMMARY_PREFIX: &str = "Summarize this complaint";

/// Answers summary prompts with a fixed sentence and risk prompts with a
/// scripted reply, recording every prompt it sees.
pub(super) struct ScriptedModel {
    summary: Result<String, BackendError>,
    risk: Result<String, BackendError>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub(super) fn new(summary: &str, risk: &str) -> Self {
        Self {
            summary: Ok(summary.to_string()),
            risk: Ok(risk.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn failing_risk(summary: &str, error: BackendError) -> Self {
        Self {
            summary: Ok(summary.to_string()),
            risk: Err(error),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn failing_summary(error: BackendError) -> Self {
        Self {
            summary: Err(error),
            risk: Ok("Score: 10\nReason: unused".to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt mutex poisoned").clone()
    }
}

impl GenerativeModel for ScriptedModel {
    fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        self.prompts
            .lock()
            .expect("prompt mutex poisoned")
            .push(prompt.to_string());
        if prompt.starts_with(SUMMARY_PREFIX) {
            self.summary.clone()
        } else {
            self.risk.clone()
        }
    }
}

/// Maps every text onto the same unit vector.
pub(super) struct UnitEmbedder;

impl EmbeddingModel for UnitEmbedder {
    fn embed(&self, _text: &str) -> Result<Vec<f32>, BackendError> {
        Ok(vec![1.0, 0.0, 0.0])
    }
}

pub(super) struct OfflineEmbedder;

impl EmbeddingModel for OfflineEmbedder {
    fn embed(&self, _text: &str) -> Result<Vec<f32>, BackendError> {
        Err(BackendError::Transport("dns lookup failed".to_string()))
    }
}

pub(super) fn complaint_index() -> InMemoryVectorIndex {
    let mut index = InMemoryVectorIndex::new(3);
    index
        .upsert(StoredDocument {
            id: "3668-QPYBK_doc".to_string(),
            customer_id: "3668-QPYBK".to_string(),
            kind: "complaint_log".to_string(),
            text_content: "My fiber connection has dropped out every evening for three weeks."
                .to_string(),
            embedding: vec![0.9, 0.1, 0.0],
            ingested_at: Utc::now(),
        })
        .expect("seed complaint");
    index
}

pub(super) fn pipeline_with(
    model: Arc<ScriptedModel>,
    embedder: Arc<dyn EmbeddingModel>,
) -> RetentionPipeline {
    RetentionPipeline::new(
        Arc::new(ProfileDirectory::standard()),
        model,
        embedder,
        Arc::new(complaint_index()),
    )
}
