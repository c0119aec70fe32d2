//! Capabilities the pipeline consumes from the model backend.
//!
//! Both traits are synchronous: from the pipeline's point of view every model
//! call blocks until the backend answers or fails. Callers running inside an
//! async runtime are expected to move the whole pipeline onto a blocking thread.

/// Vector width produced by the embedding model and accepted by the index.
pub const EMBEDDING_DIMENSIONS: usize = 768;

/// Text-in, text-out generation.
pub trait GenerativeModel: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, BackendError>;
}

/// Text-in, vector-out embedding.
pub trait EmbeddingModel: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, BackendError>;
}

/// Transport, quota, or protocol failure raised by a backend call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("backend credentials are not configured")]
    MissingCredentials,
    #[error("backend transport failed: {0}")]
    Transport(String),
    #[error("backend quota exhausted: {0}")]
    Quota(String),
    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("backend response malformed: {0}")]
    MalformedResponse(String),
}
