//! Customer retention pipeline: gather context, score churn risk, pick an offer.

pub mod backend;
pub mod domain;
pub mod gemini;
pub mod knowledge;
pub mod offers;
pub mod pipeline;
pub mod profiles;
pub mod router;
pub mod scoring;
pub mod stages;
pub mod summarizer;

#[cfg(test)]
mod tests;

pub use backend::{BackendError, EmbeddingModel, GenerativeModel, EMBEDDING_DIMENSIONS};
pub use domain::{
    CustomerId, CustomerProfile, PipelineRecord, RetentionOffer, RiskAssessment, StageName,
    StageUpdate,
};
pub use gemini::GeminiClient;
pub use knowledge::{
    ComplaintIngestor, InMemoryVectorIndex, IndexError, IngestReport, SimilarityLookup,
    VectorIndex, NO_RECORD_FOUND,
};
pub use offers::select_offer;
pub use pipeline::{PipelineFailure, RetentionPipeline};
pub use profiles::{ProfileDirectory, ProfileImportError};
pub use router::{retention_router, AnalyzeResponse, RetentionAction};
pub use scoring::{parse_risk_response, RiskScorer};
pub use stages::{DecideStage, GatherStage, PipelineStage, ScoreStage, StageError};
pub use summarizer::TextSummarizer;
