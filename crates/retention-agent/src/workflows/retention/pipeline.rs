use std::sync::Arc;

use tracing::info;

use super::backend::{EmbeddingModel, GenerativeModel};
use super::domain::{CustomerId, PipelineRecord, StageName};
use super::knowledge::{SimilarityLookup, VectorIndex};
use super::profiles::ProfileDirectory;
use super::scoring::RiskScorer;
use super::stages::{DecideStage, GatherStage, PipelineStage, ScoreStage, StageError};
use super::summarizer::TextSummarizer;

/// An unrecovered stage error, tagged with the stage that raised it.
#[derive(Debug, thiserror::Error)]
#[error("{stage} failed: {cause}")]
pub struct PipelineFailure {
    pub stage: StageName,
    #[source]
    pub cause: StageError,
}

/// Runs gather, score, and decide in that order for one customer.
pub struct RetentionPipeline {
    gather: Box<dyn PipelineStage>,
    score: Box<dyn PipelineStage>,
    decide: Box<dyn PipelineStage>,
}

impl RetentionPipeline {
    /// Wire the standard stages onto the supplied backends.
    pub fn new(
        profiles: Arc<ProfileDirectory>,
        generator: Arc<dyn GenerativeModel>,
        embedder: Arc<dyn EmbeddingModel>,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        let gather = GatherStage::new(
            profiles,
            SimilarityLookup::new(embedder, index),
            TextSummarizer::new(generator.clone()),
        );
        let score = ScoreStage::new(RiskScorer::new(generator));
        Self::with_stages(gather, score, DecideStage)
    }

    pub fn with_stages(
        gather: impl PipelineStage + 'static,
        score: impl PipelineStage + 'static,
        decide: impl PipelineStage + 'static,
    ) -> Self {
        Self {
            gather: Box::new(gather),
            score: Box::new(score),
            decide: Box::new(decide),
        }
    }

    /// Execute every stage, stopping at the first failure.
    pub fn run(&self, customer_id: CustomerId) -> Result<PipelineRecord, PipelineFailure> {
        let stages: [&dyn PipelineStage; 3] =
            [self.gather.as_ref(), self.score.as_ref(), self.decide.as_ref()];

        let record = stages
            .into_iter()
            .try_fold(
                PipelineRecord::new(customer_id),
                |record, stage| -> Result<PipelineRecord, PipelineFailure> {
                    let update = stage.run(&record).map_err(|cause| PipelineFailure {
                        stage: stage.name(),
                        cause,
                    })?;
                    Ok(record.merge(update))
                },
            )?;

        info!(
            customer_id = %record.customer_id(),
            score = ?record.risk_score(),
            "retention pipeline completed"
        );
        Ok(record)
    }
}
