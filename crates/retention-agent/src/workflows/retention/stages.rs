use std::sync::Arc;

use tracing::{debug, info};

use super::backend::BackendError;
use super::domain::{PipelineRecord, StageName, StageUpdate};
use super::knowledge::{complaint_query, SimilarityLookup};
use super::offers::select_offer;
use super::profiles::ProfileDirectory;
use super::scoring::RiskScorer;
use super::summarizer::TextSummarizer;

/// One step of the retention pipeline.
///
/// A stage reads the snapshot produced so far and returns only the fields it
/// owns; the orchestrator merges them into the next snapshot.
pub trait PipelineStage: Send + Sync {
    fn name(&self) -> StageName;
    fn run(&self, record: &PipelineRecord) -> Result<StageUpdate, StageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("required field `{0}` has not been produced yet")]
    MissingInput(&'static str),
}

/// Profile lookup, complaint retrieval, and summarization.
pub struct GatherStage {
    profiles: Arc<ProfileDirectory>,
    lookup: SimilarityLookup,
    summarizer: TextSummarizer,
}

impl GatherStage {
    pub fn new(
        profiles: Arc<ProfileDirectory>,
        lookup: SimilarityLookup,
        summarizer: TextSummarizer,
    ) -> Self {
        Self {
            profiles,
            lookup,
            summarizer,
        }
    }
}

impl PipelineStage for GatherStage {
    fn name(&self) -> StageName {
        StageName::Gather
    }

    fn run(&self, record: &PipelineRecord) -> Result<StageUpdate, StageError> {
        let customer_id = record.customer_id();
        info!(%customer_id, "gathering profile and complaint context");

        let profile = self.profiles.lookup(customer_id);
        if profile.is_unknown() {
            debug!(%customer_id, "customer missing from profile directory, using zero profile");
        }

        let complaint = self
            .lookup
            .best_match(&complaint_query(customer_id.as_str()), customer_id.as_str());
        let complaint_summary = self.summarizer.summarize(&complaint)?;

        Ok(StageUpdate::Gathered {
            profile,
            complaint_summary,
        })
    }
}

/// Churn risk estimation from the gathered profile and summary.
pub struct ScoreStage {
    scorer: RiskScorer,
}

impl ScoreStage {
    pub fn new(scorer: RiskScorer) -> Self {
        Self { scorer }
    }
}

impl PipelineStage for ScoreStage {
    fn name(&self) -> StageName {
        StageName::Score
    }

    fn run(&self, record: &PipelineRecord) -> Result<StageUpdate, StageError> {
        info!(customer_id = %record.customer_id(), "calculating churn risk");
        let profile = record.profile().ok_or(StageError::MissingInput("profile"))?;
        let summary = record
            .complaint_summary()
            .ok_or(StageError::MissingInput("complaint_summary"))?;

        let assessment = self.scorer.assess(profile, summary)?;
        Ok(StageUpdate::Scored(assessment))
    }
}

/// Offer selection from the risk score. Makes no external calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecideStage;

impl PipelineStage for DecideStage {
    fn name(&self) -> StageName {
        StageName::Decide
    }

    fn run(&self, record: &PipelineRecord) -> Result<StageUpdate, StageError> {
        let score = record
            .risk_score()
            .ok_or(StageError::MissingInput("risk_score"))?;
        let offer = select_offer(score);
        info!(customer_id = %record.customer_id(), score, offer = offer.label(), "selected retention offer");
        Ok(StageUpdate::Decided(offer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::retention::domain::{
        CustomerId, CustomerProfile, RetentionOffer, RiskAssessment,
    };

    #[test]
    fn decide_stage_requires_a_score() {
        let record = PipelineRecord::new(CustomerId::from("3668-QPYBK"));
        let err = DecideStage.run(&record).expect_err("score missing");
        assert!(matches!(err, StageError::MissingInput("risk_score")));
    }

    #[test]
    fn decide_stage_maps_score_to_offer() {
        let record = PipelineRecord::new(CustomerId::from("3668-QPYBK"))
            .merge(StageUpdate::Gathered {
                profile: CustomerProfile::unknown(),
                complaint_summary: "No complaints.".to_string(),
            })
            .merge(StageUpdate::Scored(RiskAssessment {
                score: 50,
                reason: "stable".to_string(),
            }));

        let update = DecideStage.run(&record).expect("decides");
        assert_eq!(
            update,
            StageUpdate::Decided(RetentionOffer::FreeSpeedUpgrade)
        );
    }
}
