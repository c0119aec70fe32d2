use super::common::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::workflows::retention::backend::BackendError;
use crate::workflows::retention::domain::{
    CustomerId, PipelineRecord, RetentionOffer, StageName, StageUpdate,
};
use crate::workflows::retention::knowledge::{SimilarityLookup, NO_RECORD_FOUND};
use crate::workflows::retention::pipeline::RetentionPipeline;
use crate::workflows::retention::profiles::ProfileDirectory;
use crate::workflows::retention::scoring::RiskScorer;
use crate::workflows::retention::stages::{
    DecideStage, GatherStage, PipelineStage, ScoreStage, StageError,
};
use crate::workflows::retention::summarizer::TextSummarizer;

#[test]
fn end_to_end_run_populates_every_field() {
    let model = Arc::new(ScriptedModel::new(
        "Customer suffers nightly fiber outages.",
        "Score: 90\nReason: Repeated outages",
    ));
    let pipeline = pipeline_with(model.clone(), Arc::new(UnitEmbedder));

    let record = pipeline
        .run(CustomerId::from("3668-QPYBK"))
        .expect("pipeline completes");

    assert_eq!(record.customer_id().as_str(), "3668-QPYBK");
    let profile = record.profile().expect("profile gathered");
    assert_eq!(profile.tenure_months, 2);
    assert_eq!(profile.monthly_charge, 53.85);
    assert_eq!(profile.service_type, "Fiber Optic");
    assert_eq!(
        record.complaint_summary(),
        Some("Customer suffers nightly fiber outages.")
    );
    assert_eq!(record.risk_score(), Some(90));
    assert_eq!(record.risk_reason(), Some("Repeated outages"));
    assert_eq!(
        record.recommended_offer(),
        Some(RetentionOffer::FullRefundAndFreeMonth)
    );

    let prompts = model.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0].ends_with("every evening for three weeks."));
    assert!(prompts[1].contains("Tenure 2 months, Bill $53.85"));
    assert!(prompts[1].contains("Customer suffers nightly fiber outages."));
}

#[test]
fn unknown_customer_runs_on_sentinels() {
    let model = Arc::new(ScriptedModel::new(
        "No complaint history is on file.",
        "Score: 20\nReason: No signals of dissatisfaction",
    ));
    let pipeline = pipeline_with(model.clone(), Arc::new(UnitEmbedder));

    let record = pipeline
        .run(CustomerId::from("0000-NOBODY"))
        .expect("pipeline completes");

    let profile = record.profile().expect("profile gathered");
    assert!(profile.is_unknown());
    assert_eq!(profile.tenure_months, 0);
    assert_eq!(record.risk_score(), Some(20));
    assert_eq!(
        record.recommended_offer(),
        Some(RetentionOffer::FreeSpeedUpgrade)
    );

    let prompts = model.prompts();
    assert_eq!(
        prompts[0],
        format!("Summarize this complaint in 1 sentence: {NO_RECORD_FOUND}")
    );
    assert!(prompts[1].contains("Tenure 0 months, Bill $0"));
}

#[test]
fn lookup_transport_errors_do_not_abort() {
    let model = Arc::new(ScriptedModel::new(
        "The complaint could not be retrieved.",
        "Score: 55\nReason: Unknown context",
    ));
    let pipeline = pipeline_with(model.clone(), Arc::new(OfflineEmbedder));

    let record = pipeline
        .run(CustomerId::from("3668-QPYBK"))
        .expect("lookup failure is fail-soft");

    assert_eq!(
        record.recommended_offer(),
        Some(RetentionOffer::HalfOffNextBill)
    );
    assert!(model.prompts()[0].contains("Error: backend transport failed: dns lookup failed"));
}

#[test]
fn malformed_risk_answer_falls_back_to_high_risk() {
    let model = Arc::new(ScriptedModel::new(
        "Customer is unhappy.",
        "I would rate this customer as fairly risky.",
    ));
    let pipeline = pipeline_with(model, Arc::new(UnitEmbedder));

    let record = pipeline
        .run(CustomerId::from("9237-HQITU"))
        .expect("pipeline completes");

    assert_eq!(record.risk_score(), Some(85));
    assert_eq!(record.risk_reason(), Some("High dissatisfaction detected."));
    assert_eq!(
        record.recommended_offer(),
        Some(RetentionOffer::FullRefundAndFreeMonth)
    );
}

#[test]
fn summarizer_failure_aborts_in_gather_stage() {
    let model = Arc::new(ScriptedModel::failing_summary(BackendError::Quota(
        "free tier".to_string(),
    )));
    let pipeline = pipeline_with(model.clone(), Arc::new(UnitEmbedder));

    let failure = pipeline
        .run(CustomerId::from("3668-QPYBK"))
        .expect_err("summary failure propagates");

    assert_eq!(failure.stage, StageName::Gather);
    assert!(matches!(
        failure.cause,
        StageError::Backend(BackendError::Quota(_))
    ));
    assert_eq!(model.prompts().len(), 1);
}

struct CountingDecide {
    calls: Arc<AtomicUsize>,
}

impl PipelineStage for CountingDecide {
    fn name(&self) -> StageName {
        StageName::Decide
    }

    fn run(&self, record: &PipelineRecord) -> Result<StageUpdate, StageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        DecideStage.run(record)
    }
}

fn counting_pipeline(model: Arc<ScriptedModel>, calls: Arc<AtomicUsize>) -> RetentionPipeline {
    let gather = GatherStage::new(
        Arc::new(ProfileDirectory::standard()),
        SimilarityLookup::new(Arc::new(UnitEmbedder), Arc::new(complaint_index())),
        TextSummarizer::new(model.clone()),
    );
    let score = ScoreStage::new(RiskScorer::new(model));
    RetentionPipeline::with_stages(gather, score, CountingDecide { calls })
}

#[test]
fn score_transport_failure_skips_decide_stage() {
    let calls = Arc::new(AtomicUsize::new(0));
    let model = Arc::new(ScriptedModel::failing_risk(
        "Customer suffers nightly fiber outages.",
        BackendError::Transport("connection reset by peer".to_string()),
    ));
    let pipeline = counting_pipeline(model, calls.clone());

    let failure = pipeline
        .run(CustomerId::from("3668-QPYBK"))
        .expect_err("score failure propagates");

    assert_eq!(failure.stage, StageName::Score);
    assert_eq!(
        failure.to_string(),
        "score_stage failed: backend transport failed: connection reset by peer"
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn decide_stage_runs_once_on_success() {
    let calls = Arc::new(AtomicUsize::new(0));
    let model = Arc::new(ScriptedModel::new("Summary.", "Score: 51\nReason: Mixed"));
    let pipeline = counting_pipeline(model, calls.clone());

    let record = pipeline
        .run(CustomerId::from("7795-CFOCW"))
        .expect("pipeline completes");

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        record.recommended_offer(),
        Some(RetentionOffer::HalfOffNextBill)
    );
}
