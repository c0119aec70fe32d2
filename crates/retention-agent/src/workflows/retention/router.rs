use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use super::domain::{CustomerId, PipelineRecord, RetentionOffer};
use super::pipeline::RetentionPipeline;

/// Scores strictly above this are authorized for the offer; others are monitored.
/// Kept apart from the offer bands even though the values coincide.
pub const AUTHORIZATION_ABOVE: i32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RetentionAction {
    Authorized,
    Monitor,
}

impl RetentionAction {
    pub fn for_score(score: i32) -> Self {
        if score > AUTHORIZATION_ABOVE {
            Self::Authorized
        } else {
            Self::Monitor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authorized => "Authorized",
            Self::Monitor => "Monitor",
        }
    }
}

impl std::fmt::Display for RetentionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalyzeRequest {
    pub customer_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    pub status: &'static str,
    pub customer_id: CustomerId,
    pub analysis: RiskAnalysisView,
    pub decision: DecisionView,
}

#[derive(Debug, Clone, Serialize)]
pub struct RiskAnalysisView {
    pub risk_score: i32,
    pub reasoning: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DecisionView {
    pub offer: RetentionOffer,
    pub action: RetentionAction,
}

impl AnalyzeResponse {
    /// Shape a finished record; `None` if any stage output is missing.
    pub fn from_record(record: &PipelineRecord) -> Option<Self> {
        let risk = record.risk()?;
        let offer = record.recommended_offer()?;
        Some(Self {
            status: "success",
            customer_id: record.customer_id().clone(),
            analysis: RiskAnalysisView {
                risk_score: risk.score,
                reasoning: risk.reason.clone(),
            },
            decision: DecisionView {
                offer,
                action: RetentionAction::for_score(risk.score),
            },
        })
    }
}

/// Router exposing the retention analysis endpoint.
pub fn retention_router(pipeline: Arc<RetentionPipeline>) -> Router {
    Router::new()
        .route("/analyze_customer", post(analyze_handler))
        .with_state(pipeline)
}

pub(crate) async fn analyze_handler(
    State(pipeline): State<Arc<RetentionPipeline>>,
    Json(request): Json<AnalyzeRequest>,
) -> Response {
    let customer_id = CustomerId(request.customer_id);
    info!(%customer_id, "retention analysis requested");

    let outcome = tokio::task::spawn_blocking(move || pipeline.run(customer_id)).await;

    match outcome {
        Ok(Ok(record)) => match AnalyzeResponse::from_record(&record) {
            Some(body) => (StatusCode::OK, Json(body)).into_response(),
            None => server_fault("pipeline finished without a decision".to_string()),
        },
        Ok(Err(failure)) => {
            error!(stage = %failure.stage, error = %failure, "retention pipeline failed");
            server_fault(failure.to_string())
        }
        Err(join_error) => {
            error!(error = %join_error, "retention pipeline task aborted");
            server_fault(format!("pipeline task aborted: {join_error}"))
        }
    }
}

fn server_fault(detail: String) -> Response {
    let payload = json!({ "detail": detail });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_threshold_is_strict() {
        assert_eq!(RetentionAction::for_score(51), RetentionAction::Authorized);
        assert_eq!(RetentionAction::for_score(50), RetentionAction::Monitor);
        assert_eq!(RetentionAction::for_score(-4), RetentionAction::Monitor);
    }

    #[test]
    fn incomplete_record_has_no_response() {
        let record = PipelineRecord::new(CustomerId::from("3668-QPYBK"));
        assert!(AnalyzeResponse::from_record(&record).is_none());
    }
}
