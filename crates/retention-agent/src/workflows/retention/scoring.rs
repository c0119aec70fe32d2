use std::sync::Arc;

use tracing::warn;

use super::backend::{BackendError, GenerativeModel};
use super::domain::{CustomerProfile, RiskAssessment};

pub const SCORE_LABEL: &str = "Score:";
pub const REASON_LABEL: &str = "Reason:";

/// Score substituted when the model answer cannot be parsed. Errs toward high risk.
pub const FALLBACK_SCORE: i32 = 85;
pub const FALLBACK_REASON: &str = "High dissatisfaction detected.";

pub fn fallback_assessment() -> RiskAssessment {
    RiskAssessment {
        score: FALLBACK_SCORE,
        reason: FALLBACK_REASON.to_string(),
    }
}

pub fn risk_prompt(profile: &CustomerProfile, complaint_summary: &str) -> String {
    format!(
        "Act as a Churn Analyst. Evaluate the risk (0-100%).\n\
         \n\
         Profile: Tenure {tenure} months, Bill ${bill}\n\
         Complaint: \"{complaint_summary}\"\n\
         \n\
         Output strictly in this format:\n\
         Score: [Number]\n\
         Reason: [One sentence explanation]\n",
        tenure = profile.tenure_months,
        bill = profile.monthly_charge,
    )
}

/// Extract the labeled score and reason from free-form model output.
///
/// The first line containing each label wins and its value is everything after
/// the line's first colon, trimmed. Returns `None` when either label is missing
/// or the score is not an integer.
pub fn parse_risk_response(response: &str) -> Option<RiskAssessment> {
    let score = labeled_value(response, SCORE_LABEL)?.parse::<i32>().ok()?;
    let reason = labeled_value(response, REASON_LABEL)?;
    Some(RiskAssessment {
        score,
        reason: reason.to_string(),
    })
}

fn labeled_value<'a>(response: &'a str, label: &str) -> Option<&'a str> {
    let line = response.lines().find(|line| line.contains(label))?;
    let (_, value) = line.split_once(':')?;
    Some(value.trim())
}

/// Asks the generative backend for a churn risk estimate.
#[derive(Clone)]
pub struct RiskScorer {
    model: Arc<dyn GenerativeModel>,
}

impl RiskScorer {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// Transport failures propagate; unparseable answers fall back to
    /// [`fallback_assessment`].
    pub fn assess(
        &self,
        profile: &CustomerProfile,
        complaint_summary: &str,
    ) -> Result<RiskAssessment, BackendError> {
        let response = self.model.generate(&risk_prompt(profile, complaint_summary))?;

        let assessment = match parse_risk_response(&response) {
            Some(assessment) => assessment,
            None => {
                warn!(response = %response, "unparseable risk response, using fallback score");
                fallback_assessment()
            }
        };

        if !(0..=100).contains(&assessment.score) {
            warn!(score = assessment.score, "risk score outside 0-100 passed through");
        }

        Ok(assessment)
    }
}
