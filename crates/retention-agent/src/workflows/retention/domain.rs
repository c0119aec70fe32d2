use std::fmt;

use serde::{Deserialize, Serialize};

/// Service type reported for customers missing from the profile directory.
pub const UNKNOWN_SERVICE_TYPE: &str = "unknown";

/// Identifier wrapper for the customer under analysis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CustomerId(pub String);

impl CustomerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CustomerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CustomerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Account facts used to frame the churn analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub tenure_months: u32,
    pub monthly_charge: f64,
    pub service_type: String,
}

impl CustomerProfile {
    pub fn new(tenure_months: u32, monthly_charge: f64, service_type: impl Into<String>) -> Self {
        Self {
            tenure_months,
            monthly_charge,
            service_type: service_type.into(),
        }
    }

    /// Zero-valued profile substituted when a lookup misses.
    pub fn unknown() -> Self {
        Self::new(0, 0.0, UNKNOWN_SERVICE_TYPE)
    }

    pub fn is_unknown(&self) -> bool {
        self.service_type == UNKNOWN_SERVICE_TYPE
    }
}

/// Churn risk produced by the score stage. The score is passed through as
/// the model reported it and may fall outside 0..=100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub score: i32,
    pub reason: String,
}

/// Closed set of retention offers the decide stage can recommend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RetentionOffer {
    #[serde(rename = "Full Refund + 1 Month Free Service")]
    FullRefundAndFreeMonth,
    #[serde(rename = "50% Discount on Next Bill")]
    HalfOffNextBill,
    #[serde(rename = "Free Speed Upgrade")]
    FreeSpeedUpgrade,
}

impl RetentionOffer {
    pub fn label(&self) -> &'static str {
        match self {
            RetentionOffer::FullRefundAndFreeMonth => "Full Refund + 1 Month Free Service",
            RetentionOffer::HalfOffNextBill => "50% Discount on Next Bill",
            RetentionOffer::FreeSpeedUpgrade => "Free Speed Upgrade",
        }
    }
}

impl fmt::Display for RetentionOffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The three fixed pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageName {
    #[serde(rename = "gather_stage")]
    Gather,
    #[serde(rename = "score_stage")]
    Score,
    #[serde(rename = "decide_stage")]
    Decide,
}

impl StageName {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::Gather => "gather_stage",
            StageName::Score => "score_stage",
            StageName::Decide => "decide_stage",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Partial update a stage hands back to the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum StageUpdate {
    Gathered {
        profile: CustomerProfile,
        complaint_summary: String,
    },
    Scored(RiskAssessment),
    Decided(RetentionOffer),
}

/// Snapshot of one pipeline invocation.
///
/// Records are never mutated in place: [`PipelineRecord::merge`] consumes the
/// current snapshot and returns the next one, so a stage only ever observes the
/// fields produced by the stages before it.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRecord {
    customer_id: CustomerId,
    profile: Option<CustomerProfile>,
    complaint_summary: Option<String>,
    risk: Option<RiskAssessment>,
    recommended_offer: Option<RetentionOffer>,
}

impl PipelineRecord {
    pub fn new(customer_id: CustomerId) -> Self {
        Self {
            customer_id,
            profile: None,
            complaint_summary: None,
            risk: None,
            recommended_offer: None,
        }
    }

    pub fn merge(self, update: StageUpdate) -> Self {
        match update {
            StageUpdate::Gathered {
                profile,
                complaint_summary,
            } => Self {
                profile: Some(profile),
                complaint_summary: Some(complaint_summary),
                ..self
            },
            StageUpdate::Scored(risk) => Self {
                risk: Some(risk),
                ..self
            },
            StageUpdate::Decided(offer) => Self {
                recommended_offer: Some(offer),
                ..self
            },
        }
    }

    pub fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }

    pub fn profile(&self) -> Option<&CustomerProfile> {
        self.profile.as_ref()
    }

    pub fn complaint_summary(&self) -> Option<&str> {
        self.complaint_summary.as_deref()
    }

    pub fn risk(&self) -> Option<&RiskAssessment> {
        self.risk.as_ref()
    }

    pub fn risk_score(&self) -> Option<i32> {
        self.risk.as_ref().map(|risk| risk.score)
    }

    pub fn risk_reason(&self) -> Option<&str> {
        self.risk.as_ref().map(|risk| risk.reason.as_str())
    }

    pub fn recommended_offer(&self) -> Option<RetentionOffer> {
        self.recommended_offer
    }
}
