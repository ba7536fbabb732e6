use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::domain::{AssessmentId, CustomerId, PolicyType, ProfileId};

/// Domain events buffered by the aggregates and released to the external bus
/// once the enclosing persistence step has committed.
///
/// `AssessmentOutcome` is shared by completion and rejection: a rejected
/// assessment carries no score and a zero premium on the same wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UnderwritingEvent {
    #[serde(rename_all = "camelCase")]
    ProfileCreated {
        profile_id: ProfileId,
        customer_id: CustomerId,
        profile_type: PolicyType,
        occurred_at: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    ProfileUpdated {
        profile_id: ProfileId,
        customer_id: CustomerId,
        occurred_at: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    AssessmentStarted {
        assessment_id: AssessmentId,
        profile_id: ProfileId,
        policy_type: PolicyType,
        occurred_at: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    AssessmentOutcome {
        assessment_id: AssessmentId,
        profile_id: ProfileId,
        risk_score: Option<u16>,
        final_premium: Decimal,
        occurred_at: DateTime<Utc>,
    },
}

impl UnderwritingEvent {
    /// Returns the event type name as it appears on the wire.
    pub fn event_type(&self) -> &'static str {
        match self {
            UnderwritingEvent::ProfileCreated { .. } => "ProfileCreated",
            UnderwritingEvent::ProfileUpdated { .. } => "ProfileUpdated",
            UnderwritingEvent::AssessmentStarted { .. } => "AssessmentStarted",
            UnderwritingEvent::AssessmentOutcome { .. } => "AssessmentOutcome",
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            UnderwritingEvent::ProfileCreated { occurred_at, .. } => *occurred_at,
            UnderwritingEvent::ProfileUpdated { occurred_at, .. } => *occurred_at,
            UnderwritingEvent::AssessmentStarted { occurred_at, .. } => *occurred_at,
            UnderwritingEvent::AssessmentOutcome { occurred_at, .. } => *occurred_at,
        }
    }
}
