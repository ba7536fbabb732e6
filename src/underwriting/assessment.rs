use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::domain::{
    AssessmentId, AssessmentStatus, AssessorId, PolicyType, ProfileId, RiskFactor, RiskScore,
    ValidationError,
};
use super::events::UnderwritingEvent;

/// Error raised by assessment transitions. Illegal transitions leave the
/// aggregate unchanged.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("assessment {id} cannot {op} while {state}", id = .assessment_id, op = .operation, state = .status.label())]
    IllegalTransition {
        assessment_id: AssessmentId,
        status: AssessmentStatus,
        operation: &'static str,
    },
}

/// One priced underwriting decision for a policy quote. References a profile
/// by identifier, transitions once to a terminal state, and is immutable
/// thereafter. Buffers its lifecycle events like `RiskProfile` does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    id: AssessmentId,
    profile_id: ProfileId,
    policy_type: PolicyType,
    status: AssessmentStatus,
    calculated_risk_score: Option<RiskScore>,
    base_premium: Decimal,
    risk_multiplier: Option<Decimal>,
    final_premium: Option<Decimal>,
    assessed_factors: Vec<RiskFactor>,
    notes: Option<String>,
    assessor_id: AssessorId,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    version: u64,
    #[serde(skip)]
    events: Vec<UnderwritingEvent>,
}

impl RiskAssessment {
    /// Open an assessment in `InProgress` against the given profile.
    pub fn start(
        profile_id: ProfileId,
        policy_type: PolicyType,
        base_premium: Decimal,
        assessor_id: AssessorId,
    ) -> Result<Self, ValidationError> {
        if base_premium <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveBasePremium);
        }

        let id = AssessmentId::generate();
        let now = Utc::now();
        let mut assessment = Self {
            id,
            profile_id,
            policy_type,
            status: AssessmentStatus::InProgress,
            calculated_risk_score: None,
            base_premium,
            risk_multiplier: None,
            final_premium: None,
            assessed_factors: Vec::new(),
            notes: None,
            assessor_id,
            created_at: now,
            completed_at: None,
            version: 0,
            events: Vec::new(),
        };

        assessment.events.push(UnderwritingEvent::AssessmentStarted {
            assessment_id: id,
            profile_id,
            policy_type,
            occurred_at: now,
        });

        Ok(assessment)
    }

    /// Seal the assessment with the computed score, factor snapshot, and
    /// multiplier. The final premium is fixed to base x multiplier at two
    /// decimal places.
    pub fn complete(
        &mut self,
        score: RiskScore,
        factors: Vec<RiskFactor>,
        multiplier: Decimal,
        notes: Option<String>,
    ) -> Result<(), AssessmentError> {
        self.ensure_in_progress("complete")?;
        if multiplier <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveMultiplier.into());
        }

        let final_premium = (self.base_premium * multiplier)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let now = Utc::now();

        self.status = AssessmentStatus::Completed;
        self.calculated_risk_score = Some(score);
        self.risk_multiplier = Some(multiplier);
        self.final_premium = Some(final_premium);
        self.assessed_factors = factors;
        self.notes = notes;
        self.completed_at = Some(now);

        self.events.push(UnderwritingEvent::AssessmentOutcome {
            assessment_id: self.id,
            profile_id: self.profile_id,
            risk_score: Some(score.value()),
            final_premium,
            occurred_at: now,
        });

        Ok(())
    }

    /// Decline the assessment, recording the reason as notes. Emits the same
    /// outcome event as completion with no score and a zero premium.
    pub fn reject(&mut self, reason: String) -> Result<(), AssessmentError> {
        self.ensure_in_progress("reject")?;

        let now = Utc::now();
        self.status = AssessmentStatus::Rejected;
        self.notes = Some(reason);
        self.final_premium = Some(Decimal::ZERO);
        self.completed_at = Some(now);

        self.events.push(UnderwritingEvent::AssessmentOutcome {
            assessment_id: self.id,
            profile_id: self.profile_id,
            risk_score: None,
            final_premium: Decimal::ZERO,
            occurred_at: now,
        });

        Ok(())
    }

    fn ensure_in_progress(&self, operation: &'static str) -> Result<(), AssessmentError> {
        if self.status == AssessmentStatus::InProgress {
            Ok(())
        } else {
            Err(AssessmentError::IllegalTransition {
                assessment_id: self.id,
                status: self.status,
                operation,
            })
        }
    }

    /// Drain the buffered events. Callers publish them only after the
    /// aggregate has been persisted.
    pub fn take_events(&mut self) -> Vec<UnderwritingEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn id(&self) -> AssessmentId {
        self.id
    }

    pub fn profile_id(&self) -> ProfileId {
        self.profile_id
    }

    pub fn policy_type(&self) -> PolicyType {
        self.policy_type
    }

    pub fn status(&self) -> AssessmentStatus {
        self.status
    }

    pub fn calculated_risk_score(&self) -> Option<RiskScore> {
        self.calculated_risk_score
    }

    pub fn base_premium(&self) -> Decimal {
        self.base_premium
    }

    pub fn risk_multiplier(&self) -> Option<Decimal> {
        self.risk_multiplier
    }

    pub fn final_premium(&self) -> Option<Decimal> {
        self.final_premium
    }

    pub fn assessed_factors(&self) -> &[RiskFactor] {
        &self.assessed_factors
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn assessor_id(&self) -> &AssessorId {
        &self.assessor_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Intended for repository adapters applying the optimistic-lock
    /// increment after a successful save.
    pub fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    /// True once the assessment has reached either terminal state.
    pub fn is_completed(&self) -> bool {
        self.status.is_terminal()
    }

    /// Premium movement relative to the base, as a percentage. Zero while
    /// the multiplier is unset.
    pub fn premium_adjustment_percentage(&self) -> Decimal {
        match self.risk_multiplier {
            Some(multiplier) => (multiplier - Decimal::ONE) * Decimal::ONE_HUNDRED,
            None => Decimal::ZERO,
        }
    }
}
