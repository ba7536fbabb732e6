use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use super::assessment::{AssessmentError, RiskAssessment};
use super::domain::{
    Address, AssessmentId, AssessmentStatus, AssessorId, CustomerId, DrivingHistory, PolicyType,
    ProfileId, ValidationError,
};
use super::events::UnderwritingEvent;
use super::pricing::PricingEngine;
use super::profile::{NewProfile, RiskProfile};
use super::repository::{
    AssessmentRepository, EventPublisher, ProfileRepository, PublishError, RepositoryError,
};
use super::scoring::ScoringEngine;

#[derive(Debug, Error)]
pub enum UnderwritingError {
    #[error("a {policy} profile already exists for customer {customer_id}", policy = .policy_type.label())]
    DuplicateProfile {
        customer_id: CustomerId,
        policy_type: PolicyType,
    },
    #[error("risk profile {0} not found")]
    ProfileNotFound(ProfileId),
    #[error("risk assessment {0} not found")]
    AssessmentNotFound(AssessmentId),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Assessment(#[from] AssessmentError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// One line of a quote breakdown, flattened for rendering.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorView {
    pub kind: &'static str,
    pub description: String,
    pub impact: Decimal,
}

/// Outcome of a full quote run: the sealed assessment plus the derived
/// pricing figures a caller would present to the customer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteOutcome {
    pub assessment_id: AssessmentId,
    pub profile_id: ProfileId,
    pub status: &'static str,
    pub risk_score: Option<u16>,
    pub risk_category: Option<&'static str>,
    pub factors: Vec<FactorView>,
    pub base_premium: Decimal,
    pub risk_multiplier: Option<Decimal>,
    pub final_premium: Option<Decimal>,
    pub discount_percentage: u8,
    pub annual_premium: Option<Decimal>,
    pub insurable: bool,
    pub notes: Option<String>,
}

/// Application service coordinating profiles, assessments, scoring, pricing
/// and event publication.
///
/// Events buffered by the aggregates are drained before each save and
/// published only after the repository accepts the write, so a rejected
/// write never leaks events to the bus.
pub struct UnderwritingService<P, A, E> {
    profiles: Arc<P>,
    assessments: Arc<A>,
    publisher: Arc<E>,
    scoring: ScoringEngine,
    pricing: PricingEngine,
}

impl<P, A, E> UnderwritingService<P, A, E>
where
    P: ProfileRepository,
    A: AssessmentRepository,
    E: EventPublisher,
{
    pub fn new(profiles: Arc<P>, assessments: Arc<A>, publisher: Arc<E>) -> Self {
        Self {
            profiles,
            assessments,
            publisher,
            scoring: ScoringEngine::new(),
            pricing: PricingEngine::new(),
        }
    }

    /// Registers a new risk profile. A customer may hold at most one profile
    /// per policy type.
    pub fn create_profile(&self, input: NewProfile) -> Result<RiskProfile, UnderwritingError> {
        if self
            .profiles
            .exists_by_customer_id_and_type(&input.customer_id, input.policy_type)?
        {
            return Err(UnderwritingError::DuplicateProfile {
                customer_id: input.customer_id,
                policy_type: input.policy_type,
            });
        }

        let mut profile = RiskProfile::create(input)?;
        let events = profile.take_events();
        let stored = self.profiles.save(profile)?;
        self.publish_all(events)?;
        Ok(stored)
    }

    /// Re-derives risk factors from the profile's current attributes and
    /// recalculates its score.
    pub fn rescore_profile(&self, id: &ProfileId) -> Result<RiskProfile, UnderwritingError> {
        let mut profile = self.require_profile(id)?;
        let factors = self.scoring.derive_factors(&profile);
        let score = self.scoring.calculate_score(&profile);
        profile.update_risk_factors(factors);
        profile.update_risk_score(score);

        let events = profile.take_events();
        let stored = self.profiles.save(profile)?;
        self.publish_all(events)?;
        Ok(stored)
    }

    pub fn update_driving_history(
        &self,
        id: &ProfileId,
        history: DrivingHistory,
    ) -> Result<RiskProfile, UnderwritingError> {
        let mut profile = self.require_profile(id)?;
        profile.update_driving_history(history);

        let events = profile.take_events();
        let stored = self.profiles.save(profile)?;
        self.publish_all(events)?;
        Ok(stored)
    }

    pub fn update_personal_info(
        &self,
        id: &ProfileId,
        address: Address,
        age: Option<u8>,
        occupation: Option<String>,
        annual_income: Option<Decimal>,
    ) -> Result<RiskProfile, UnderwritingError> {
        let mut profile = self.require_profile(id)?;
        profile.update_personal_info(address, age, occupation, annual_income)?;

        let events = profile.take_events();
        let stored = self.profiles.save(profile)?;
        self.publish_all(events)?;
        Ok(stored)
    }

    /// Opens an assessment for the profile, seeding it with the base premium
    /// for the profile's policy type.
    pub fn start_assessment(
        &self,
        profile_id: &ProfileId,
        assessor_id: AssessorId,
    ) -> Result<RiskAssessment, UnderwritingError> {
        let profile = self.require_profile(profile_id)?;
        let base = self.pricing.base_premium(profile.policy_type());
        let mut assessment =
            RiskAssessment::start(profile.id(), profile.policy_type(), base, assessor_id)?;

        let events = assessment.take_events();
        let stored = self.assessments.save(assessment)?;
        self.publish_all(events)?;
        Ok(stored)
    }

    /// Scores the underlying profile and seals the assessment: completed with
    /// a priced premium when the profile is insurable, rejected otherwise.
    pub fn complete_assessment(
        &self,
        assessment_id: &AssessmentId,
        notes: Option<String>,
    ) -> Result<RiskAssessment, UnderwritingError> {
        let mut assessment = self.require_assessment(assessment_id)?;
        let profile = self.require_profile(&assessment.profile_id())?;

        let factors = self.scoring.derive_factors(&profile);
        let score = self.scoring.calculate_score(&profile);

        if self.pricing.is_insurable(score, &factors) {
            let multiplier = self.pricing.risk_multiplier(score, &factors);
            assessment.complete(score, factors, multiplier, notes)?;
        } else {
            assessment.reject(format!(
                "profile is uninsurable at score {}",
                score.value()
            ))?;
        }

        let events = assessment.take_events();
        let stored = self.assessments.save(assessment)?;
        self.publish_all(events)?;
        Ok(stored)
    }

    /// Rejects an in-progress assessment for an operational reason, without
    /// scoring the profile.
    pub fn reject_assessment(
        &self,
        assessment_id: &AssessmentId,
        reason: String,
    ) -> Result<RiskAssessment, UnderwritingError> {
        let mut assessment = self.require_assessment(assessment_id)?;
        assessment.reject(reason)?;

        let events = assessment.take_events();
        let stored = self.assessments.save(assessment)?;
        self.publish_all(events)?;
        Ok(stored)
    }

    /// Runs the full quote pipeline for a profile: start an assessment, seal
    /// it, and flatten the result for presentation.
    pub fn quote(
        &self,
        profile_id: &ProfileId,
        assessor_id: AssessorId,
        notes: Option<String>,
    ) -> Result<QuoteOutcome, UnderwritingError> {
        let started = self.start_assessment(profile_id, assessor_id)?;
        let sealed = self.complete_assessment(&started.id(), notes)?;
        Ok(self.quote_view(&sealed))
    }

    pub fn profile(&self, id: &ProfileId) -> Result<RiskProfile, UnderwritingError> {
        self.require_profile(id)
    }

    pub fn assessment(&self, id: &AssessmentId) -> Result<RiskAssessment, UnderwritingError> {
        self.require_assessment(id)
    }

    pub fn assessments_for_profile(
        &self,
        profile_id: &ProfileId,
    ) -> Result<Vec<RiskAssessment>, UnderwritingError> {
        Ok(self.assessments.find_by_profile_id(profile_id)?)
    }

    pub fn high_risk_profiles(&self) -> Result<Vec<RiskProfile>, UnderwritingError> {
        Ok(self.profiles.find_high_risk()?)
    }

    /// Assessments still in progress that were opened before the cutoff.
    pub fn stale_assessments(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<RiskAssessment>, UnderwritingError> {
        Ok(self.assessments.find_pending_older_than(cutoff)?)
    }

    fn quote_view(&self, assessment: &RiskAssessment) -> QuoteOutcome {
        let insurable = assessment.status() == AssessmentStatus::Completed;
        let score = assessment.calculated_risk_score();
        let factors = assessment.assessed_factors();

        let (discount, annual) = match (insurable, score, assessment.final_premium()) {
            (true, Some(score), Some(premium)) => (
                self.pricing.discount_percentage(score, factors),
                Some(self.pricing.annual_premium(premium)),
            ),
            _ => (0, None),
        };

        QuoteOutcome {
            assessment_id: assessment.id(),
            profile_id: assessment.profile_id(),
            status: assessment.status().label(),
            risk_score: score.map(|s| s.value()),
            risk_category: score.map(|s| s.category().label()),
            factors: factors
                .iter()
                .map(|factor| FactorView {
                    kind: factor.kind().label(),
                    description: factor.description().to_string(),
                    impact: factor.impact(),
                })
                .collect(),
            base_premium: assessment.base_premium(),
            risk_multiplier: assessment.risk_multiplier(),
            final_premium: assessment.final_premium(),
            discount_percentage: discount,
            annual_premium: annual,
            insurable,
            notes: assessment.notes().map(str::to_string),
        }
    }

    fn require_profile(&self, id: &ProfileId) -> Result<RiskProfile, UnderwritingError> {
        self.profiles
            .find_by_id(id)?
            .ok_or(UnderwritingError::ProfileNotFound(*id))
    }

    fn require_assessment(&self, id: &AssessmentId) -> Result<RiskAssessment, UnderwritingError> {
        self.assessments
            .find_by_id(id)?
            .ok_or(UnderwritingError::AssessmentNotFound(*id))
    }

    fn publish_all(&self, events: Vec<UnderwritingEvent>) -> Result<(), UnderwritingError> {
        for event in events {
            self.publisher.publish(event)?;
        }
        Ok(())
    }
}
