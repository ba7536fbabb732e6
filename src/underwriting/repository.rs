use chrono::{DateTime, Utc};

use super::assessment::RiskAssessment;
use super::domain::{AssessmentId, AssessmentStatus, AssessorId, CustomerId, PolicyType, ProfileId};
use super::events::UnderwritingEvent;
use super::profile::RiskProfile;

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("version conflict: stored {stored}, submitted {submitted}")]
    VersionConflict { stored: u64, submitted: u64 },
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Storage contract for risk profiles. Implementations must enforce the
/// (customer, policy type) uniqueness index and optimistic versioning:
/// `save` compares the submitted aggregate's version against the stored one,
/// fails with `VersionConflict` on a mismatch, and returns the stored copy
/// carrying version + 1.
pub trait ProfileRepository: Send + Sync {
    fn save(&self, profile: RiskProfile) -> Result<RiskProfile, RepositoryError>;
    fn find_by_id(&self, id: &ProfileId) -> Result<Option<RiskProfile>, RepositoryError>;
    fn find_by_customer_id(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<RiskProfile>, RepositoryError>;
    fn find_by_customer_id_and_type(
        &self,
        customer_id: &CustomerId,
        policy_type: PolicyType,
    ) -> Result<Option<RiskProfile>, RepositoryError>;
    fn exists_by_customer_id_and_type(
        &self,
        customer_id: &CustomerId,
        policy_type: PolicyType,
    ) -> Result<bool, RepositoryError>;
    fn find_by_type(&self, policy_type: PolicyType) -> Result<Vec<RiskProfile>, RepositoryError>;
    /// Profiles whose current score classifies High or VeryHigh.
    fn find_high_risk(&self) -> Result<Vec<RiskProfile>, RepositoryError>;
    fn delete(&self, id: &ProfileId) -> Result<(), RepositoryError>;
    fn find_all(&self) -> Result<Vec<RiskProfile>, RepositoryError>;
}

/// Storage contract for risk assessments, with the same versioning rules as
/// `ProfileRepository`.
pub trait AssessmentRepository: Send + Sync {
    fn save(&self, assessment: RiskAssessment) -> Result<RiskAssessment, RepositoryError>;
    fn find_by_id(&self, id: &AssessmentId) -> Result<Option<RiskAssessment>, RepositoryError>;
    fn find_by_profile_id(
        &self,
        profile_id: &ProfileId,
    ) -> Result<Vec<RiskAssessment>, RepositoryError>;
    fn find_most_recent_by_profile_id(
        &self,
        profile_id: &ProfileId,
    ) -> Result<Option<RiskAssessment>, RepositoryError>;
    fn find_by_status(
        &self,
        status: AssessmentStatus,
    ) -> Result<Vec<RiskAssessment>, RepositoryError>;
    fn find_by_policy_type(
        &self,
        policy_type: PolicyType,
    ) -> Result<Vec<RiskAssessment>, RepositoryError>;
    fn find_by_assessor_id(
        &self,
        assessor_id: &AssessorId,
    ) -> Result<Vec<RiskAssessment>, RepositoryError>;
    fn find_by_created_at_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RiskAssessment>, RepositoryError>;
    /// Assessments still `InProgress` that were created before the cutoff.
    fn find_pending_older_than(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<RiskAssessment>, RepositoryError>;
    fn count_by_status(&self, status: AssessmentStatus) -> Result<usize, RepositoryError>;
    fn delete(&self, id: &AssessmentId) -> Result<(), RepositoryError>;
    fn find_all(&self) -> Result<Vec<RiskAssessment>, RepositoryError>;
}

/// Trait describing the outbound event bus hook.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: UnderwritingEvent) -> Result<(), PublishError>;
}

/// Event dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("event transport unavailable: {0}")]
    Transport(String),
}
