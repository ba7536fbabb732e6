use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal_macros::dec;

use crate::underwriting::assessment::RiskAssessment;
use crate::underwriting::domain::{
    Address, AssessmentId, AssessmentStatus, AssessorId, CustomerId, DrivingHistory, PolicyType,
    ProfileId,
};
use crate::underwriting::events::UnderwritingEvent;
use crate::underwriting::memory::{
    InMemoryAssessmentRepository, InMemoryEventPublisher, InMemoryProfileRepository,
};
use crate::underwriting::profile::{NewProfile, RiskProfile};
use crate::underwriting::repository::{
    AssessmentRepository, EventPublisher, ProfileRepository, PublishError, RepositoryError,
};
use crate::underwriting::service::UnderwritingService;

pub(super) fn address(state: &str) -> Address {
    Address::new(
        "742 Prairie Lane".to_string(),
        "Fargo".to_string(),
        state.to_string(),
        "58102".to_string(),
        "USA".to_string(),
    )
    .expect("valid address")
}

pub(super) fn driving_history(
    accidents: u32,
    violations: u32,
    years_of_experience: Option<u32>,
) -> DrivingHistory {
    DrivingHistory::new(accidents, violations, years_of_experience, None)
}

pub(super) fn new_profile(customer: &str, policy_type: PolicyType) -> NewProfile {
    NewProfile {
        customer_id: CustomerId(customer.to_string()),
        policy_type,
        driving_history: driving_history(0, 0, Some(10)),
        address: address("ND"),
        age: Some(30),
        occupation: Some("Software Engineer".to_string()),
        annual_income: Some(dec!(75000)),
    }
}

/// Clean-record applicant that scores 615 under the current rules.
pub(super) fn baseline_profile() -> RiskProfile {
    RiskProfile::create(new_profile("CUST-1001", PolicyType::Auto)).expect("valid profile")
}

/// Applicant whose accident factor alone disqualifies them, and whose score
/// bottoms out at the floor.
pub(super) fn uninsurable_input() -> NewProfile {
    NewProfile {
        customer_id: CustomerId("CUST-9099".to_string()),
        policy_type: PolicyType::Auto,
        driving_history: driving_history(4, 3, Some(1)),
        address: address("CA"),
        age: Some(19),
        occupation: Some("Delivery Driver".to_string()),
        annual_income: Some(dec!(20000)),
    }
}

pub(super) fn uninsurable_profile() -> RiskProfile {
    RiskProfile::create(uninsurable_input()).expect("valid profile")
}

pub(super) fn assessor() -> AssessorId {
    AssessorId("uw-42".to_string())
}

pub(super) type MemoryService =
    UnderwritingService<InMemoryProfileRepository, InMemoryAssessmentRepository, InMemoryEventPublisher>;

pub(super) fn build_service() -> (
    MemoryService,
    Arc<InMemoryProfileRepository>,
    Arc<InMemoryAssessmentRepository>,
    Arc<InMemoryEventPublisher>,
) {
    let profiles = Arc::new(InMemoryProfileRepository::default());
    let assessments = Arc::new(InMemoryAssessmentRepository::default());
    let publisher = Arc::new(InMemoryEventPublisher::default());
    let service =
        UnderwritingService::new(profiles.clone(), assessments.clone(), publisher.clone());
    (service, profiles, assessments, publisher)
}

pub(super) struct UnavailableProfileRepository;

impl ProfileRepository for UnavailableProfileRepository {
    fn save(&self, _profile: RiskProfile) -> Result<RiskProfile, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_by_id(&self, _id: &ProfileId) -> Result<Option<RiskProfile>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_by_customer_id(
        &self,
        _customer_id: &CustomerId,
    ) -> Result<Vec<RiskProfile>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_by_customer_id_and_type(
        &self,
        _customer_id: &CustomerId,
        _policy_type: PolicyType,
    ) -> Result<Option<RiskProfile>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn exists_by_customer_id_and_type(
        &self,
        _customer_id: &CustomerId,
        _policy_type: PolicyType,
    ) -> Result<bool, RepositoryError> {
        Ok(false)
    }

    fn find_by_type(&self, _policy_type: PolicyType) -> Result<Vec<RiskProfile>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_high_risk(&self) -> Result<Vec<RiskProfile>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: &ProfileId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_all(&self) -> Result<Vec<RiskProfile>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct FailingPublisher;

impl EventPublisher for FailingPublisher {
    fn publish(&self, _event: UnderwritingEvent) -> Result<(), PublishError> {
        Err(PublishError::Transport("bus offline".to_string()))
    }
}

/// Assessment store whose writes always fail, for exercising the
/// publish-after-commit ordering.
pub(super) struct UnavailableAssessmentRepository;

impl AssessmentRepository for UnavailableAssessmentRepository {
    fn save(&self, _assessment: RiskAssessment) -> Result<RiskAssessment, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_by_id(&self, _id: &AssessmentId) -> Result<Option<RiskAssessment>, RepositoryError> {
        Ok(None)
    }

    fn find_by_profile_id(
        &self,
        _profile_id: &ProfileId,
    ) -> Result<Vec<RiskAssessment>, RepositoryError> {
        Ok(Vec::new())
    }

    fn find_most_recent_by_profile_id(
        &self,
        _profile_id: &ProfileId,
    ) -> Result<Option<RiskAssessment>, RepositoryError> {
        Ok(None)
    }

    fn find_by_status(
        &self,
        _status: AssessmentStatus,
    ) -> Result<Vec<RiskAssessment>, RepositoryError> {
        Ok(Vec::new())
    }

    fn find_by_policy_type(
        &self,
        _policy_type: PolicyType,
    ) -> Result<Vec<RiskAssessment>, RepositoryError> {
        Ok(Vec::new())
    }

    fn find_by_assessor_id(
        &self,
        _assessor_id: &AssessorId,
    ) -> Result<Vec<RiskAssessment>, RepositoryError> {
        Ok(Vec::new())
    }

    fn find_by_created_at_between(
        &self,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Vec<RiskAssessment>, RepositoryError> {
        Ok(Vec::new())
    }

    fn find_pending_older_than(
        &self,
        _cutoff: DateTime<Utc>,
    ) -> Result<Vec<RiskAssessment>, RepositoryError> {
        Ok(Vec::new())
    }

    fn count_by_status(&self, _status: AssessmentStatus) -> Result<usize, RepositoryError> {
        Ok(0)
    }

    fn delete(&self, _id: &AssessmentId) -> Result<(), RepositoryError> {
        Err(RepositoryError::NotFound)
    }

    fn find_all(&self) -> Result<Vec<RiskAssessment>, RepositoryError> {
        Ok(Vec::new())
    }
}
