use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use super::assessment::RiskAssessment;
use super::domain::{AssessmentId, AssessmentStatus, AssessorId, CustomerId, PolicyType, ProfileId};
use super::events::UnderwritingEvent;
use super::profile::RiskProfile;
use super::repository::{
    AssessmentRepository, EventPublisher, ProfileRepository, PublishError, RepositoryError,
};

/// Mutex-backed profile store used by the demo binary and tests. Real
/// persistence adapters live outside this crate.
#[derive(Default, Clone)]
pub struct InMemoryProfileRepository {
    records: Arc<Mutex<HashMap<ProfileId, RiskProfile>>>,
}

impl ProfileRepository for InMemoryProfileRepository {
    fn save(&self, profile: RiskProfile) -> Result<RiskProfile, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        match guard.get(&profile.id()) {
            Some(existing) if existing.version() != profile.version() => {
                return Err(RepositoryError::VersionConflict {
                    stored: existing.version(),
                    submitted: profile.version(),
                });
            }
            Some(_) => {}
            None => {
                let duplicate = guard.values().any(|stored| {
                    stored.customer_id() == profile.customer_id()
                        && stored.policy_type() == profile.policy_type()
                });
                if duplicate {
                    return Err(RepositoryError::Conflict);
                }
            }
        }

        let mut stored = profile;
        stored.set_version(stored.version() + 1);
        guard.insert(stored.id(), stored.clone());
        Ok(stored)
    }

    fn find_by_id(&self, id: &ProfileId) -> Result<Option<RiskProfile>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn find_by_customer_id(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<RiskProfile>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|profile| profile.customer_id() == customer_id)
            .cloned()
            .collect())
    }

    fn find_by_customer_id_and_type(
        &self,
        customer_id: &CustomerId,
        policy_type: PolicyType,
    ) -> Result<Option<RiskProfile>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .find(|profile| {
                profile.customer_id() == customer_id && profile.policy_type() == policy_type
            })
            .cloned())
    }

    fn exists_by_customer_id_and_type(
        &self,
        customer_id: &CustomerId,
        policy_type: PolicyType,
    ) -> Result<bool, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().any(|profile| {
            profile.customer_id() == customer_id && profile.policy_type() == policy_type
        }))
    }

    fn find_by_type(&self, policy_type: PolicyType) -> Result<Vec<RiskProfile>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|profile| profile.policy_type() == policy_type)
            .cloned()
            .collect())
    }

    fn find_high_risk(&self) -> Result<Vec<RiskProfile>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|profile| profile.current_score().is_high_risk())
            .cloned()
            .collect())
    }

    fn delete(&self, id: &ProfileId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn find_all(&self) -> Result<Vec<RiskProfile>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

/// Mutex-backed assessment store with the same versioning rules as the
/// profile store.
#[derive(Default, Clone)]
pub struct InMemoryAssessmentRepository {
    records: Arc<Mutex<HashMap<AssessmentId, RiskAssessment>>>,
}

impl AssessmentRepository for InMemoryAssessmentRepository {
    fn save(&self, assessment: RiskAssessment) -> Result<RiskAssessment, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if let Some(existing) = guard.get(&assessment.id()) {
            if existing.version() != assessment.version() {
                return Err(RepositoryError::VersionConflict {
                    stored: existing.version(),
                    submitted: assessment.version(),
                });
            }
        }

        let mut stored = assessment;
        stored.set_version(stored.version() + 1);
        guard.insert(stored.id(), stored.clone());
        Ok(stored)
    }

    fn find_by_id(&self, id: &AssessmentId) -> Result<Option<RiskAssessment>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn find_by_profile_id(
        &self,
        profile_id: &ProfileId,
    ) -> Result<Vec<RiskAssessment>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|assessment| assessment.profile_id() == *profile_id)
            .cloned()
            .collect())
    }

    fn find_most_recent_by_profile_id(
        &self,
        profile_id: &ProfileId,
    ) -> Result<Option<RiskAssessment>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|assessment| assessment.profile_id() == *profile_id)
            .max_by_key(|assessment| assessment.created_at())
            .cloned())
    }

    fn find_by_status(
        &self,
        status: AssessmentStatus,
    ) -> Result<Vec<RiskAssessment>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|assessment| assessment.status() == status)
            .cloned()
            .collect())
    }

    fn find_by_policy_type(
        &self,
        policy_type: PolicyType,
    ) -> Result<Vec<RiskAssessment>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|assessment| assessment.policy_type() == policy_type)
            .cloned()
            .collect())
    }

    fn find_by_assessor_id(
        &self,
        assessor_id: &AssessorId,
    ) -> Result<Vec<RiskAssessment>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|assessment| assessment.assessor_id() == assessor_id)
            .cloned()
            .collect())
    }

    fn find_by_created_at_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RiskAssessment>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|assessment| assessment.created_at() >= start && assessment.created_at() <= end)
            .cloned()
            .collect())
    }

    fn find_pending_older_than(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<RiskAssessment>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|assessment| {
                assessment.status() == AssessmentStatus::InProgress
                    && assessment.created_at() < cutoff
            })
            .cloned()
            .collect())
    }

    fn count_by_status(&self, status: AssessmentStatus) -> Result<usize, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|assessment| assessment.status() == status)
            .count())
    }

    fn delete(&self, id: &AssessmentId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn find_all(&self) -> Result<Vec<RiskAssessment>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

/// Capturing publisher standing in for the external event bus.
#[derive(Default, Clone)]
pub struct InMemoryEventPublisher {
    events: Arc<Mutex<Vec<UnderwritingEvent>>>,
}

impl InMemoryEventPublisher {
    pub fn events(&self) -> Vec<UnderwritingEvent> {
        self.events.lock().expect("publisher mutex poisoned").clone()
    }
}

impl EventPublisher for InMemoryEventPublisher {
    fn publish(&self, event: UnderwritingEvent) -> Result<(), PublishError> {
        self.events
            .lock()
            .expect("publisher mutex poisoned")
            .push(event);
        Ok(())
    }
}
