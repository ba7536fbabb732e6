//! Risk scoring and premium pricing for insurance underwriting.
//!
//! Customer risk profiles are scored from driving history, demographics and
//! location, then priced into policy premiums through assessments. Profiles
//! and assessments are event-sourcing-friendly aggregates: state changes
//! buffer [`events::UnderwritingEvent`]s that the service layer publishes
//! once the owning repository accepts the write.

pub mod assessment;
pub mod domain;
pub mod events;
pub mod memory;
pub mod pricing;
pub mod profile;
pub mod repository;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use assessment::{AssessmentError, RiskAssessment};
pub use domain::{
    Address, AssessmentId, AssessmentStatus, AssessorId, CustomerId, DrivingHistory, FactorKind,
    PolicyType, ProfileId, RiskCategory, RiskFactor, RiskScore, ValidationError,
};
pub use events::UnderwritingEvent;
pub use memory::{InMemoryAssessmentRepository, InMemoryEventPublisher, InMemoryProfileRepository};
pub use pricing::PricingEngine;
pub use profile::{NewProfile, RiskProfile};
pub use repository::{
    AssessmentRepository, EventPublisher, ProfileRepository, PublishError, RepositoryError,
};
pub use scoring::ScoringEngine;
pub use service::{FactorView, QuoteOutcome, UnderwritingError, UnderwritingService};
