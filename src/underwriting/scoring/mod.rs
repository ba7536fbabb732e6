mod rules;

use super::domain::{RiskFactor, RiskScore};
use super::profile::RiskProfile;

/// Stateless engine applying the fixed underwriting rules to a profile's raw
/// attributes. Factor derivation explains the risk; score calculation rates
/// it. The two walk the same attributes independently and their overlaps are
/// part of the rating model.
#[derive(Debug, Default)]
pub struct ScoringEngine;

impl ScoringEngine {
    pub fn new() -> Self {
        Self
    }

    /// Derive the explainable factor set from the profile's attributes.
    pub fn derive_factors(&self, profile: &RiskProfile) -> Vec<RiskFactor> {
        rules::derive_factors(profile)
    }

    /// Compute the bounded risk score for the profile.
    pub fn calculate_score(&self, profile: &RiskProfile) -> RiskScore {
        rules::calculate_score(profile)
    }
}
