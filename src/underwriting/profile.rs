use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::domain::{
    Address, CustomerId, DrivingHistory, PolicyType, ProfileId, RiskFactor, RiskScore,
    ValidationError,
};
use super::events::UnderwritingEvent;

/// Attributes supplied when opening a profile for a customer and policy line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProfile {
    pub customer_id: CustomerId,
    pub policy_type: PolicyType,
    pub driving_history: DrivingHistory,
    pub address: Address,
    pub age: Option<u8>,
    pub occupation: Option<String>,
    pub annual_income: Option<Decimal>,
}

/// Durable record of a customer's risk-relevant attributes and latest score
/// for one policy line. Mutated only through the explicit operations below;
/// scoring results are pushed in by the orchestration layer, never computed
/// here. Domain events accumulate in an outbox drained after persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskProfile {
    id: ProfileId,
    customer_id: CustomerId,
    policy_type: PolicyType,
    current_score: RiskScore,
    risk_factors: Vec<RiskFactor>,
    driving_history: DrivingHistory,
    address: Address,
    age: Option<u8>,
    occupation: Option<String>,
    annual_income: Option<Decimal>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: u64,
    #[serde(skip)]
    events: Vec<UnderwritingEvent>,
}

impl RiskProfile {
    /// Open a profile with the medium placeholder score, pending the first
    /// scoring pass.
    pub fn create(new_profile: NewProfile) -> Result<Self, ValidationError> {
        let NewProfile {
            customer_id,
            policy_type,
            driving_history,
            address,
            age,
            occupation,
            annual_income,
        } = new_profile;

        validate_age(age)?;
        validate_income(annual_income)?;

        let id = ProfileId::generate();
        let now = Utc::now();
        let mut profile = Self {
            id,
            customer_id: customer_id.clone(),
            policy_type,
            current_score: RiskScore::default(),
            risk_factors: Vec::new(),
            driving_history,
            address,
            age,
            occupation,
            annual_income,
            created_at: now,
            updated_at: now,
            version: 0,
            events: Vec::new(),
        };

        profile.events.push(UnderwritingEvent::ProfileCreated {
            profile_id: id,
            customer_id,
            profile_type: policy_type,
            occurred_at: now,
        });

        Ok(profile)
    }

    /// Replace the factor set wholesale. Duplicate identities (kind,
    /// description) collapse to the first occurrence.
    pub fn update_risk_factors(&mut self, factors: Vec<RiskFactor>) {
        let mut unique: Vec<RiskFactor> = Vec::with_capacity(factors.len());
        for factor in factors {
            if !unique.contains(&factor) {
                unique.push(factor);
            }
        }
        self.risk_factors = unique;
        self.touch();
    }

    pub fn update_risk_score(&mut self, score: RiskScore) {
        self.current_score = score;
        self.touch();
    }

    pub fn update_driving_history(&mut self, history: DrivingHistory) {
        self.driving_history = history;
        self.touch();
    }

    /// Replace address, age, occupation, and income wholesale, re-validating
    /// the age and income bounds.
    pub fn update_personal_info(
        &mut self,
        address: Address,
        age: Option<u8>,
        occupation: Option<String>,
        annual_income: Option<Decimal>,
    ) -> Result<(), ValidationError> {
        validate_age(age)?;
        validate_income(annual_income)?;

        self.address = address;
        self.age = age;
        self.occupation = occupation;
        self.annual_income = annual_income;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        let now = Utc::now();
        self.updated_at = now;
        self.events.push(UnderwritingEvent::ProfileUpdated {
            profile_id: self.id,
            customer_id: self.customer_id.clone(),
            occurred_at: now,
        });
    }

    /// Drain the buffered events. Callers publish them only after the
    /// aggregate has been persisted.
    pub fn take_events(&mut self) -> Vec<UnderwritingEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn id(&self) -> ProfileId {
        self.id
    }

    pub fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }

    pub fn policy_type(&self) -> PolicyType {
        self.policy_type
    }

    pub fn current_score(&self) -> RiskScore {
        self.current_score
    }

    pub fn risk_factors(&self) -> &[RiskFactor] {
        &self.risk_factors
    }

    pub fn driving_history(&self) -> &DrivingHistory {
        &self.driving_history
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn age(&self) -> Option<u8> {
        self.age
    }

    pub fn occupation(&self) -> Option<&str> {
        self.occupation.as_deref()
    }

    pub fn annual_income(&self) -> Option<Decimal> {
        self.annual_income
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Intended for repository adapters applying the optimistic-lock
    /// increment after a successful save.
    pub fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}

fn validate_age(age: Option<u8>) -> Result<(), ValidationError> {
    match age {
        Some(value) if !(16..=120).contains(&value) => Err(ValidationError::AgeOutOfBounds(value)),
        _ => Ok(()),
    }
}

fn validate_income(income: Option<Decimal>) -> Result<(), ValidationError> {
    match income {
        Some(value) if value < Decimal::ZERO => Err(ValidationError::NegativeIncome),
        _ => Ok(()),
    }
}
