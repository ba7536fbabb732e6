use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier wrapper for risk profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProfileId(pub Uuid);

impl ProfileId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier wrapper for risk assessments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssessmentId(pub Uuid);

impl AssessmentId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for AssessmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Externally assigned customer identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub String);

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Externally assigned identifier of the underwriter handling an assessment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssessorId(pub String);

impl fmt::Display for AssessorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Validation failures raised at construction or mutation time. The failing
/// aggregate or value is left unchanged.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("risk score {0} is outside 0..=1000")]
    ScoreOutOfRange(u16),
    #[error("factor impact must be greater than zero")]
    NonPositiveImpact,
    #[error("factor description must not be blank")]
    BlankFactorDescription,
    #[error("age {0} is outside 16..=120")]
    AgeOutOfBounds(u8),
    #[error("annual income must not be negative")]
    NegativeIncome,
    #[error("address {0} must not be blank")]
    BlankAddressField(&'static str),
    #[error("zip code '{0}' must match NNNNN or NNNNN-NNNN")]
    MalformedZip(String),
    #[error("base premium must be greater than zero")]
    NonPositiveBasePremium,
    #[error("risk multiplier must be greater than zero")]
    NonPositiveMultiplier,
}

/// Risk classification derived from a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskCategory {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl RiskCategory {
    pub const fn label(self) -> &'static str {
        match self {
            RiskCategory::Low => "low",
            RiskCategory::Medium => "medium",
            RiskCategory::High => "high",
            RiskCategory::VeryHigh => "very_high",
        }
    }

    /// Legacy per-category rate multiplier. Informational only; premium
    /// pricing computes its own multiplier from score bands and factors.
    pub const fn rate_multiplier(self) -> Decimal {
        match self {
            RiskCategory::Low => dec!(0.8),
            RiskCategory::Medium => dec!(1.0),
            RiskCategory::High => dec!(1.5),
            RiskCategory::VeryHigh => dec!(2.0),
        }
    }
}

const SCORE_MAX: u16 = 1000;
const DEFAULT_SCORE: u16 = 500;

/// Bounded risk rating in 0..=1000 with a derived category. Deserialization
/// goes through [`RiskScore::new`], so a persisted payload cannot smuggle an
/// out-of-range value past the bounds check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16")]
pub struct RiskScore(u16);

impl TryFrom<u16> for RiskScore {
    type Error = ValidationError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl RiskScore {
    pub fn new(value: u16) -> Result<Self, ValidationError> {
        if value > SCORE_MAX {
            return Err(ValidationError::ScoreOutOfRange(value));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u16 {
        self.0
    }

    pub fn category(self) -> RiskCategory {
        match self.0 {
            0..=200 => RiskCategory::Low,
            201..=500 => RiskCategory::Medium,
            501..=800 => RiskCategory::High,
            _ => RiskCategory::VeryHigh,
        }
    }

    pub fn rate_multiplier(self) -> Decimal {
        self.category().rate_multiplier()
    }

    pub fn is_high_risk(self) -> bool {
        matches!(self.category(), RiskCategory::High | RiskCategory::VeryHigh)
    }
}

/// Medium placeholder assigned to profiles awaiting their first scoring pass.
impl Default for RiskScore {
    fn default() -> Self {
        Self(DEFAULT_SCORE)
    }
}

impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Categories a risk factor can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FactorKind {
    Demographic,
    DrivingHistory,
    Location,
    Occupation,
    Vehicle,
    Financial,
    Health,
    Property,
    Business,
    Other,
}

impl FactorKind {
    pub const fn label(self) -> &'static str {
        match self {
            FactorKind::Demographic => "demographic",
            FactorKind::DrivingHistory => "driving_history",
            FactorKind::Location => "location",
            FactorKind::Occupation => "occupation",
            FactorKind::Vehicle => "vehicle",
            FactorKind::Financial => "financial",
            FactorKind::Health => "health",
            FactorKind::Property => "property",
            FactorKind::Business => "business",
            FactorKind::Other => "other",
        }
    }
}

/// Named, weighted contributor to a risk score. Identity is (kind,
/// description); the impact carried at insertion time does not participate
/// in equality or hashing. Deserialization re-runs [`RiskFactor::new`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RiskFactorRecord")]
pub struct RiskFactor {
    kind: FactorKind,
    description: String,
    impact: Decimal,
}

/// Raw wire shape of a factor, validated on the way in.
#[derive(Deserialize)]
struct RiskFactorRecord {
    kind: FactorKind,
    description: String,
    impact: Decimal,
}

impl TryFrom<RiskFactorRecord> for RiskFactor {
    type Error = ValidationError;

    fn try_from(record: RiskFactorRecord) -> Result<Self, Self::Error> {
        Self::new(record.kind, record.description, record.impact)
    }
}

impl RiskFactor {
    pub fn new(
        kind: FactorKind,
        description: String,
        impact: Decimal,
    ) -> Result<Self, ValidationError> {
        if impact <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveImpact);
        }
        if description.trim().is_empty() {
            return Err(ValidationError::BlankFactorDescription);
        }
        Ok(Self {
            kind,
            description,
            impact,
        })
    }

    pub fn kind(&self) -> FactorKind {
        self.kind
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn impact(&self) -> Decimal {
        self.impact
    }

    pub fn increases_risk(&self) -> bool {
        self.impact > Decimal::ONE
    }

    pub fn decreases_risk(&self) -> bool {
        self.impact < Decimal::ONE
    }
}

impl PartialEq for RiskFactor {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.description == other.description
    }
}

impl Eq for RiskFactor {}

impl Hash for RiskFactor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.description.hash(state);
    }
}

/// Raw driving record consumed by scoring. Counts are structurally
/// non-negative; experience and license date may be unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrivingHistory {
    pub accidents: u32,
    pub violations: u32,
    pub years_of_experience: Option<u32>,
    pub license_date: Option<NaiveDate>,
}

impl DrivingHistory {
    pub fn new(
        accidents: u32,
        violations: u32,
        years_of_experience: Option<u32>,
        license_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            accidents,
            violations,
            years_of_experience,
            license_date,
        }
    }
}

/// Postal address snapshot used for location-based scoring. Deserialization
/// re-runs [`Address::new`], including the zip shape check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AddressRecord")]
pub struct Address {
    street: String,
    city: String,
    state: String,
    zip_code: String,
    country: String,
}

/// Raw wire shape of an address, validated on the way in.
#[derive(Deserialize)]
struct AddressRecord {
    street: String,
    city: String,
    state: String,
    zip_code: String,
    country: String,
}

impl TryFrom<AddressRecord> for Address {
    type Error = ValidationError;

    fn try_from(record: AddressRecord) -> Result<Self, Self::Error> {
        Self::new(
            record.street,
            record.city,
            record.state,
            record.zip_code,
            record.country,
        )
    }
}

impl Address {
    pub fn new(
        street: String,
        city: String,
        state: String,
        zip_code: String,
        country: String,
    ) -> Result<Self, ValidationError> {
        for (name, value) in [
            ("street", &street),
            ("city", &city),
            ("state", &state),
            ("zip code", &zip_code),
            ("country", &country),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::BlankAddressField(name));
            }
        }
        if !zip_code_is_valid(&zip_code) {
            return Err(ValidationError::MalformedZip(zip_code));
        }
        Ok(Self {
            street,
            city,
            state,
            zip_code,
            country,
        })
    }

    pub fn street(&self) -> &str {
        &self.street
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn zip_code(&self) -> &str {
        &self.zip_code
    }

    pub fn country(&self) -> &str {
        &self.country
    }
}

fn zip_code_is_valid(zip: &str) -> bool {
    let bytes = zip.as_bytes();
    match bytes.len() {
        5 => bytes.iter().all(u8::is_ascii_digit),
        10 => {
            bytes[5] == b'-'
                && bytes[..5].iter().all(u8::is_ascii_digit)
                && bytes[6..].iter().all(u8::is_ascii_digit)
        }
        _ => false,
    }
}

/// Insurance line a profile or assessment is priced against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolicyType {
    Auto,
    Home,
    Life,
    Health,
    Business,
}

impl PolicyType {
    pub const fn label(self) -> &'static str {
        match self {
            PolicyType::Auto => "auto",
            PolicyType::Home => "home",
            PolicyType::Life => "life",
            PolicyType::Health => "health",
            PolicyType::Business => "business",
        }
    }
}

/// Lifecycle status of a risk assessment. `OnHold` is declared for schema
/// compatibility; no transition currently produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssessmentStatus {
    InProgress,
    Completed,
    Rejected,
    OnHold,
}

impl AssessmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            AssessmentStatus::InProgress => "in_progress",
            AssessmentStatus::Completed => "completed",
            AssessmentStatus::Rejected => "rejected",
            AssessmentStatus::OnHold => "on_hold",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            AssessmentStatus::Completed | AssessmentStatus::Rejected
        )
    }
}
