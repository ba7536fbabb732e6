use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use super::domain::{PolicyType, RiskFactor, RiskScore};

const MULTIPLIER_FLOOR: Decimal = dec!(0.5);
const MULTIPLIER_CEILING: Decimal = dec!(3.0);
const UNINSURABLE_SCORE_CUTOFF: u16 = 350;
const UNINSURABLE_IMPACT_CUTOFF: Decimal = dec!(2.0);
const ANNUAL_PREPAY_FACTOR: Decimal = dec!(0.98);
const DISCOUNT_CAP: u8 = 25;

/// Stateless premium calculator: base rates per policy line, a score-banded
/// multiplier compounded by factor impacts, and the insurability gate.
#[derive(Debug, Default)]
pub struct PricingEngine;

impl PricingEngine {
    pub fn new() -> Self {
        Self
    }

    /// Monthly base premium for the policy line, before risk adjustment.
    pub fn base_premium(&self, policy_type: PolicyType) -> Decimal {
        match policy_type {
            PolicyType::Auto => dec!(150.00),
            PolicyType::Home => dec!(100.00),
            PolicyType::Life => dec!(75.00),
            PolicyType::Health => dec!(400.00),
            PolicyType::Business => dec!(500.00),
        }
    }

    /// Score-banded multiplier compounded by every factor impact, clamped to
    /// [0.5, 3.0] and rounded to three decimal places.
    pub fn risk_multiplier(&self, score: RiskScore, factors: &[RiskFactor]) -> Decimal {
        let mut multiplier = band_multiplier(score.value());
        for factor in factors {
            multiplier *= factor.impact();
        }
        multiplier
            .clamp(MULTIPLIER_FLOOR, MULTIPLIER_CEILING)
            .round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero)
    }

    pub fn final_premium(&self, base_premium: Decimal, multiplier: Decimal) -> Decimal {
        (base_premium * multiplier)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Coverage is declined below a score of 350 or when any single factor
    /// carries an impact of 2.0 or more.
    pub fn is_insurable(&self, score: RiskScore, factors: &[RiskFactor]) -> bool {
        score.value() >= UNINSURABLE_SCORE_CUTOFF
            && factors
                .iter()
                .all(|factor| factor.impact() < UNINSURABLE_IMPACT_CUTOFF)
    }

    /// Percentage discount for strong scores, plus a mitigation bonus when
    /// any factor reduces risk. Capped at 25.
    pub fn discount_percentage(&self, score: RiskScore, factors: &[RiskFactor]) -> u8 {
        let mut discount: u8 = match score.value() {
            value if value >= 750 => 15,
            value if value >= 700 => 10,
            value if value >= 650 => 5,
            _ => 0,
        };
        if factors.iter().any(RiskFactor::decreases_risk) {
            discount += 5;
        }
        discount.min(DISCOUNT_CAP)
    }

    /// Yearly premium when paid up front: twelve months less a two percent
    /// prepayment discount.
    pub fn annual_premium(&self, monthly_premium: Decimal) -> Decimal {
        (monthly_premium * dec!(12) * ANNUAL_PREPAY_FACTOR)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

fn band_multiplier(score: u16) -> Decimal {
    match score {
        value if value >= 750 => dec!(0.80),
        value if value >= 700 => dec!(0.90),
        value if value >= 650 => dec!(0.95),
        value if value >= 600 => dec!(1.00),
        value if value >= 550 => dec!(1.10),
        value if value >= 500 => dec!(1.25),
        value if value >= 450 => dec!(1.50),
        value if value >= 400 => dec!(1.75),
        _ => dec!(2.00),
    }
}
