use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use super::super::domain::{FactorKind, RiskFactor, RiskScore};
use super::super::profile::RiskProfile;

const HIGH_RISK_STATES: [&str; 3] = ["CA", "NY", "FL"];
const LOW_RISK_STATES: [&str; 3] = ["ND", "SD", "WY"];

const HAZARDOUS_OCCUPATIONS: [(&str, Decimal); 3] = [
    ("driver", dec!(1.4)),
    ("pilot", dec!(1.3)),
    ("construction", dec!(1.2)),
];
const LOW_RISK_OCCUPATIONS: [&str; 3] = ["teacher", "accountant", "engineer"];

const SCORE_BASELINE: Decimal = dec!(500);
const SCORE_FLOOR: Decimal = dec!(300);
const SCORE_CEILING: Decimal = dec!(850);

pub(crate) fn derive_factors(profile: &RiskProfile) -> Vec<RiskFactor> {
    let mut factors = Vec::new();

    match profile.age() {
        Some(age) if age < 25 => {
            factors.push(factor(
                FactorKind::Demographic,
                "young driver".to_string(),
                dec!(1.2),
            ));
        }
        Some(age) if age > 65 => {
            factors.push(factor(
                FactorKind::Demographic,
                "senior driver".to_string(),
                dec!(1.1),
            ));
        }
        _ => {}
    }

    let history = profile.driving_history();
    if history.accidents > 0 {
        let impact = Decimal::ONE + dec!(0.3) * Decimal::from(history.accidents);
        factors.push(factor(
            FactorKind::DrivingHistory,
            format!("{} at-fault accident(s) on record", history.accidents),
            impact,
        ));
    }
    if history.violations > 0 {
        let impact = Decimal::ONE + dec!(0.2) * Decimal::from(history.violations);
        factors.push(factor(
            FactorKind::DrivingHistory,
            format!("{} moving violation(s) on record", history.violations),
            impact,
        ));
    }
    if matches!(history.years_of_experience, Some(years) if years < 2) {
        factors.push(factor(
            FactorKind::DrivingHistory,
            "limited driving experience".to_string(),
            dec!(1.3),
        ));
    }

    if let Some(occupation) = profile.occupation() {
        let lowered = occupation.to_lowercase();
        for (keyword, impact) in HAZARDOUS_OCCUPATIONS {
            if lowered.contains(keyword) {
                factors.push(factor(
                    FactorKind::Occupation,
                    format!("hazardous occupation: {keyword}"),
                    impact,
                ));
                break;
            }
        }
    }

    let state = profile.address().state().to_ascii_uppercase();
    if HIGH_RISK_STATES.contains(&state.as_str()) {
        factors.push(factor(
            FactorKind::Location,
            format!("high-risk state: {state}"),
            dec!(1.2),
        ));
    } else if LOW_RISK_STATES.contains(&state.as_str()) {
        factors.push(factor(
            FactorKind::Location,
            format!("low-risk state: {state}"),
            dec!(0.9),
        ));
    }

    factors
}

pub(crate) fn calculate_score(profile: &RiskProfile) -> RiskScore {
    let mut score = SCORE_BASELINE;

    match profile.age() {
        Some(age) if age < 25 => score -= dec!(50),
        Some(age) if age <= 65 => score += dec!(25),
        Some(_) => score -= dec!(25),
        None => {}
    }

    let history = profile.driving_history();
    score -= dec!(75) * Decimal::from(history.accidents);
    score -= dec!(50) * Decimal::from(history.violations);
    match history.years_of_experience {
        Some(years) if years >= 10 => score += dec!(50),
        Some(years) if years < 2 => score -= dec!(75),
        _ => {}
    }

    // Whole-string match here; factor derivation matches substrings.
    if let Some(occupation) = profile.occupation() {
        let lowered = occupation.to_lowercase();
        if HAZARDOUS_OCCUPATIONS
            .iter()
            .any(|(keyword, _)| lowered == *keyword)
        {
            score -= dec!(40);
        } else if LOW_RISK_OCCUPATIONS.contains(&lowered.as_str()) {
            score += dec!(30);
        }
    }

    match profile.annual_income() {
        Some(income) if income >= dec!(100000) => score += dec!(25),
        Some(income) if income < dec!(30000) => score -= dec!(25),
        _ => {}
    }

    // Derived impacts stack on top of the direct adjustments above.
    for factor in derive_factors(profile) {
        score += (factor.impact() - Decimal::ONE) * dec!(-100);
    }

    let state = profile.address().state().to_ascii_uppercase();
    if HIGH_RISK_STATES.contains(&state.as_str()) {
        score -= dec!(30);
    } else if LOW_RISK_STATES.contains(&state.as_str()) {
        score += dec!(30);
    }

    let bounded = score
        .clamp(SCORE_FLOOR, SCORE_CEILING)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    bounded
        .to_u16()
        .and_then(|value| RiskScore::new(value).ok())
        .expect("a score clamped to 300..=850 is always a valid RiskScore")
}

fn factor(kind: FactorKind, description: String, impact: Decimal) -> RiskFactor {
    RiskFactor::new(kind, description, impact).expect("rule factors are well formed")
}
