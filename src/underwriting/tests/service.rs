use std::sync::Arc;

use rust_decimal_macros::dec;

use super::common::*;
use crate::underwriting::domain::{AssessmentId, AssessmentStatus, PolicyType, ProfileId};
use crate::underwriting::memory::{
    InMemoryAssessmentRepository, InMemoryEventPublisher, InMemoryProfileRepository,
};
use crate::underwriting::repository::{ProfileRepository, PublishError, RepositoryError};
use crate::underwriting::service::{UnderwritingError, UnderwritingService};

#[test]
fn create_profile_persists_and_publishes_the_creation_event() {
    let (service, profiles, _assessments, publisher) = build_service();

    let profile = service
        .create_profile(new_profile("CUST-1001", PolicyType::Auto))
        .expect("profile created");

    assert_eq!(profile.version(), 1, "stored copy carries the new version");
    assert!(profiles
        .find_by_id(&profile.id())
        .expect("lookup succeeds")
        .is_some());

    let events = publisher.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type(), "ProfileCreated");
}

#[test]
fn create_profile_rejects_a_second_profile_for_the_same_line() {
    let (service, _profiles, _assessments, _publisher) = build_service();

    service
        .create_profile(new_profile("CUST-1001", PolicyType::Auto))
        .expect("first profile created");

    match service.create_profile(new_profile("CUST-1001", PolicyType::Auto)) {
        Err(UnderwritingError::DuplicateProfile {
            customer_id,
            policy_type,
        }) => {
            assert_eq!(customer_id.0, "CUST-1001");
            assert_eq!(policy_type, PolicyType::Auto);
        }
        other => panic!("expected duplicate profile error, got {other:?}"),
    }

    service
        .create_profile(new_profile("CUST-1001", PolicyType::Home))
        .expect("other lines remain open");
}

#[test]
fn rescore_profile_stores_the_derived_factors_and_score() {
    let (service, profiles, _assessments, publisher) = build_service();

    let created = service
        .create_profile(new_profile("CUST-1001", PolicyType::Auto))
        .expect("profile created");
    let rescored = service
        .rescore_profile(&created.id())
        .expect("rescore succeeds");

    assert_eq!(rescored.current_score().value(), 615);
    assert_eq!(rescored.risk_factors().len(), 1);
    assert_eq!(rescored.risk_factors()[0].description(), "low-risk state: ND");
    assert_eq!(rescored.version(), 2);

    let stored = profiles
        .find_by_id(&created.id())
        .expect("lookup succeeds")
        .expect("profile present");
    assert_eq!(stored.current_score().value(), 615);

    let kinds: Vec<_> = publisher
        .events()
        .iter()
        .map(|event| event.event_type())
        .collect();
    assert_eq!(kinds, ["ProfileCreated", "ProfileUpdated", "ProfileUpdated"]);
}

#[test]
fn driving_history_and_personal_info_updates_round_trip() {
    let (service, _profiles, _assessments, _publisher) = build_service();

    let created = service
        .create_profile(new_profile("CUST-1001", PolicyType::Auto))
        .expect("profile created");

    let updated = service
        .update_driving_history(&created.id(), driving_history(2, 1, Some(12)))
        .expect("history updated");
    assert_eq!(updated.driving_history().accidents, 2);

    let updated = service
        .update_personal_info(
            &created.id(),
            address("WY"),
            Some(42),
            Some("Accountant".to_string()),
            Some(dec!(101000)),
        )
        .expect("personal info updated");
    assert_eq!(updated.address().state(), "WY");
    assert_eq!(updated.occupation(), Some("Accountant"));
    assert_eq!(updated.version(), 3);
}

#[test]
fn start_assessment_seeds_the_base_premium_for_the_line() {
    let (service, _profiles, _assessments, publisher) = build_service();

    let profile = service
        .create_profile(new_profile("CUST-1001", PolicyType::Business))
        .expect("profile created");
    let assessment = service
        .start_assessment(&profile.id(), assessor())
        .expect("assessment started");

    assert_eq!(assessment.status(), AssessmentStatus::InProgress);
    assert_eq!(assessment.base_premium(), dec!(500.00));
    assert_eq!(assessment.profile_id(), profile.id());

    let events = publisher.events();
    assert_eq!(events.last().expect("events published").event_type(), "AssessmentStarted");
}

#[test]
fn start_assessment_requires_an_existing_profile() {
    let (service, _profiles, _assessments, _publisher) = build_service();

    match service.start_assessment(&ProfileId::generate(), assessor()) {
        Err(UnderwritingError::ProfileNotFound(_)) => {}
        other => panic!("expected profile not found, got {other:?}"),
    }
}

#[test]
fn complete_assessment_prices_an_insurable_profile() {
    let (service, _profiles, _assessments, _publisher) = build_service();

    let profile = service
        .create_profile(new_profile("CUST-1001", PolicyType::Auto))
        .expect("profile created");
    let started = service
        .start_assessment(&profile.id(), assessor())
        .expect("assessment started");

    let sealed = service
        .complete_assessment(&started.id(), Some("standard review".to_string()))
        .expect("assessment sealed");

    assert_eq!(sealed.status(), AssessmentStatus::Completed);
    assert_eq!(sealed.calculated_risk_score().map(|s| s.value()), Some(615));
    assert_eq!(sealed.risk_multiplier(), Some(dec!(0.900)));
    assert_eq!(sealed.final_premium(), Some(dec!(135.00)));
    assert_eq!(sealed.assessed_factors().len(), 1);
    assert_eq!(sealed.notes(), Some("standard review"));
}

#[test]
fn complete_assessment_rejects_an_uninsurable_profile() {
    let (service, _profiles, _assessments, publisher) = build_service();

    let profile = service
        .create_profile(uninsurable_input())
        .expect("profile created");
    let started = service
        .start_assessment(&profile.id(), assessor())
        .expect("assessment started");

    let sealed = service
        .complete_assessment(&started.id(), None)
        .expect("assessment sealed");

    assert_eq!(sealed.status(), AssessmentStatus::Rejected);
    assert_eq!(sealed.calculated_risk_score(), None);
    assert_eq!(sealed.final_premium(), Some(dec!(0)));
    assert_eq!(sealed.notes(), Some("profile is uninsurable at score 300"));

    match publisher.events().last() {
        Some(event) => assert_eq!(event.event_type(), "AssessmentOutcome"),
        None => panic!("expected a published outcome"),
    }
}

#[test]
fn reject_assessment_records_the_operational_reason() {
    let (service, _profiles, _assessments, _publisher) = build_service();

    let profile = service
        .create_profile(new_profile("CUST-1001", PolicyType::Auto))
        .expect("profile created");
    let started = service
        .start_assessment(&profile.id(), assessor())
        .expect("assessment started");

    let rejected = service
        .reject_assessment(&started.id(), "duplicate request".to_string())
        .expect("assessment rejected");

    assert_eq!(rejected.status(), AssessmentStatus::Rejected);
    assert_eq!(rejected.notes(), Some("duplicate request"));
}

#[test]
fn quote_flattens_the_completed_assessment_with_discount_and_annual() {
    let (service, _profiles, _assessments, publisher) = build_service();

    let profile = service
        .create_profile(new_profile("CUST-1001", PolicyType::Auto))
        .expect("profile created");
    service
        .rescore_profile(&profile.id())
        .expect("rescore succeeds");

    let quote = service
        .quote(&profile.id(), assessor(), None)
        .expect("quote succeeds");

    assert_eq!(quote.status, "completed");
    assert!(quote.insurable);
    assert_eq!(quote.risk_score, Some(615));
    assert_eq!(quote.risk_category, Some("high"));
    assert_eq!(quote.factors.len(), 1);
    assert_eq!(quote.factors[0].kind, "location");
    assert_eq!(quote.base_premium, dec!(150.00));
    assert_eq!(quote.risk_multiplier, Some(dec!(0.900)));
    assert_eq!(quote.final_premium, Some(dec!(135.00)));
    assert_eq!(quote.discount_percentage, 5);
    assert_eq!(quote.annual_premium, Some(dec!(1587.60)));

    let kinds: Vec<_> = publisher
        .events()
        .iter()
        .map(|event| event.event_type())
        .collect();
    assert_eq!(
        kinds,
        [
            "ProfileCreated",
            "ProfileUpdated",
            "ProfileUpdated",
            "AssessmentStarted",
            "AssessmentOutcome",
        ]
    );
}

#[test]
fn quote_for_an_uninsurable_profile_prices_nothing() {
    let (service, _profiles, _assessments, _publisher) = build_service();

    let profile = service
        .create_profile(uninsurable_input())
        .expect("profile created");

    let quote = service
        .quote(&profile.id(), assessor(), None)
        .expect("quote succeeds");

    assert_eq!(quote.status, "rejected");
    assert!(!quote.insurable);
    assert_eq!(quote.risk_score, None);
    assert_eq!(quote.risk_category, None);
    assert_eq!(quote.final_premium, Some(dec!(0)));
    assert_eq!(quote.discount_percentage, 0);
    assert_eq!(quote.annual_premium, None);
}

#[test]
fn lookups_propagate_not_found() {
    let (service, _profiles, _assessments, _publisher) = build_service();

    match service.profile(&ProfileId::generate()) {
        Err(UnderwritingError::ProfileNotFound(_)) => {}
        other => panic!("expected profile not found, got {other:?}"),
    }

    match service.assessment(&AssessmentId::generate()) {
        Err(UnderwritingError::AssessmentNotFound(_)) => {}
        other => panic!("expected assessment not found, got {other:?}"),
    }
}

#[test]
fn high_risk_and_stale_queries_surface_through_the_service() {
    let (service, _profiles, _assessments, _publisher) = build_service();

    let profile = service
        .create_profile(new_profile("CUST-1001", PolicyType::Auto))
        .expect("profile created");
    service
        .rescore_profile(&profile.id())
        .expect("rescore succeeds");
    let started = service
        .start_assessment(&profile.id(), assessor())
        .expect("assessment started");

    let high_risk = service.high_risk_profiles().expect("query succeeds");
    assert_eq!(high_risk.len(), 1, "615 classifies as high risk");

    let stale = service
        .stale_assessments(started.created_at() + chrono::Duration::minutes(5))
        .expect("query succeeds");
    assert_eq!(stale.len(), 1);
    assert_eq!(stale[0].id(), started.id());
}

#[test]
fn no_events_are_published_when_the_save_fails() {
    let publisher = Arc::new(InMemoryEventPublisher::default());
    let service = UnderwritingService::new(
        Arc::new(UnavailableProfileRepository),
        Arc::new(InMemoryAssessmentRepository::default()),
        publisher.clone(),
    );

    match service.create_profile(new_profile("CUST-1001", PolicyType::Auto)) {
        Err(UnderwritingError::Repository(RepositoryError::Unavailable(_))) => {}
        other => panic!("expected repository error, got {other:?}"),
    }

    assert!(publisher.events().is_empty(), "nothing reaches the bus");
}

#[test]
fn a_failed_assessment_write_publishes_nothing_for_the_start() {
    let publisher = Arc::new(InMemoryEventPublisher::default());
    let service = UnderwritingService::new(
        Arc::new(InMemoryProfileRepository::default()),
        Arc::new(UnavailableAssessmentRepository),
        publisher.clone(),
    );

    let profile = service
        .create_profile(new_profile("CUST-1001", PolicyType::Auto))
        .expect("profile created");

    match service.start_assessment(&profile.id(), assessor()) {
        Err(UnderwritingError::Repository(RepositoryError::Unavailable(_))) => {}
        other => panic!("expected repository error, got {other:?}"),
    }

    let kinds: Vec<_> = publisher.events().iter().map(|e| e.event_type()).collect();
    assert_eq!(kinds, ["ProfileCreated"]);
}

#[test]
fn publish_failures_surface_after_the_record_is_saved() {
    let profiles = Arc::new(InMemoryProfileRepository::default());
    let service = UnderwritingService::new(
        profiles.clone(),
        Arc::new(InMemoryAssessmentRepository::default()),
        Arc::new(FailingPublisher),
    );

    match service.create_profile(new_profile("CUST-1001", PolicyType::Auto)) {
        Err(UnderwritingError::Publish(PublishError::Transport(_))) => {}
        other => panic!("expected publish error, got {other:?}"),
    }

    assert_eq!(
        profiles.find_all().expect("lookup succeeds").len(),
        1,
        "the write committed before the publish attempt"
    );
}
