use super::common::*;
use std::sync::Arc;

use crate::allocation::account::FundAccount;
use crate::allocation::catchment::{CatchmentArea, MatchPriority};
use crate::allocation::domain::{Application, FundAccountId};
use crate::allocation::registry::RegistryError;
use crate::allocation::selector::SelectionOrder;
use crate::allocation::service::{
    AllocationOutcome, AllocationServiceError, FundAllocationService,
};

#[test]
fn allocates_once_to_the_selected_fund() {
    let (service, sink) = build_service(vec![
        wildcard("wildcard"),
        galway_circle("galway"),
        galway_circle("galway-backup"),
    ]);

    let outcome = service
        .process_application_created(&galway_application())
        .expect("allocation succeeds");

    assert_eq!(
        outcome,
        AllocationOutcome::Allocated {
            application_id: galway_application().id,
            fund_account_id: FundAccountId("galway".to_string()),
            fund_name: "Galway Community Fund".to_string(),
            priority: MatchPriority::Shape,
        }
    );

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].fund_account_id.0, "galway");
    assert_eq!(records[0].application_id.0, "app-galway");
}

#[test]
fn no_match_is_reported_without_touching_the_sink() {
    let (service, sink) = build_service(vec![
        named_region("uk", &["london", "brighton"]),
        dublin_polygon("dublin"),
    ]);
    let application = Application::new("app-tokyo")
        .with_address("Shibuya, Tokyo")
        .with_latlong(galway());

    let outcome = service
        .process_application_created(&application)
        .expect("no match is not an error");

    assert!(matches!(outcome, AllocationOutcome::Unallocated { .. }));
    assert_eq!(outcome.fund_account_id(), None);
    assert_eq!(outcome.summary(), "no allocatable fund for this location");
    assert!(sink.records().is_empty());
}

#[test]
fn preview_selects_without_allocating() {
    let (service, sink) = build_service(vec![named_region("uk", &["london", "brighton"])]);
    let application = Application::new("app-brighton").with_address("Brighton Pier");

    let outcome = service.preview(&application).expect("preview runs");

    assert!(matches!(outcome, AllocationOutcome::Matched { .. }));
    assert_eq!(
        outcome.fund_account_id().map(|id| id.0.as_str()),
        Some("uk")
    );
    assert!(sink.records().is_empty());
}

#[test]
fn registry_outage_is_propagated() {
    let service = FundAllocationService::new(
        Arc::new(UnavailableRegistry),
        Arc::new(MemorySink::default()),
        selector(SelectionOrder::SpecificFirst),
    );

    let err = service
        .process_application_created(&galway_application())
        .unwrap_err();
    assert!(matches!(
        err,
        AllocationServiceError::Registry(RegistryError::Unavailable(_))
    ));
    assert!(!err.is_configuration());
}

#[test]
fn sink_failure_is_propagated() {
    let service = FundAllocationService::new(
        Arc::new(MemoryRegistry::new(vec![galway_circle("galway")])),
        Arc::new(FailingSink),
        selector(SelectionOrder::SpecificFirst),
    );

    let err = service
        .process_application_created(&galway_application())
        .unwrap_err();
    assert!(matches!(err, AllocationServiceError::Allocation(_)));
}

#[test]
fn configuration_fault_aborts_before_allocation() {
    let (service, sink) = build_service(vec![FundAccount::new(
        "broken",
        "Broken Fund",
        CatchmentArea::Polygon {
            vertices: Vec::new(),
        },
    )]);

    let err = service
        .process_application_created(&galway_application())
        .unwrap_err();
    assert!(err.is_configuration());
    assert!(sink.records().is_empty());
}
