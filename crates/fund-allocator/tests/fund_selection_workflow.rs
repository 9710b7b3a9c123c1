//! End-to-end scenarios for fund selection and allocation.
//!
//! Fund accounts are loaded from the registry wire shape, handed to the public
//! service facade, and the allocation sink is inspected to confirm exactly one
//! hand-off per match and none on a miss.

mod common {
    use std::sync::{Arc, Mutex};

    use fund_allocator::allocation::{
        AllocationError, AllocationSink, Application, FundAccount, FundAccountRecord,
        FundAccountRegistry, FundAllocationService, FundSelector, RegistryError,
    };

    pub(super) struct RecordRegistry {
        records: Vec<FundAccountRecord>,
    }

    impl RecordRegistry {
        pub(super) fn from_json(raw: serde_json::Value) -> Self {
            Self {
                records: serde_json::from_value(raw).expect("registry records deserialize"),
            }
        }
    }

    impl FundAccountRegistry for RecordRegistry {
        fn all(&self) -> Result<Vec<FundAccount>, RegistryError> {
            self.records
                .iter()
                .cloned()
                .map(|record| FundAccount::try_from(record).map_err(RegistryError::from))
                .collect()
        }
    }

    #[derive(Default)]
    pub(super) struct RecordingSink {
        calls: Mutex<Vec<(String, String)>>,
    }

    impl RecordingSink {
        pub(super) fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().expect("sink mutex poisoned").clone()
        }
    }

    impl AllocationSink for RecordingSink {
        fn allocate(
            &self,
            application: &Application,
            account: &FundAccount,
        ) -> Result<(), AllocationError> {
            self.calls
                .lock()
                .expect("sink mutex poisoned")
                .push((application.id.0.clone(), account.id.0.clone()));
            Ok(())
        }
    }

    pub(super) fn service(
        raw: serde_json::Value,
    ) -> (
        FundAllocationService<RecordRegistry, RecordingSink>,
        Arc<RecordingSink>,
    ) {
        let sink = Arc::new(RecordingSink::default());
        let service = FundAllocationService::new(
            Arc::new(RecordRegistry::from_json(raw)),
            sink.clone(),
            FundSelector::default(),
        );
        (service, sink)
    }
}

use common::service;
use fund_allocator::allocation::{
    AllocationOutcome, AllocationServiceError, Application, ConfigurationError, GeoPoint,
    RegistryError,
};
use serde_json::json;

#[test]
fn circle_account_selected_for_application_at_its_centre() {
    let (service, sink) = service(json!([{
        "id": "fund-galway",
        "name": "Galway Fund",
        "location_match": {
            "type": "circle",
            "options": { "centre": [53.270668, -9.0567905], "radius": 10000 }
        }
    }]));
    let application =
        Application::new("app-1").with_latlong(GeoPoint::new(53.270668, -9.0567905));

    let outcome = service
        .process_application_created(&application)
        .expect("allocation runs");

    assert_eq!(
        outcome.fund_account_id().map(|id| id.0.as_str()),
        Some("fund-galway")
    );
    assert_eq!(
        sink.calls(),
        vec![("app-1".to_string(), "fund-galway".to_string())]
    );
}

#[test]
fn region_account_selected_by_address_alone() {
    let (service, sink) = service(json!([{
        "id": "fund-uk-south",
        "location_match": {
            "type": "region",
            "options": { "centre": [53.270668, -9.0567905], "regions": ["london", "brighton"] }
        }
    }]));
    let application = Application::new("app-2").with_address("Brighton Pier");

    let outcome = service
        .process_application_created(&application)
        .expect("allocation runs");

    assert!(matches!(
        outcome,
        AllocationOutcome::Allocated { ref fund_name, .. } if fund_name == "fund-uk-south"
    ));
    assert_eq!(sink.calls().len(), 1);
}

#[test]
fn wildcard_account_is_the_fallback_when_named_regions_miss() {
    let (service, sink) = service(json!([
        {
            "id": "fund-global",
            "location_match": { "type": "region", "options": { "regions": ["*"] } }
        },
        {
            "id": "fund-london",
            "location_match": { "type": "region", "options": { "regions": ["london"] } }
        }
    ]));
    let application = Application::new("app-3").with_address("Tokyo");

    let outcome = service
        .process_application_created(&application)
        .expect("allocation runs");

    assert_eq!(
        outcome.fund_account_id().map(|id| id.0.as_str()),
        Some("fund-global")
    );
    assert_eq!(
        sink.calls(),
        vec![("app-3".to_string(), "fund-global".to_string())]
    );
}

#[test]
fn unmatched_application_is_not_allocated() {
    let (service, sink) = service(json!([
        {
            "id": "fund-dublin",
            "location_match": {
                "type": "polygon",
                "options": {
                    "points": [[53.369669, -6.349048], [53.358093, -6.356429], [53.346720, -6.337976]]
                }
            }
        },
        {
            "id": "fund-london",
            "location_match": { "type": "region", "options": { "regions": ["london"] } }
        }
    ]));
    let application = Application::new("app-4")
        .with_address("Patrick Street, Cork")
        .with_latlong(GeoPoint::new(51.8985, -8.4756));

    let outcome = service
        .process_application_created(&application)
        .expect("no match is an ordinary outcome");

    assert!(matches!(outcome, AllocationOutcome::Unallocated { .. }));
    assert!(sink.calls().is_empty());
}

#[test]
fn unknown_area_type_is_a_configuration_error() {
    let (service, sink) = service(json!([{
        "id": "fund-mystery",
        "location_match": { "type": "hexagon", "options": {} }
    }]));

    let err = service
        .process_application_created(&Application::new("app-5").with_address("Galway"))
        .unwrap_err();

    assert!(matches!(
        err,
        AllocationServiceError::Registry(RegistryError::Configuration(
            ConfigurationError::UnknownAreaType(ref kind)
        )) if kind == "hexagon"
    ));
    assert!(err.is_configuration());
    assert!(sink.calls().is_empty());
}

#[test]
fn fund_accounts_serialize_back_to_the_registry_shape() {
    let account = fund_allocator::allocation::FundAccount::new(
        "fund-galway",
        "Galway Fund",
        fund_allocator::allocation::CatchmentArea::circle(
            GeoPoint::new(53.270668, -9.0567905),
            10_000.0,
        )
        .expect("valid circle"),
    );

    let value = serde_json::to_value(&account).expect("account serializes");

    assert_eq!(
        value,
        json!({
            "id": "fund-galway",
            "name": "Galway Fund",
            "location_match": {
                "type": "circle",
                "options": { "centre": [53.270668, -9.0567905], "radius": 10000.0 }
            }
        })
    );
}
