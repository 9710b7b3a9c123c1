use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::allocation::account::FundAccount;
use crate::allocation::catchment::CatchmentArea;
use crate::allocation::domain::{Application, GeoPoint};
use crate::allocation::registry::{
    AllocationError, AllocationRecord, AllocationSink, FundAccountRegistry, RegistryError,
};
use crate::allocation::selector::{FundSelector, SelectionOrder};
use crate::allocation::service::FundAllocationService;
use crate::allocation::{allocation_router, DistanceMode};

pub(super) fn galway() -> GeoPoint {
    GeoPoint::new(53.270668, -9.0567905)
}

/// Centroid of the Dublin triangle used by [`dublin_polygon`].
pub(super) fn dublin_centroid() -> GeoPoint {
    GeoPoint::new(53.358161, -6.347818)
}

pub(super) fn galway_circle(id: &str) -> FundAccount {
    FundAccount::new(
        id,
        "Galway Community Fund",
        CatchmentArea::circle(galway(), 10_000.0).expect("valid circle"),
    )
}

pub(super) fn dublin_polygon(id: &str) -> FundAccount {
    FundAccount::new(
        id,
        "Dublin 7 Fund",
        CatchmentArea::polygon(vec![
            GeoPoint::new(53.369669, -6.349048),
            GeoPoint::new(53.358093, -6.356429),
            GeoPoint::new(53.346720, -6.337976),
        ])
        .expect("valid polygon"),
    )
}

pub(super) fn named_region(id: &str, names: &[&str]) -> FundAccount {
    FundAccount::new(
        id,
        format!("{} Regional Fund", names.join("/")),
        CatchmentArea::region(names.iter().copied()).expect("valid region"),
    )
}

pub(super) fn wildcard(id: &str) -> FundAccount {
    FundAccount::new(id, "Global Fund", CatchmentArea::wildcard())
}

pub(super) fn galway_application() -> Application {
    Application::new("app-galway")
        .with_address("Shop Street, Galway")
        .with_latlong(galway())
}

pub(super) fn selector(order: SelectionOrder) -> FundSelector {
    FundSelector::new(DistanceMode::GreatCircle, order)
}

pub(super) fn ids(accounts: &[&FundAccount]) -> Vec<String> {
    accounts.iter().map(|account| account.id.0.clone()).collect()
}

#[derive(Default)]
pub(super) struct MemoryRegistry {
    accounts: Vec<FundAccount>,
}

impl MemoryRegistry {
    pub(super) fn new(accounts: Vec<FundAccount>) -> Self {
        Self { accounts }
    }
}

impl FundAccountRegistry for MemoryRegistry {
    fn all(&self) -> Result<Vec<FundAccount>, RegistryError> {
        Ok(self.accounts.clone())
    }
}

pub(super) struct UnavailableRegistry;

impl FundAccountRegistry for UnavailableRegistry {
    fn all(&self) -> Result<Vec<FundAccount>, RegistryError> {
        Err(RegistryError::Unavailable("registry offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemorySink {
    records: Arc<Mutex<Vec<AllocationRecord>>>,
}

impl MemorySink {
    pub(super) fn records(&self) -> Vec<AllocationRecord> {
        self.records.lock().expect("sink mutex poisoned").clone()
    }
}

impl AllocationSink for MemorySink {
    fn allocate(
        &self,
        application: &Application,
        account: &FundAccount,
    ) -> Result<(), AllocationError> {
        let mut guard = self.records.lock().expect("sink mutex poisoned");
        guard.push(AllocationRecord::new(application, account));
        Ok(())
    }
}

pub(super) struct FailingSink;

impl AllocationSink for FailingSink {
    fn allocate(
        &self,
        _application: &Application,
        _account: &FundAccount,
    ) -> Result<(), AllocationError> {
        Err(AllocationError::Transport("ledger offline".to_string()))
    }
}

pub(super) fn build_service(
    accounts: Vec<FundAccount>,
) -> (
    FundAllocationService<MemoryRegistry, MemorySink>,
    Arc<MemorySink>,
) {
    let sink = Arc::new(MemorySink::default());
    let service = FundAllocationService::new(
        Arc::new(MemoryRegistry::new(accounts)),
        sink.clone(),
        selector(SelectionOrder::SpecificFirst),
    );
    (service, sink)
}

pub(super) fn allocation_router_with_service<R, S>(
    service: FundAllocationService<R, S>,
) -> axum::Router
where
    R: FundAccountRegistry + 'static,
    S: AllocationSink + 'static,
{
    allocation_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
