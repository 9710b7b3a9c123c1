use fund_allocator::allocation::{
    AllocationError, AllocationRecord, AllocationSink, Application, FundAccount,
    FundAccountRecord, FundAccountRegistry, RegistryError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::debug;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Registry backed by a JSON array of fund account records on disk.
///
/// Every call reads the file from scratch. The HTTP server only uses it once,
/// through [`ConfiguredRegistry::snapshot`], so request handlers never block on
/// file I/O.
#[derive(Debug, Clone)]
pub(crate) struct JsonFileRegistry {
    path: PathBuf,
}

impl JsonFileRegistry {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    fn read_records(&self) -> Result<Vec<FundAccountRecord>, RegistryError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|err| {
            RegistryError::Unavailable(format!("failed to read {}: {err}", self.path.display()))
        })?;
        serde_json::from_str(&raw).map_err(|err| {
            RegistryError::Unavailable(format!("failed to parse {}: {err}", self.path.display()))
        })
    }
}

impl FundAccountRegistry for JsonFileRegistry {
    fn all(&self) -> Result<Vec<FundAccount>, RegistryError> {
        let records = self.read_records()?;
        debug!(
            path = %self.path.display(),
            count = records.len(),
            "loaded fund account records"
        );
        records
            .into_iter()
            .map(|record| FundAccount::try_from(record).map_err(RegistryError::from))
            .collect()
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryFundRegistry {
    accounts: Arc<Mutex<Vec<FundAccount>>>,
}

impl InMemoryFundRegistry {
    pub(crate) fn new(accounts: Vec<FundAccount>) -> Self {
        Self {
            accounts: Arc::new(Mutex::new(accounts)),
        }
    }
}

impl FundAccountRegistry for InMemoryFundRegistry {
    fn all(&self) -> Result<Vec<FundAccount>, RegistryError> {
        let guard = self
            .accounts
            .lock()
            .map_err(|_| RegistryError::Unavailable("registry mutex poisoned".to_string()))?;
        Ok(guard.clone())
    }
}

/// Registry selected at startup from configuration.
#[derive(Clone)]
pub(crate) enum ConfiguredRegistry {
    File(JsonFileRegistry),
    Memory(InMemoryFundRegistry),
}

impl ConfiguredRegistry {
    pub(crate) fn from_path(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) => Self::File(JsonFileRegistry::new(path)),
            None => Self::Memory(InMemoryFundRegistry::new(Vec::new())),
        }
    }

    /// Load the accounts once and freeze them into an in-memory registry.
    pub(crate) fn snapshot(&self) -> Result<InMemoryFundRegistry, RegistryError> {
        self.all().map(InMemoryFundRegistry::new)
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Self::File(registry) => registry.path().display().to_string(),
            Self::Memory(_) => "in-memory".to_string(),
        }
    }
}

impl FundAccountRegistry for ConfiguredRegistry {
    fn all(&self) -> Result<Vec<FundAccount>, RegistryError> {
        match self {
            Self::File(registry) => registry.all(),
            Self::Memory(registry) => registry.all(),
        }
    }
}

/// Allocation sink that keeps an audit trail in process memory.
#[derive(Default, Clone)]
pub(crate) struct InMemoryAllocationLedger {
    records: Arc<Mutex<Vec<AllocationRecord>>>,
}

impl AllocationSink for InMemoryAllocationLedger {
    fn allocate(
        &self,
        application: &Application,
        account: &FundAccount,
    ) -> Result<(), AllocationError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|_| AllocationError::Transport("ledger mutex poisoned".to_string()))?;
        guard.push(AllocationRecord::new(application, account));
        Ok(())
    }
}

impl InMemoryAllocationLedger {
    pub(crate) fn records(&self) -> Vec<AllocationRecord> {
        self.records
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}
