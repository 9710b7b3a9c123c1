use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::account::FundAccount;
use super::catchment::MatchPriority;
use super::domain::{Application, ApplicationId, ConfigurationError, FundAccountId};

/// Source of the fund accounts considered for each application.
///
/// Implementations hand out an owned snapshot so a selection run never sees
/// accounts change underneath it.
pub trait FundAccountRegistry: Send + Sync {
    fn all(&self) -> Result<Vec<FundAccount>, RegistryError>;
}

/// Error enumeration for registry failures.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("fund account registry unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Downstream hook that performs the actual funding allocation.
pub trait AllocationSink: Send + Sync {
    fn allocate(&self, application: &Application, account: &FundAccount)
        -> Result<(), AllocationError>;
}

/// Allocation dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum AllocationError {
    #[error("allocation transport unavailable: {0}")]
    Transport(String),
}

/// Audit entry describing a completed hand-off to the allocation sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRecord {
    pub application_id: ApplicationId,
    pub fund_account_id: FundAccountId,
    pub priority: MatchPriority,
    pub allocated_at: DateTime<Utc>,
}

impl AllocationRecord {
    pub fn new(application: &Application, account: &FundAccount) -> Self {
        Self {
            application_id: application.id.clone(),
            fund_account_id: account.id.clone(),
            priority: account.priority(),
            allocated_at: Utc::now(),
        }
    }
}
