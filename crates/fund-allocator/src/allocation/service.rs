use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use super::account::FundAccount;
use super::catchment::MatchPriority;
use super::domain::{Application, ApplicationId, ConfigurationError, FundAccountId};
use super::registry::{AllocationError, AllocationSink, FundAccountRegistry, RegistryError};
use super::selector::{FundSelector, Selection};

const NO_MATCH_REASON: &str = "no allocatable fund for this location";

/// Service composing the fund registry, selector, and allocation sink.
pub struct FundAllocationService<R, S> {
    registry: Arc<R>,
    sink: Arc<S>,
    selector: Arc<FundSelector>,
}

impl<R, S> FundAllocationService<R, S>
where
    R: FundAccountRegistry + 'static,
    S: AllocationSink + 'static,
{
    pub fn new(registry: Arc<R>, sink: Arc<S>, selector: FundSelector) -> Self {
        Self {
            registry,
            sink,
            selector: Arc::new(selector),
        }
    }

    /// Handle an "application created" event: select a fund and allocate to it.
    ///
    /// The sink is called at most once, and never when no fund matches.
    pub fn process_application_created(
        &self,
        application: &Application,
    ) -> Result<AllocationOutcome, AllocationServiceError> {
        let accounts = self.registry.all()?;
        let selection = self.select_logged(application, &accounts)?;

        let Some(account) = selection.account() else {
            warn!(application_id = %application.id.0, "{}", NO_MATCH_REASON);
            return Ok(AllocationOutcome::unallocated(application));
        };

        self.sink.allocate(application, account)?;
        info!(
            application_id = %application.id.0,
            fund_account_id = %account.id.0,
            priority = account.priority().label(),
            "allocated application to fund account"
        );

        Ok(AllocationOutcome::Allocated {
            application_id: application.id.clone(),
            fund_account_id: account.id.clone(),
            fund_name: account.name.clone(),
            priority: account.priority(),
        })
    }

    /// Run selection without handing anything to the allocation sink.
    pub fn preview(
        &self,
        application: &Application,
    ) -> Result<AllocationOutcome, AllocationServiceError> {
        let accounts = self.registry.all()?;
        let outcome = match self.select_logged(application, &accounts)? {
            Selection::Matched(account) => AllocationOutcome::Matched {
                application_id: application.id.clone(),
                fund_account_id: account.id.clone(),
                fund_name: account.name.clone(),
                priority: account.priority(),
            },
            Selection::NoMatch => AllocationOutcome::unallocated(application),
        };
        Ok(outcome)
    }

    fn select_logged<'a>(
        &self,
        application: &Application,
        accounts: &'a [FundAccount],
    ) -> Result<Selection<'a>, ConfigurationError> {
        self.selector
            .select(application, accounts)
            .inspect_err(|err| {
                error!(
                    application_id = %application.id.0,
                    error = %err,
                    "fund catchment misconfigured"
                );
            })
    }
}

/// Outcome reported back to callers after a selection run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AllocationOutcome {
    /// A fund matched and the allocation sink accepted the hand-off.
    Allocated {
        application_id: ApplicationId,
        fund_account_id: FundAccountId,
        fund_name: String,
        priority: MatchPriority,
    },
    /// A fund matched during a preview; nothing was allocated.
    Matched {
        application_id: ApplicationId,
        fund_account_id: FundAccountId,
        fund_name: String,
        priority: MatchPriority,
    },
    /// No fund's catchment area contains the application.
    Unallocated {
        application_id: ApplicationId,
        reason: String,
    },
}

impl AllocationOutcome {
    fn unallocated(application: &Application) -> Self {
        AllocationOutcome::Unallocated {
            application_id: application.id.clone(),
            reason: NO_MATCH_REASON.to_string(),
        }
    }

    pub fn fund_account_id(&self) -> Option<&FundAccountId> {
        match self {
            AllocationOutcome::Allocated {
                fund_account_id, ..
            }
            | AllocationOutcome::Matched {
                fund_account_id, ..
            } => Some(fund_account_id),
            AllocationOutcome::Unallocated { .. } => None,
        }
    }

    pub fn summary(&self) -> String {
        match self {
            AllocationOutcome::Allocated {
                fund_name,
                priority,
                ..
            } => format!("allocated to {fund_name} ({})", priority.label()),
            AllocationOutcome::Matched {
                fund_name,
                priority,
                ..
            } => format!("would allocate to {fund_name} ({})", priority.label()),
            AllocationOutcome::Unallocated { reason, .. } => reason.clone(),
        }
    }
}

/// Error raised by the allocation service.
#[derive(Debug, thiserror::Error)]
pub enum AllocationServiceError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Allocation(#[from] AllocationError),
}

impl AllocationServiceError {
    /// True for faults in the fund account data rather than in a collaborator.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            AllocationServiceError::Configuration(_)
                | AllocationServiceError::Registry(RegistryError::Configuration(_))
        )
    }
}
