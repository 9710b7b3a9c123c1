use std::cmp::Reverse;

use tracing::debug;

use super::account::FundAccount;
use super::domain::{Application, ConfigurationError};
use super::geometry::{DistanceMetric, DistanceMode};

/// Direction in which priority tiers are walked.
///
/// `SpecificFirst` evaluates shapes, then named regions, then the wildcard
/// catch-all. `CatchAllFirst` is the plain ascending-tier walk and is kept for
/// deployments that want the wildcard fund to win whenever it is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionOrder {
    #[default]
    SpecificFirst,
    CatchAllFirst,
}

impl SelectionOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "specific_first" | "specific-first" => Some(Self::SpecificFirst),
            "catch_all_first" | "catch-all-first" => Some(Self::CatchAllFirst),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            SelectionOrder::SpecificFirst => "specific_first",
            SelectionOrder::CatchAllFirst => "catch_all_first",
        }
    }
}

/// Result of a selection run. `NoMatch` is an expected outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection<'a> {
    Matched(&'a FundAccount),
    NoMatch,
}

impl<'a> Selection<'a> {
    pub fn account(&self) -> Option<&'a FundAccount> {
        match *self {
            Selection::Matched(account) => Some(account),
            Selection::NoMatch => None,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Selection::Matched(_))
    }
}

/// Picks at most one fund account for an application.
pub struct FundSelector {
    metric: Box<dyn DistanceMetric>,
    order: SelectionOrder,
}

impl Default for FundSelector {
    fn default() -> Self {
        Self::new(DistanceMode::default(), SelectionOrder::default())
    }
}

impl FundSelector {
    pub fn new(mode: DistanceMode, order: SelectionOrder) -> Self {
        Self::with_metric(mode.metric(), order)
    }

    pub fn with_metric(metric: Box<dyn DistanceMetric>, order: SelectionOrder) -> Self {
        Self { metric, order }
    }

    /// Candidates in the order they will be evaluated. The sort is stable, so
    /// accounts sharing a tier keep their registry order.
    pub fn evaluation_order<'a>(&self, candidates: &'a [FundAccount]) -> Vec<&'a FundAccount> {
        let mut ordered: Vec<&FundAccount> = candidates.iter().collect();
        match self.order {
            SelectionOrder::SpecificFirst => {
                ordered.sort_by_key(|account| Reverse(account.priority()))
            }
            SelectionOrder::CatchAllFirst => ordered.sort_by_key(|account| account.priority()),
        }
        ordered
    }

    /// First account, in evaluation order, whose catchment contains the
    /// application. Evaluation stops at the first match.
    pub fn select<'a>(
        &self,
        application: &Application,
        candidates: &'a [FundAccount],
    ) -> Result<Selection<'a>, ConfigurationError> {
        for account in self.evaluation_order(candidates) {
            let matched = account.matches(application, self.metric.as_ref())?;
            debug!(
                application_id = %application.id.0,
                fund_account_id = %account.id.0,
                priority = account.priority().label(),
                matched,
                "evaluated fund account"
            );
            if matched {
                return Ok(Selection::Matched(account));
            }
        }

        Ok(Selection::NoMatch)
    }
}
