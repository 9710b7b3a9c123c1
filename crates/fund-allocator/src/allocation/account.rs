use serde::{Deserialize, Serialize};

use super::catchment::{CatchmentArea, LocationMatchRecord, MatchPriority};
use super::domain::{Application, ConfigurationError, FundAccountId};
use super::geometry::DistanceMetric;

/// Fund account bound to a single catchment area.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "FundAccountRecord")]
pub struct FundAccount {
    pub id: FundAccountId,
    pub name: String,
    pub area: CatchmentArea,
}

impl FundAccount {
    pub fn new(id: impl Into<String>, name: impl Into<String>, area: CatchmentArea) -> Self {
        Self {
            id: FundAccountId(id.into()),
            name: name.into(),
            area,
        }
    }

    pub fn matches(
        &self,
        application: &Application,
        metric: &dyn DistanceMetric,
    ) -> Result<bool, ConfigurationError> {
        self.area.contains(application, metric)
    }

    pub fn priority(&self) -> MatchPriority {
        self.area.priority()
    }
}

/// Registry representation of a fund account before its catchment is validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundAccountRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub location_match: LocationMatchRecord,
}

impl TryFrom<FundAccountRecord> for FundAccount {
    type Error = ConfigurationError;

    fn try_from(record: FundAccountRecord) -> Result<Self, Self::Error> {
        let area = CatchmentArea::try_from(record.location_match)?;
        let name = record.name.unwrap_or_else(|| record.id.clone());
        Ok(FundAccount::new(record.id, name, area))
    }
}

impl From<FundAccount> for FundAccountRecord {
    fn from(account: FundAccount) -> Self {
        Self {
            location_match: LocationMatchRecord::from(&account.area),
            id: account.id.0,
            name: Some(account.name),
        }
    }
}
