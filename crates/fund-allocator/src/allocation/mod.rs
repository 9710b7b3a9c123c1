//! Catchment-area matching and fund account selection.
//!
//! Geometry predicates sit at the bottom, [`CatchmentArea`] unifies the three
//! area shapes behind `contains`/`priority`, [`FundAccount`] binds an area to an
//! identity, and [`FundSelector`] picks the first matching account in priority
//! order. [`FundAllocationService`] wires the selector to an injected registry
//! and allocation sink.

pub mod account;
pub mod catchment;
pub mod domain;
pub mod geometry;
pub mod registry;
pub mod router;
pub mod selector;
pub mod service;

#[cfg(test)]
mod tests;

pub use account::{FundAccount, FundAccountRecord};
pub use catchment::{CatchmentArea, LocationMatchRecord, MatchPriority};
pub use domain::{Application, ApplicationId, ConfigurationError, FundAccountId, GeoPoint};
pub use geometry::{
    address_matches_regions, point_in_circle, point_in_polygon, DistanceMetric, DistanceMode,
    GreatCircle, Planar, RegionMatcher, WILDCARD_REGION,
};
pub use registry::{
    AllocationError, AllocationRecord, AllocationSink, FundAccountRegistry, RegistryError,
};
pub use router::allocation_router;
pub use selector::{FundSelector, Selection, SelectionOrder};
pub use service::{AllocationOutcome, AllocationServiceError, FundAllocationService};
