//! Fund account selection for incoming funding applications.
//!
//! Each fund account owns a catchment area (a circle, a polygon, or a set of
//! named regions). When an application arrives, the [`allocation::FundSelector`]
//! walks the registered accounts in priority order and picks the first one whose
//! catchment area contains the application's location.

pub mod allocation;
pub mod config;
pub mod error;
pub mod telemetry;
