//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - validated inputs (`Symbol`, `LookbackDays`, `DateRange`)
//! - the provider output (`PriceRow`, `PriceSeries`)
//! - derived outputs (`ValidationResult`, `MetricSummary`)

pub mod types;

pub use types::*;
