// SPDX-License-Identifier: AGPL-3.0-or-later
//! seabream — Fish Biotelemetry Analysis Pipelines
//!
//! Rust implementations of the acoustic-telemetry analysis chain behind the
//! sea-cage food anticipatory activity (FAA) study:
//! - sensor record enrichment (quality filtering, channel resolution,
//!   outlier exclusion, solar/diurnal labeling)
//! - FAA detection over time-binned activity
//! - depth × time-of-day density clustering
//! - the statistical battery consumed by the paper figures
//!
//! Each module mirrors a stage of the Python `fish_telemetry_faa` package,
//! validated against documented Python baselines before replacing it.
//! Figure rendering and bulk sensor-CSV loading stay outside this crate;
//! the contract is the record types in [`telemetry::record`].

pub mod error;
pub mod io;
pub mod solar;
pub mod special;
pub mod telemetry;
pub mod tolerances;
pub mod validation;

pub use error::{Error, Result};
