// SPDX-License-Identifier: AGPL-3.0-or-later
//! Telemetry enrichment, FAA detection, clustering, and statistics.
//!
//! Data flows strictly downward:
//! [`ingest`] → [`filter`] → [`channel`] → [`outlier`] → [`diurnal`] →
//! {[`faa`], [`cluster`], [`stats`]}. The [`pipeline`] module wires the
//! enrichment chain end to end.

pub mod channel;
pub mod cluster;
pub mod diurnal;
pub mod faa;
pub mod filter;
pub mod ingest;
pub mod outlier;
pub mod pipeline;
pub mod record;
pub mod stats;
