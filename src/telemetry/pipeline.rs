// SPDX-License-Identifier: AGPL-3.0-or-later
//! End-to-end enrichment pipeline.
//!
//! Chains the batch stages in their fixed order: ingest, quality
//! filter, channel resolution, outlier exclusion, diurnal labelling.
//! The output stream feeds FAA detection, clustering, and the
//! statistics battery.
//!
//! Single-threaded by design. Every stage is a pure transform over the
//! whole in-memory dataset (one field season, low tens of thousands of
//! records); a failure in any stage aborts the run with the stage's
//! error, and partial output is never returned.

use crate::error::{Error, Result};
use crate::solar::SolarEventTable;
use crate::telemetry::channel;
use crate::telemetry::diurnal::{self, DiurnalParams};
use crate::telemetry::filter::{self, FilterParams, FilterStats};
use crate::telemetry::ingest::{self, IngestParams};
use crate::telemetry::outlier::{self, ExclusionGrouping, ExclusionStats, OutlierParams};
use crate::telemetry::record::{Dataset, EnrichedRecord, RawDetection};

/// Full pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineParams {
    pub dataset: Dataset,
    pub ingest: IngestParams,
    pub filter: FilterParams,
    pub outlier: OutlierParams,
    pub diurnal: DiurnalParams,
}

impl PipelineParams {
    /// Constrained (cage) dataset: positioning is available, so HDOP
    /// bounds apply and exclusion groups by fish.
    #[must_use]
    pub fn constrained() -> Self {
        Self {
            dataset: Dataset::Constrained,
            ingest: IngestParams::default(),
            filter: FilterParams::default(),
            outlier: OutlierParams {
                grouping: ExclusionGrouping::ByFish,
                ..OutlierParams::default()
            },
            diurnal: DiurnalParams::default(),
        }
    }

    /// Unconstrained (free-swimming) dataset: no positioning channel,
    /// so no HDOP filtering, and exclusion groups by calendar date.
    #[must_use]
    pub fn unconstrained() -> Self {
        Self {
            dataset: Dataset::Unconstrained,
            ingest: IngestParams::default(),
            filter: FilterParams {
                hdop_bounds: None,
                ..FilterParams::default()
            },
            outlier: OutlierParams {
                grouping: ExclusionGrouping::ByDate,
                ..OutlierParams::default()
            },
            diurnal: DiurnalParams::default(),
        }
    }
}

/// Per-stage record accounting for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentStats {
    pub ingested: usize,
    pub filter: FilterStats,
    pub exclusion: ExclusionStats,
    /// Records in the final enriched stream.
    pub labeled: usize,
}

/// Run the full enrichment pipeline over one raw detection batch.
///
/// [`Error::EmptyResult`] when no record survives to the enriched
/// stream; downstream stages assume a non-empty input.
pub fn enrich(
    detections: &[RawDetection],
    table: &SolarEventTable,
    params: &PipelineParams,
) -> Result<(Vec<EnrichedRecord>, EnrichmentStats)> {
    let sensor = ingest::ingest(detections, &params.ingest)?;
    let ingested = sensor.len();

    let (filtered, filter_stats) = filter::apply(sensor, &params.filter);
    let resolved = channel::resolve(filtered);
    let (kept, exclusion_stats) = outlier::exclude(resolved, &params.outlier);
    let enriched = diurnal::label(kept, table, &params.diurnal)?;

    if enriched.is_empty() {
        return Err(Error::EmptyResult(
            "pipeline: no records survived enrichment".into(),
        ));
    }
    let stats = EnrichmentStats {
        ingested,
        filter: filter_stats,
        exclusion: exclusion_stats,
        labeled: enriched.len(),
    };
    Ok((enriched, stats))
}
