// SPDX-License-Identifier: AGPL-3.0-or-later
//! Ingestion: raw detections → schema-normalized [`SensorRecord`]s.
//!
//! Replaces the `TransmitterDataSheet` normalization of the Python
//! package. Responsibilities:
//!
//! 1. Apply the fixed UTC → local offset (the study site is UTC+3).
//! 2. Resolve tag identity to a numeric tag id. Constrained tag names
//!    (`A69-1601-1028`) carry the id in their trailing dash segment; a
//!    non-numeric segment fails loudly rather than silently mis-tagging.
//! 3. Assign the stable fish identifier. Tag ids come in adjacent pairs
//!    (base = depth+temperature, base+1 = depth+activity); both members
//!    map to the pair's activity-bearing (even) id.
//! 4. Sort by timestamp so downstream binning sees time order.

use chrono::Duration;

use crate::error::{Error, Result};
use crate::telemetry::record::{RawDetection, SensorRecord, TagIdent};

/// Ingestion parameters.
#[derive(Debug, Clone)]
pub struct IngestParams {
    /// Hours added to UTC timestamps to obtain local time.
    pub utc_offset_hours: i64,
}

impl Default for IngestParams {
    fn default() -> Self {
        // Crete is UTC+3 during the field season.
        Self { utc_offset_hours: 3 }
    }
}

/// Numeric tag id for a tag identity.
///
/// Names must end in a dash-separated decimal segment.
pub fn tag_id(tag: &TagIdent) -> Result<u32> {
    match tag {
        TagIdent::Id(id) => Ok(*id),
        TagIdent::Name(name) => {
            let segment = name
                .rsplit('-')
                .next()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| Error::MalformedInput(format!("empty tag name '{name}'")))?;
            segment.parse::<u32>().map_err(|_| {
                Error::MalformedInput(format!(
                    "tag name '{name}' has non-numeric trailing segment '{segment}'"
                ))
            })
        }
    }
}

/// The pair-stable fish id: the even (activity-bearing) member of the
/// tag's id pair.
#[must_use]
pub const fn fish_id_for(tag_id: u32) -> u32 {
    if tag_id % 2 == 0 {
        tag_id
    } else {
        tag_id + 1
    }
}

/// Normalize a raw detection stream into sensor records.
///
/// Fails on the first malformed tag identity; ingestion is all-or-nothing
/// so no partially normalized dataset escapes.
pub fn ingest(detections: &[RawDetection], params: &IngestParams) -> Result<Vec<SensorRecord>> {
    let offset = Duration::hours(params.utc_offset_hours);
    let mut records = Vec::with_capacity(detections.len());
    for det in detections {
        let tag_id = tag_id(&det.tag)?;
        records.push(SensorRecord {
            tag_id,
            fish_id: fish_id_for(tag_id),
            timestamp: det.time_utc + offset,
            depth: det.depth,
            raw_channel_value: det.raw_channel_value,
            signal_quality: det.signal_quality,
            geometric_precision: det.geometric_precision,
        });
    }
    records.sort_by_key(|r| r.timestamp);
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn det(hour: u32, tag: TagIdent) -> RawDetection {
        RawDetection {
            time_utc: NaiveDate::from_ymd_opt(2021, 5, 26)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            tag,
            depth: 2.0,
            raw_channel_value: 100.0,
            signal_quality: 30.0,
            geometric_precision: Some(1.0),
        }
    }

    #[test]
    fn named_tag_resolves_trailing_segment() {
        assert_eq!(tag_id(&TagIdent::Name("A69-1601-1028".into())).unwrap(), 1028);
        assert_eq!(tag_id(&TagIdent::Id(77)).unwrap(), 77);
    }

    #[test]
    fn malformed_tag_fails_loudly() {
        let err = tag_id(&TagIdent::Name("A69-1601-xx".into())).unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
        assert!(err.to_string().contains("A69-1601-xx"));
    }

    #[test]
    fn fish_id_is_the_even_pair_member() {
        assert_eq!(fish_id_for(1027), 1028);
        assert_eq!(fish_id_for(1028), 1028);
    }

    #[test]
    fn utc_offset_applied_and_sorted() {
        let detections = vec![
            det(8, TagIdent::Id(12)),
            det(5, TagIdent::Name("A69-1601-11".into())),
        ];
        let records = ingest(&detections, &IngestParams::default()).unwrap();
        assert_eq!(records.len(), 2);
        // +3 h offset, then sorted ascending.
        assert_eq!(records[0].timestamp.format("%H:%M").to_string(), "08:00");
        assert_eq!(records[1].timestamp.format("%H:%M").to_string(), "11:00");
        assert_eq!(records[0].tag_id, 11);
        assert_eq!(records[0].fish_id, 12);
        assert_eq!(records[1].fish_id, 12);
    }

    #[test]
    fn ingest_propagates_malformed_tags() {
        let detections = vec![det(5, TagIdent::Name("nodigits".into()))];
        assert!(ingest(&detections, &IngestParams::default()).is_err());
    }
}
