// SPDX-License-Identifier: AGPL-3.0-or-later
//! Record types flowing through the enrichment pipeline.
//!
//! Each stage consumes the previous stage's record type by value and adds
//! fields, never removing source fields: [`RawDetection`] (I/O boundary) →
//! [`SensorRecord`] (ingested) → [`ChannelRecord`] (channel resolved) →
//! [`EnrichedRecord`] (fully labeled, analysis-ready).
//!
//! Sentinel convention: a record carries exactly one physical channel; the
//! other physical value is `-1.0`, never a null, so downstream consumers
//! see fixed columns.

use chrono::{NaiveDateTime, Timelike};

/// Which dataset a record stream came from. Constrained tags were position-
/// tracked inside the receiver array (SNR + HDOP); unconstrained tags
/// report depth + channel only (SNR, no positioning).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    /// Position-constrained transmitters (named tags, HDOP available).
    Constrained,
    /// Unconstrained transmitters (numeric tag ids, no HDOP).
    Unconstrained,
}

/// Tag identity as delivered by the I/O boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagIdent {
    /// Constrained datasets carry names like `A69-1601-1028`.
    Name(String),
    /// Unconstrained datasets carry the bare numeric id.
    Id(u32),
}

/// One raw detection as produced by the excluded CSV/I-O collaborator.
/// Timestamps are UTC; ingestion applies the fixed local offset.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    /// Detection time in UTC.
    pub time_utc: NaiveDateTime,
    /// Tag identity (name or numeric id).
    pub tag: TagIdent,
    /// Depth in meters (estimated or from tag).
    pub depth: f64,
    /// Raw second-channel sensor value (DS256 `Data2`).
    pub raw_channel_value: f64,
    /// Signal-to-noise ratio in dB.
    pub signal_quality: f64,
    /// Horizontal dilution of precision; absent for unconstrained tags.
    pub geometric_precision: Option<f64>,
}

/// Ingested, schema-normalized sensor record. Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorRecord {
    /// Numeric tag id (trailing segment of the tag name for constrained
    /// datasets).
    pub tag_id: u32,
    /// Stable fish identifier: the activity-bearing (even) id of the
    /// tag's channel pair.
    pub fish_id: u32,
    /// Local, offset-corrected timestamp.
    pub timestamp: NaiveDateTime,
    /// Depth in meters.
    pub depth: f64,
    /// Raw second-channel sensor value.
    pub raw_channel_value: f64,
    /// Signal-to-noise ratio in dB.
    pub signal_quality: f64,
    /// HDOP, when the dataset has positioning.
    pub geometric_precision: Option<f64>,
}

/// Which physical quantity a tag's second channel carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelType {
    /// Even trailing digit: acceleration activity.
    Activity,
    /// Odd trailing digit: water temperature.
    Temperature,
}

/// Sensor record with its channel resolved and converted to physical units.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelRecord {
    /// The ingested record this was derived from.
    pub sensor: SensorRecord,
    /// Channel this record carries.
    pub channel: ChannelType,
    /// Acceleration activity in m/s², or `-1.0` for temperature records.
    pub activity: f64,
    /// Temperature in °C, or `-1.0` for activity records.
    pub temperature: f64,
}

/// Solar-elevation category of a timestamp. Morning and evening twilight
/// share label values, so five labels cover the seven diel intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeOfDay {
    /// Between official sunrise and official sunset.
    Day,
    /// Sun within 6° below the horizon.
    CivilTwilight,
    /// Sun within 12° below the horizon.
    NauticalTwilight,
    /// Sun within 18° below the horizon.
    AstronomicalTwilight,
    /// Full darkness; wraps past midnight.
    Night,
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Day => "Day",
            Self::CivilTwilight => "Civil Twilight",
            Self::NauticalTwilight => "Nautical Twilight",
            Self::AstronomicalTwilight => "Astronomical Twilight",
            Self::Night => "Night",
        })
    }
}

/// Fixed clock sub-interval of the daytime span. Early and late intervals
/// are clipped to the date's actual sunrise/sunset and may be empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiurnalInterval {
    /// Outside the configured day window.
    Night,
    /// `[sunrise, 08:00)`.
    SunriseTo0800,
    /// `[08:00, 10:00)` — the scheduled feeding window.
    T0800To1000,
    /// `[10:00, 12:00)`.
    T1000To1200,
    /// `[12:00, 14:00)`.
    T1200To1400,
    /// `[14:00, 16:00)`.
    T1400To1600,
    /// `[16:00, sunset)`.
    T1600ToSunset,
}

impl std::fmt::Display for DiurnalInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Night => "Official Night Time",
            Self::SunriseTo0800 => "Sunrise to 8:00",
            Self::T0800To1000 => "8:00 to 10:00",
            Self::T1000To1200 => "10:00 to 12:00",
            Self::T1200To1400 => "12:00 to 14:00",
            Self::T1400To1600 => "14:00 to 16:00",
            Self::T1600ToSunset => "16:00 to Sunset",
        })
    }
}

/// Depth stratification bucket used by the spatial analyses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaterColumn {
    /// `depth < 3 m`.
    Upper03,
    /// `3 m ≤ depth < 6 m`.
    Mid36,
    /// `6 m ≤ depth` (≤ 9 m after the hard depth bound).
    Lower69,
}

impl WaterColumn {
    /// All buckets, surface first.
    pub const ALL: [Self; 3] = [Self::Upper03, Self::Mid36, Self::Lower69];

    /// Bucket for a depth already inside the hard `[0, 9]` m bound.
    #[must_use]
    pub fn from_depth(depth: f64) -> Self {
        if depth < 3.0 {
            Self::Upper03
        } else if depth < 6.0 {
            Self::Mid36
        } else {
            Self::Lower69
        }
    }
}

impl std::fmt::Display for WaterColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Upper03 => "0-3m",
            Self::Mid36 => "3-6m",
            Self::Lower69 => "6-9m",
        })
    }
}

/// Fully annotated, analysis-ready record.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRecord {
    /// The ingested record this was derived from.
    pub sensor: SensorRecord,
    /// Channel this record carries.
    pub channel: ChannelType,
    /// Acceleration activity in m/s², or `-1.0` sentinel.
    pub activity: f64,
    /// Temperature in °C, or `-1.0` sentinel.
    pub temperature: f64,
    /// Solar-elevation category of the timestamp.
    pub time_of_day: TimeOfDay,
    /// Daytime clock sub-interval.
    pub interval: DiurnalInterval,
    /// Depth stratification bucket.
    pub water_column: WaterColumn,
    /// Time of day as fractional hours in `[0, 24)`.
    pub time_of_day_hours: f64,
}

/// Time of day as fractional hours (`h + m/60 + s/3600`), as used by the
/// clustering metric and the diurnal sub-intervals.
#[must_use]
pub fn fractional_hours(t: NaiveDateTime) -> f64 {
    f64::from(t.hour()) + f64::from(t.minute()) / 60.0 + f64::from(t.second()) / 3600.0
}
