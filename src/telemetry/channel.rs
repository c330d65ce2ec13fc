// SPDX-License-Identifier: AGPL-3.0-or-later
//! Channel resolution: split the interleaved per-tag streams into
//! activity vs. temperature records and convert raw counts to physical
//! units.
//!
//! Each tagged fish carries two transmitter ids: the base id sends
//! depth + temperature, base+1 sends depth + activity. The trailing-digit
//! parity of the id decides the channel: even → activity, odd →
//! temperature. The linear calibrations below come from the DS256
//! transmitter datasheet and must be reproduced exactly.

use crate::telemetry::record::{ChannelRecord, ChannelType, SensorRecord};

/// Acceleration per raw count, m/s² (DS256 datasheet).
pub const ACTIVITY_SLOPE: f64 = 0.013_588;

/// Temperature slope, °C per raw count (DS256 datasheet, t_min = 10,
/// t_max = 35.5 over the 8-bit range).
pub const TEMPERATURE_SLOPE: f64 = 0.1;

/// Temperature intercept, °C.
pub const TEMPERATURE_OFFSET: f64 = 10.0;

/// Sentinel for the physical quantity a record does not carry. Kept a
/// number (never a null) to preserve fixed columns downstream.
pub const CHANNEL_SENTINEL: f64 = -1.0;

/// Channel carried by a tag id (trailing-digit parity).
#[must_use]
pub const fn channel_of(tag_id: u32) -> ChannelType {
    if tag_id % 2 == 0 {
        ChannelType::Activity
    } else {
        ChannelType::Temperature
    }
}

/// Activity in m/s² from a raw channel count.
#[must_use]
pub fn activity_from_raw(raw: f64) -> f64 {
    ACTIVITY_SLOPE * raw
}

/// Temperature in °C from a raw channel count.
#[must_use]
pub fn temperature_from_raw(raw: f64) -> f64 {
    TEMPERATURE_SLOPE.mul_add(raw, TEMPERATURE_OFFSET)
}

/// Resolve one record's channel and convert to physical units.
#[must_use]
pub fn resolve_record(sensor: SensorRecord) -> ChannelRecord {
    let channel = channel_of(sensor.tag_id);
    let (activity, temperature) = match channel {
        ChannelType::Activity => (activity_from_raw(sensor.raw_channel_value), CHANNEL_SENTINEL),
        ChannelType::Temperature => {
            (CHANNEL_SENTINEL, temperature_from_raw(sensor.raw_channel_value))
        }
    };
    ChannelRecord {
        sensor,
        channel,
        activity,
        temperature,
    }
}

/// Resolve a whole stream. Malformed identifiers were already rejected at
/// ingestion, so this stage cannot fail.
#[must_use]
pub fn resolve(records: Vec<SensorRecord>) -> Vec<ChannelRecord> {
    records.into_iter().map(resolve_record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sensor(tag_id: u32, raw: f64) -> SensorRecord {
        SensorRecord {
            tag_id,
            fish_id: if tag_id % 2 == 0 { tag_id } else { tag_id + 1 },
            timestamp: NaiveDate::from_ymd_opt(2021, 5, 26)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            depth: 3.0,
            raw_channel_value: raw,
            signal_quality: 30.0,
            geometric_precision: Some(1.0),
        }
    }

    #[test]
    fn parity_selects_the_channel() {
        assert_eq!(channel_of(1002), ChannelType::Activity);
        assert_eq!(channel_of(1001), ChannelType::Temperature);
    }

    #[test]
    fn calibration_is_exact_for_raw_1000() {
        // DS256: 0.013588 × 1000 = 13.588 m/s².
        let rec = resolve_record(sensor(1002, 1000.0));
        assert!((rec.activity - 13.588).abs() < 1e-12);
        assert_eq!(rec.temperature.to_bits(), CHANNEL_SENTINEL.to_bits());
    }

    #[test]
    fn temperature_calibration() {
        let rec = resolve_record(sensor(1001, 100.0));
        assert!((rec.temperature - 20.0).abs() < 1e-12);
        assert_eq!(rec.activity.to_bits(), CHANNEL_SENTINEL.to_bits());
        assert_eq!(rec.channel, ChannelType::Temperature);
    }

    #[test]
    fn resolve_preserves_order_and_count() {
        let records = vec![sensor(1001, 10.0), sensor(1002, 20.0), sensor(1004, 30.0)];
        let resolved = resolve(records);
        assert_eq!(resolved.len(), 3);
        assert_eq!(resolved[0].channel, ChannelType::Temperature);
        assert_eq!(resolved[1].channel, ChannelType::Activity);
        assert_eq!(resolved[2].sensor.raw_channel_value, 30.0);
    }
}
