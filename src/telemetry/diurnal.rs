// SPDX-License-Identifier: AGPL-3.0-or-later
//! Diurnal labeling: solar time-of-day categories and daytime clock
//! sub-intervals.
//!
//! Replaces `sun_times.correlate_sun_timer_with_fish_positions` and
//! `add_time_of_day_intervals`. For each date the four twilight tiers
//! give six ordered boundaries that partition the 24 h clock into seven
//! intervals — Day, three evening twilight tiers, Night (which wraps past
//! midnight), and three morning twilight tiers. The classifier is an
//! ordered sequence of half-open `[lower, upper)` tests with the
//! wraparound Night test in the middle; a record that matches none is an
//! invariant violation, surfaced rather than defaulted.
//!
//! The secondary label subdivides the day window into fixed clock
//! intervals anchored at sunrise/sunset: `[sunrise, 8:00)`, `[8, 10)`,
//! `[10, 12)`, `[12, 14)`, `[14, 16)`, `[16, sunset)`. Two solar
//! references exist: official ("long nights", only Day records are
//! eligible) and astronomical ("short nights" — a wider day window where
//! every non-Night record is eligible).

use chrono::NaiveTime;

use crate::error::{Error, Result};
use crate::solar::{SolarDay, SolarEventTable, TwilightTier};
use crate::telemetry::record::{
    fractional_hours, ChannelRecord, DiurnalInterval, EnrichedRecord, TimeOfDay, WaterColumn,
};

/// Diurnal labeling configuration.
#[derive(Debug, Clone)]
pub struct DiurnalParams {
    /// Use the astronomical sunrise/sunset as the day-window reference
    /// ("short nights"). `false` uses the official tier.
    pub short_nights: bool,
}

impl Default for DiurnalParams {
    fn default() -> Self {
        Self { short_nights: true }
    }
}

/// Classify a clock time against one date's solar boundaries.
///
/// Exactly one of the seven intervals matches; the final error arm is the
/// fail-fast guard for a table whose boundaries do not partition the day
/// (possible only if the nesting invariant were bypassed).
pub fn classify_time_of_day(time: NaiveTime, day: &SolarDay) -> Result<TimeOfDay> {
    let within = |lo: NaiveTime, hi: NaiveTime| lo <= time && time < hi;

    if within(day.sunrise_official, day.sunset_official) {
        Ok(TimeOfDay::Day)
    } else if within(day.sunset_official, day.sunset_civil) {
        Ok(TimeOfDay::CivilTwilight)
    } else if within(day.sunset_civil, day.sunset_nautical) {
        Ok(TimeOfDay::NauticalTwilight)
    } else if within(day.sunset_nautical, day.sunset_astronomical) {
        Ok(TimeOfDay::AstronomicalTwilight)
    } else if time >= day.sunset_astronomical || time < day.sunrise_astronomical {
        // Night wraps past midnight: disjunctive test, not a range.
        Ok(TimeOfDay::Night)
    } else if within(day.sunrise_astronomical, day.sunrise_nautical) {
        Ok(TimeOfDay::AstronomicalTwilight)
    } else if within(day.sunrise_nautical, day.sunrise_civil) {
        Ok(TimeOfDay::NauticalTwilight)
    } else if within(day.sunrise_civil, day.sunrise_official) {
        Ok(TimeOfDay::CivilTwilight)
    } else {
        Err(Error::InvariantViolation(format!(
            "time {time} on {} received no diurnal label",
            day.date
        )))
    }
}

/// Day-window reference tier for the given configuration.
#[must_use]
pub const fn reference_tier(params: &DiurnalParams) -> TwilightTier {
    if params.short_nights {
        TwilightTier::Astronomical
    } else {
        TwilightTier::Official
    }
}

/// Whether a record's solar category makes it eligible for a daytime
/// sub-interval under the given configuration.
#[must_use]
pub const fn eligible_for_interval(time_of_day: TimeOfDay, params: &DiurnalParams) -> bool {
    if params.short_nights {
        !matches!(time_of_day, TimeOfDay::Night)
    } else {
        matches!(time_of_day, TimeOfDay::Day)
    }
}

/// Daytime sub-interval for a fractional-hour clock value.
///
/// `sunrise`/`sunset` are the reference tier's boundaries for the date,
/// as fractional hours. Eligible records falling outside `[sunrise,
/// sunset)` would contradict the classifier, so that case is an
/// invariant violation.
pub fn interval_for(
    hours: f64,
    time_of_day: TimeOfDay,
    sunrise: f64,
    sunset: f64,
    params: &DiurnalParams,
) -> Result<DiurnalInterval> {
    if !eligible_for_interval(time_of_day, params) {
        return Ok(DiurnalInterval::Night);
    }
    let interval = if hours >= sunrise && hours < 8.0 {
        DiurnalInterval::SunriseTo0800
    } else if (8.0..10.0).contains(&hours) {
        DiurnalInterval::T0800To1000
    } else if (10.0..12.0).contains(&hours) {
        DiurnalInterval::T1000To1200
    } else if (12.0..14.0).contains(&hours) {
        DiurnalInterval::T1200To1400
    } else if (14.0..16.0).contains(&hours) {
        DiurnalInterval::T1400To1600
    } else if hours >= 16.0 && hours < sunset {
        DiurnalInterval::T1600ToSunset
    } else {
        return Err(Error::InvariantViolation(format!(
            "eligible record at {hours:.4} h escaped the day window [{sunrise:.4}, {sunset:.4})"
        )));
    };
    Ok(interval)
}

/// Label a channel-resolved stream into fully enriched records.
///
/// Also attaches the fractional time of day and the water-column bucket
/// (depth is inside `[0, 9]` m by the time records reach this stage).
pub fn label(
    records: Vec<ChannelRecord>,
    table: &SolarEventTable,
    params: &DiurnalParams,
) -> Result<Vec<EnrichedRecord>> {
    let tier = reference_tier(params);
    let mut enriched = Vec::with_capacity(records.len());
    for rec in records {
        let date = rec.sensor.timestamp.date();
        let day = table.day(date)?;
        let time = rec.sensor.timestamp.time();
        let time_of_day = classify_time_of_day(time, day)?;
        let hours = fractional_hours(rec.sensor.timestamp);
        let sunrise = time_as_hours(day.sunrise(tier));
        let sunset = time_as_hours(day.sunset(tier));
        let interval = interval_for(hours, time_of_day, sunrise, sunset, params)?;
        enriched.push(EnrichedRecord {
            water_column: WaterColumn::from_depth(rec.sensor.depth),
            sensor: rec.sensor,
            channel: rec.channel,
            activity: rec.activity,
            temperature: rec.temperature,
            time_of_day,
            interval,
            time_of_day_hours: hours,
        });
    }
    Ok(enriched)
}

/// Clock time as fractional hours.
#[must_use]
pub fn time_as_hours(t: NaiveTime) -> f64 {
    use chrono::Timelike;
    f64::from(t.hour()) + f64::from(t.minute()) / 60.0 + f64::from(t.second()) / 3600.0
}
