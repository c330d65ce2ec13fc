// SPDX-License-Identifier: AGPL-3.0-or-later
//! Solar event table: per-date sunrise/sunset times for four twilight tiers.
//!
//! Replaces the `SunTimer` lookup of the Python `fish_telemetry_faa`
//! package. One [`SolarDay`] per calendar date in the experiment window,
//! covering the official, civil, nautical, and astronomical definitions of
//! sunrise and sunset. The table is constructed once, validated, and then
//! shared by reference with every stage that needs it — it is never
//! mutated after load.
//!
//! # Nesting invariant
//!
//! For every date the official day window must nest inside the civil,
//! nautical, and astronomical windows:
//!
//! ```text
//! sunrise_astronomical ≤ sunrise_nautical ≤ sunrise_civil ≤ sunrise_official
//! sunset_official ≤ sunset_civil ≤ sunset_nautical ≤ sunset_astronomical
//! ```
//!
//! A table violating this is rejected at construction
//! ([`Error::InvariantViolation`]), not discovered mid-pipeline.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};

use crate::error::{Error, Result};

/// Successively wider definitions of "not fully dark".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TwilightTier {
    /// Sun at the horizon.
    Official,
    /// Sun ≤ 6° below the horizon.
    Civil,
    /// Sun ≤ 12° below the horizon.
    Nautical,
    /// Sun ≤ 18° below the horizon.
    Astronomical,
}

impl TwilightTier {
    /// All tiers, from narrowest to widest day window.
    pub const ALL: [Self; 4] = [Self::Official, Self::Civil, Self::Nautical, Self::Astronomical];
}

/// Sunrise/sunset times for one calendar date across all four tiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolarDay {
    /// Calendar date (local).
    pub date: NaiveDate,
    /// Official sunrise (sun at horizon).
    pub sunrise_official: NaiveTime,
    /// Official sunset.
    pub sunset_official: NaiveTime,
    /// Civil dawn.
    pub sunrise_civil: NaiveTime,
    /// Civil dusk.
    pub sunset_civil: NaiveTime,
    /// Nautical dawn.
    pub sunrise_nautical: NaiveTime,
    /// Nautical dusk.
    pub sunset_nautical: NaiveTime,
    /// Astronomical dawn.
    pub sunrise_astronomical: NaiveTime,
    /// Astronomical dusk.
    pub sunset_astronomical: NaiveTime,
}

impl SolarDay {
    /// Sunrise for the given tier.
    #[must_use]
    pub const fn sunrise(&self, tier: TwilightTier) -> NaiveTime {
        match tier {
            TwilightTier::Official => self.sunrise_official,
            TwilightTier::Civil => self.sunrise_civil,
            TwilightTier::Nautical => self.sunrise_nautical,
            TwilightTier::Astronomical => self.sunrise_astronomical,
        }
    }

    /// Sunset for the given tier.
    #[must_use]
    pub const fn sunset(&self, tier: TwilightTier) -> NaiveTime {
        match tier {
            TwilightTier::Official => self.sunset_official,
            TwilightTier::Civil => self.sunset_civil,
            TwilightTier::Nautical => self.sunset_nautical,
            TwilightTier::Astronomical => self.sunset_astronomical,
        }
    }

    /// Verify the nesting invariant for this date.
    pub fn validate(&self) -> Result<()> {
        let rises_nested = self.sunrise_astronomical <= self.sunrise_nautical
            && self.sunrise_nautical <= self.sunrise_civil
            && self.sunrise_civil <= self.sunrise_official;
        let sets_nested = self.sunset_official <= self.sunset_civil
            && self.sunset_civil <= self.sunset_nautical
            && self.sunset_nautical <= self.sunset_astronomical;
        if rises_nested && sets_nested {
            Ok(())
        } else {
            Err(Error::InvariantViolation(format!(
                "solar nesting broken for {}: twilight windows must widen outward",
                self.date
            )))
        }
    }
}

/// Decode an HHMM-coded clock time (e.g. `619` → 06:19, `2042` → 20:42).
///
/// The source sheets store rise/set as bare integers with the leading
/// zero dropped; the Python loader zero-padded with `'{:0>4}'`.
pub fn time_from_hhmm(code: u16) -> Result<NaiveTime> {
    let (hour, minute) = (u32::from(code) / 100, u32::from(code) % 100);
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
        Error::MalformedInput(format!("HHMM code {code} is not a valid clock time"))
    })
}

/// Read-only per-date solar event lookup, shared across pipeline stages.
#[derive(Debug, Clone)]
pub struct SolarEventTable {
    days: BTreeMap<NaiveDate, SolarDay>,
}

impl SolarEventTable {
    /// Build a table from per-date entries, validating the nesting
    /// invariant for every day.
    pub fn from_days(days: impl IntoIterator<Item = SolarDay>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for day in days {
            day.validate()?;
            map.insert(day.date, day);
        }
        if map.is_empty() {
            return Err(Error::EmptyResult("solar table has no days".into()));
        }
        Ok(Self { days: map })
    }

    /// Solar events for a date; [`Error::EmptyResult`] if the date is not
    /// covered (downstream labeling assumes coverage).
    pub fn day(&self, date: NaiveDate) -> Result<&SolarDay> {
        self.days
            .get(&date)
            .ok_or_else(|| Error::EmptyResult(format!("no solar day loaded for {date}")))
    }

    /// Non-failing lookup.
    #[must_use]
    pub fn get(&self, date: NaiveDate) -> Option<&SolarDay> {
        self.days.get(&date)
    }

    /// Number of dates covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Always false — construction rejects empty tables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Dates covered, ascending.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    /// Restrict to the inclusive date window `[start, end]`.
    pub fn restrict(&self, start: NaiveDate, end: NaiveDate) -> Result<Self> {
        Self::from_days(
            self.days
                .range(start..=end)
                .map(|(_, day)| day.clone()),
        )
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::solar_day;
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn hhmm_decodes_with_and_without_leading_zero() {
        assert_eq!(
            time_from_hhmm(619).unwrap(),
            NaiveTime::from_hms_opt(6, 19, 0).unwrap()
        );
        assert_eq!(
            time_from_hhmm(2042).unwrap(),
            NaiveTime::from_hms_opt(20, 42, 0).unwrap()
        );
        assert_eq!(
            time_from_hhmm(0).unwrap(),
            NaiveTime::from_hms_opt(0, 0, 0).unwrap()
        );
    }

    #[test]
    fn hhmm_rejects_invalid_codes() {
        assert!(time_from_hhmm(2460).is_err());
        assert!(time_from_hhmm(1299).is_err());
    }

    #[test]
    fn nesting_invariant_holds_for_valid_day() {
        assert!(solar_day(date(2021, 5, 26)).validate().is_ok());
    }

    #[test]
    fn nesting_invariant_rejects_swapped_tiers() {
        let mut day = solar_day(date(2021, 5, 26));
        std::mem::swap(&mut day.sunrise_official, &mut day.sunrise_astronomical);
        let err = day.validate().unwrap_err();
        assert!(err.to_string().contains("2021-05-26"));
    }

    #[test]
    fn table_lookup_and_missing_date() {
        let table =
            SolarEventTable::from_days((26..=31).map(|d| solar_day(date(2021, 5, d)))).unwrap();
        assert_eq!(table.len(), 6);
        assert!(table.day(date(2021, 5, 28)).is_ok());
        let err = table.day(date(2021, 7, 1)).unwrap_err();
        assert!(matches!(err, Error::EmptyResult(_)));
    }

    #[test]
    fn table_rejects_empty() {
        assert!(SolarEventTable::from_days(std::iter::empty()).is_err());
    }

    #[test]
    fn restrict_keeps_inclusive_window() {
        let table =
            SolarEventTable::from_days((26..=31).map(|d| solar_day(date(2021, 5, d)))).unwrap();
        let cut = table.restrict(date(2021, 5, 27), date(2021, 5, 29)).unwrap();
        assert_eq!(cut.dates().collect::<Vec<_>>(), vec![
            date(2021, 5, 27),
            date(2021, 5, 28),
            date(2021, 5, 29)
        ]);
    }

    #[test]
    fn tier_accessors_match_fields() {
        let day = solar_day(date(2021, 5, 26));
        assert_eq!(day.sunrise(TwilightTier::Official), day.sunrise_official);
        assert_eq!(day.sunset(TwilightTier::Astronomical), day.sunset_astronomical);
    }
}
