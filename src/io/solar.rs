// SPDX-License-Identifier: AGPL-3.0-or-later
//! Sun-times CSV parsing.
//!
//! Replaces `sun_times.SunTimer.parse_and_read`. The field-season sun
//! tables come as one CSV per twilight tier with columns
//! `month, day, rise, set`, where `rise` and `set` are HHMM integer
//! codes (`609` = 06:09, `2030` = 20:30) for a fixed year. The four
//! tier files are joined by date into a [`SolarEventTable`].

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{NaiveDate, NaiveTime};

use crate::error::{Error, Result};
use crate::solar::{time_from_hhmm, SolarDay, SolarEventTable};

/// Paths to the four per-tier sun-times CSVs.
#[derive(Debug, Clone)]
pub struct SolarCsvPaths {
    pub official: std::path::PathBuf,
    pub civil: std::path::PathBuf,
    pub nautical: std::path::PathBuf,
    pub astronomical: std::path::PathBuf,
}

/// One tier's parsed rise/set times, keyed by date.
pub type TierTimes = BTreeMap<NaiveDate, (NaiveTime, NaiveTime)>;

/// Parse one tier CSV (`month, day, rise, set` with a header row).
///
/// Fields are trimmed, blank lines skipped. Malformed rows, invalid
/// HHMM codes, impossible dates, and duplicate dates are all
/// [`Error::MalformedInput`].
pub fn parse_tier_csv(text: &str, year: i32) -> Result<TierTimes> {
    let mut out = TierTimes::new();
    for (lineno, line) in text.lines().enumerate().skip(1) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let &[month, day, rise, set] = fields.as_slice() else {
            return Err(Error::MalformedInput(format!(
                "sun-times line {}: expected 4 fields, got {}",
                lineno + 1,
                fields.len()
            )));
        };
        let parse_u32 = |field: &str, what: &str| {
            field.parse::<u32>().map_err(|_| {
                Error::MalformedInput(format!(
                    "sun-times line {}: bad {what} {field:?}",
                    lineno + 1
                ))
            })
        };
        let month = parse_u32(month, "month")?;
        let day = parse_u32(day, "day")?;
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            Error::MalformedInput(format!(
                "sun-times line {}: no such date {year}-{month:02}-{day:02}",
                lineno + 1
            ))
        })?;
        let rise = time_from_hhmm(u16::try_from(parse_u32(rise, "rise code")?).map_err(|_| {
            Error::MalformedInput(format!("sun-times line {}: rise code out of range", lineno + 1))
        })?)?;
        let set = time_from_hhmm(u16::try_from(parse_u32(set, "set code")?).map_err(|_| {
            Error::MalformedInput(format!("sun-times line {}: set code out of range", lineno + 1))
        })?)?;
        if out.insert(date, (rise, set)).is_some() {
            return Err(Error::MalformedInput(format!(
                "sun-times line {}: duplicate date {date}",
                lineno + 1
            )));
        }
    }
    if out.is_empty() {
        return Err(Error::MalformedInput("sun-times CSV has no data rows".into()));
    }
    Ok(out)
}

/// Join the four parsed tiers into a validated [`SolarEventTable`].
///
/// Every date must be present in all four tiers; the per-day nesting
/// invariant (astronomical ⊂ nautical ⊂ civil ⊂ official) is checked
/// by [`SolarEventTable::from_days`].
pub fn assemble_table(
    official: &TierTimes,
    civil: &TierTimes,
    nautical: &TierTimes,
    astronomical: &TierTimes,
) -> Result<SolarEventTable> {
    let mut days = Vec::with_capacity(official.len());
    for (&date, &(sunrise_official, sunset_official)) in official {
        let missing =
            |tier: &str| Error::MalformedInput(format!("sun-times: {date} missing in {tier} tier"));
        let &(sunrise_civil, sunset_civil) = civil.get(&date).ok_or_else(|| missing("civil"))?;
        let &(sunrise_nautical, sunset_nautical) =
            nautical.get(&date).ok_or_else(|| missing("nautical"))?;
        let &(sunrise_astronomical, sunset_astronomical) =
            astronomical.get(&date).ok_or_else(|| missing("astronomical"))?;
        days.push(SolarDay {
            date,
            sunrise_official,
            sunset_official,
            sunrise_civil,
            sunset_civil,
            sunrise_nautical,
            sunset_nautical,
            sunrise_astronomical,
            sunset_astronomical,
        });
    }
    SolarEventTable::from_days(days)
}

fn read_to_string(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load and join the four tier CSVs from disk.
pub fn load_solar_table(paths: &SolarCsvPaths, year: i32) -> Result<SolarEventTable> {
    let official = parse_tier_csv(&read_to_string(&paths.official)?, year)?;
    let civil = parse_tier_csv(&read_to_string(&paths.civil)?, year)?;
    let nautical = parse_tier_csv(&read_to_string(&paths.nautical)?, year)?;
    let astronomical = parse_tier_csv(&read_to_string(&paths.astronomical)?, year)?;
    assemble_table(&official, &civil, &nautical, &astronomical)
}

#[cfg(test)]
mod tests {
    use super::*;

    const OFFICIAL: &str = "month,day,rise,set\n5,26,609,2030\n5,27,608,2031\n";
    const CIVIL: &str = "month,day,rise,set\n5,26,542,2057\n5,27,541,2058\n";
    const NAUTICAL: &str = "month,day,rise,set\n5,26,509,2131\n5,27,508,2132\n";
    const ASTRONOMICAL: &str = "month,day,rise,set\n5,26,433,2207\n5,27,431,2209\n";

    #[test]
    fn parses_hhmm_codes_with_trimming() {
        let tier = parse_tier_csv(" month, day, rise, set\n 5, 26, 609, 2030\n", 2021).unwrap();
        let date = NaiveDate::from_ymd_opt(2021, 5, 26).unwrap();
        let (rise, set) = tier[&date];
        assert_eq!(rise, NaiveTime::from_hms_opt(6, 9, 0).unwrap());
        assert_eq!(set, NaiveTime::from_hms_opt(20, 30, 0).unwrap());
    }

    #[test]
    fn malformed_rows_are_rejected() {
        assert!(matches!(
            parse_tier_csv("month,day,rise,set\n5,26,609\n", 2021),
            Err(Error::MalformedInput(_))
        ));
        assert!(matches!(
            parse_tier_csv("month,day,rise,set\n2,30,609,2030\n", 2021),
            Err(Error::MalformedInput(_))
        ));
        assert!(matches!(
            parse_tier_csv("month,day,rise,set\n5,26,2561,2030\n", 2021),
            Err(Error::MalformedInput(_))
        ));
        assert!(matches!(
            parse_tier_csv("month,day,rise,set\n5,26,609,2030\n5,26,610,2031\n", 2021),
            Err(Error::MalformedInput(_))
        ));
        assert!(matches!(
            parse_tier_csv("month,day,rise,set\n", 2021),
            Err(Error::MalformedInput(_))
        ));
    }

    #[test]
    fn four_tiers_assemble_into_a_table() {
        let table = assemble_table(
            &parse_tier_csv(OFFICIAL, 2021).unwrap(),
            &parse_tier_csv(CIVIL, 2021).unwrap(),
            &parse_tier_csv(NAUTICAL, 2021).unwrap(),
            &parse_tier_csv(ASTRONOMICAL, 2021).unwrap(),
        )
        .unwrap();
        assert_eq!(table.len(), 2);
        let day = table
            .day(NaiveDate::from_ymd_opt(2021, 5, 27).unwrap())
            .unwrap();
        assert_eq!(
            day.sunrise_astronomical,
            NaiveTime::from_hms_opt(4, 31, 0).unwrap()
        );
        assert_eq!(
            day.sunset_official,
            NaiveTime::from_hms_opt(20, 31, 0).unwrap()
        );
    }

    #[test]
    fn missing_date_in_one_tier_is_rejected() {
        let short_civil = parse_tier_csv("month,day,rise,set\n5,26,542,2057\n", 2021).unwrap();
        let err = assemble_table(
            &parse_tier_csv(OFFICIAL, 2021).unwrap(),
            &short_civil,
            &parse_tier_csv(NAUTICAL, 2021).unwrap(),
            &parse_tier_csv(ASTRONOMICAL, 2021).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
    }

    #[test]
    fn load_reports_the_failing_path() {
        let paths = SolarCsvPaths {
            official: "/nonexistent/official.csv".into(),
            civil: "/nonexistent/civil.csv".into(),
            nautical: "/nonexistent/nautical.csv".into(),
            astronomical: "/nonexistent/astronomical.csv".into(),
        };
        let err = load_solar_table(&paths, 2021).unwrap_err();
        match err {
            Error::Io { path, .. } => assert!(path.ends_with("official.csv")),
            other => panic!("expected Io error, got {other}"),
        }
    }

    #[test]
    fn roundtrip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let write = |name: &str, contents: &str| {
            let path = dir.path().join(name);
            std::fs::write(&path, contents).unwrap();
            path
        };
        let paths = SolarCsvPaths {
            official: write("official.csv", OFFICIAL),
            civil: write("civil.csv", CIVIL),
            nautical: write("nautical.csv", NAUTICAL),
            astronomical: write("astronomical.csv", ASTRONOMICAL),
        };
        let table = load_solar_table(&paths, 2021).unwrap();
        assert_eq!(table.len(), 2);
    }
}
