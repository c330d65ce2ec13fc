// SPDX-License-Identifier: AGPL-3.0-or-later
//! Detection report output.
//!
//! Replaces the peak-report CSVs `basic_activity_stats` wrote next to
//! its figures: one row per detected FAA window with the date, the
//! window bounds, and the sustained mean activity.

use std::fmt::Write as _;
use std::path::Path;

use crate::error::{Error, Result};
use crate::telemetry::faa::FaaWindow;

/// Render FAA windows as CSV text.
///
/// Columns: `date, start_time, end_time, mean_activity, bins`. Times
/// are local wall-clock `HH:MM:SS`; mean activity keeps 6 decimals,
/// matching the precision the Python reports carried.
#[must_use]
pub fn render_faa_csv(windows: &[FaaWindow]) -> String {
    let mut out = String::from("date,start_time,end_time,mean_activity,bins\n");
    for w in windows {
        let _ = writeln!(
            out,
            "{},{},{},{:.6},{}",
            w.date,
            w.start_time.format("%H:%M:%S"),
            w.end_time.format("%H:%M:%S"),
            w.mean_activity,
            w.bins
        );
    }
    out
}

/// Write the FAA window report to `path`.
pub fn write_faa_csv(path: &Path, windows: &[FaaWindow]) -> Result<()> {
    std::fs::write(path, render_faa_csv(windows)).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}
