// SPDX-License-Identifier: AGPL-3.0-or-later
//! Centralized validation tolerances with scientific justification.
//!
//! Every tolerance threshold used in validation binaries is defined here
//! with documentation of its origin. No ad-hoc magic numbers.
//!
//! # Tolerance categories
//!
//! | Category | Basis | Example |
//! |----------|-------|---------|
//! | Exact | IEEE 754 f64 | 0.0 for record counts |
//! | Machine | f64 arithmetic | 1e-12 for analytical formulas |
//! | Instrument | Sensor resolution | 0.01 °C for temperature |
//! | Baseline | Python reference | 1e-9 for scipy statistics |

// ═══════════════════════════════════════════════════════════════════
// Machine-precision tolerances (IEEE 754 f64)
// ═══════════════════════════════════════════════════════════════════

/// Operations that must be exact (record counts, bin counts, labels).
pub const EXACT: f64 = 0.0;

/// Analytical formulas with minimal f64 rounding (calibration slopes,
/// quantiles, z-scores).
///
/// f64 has ~15.9 significant digits; 1e-12 allows 3 digits of
/// accumulated rounding in simple arithmetic chains.
pub const ANALYTICAL_F64: f64 = 1e-12;

// ═══════════════════════════════════════════════════════════════════
// Instrument / baseline tolerances
// ═══════════════════════════════════════════════════════════════════

/// Tag temperature channel: ±0.01 °C (0.1 °C/count transmitter
/// resolution comfortably exceeds f64 calibration rounding).
pub const TEMPERATURE_CALIBRATION: f64 = 0.01;

/// Statistics vs the scipy baseline (KS, chi-square, Fisher combine).
///
/// scipy computes the same closed forms in f64; 1e-9 absorbs ordering
/// differences in the summations.
pub const SCIPY_BASELINE: f64 = 1e-9;

// ═══════════════════════════════════════════════════════════════════
// Series-expansion controls (special functions)
// ═══════════════════════════════════════════════════════════════════

/// Iteration cap for the incomplete-gamma series expansion.
///
/// The series converges in well under 200 terms for every (a, x) the
/// chi-square survival function feeds it (df ≤ 48, x below the cap in
/// `regularized_gamma_lower`).
pub const GAMMA_SERIES_MAX_ITER: usize = 500;

/// Relative convergence threshold for the incomplete-gamma series.
pub const GAMMA_SERIES_CONVERGENCE: f64 = 1e-15;

/// Term cutoff for the Kolmogorov distribution alternating series.
///
/// Terms decay like exp(-2k²x²); beyond this bound they are below f64
/// resolution for every x where the p-value is distinguishable from 0.
pub const KOLMOGOROV_SERIES_MAX_TERMS: usize = 100;
