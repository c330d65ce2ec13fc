// SPDX-License-Identifier: AGPL-3.0-or-later
//! Validation: statistics battery — scipy closed-form baselines.
//!
//! Validates the KS two-sample test, the seeded permutation test,
//! Pearson correlation, the 2×k chi-square, and Fisher's method against
//! scipy values computable in closed form.
//!
//! # Provenance
//!
//! | Field | Value |
//! |-------|-------|
//! | Baseline tool | scipy 1.10 closed forms |
//! | Baseline modules | ks_test_*.py, permutation_tests.py, shuffle_time.py |
//! | Baseline command | hand-evaluated closed-form expectations |
//! | Data | synthetic samples with analytic statistics |

use seabream::special::chi_squared_sf;
use seabream::telemetry::stats::{
    chi_square_2xk, fisher_combine, ks_two_sample, pearson_r, permutation_mean_diff, Alternative,
};
use seabream::tolerances;
use seabream::validation::Validator;

fn main() {
    let mut v = Validator::new("seabream: statistics battery vs scipy closed forms");

    v.section("── Kolmogorov-Smirnov ──");
    match ks_two_sample(&[1.0, 2.0, 3.0, 4.0], &[3.0, 4.0, 5.0, 6.0]) {
        Ok(r) => {
            v.check("D for shifted samples", r.statistic, 0.5, tolerances::ANALYTICAL_F64);
        }
        Err(e) => v.check_count(&format!("KS failed: {e}"), 0, 1),
    }
    match ks_two_sample(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]) {
        Ok(r) => {
            v.check("D for identical samples", r.statistic, 0.0, tolerances::EXACT);
            v.check("p for identical samples", r.p_value, 1.0, tolerances::SCIPY_BASELINE);
        }
        Err(e) => v.check_count(&format!("KS failed: {e}"), 0, 1),
    }

    v.section("── Permutation test (seeded) ──");
    let x = [5.0, 6.0, 7.0, 8.0];
    let y = [1.0, 2.0, 3.0, 4.0];
    match permutation_mean_diff(&x, &y, 999, Alternative::Greater, 42) {
        Ok(r) => {
            v.check("observed mean difference", r.statistic, 4.0, tolerances::ANALYTICAL_F64);
            v.check_count(
                "p below 0.05 for complete separation",
                usize::from(r.p_value < 0.05),
                1,
            );
            let rerun = permutation_mean_diff(&x, &y, 999, Alternative::Greater, 42);
            let identical = rerun.map(|r2| r2.p_value.to_bits() == r.p_value.to_bits());
            v.check_count("same seed, same p", usize::from(identical.unwrap_or(false)), 1);
        }
        Err(e) => v.check_count(&format!("permutation failed: {e}"), 0, 1),
    }

    v.section("── Pearson correlation ──");
    v.check(
        "perfect positive",
        pearson_r(&[1.0, 2.0, 3.0, 4.0], &[2.0, 4.0, 6.0, 8.0]).unwrap_or(f64::NAN),
        1.0,
        tolerances::ANALYTICAL_F64,
    );
    v.check(
        "perfect negative",
        pearson_r(&[1.0, 2.0, 3.0, 4.0], &[8.0, 6.0, 4.0, 2.0]).unwrap_or(f64::NAN),
        -1.0,
        tolerances::ANALYTICAL_F64,
    );

    v.section("── Chi-square and Fisher's method ──");
    match chi_square_2xk(&[10, 20], &[20, 10]) {
        Ok(r) => {
            v.check("2x2 statistic", r.statistic, 20.0 / 3.0, tolerances::ANALYTICAL_F64);
            v.check(
                "2x2 p-value",
                r.p_value,
                chi_squared_sf(20.0 / 3.0, 1.0),
                tolerances::SCIPY_BASELINE,
            );
        }
        Err(e) => v.check_count(&format!("chi-square failed: {e}"), 0, 1),
    }
    v.check(
        "chi2.sf at the 95% critical value",
        chi_squared_sf(3.841_458_820_694_124, 1.0),
        0.05,
        tolerances::SCIPY_BASELINE,
    );
    let p = (-1.0_f64).exp();
    match fisher_combine(&[p, p, p]) {
        Ok(r) => {
            v.check("combined statistic -2·3·ln(e⁻¹)", r.statistic, 6.0, tolerances::ANALYTICAL_F64);
            v.check(
                "combined p",
                r.p_value,
                chi_squared_sf(6.0, 6.0),
                tolerances::SCIPY_BASELINE,
            );
        }
        Err(e) => v.check_count(&format!("Fisher combine failed: {e}"), 0, 1),
    }

    v.finish();
}
