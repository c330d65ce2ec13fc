// SPDX-License-Identifier: AGPL-3.0-or-later
//! Statistics battery for enriched telemetry streams.
//!
//! Replaces `basic_activity_stats.compare_activity_distributions` and
//! `fish_depth_clustering.water_column_randomization` (scipy
//! `ks_2samp`, `permutation_test`, `pearsonr`, `chi2_contingency`,
//! `combine_pvalues`).
//!
//! All randomized procedures take an explicit seed and run on the
//! sovereign [`Lcg64`] generator, so every p-value is reproducible
//! bit-for-bit across runs and platforms.

use crate::error::{Error, Result};
use crate::special::{chi_squared_sf, kolmogorov_sf};
use crate::telemetry::outlier::{mean, population_std};
use crate::telemetry::record::{ChannelType, EnrichedRecord, WaterColumn};

/// Knuth-style 64-bit linear congruential generator.
///
/// Same multiplier/increment as PCG's underlying LCG. Deterministic,
/// seedable, and free of platform entropy, which is what the
/// permutation and shuffle tests need.
#[derive(Debug, Clone)]
pub struct Lcg64 {
    state: u64,
}

impl Lcg64 {
    const MULT: u64 = 6_364_136_223_846_793_005;
    const INC: u64 = 1_442_695_040_888_963_407;

    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_mul(Self::MULT).wrapping_add(Self::INC),
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(Self::MULT).wrapping_add(Self::INC);
        self.state
    }

    /// Uniform f64 in [0, 1) with 53 bits of precision.
    #[allow(clippy::cast_precision_loss)]
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / ((1_u64 << 53) as f64)
    }

    /// Fisher-Yates shuffle in place.
    ///
    /// Index selection uses modulo reduction; for the slice lengths the
    /// pipeline shuffles (≤ 1e5) the bias is far below 2⁻⁴⁰.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = usize::try_from(self.next_u64() % (i as u64 + 1)).unwrap_or(0);
            slice.swap(i, j);
        }
    }
}

/// Directional hypothesis for the permutation test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alternative {
    /// Observed statistic in the lower tail.
    Less,
    /// Observed statistic in the upper tail.
    Greater,
    /// Either tail.
    TwoSided,
}

/// Descriptive summary of the activity channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivitySummary {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation (divisor N).
    pub std: f64,
    pub min: f64,
    pub median: f64,
    pub max: f64,
}

/// Summarize the activity channel of an enriched stream.
///
/// [`Error::EmptyResult`] when the stream carries no activity records.
pub fn activity_summary(records: &[EnrichedRecord]) -> Result<ActivitySummary> {
    let values: Vec<f64> = records
        .iter()
        .filter(|r| r.channel == ChannelType::Activity)
        .map(|r| r.activity)
        .collect();
    if values.is_empty() {
        return Err(Error::EmptyResult(
            "activity summary: no activity-channel records".into(),
        ));
    }
    let median = crate::telemetry::faa::quantile(&values, 0.5)
        .ok_or_else(|| Error::EmptyResult("activity summary: no values".into()))?;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Ok(ActivitySummary {
        count: values.len(),
        mean: mean(&values),
        std: population_std(&values),
        min,
        median,
        max,
    })
}

/// Outcome of a two-sample test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestResult {
    pub statistic: f64,
    pub p_value: f64,
}

/// Two-sample Kolmogorov-Smirnov test (two-sided, asymptotic p-value).
///
/// The statistic is the supremum distance between the two empirical
/// CDFs; the p-value uses the Kolmogorov tail with the finite-sample
/// scale correction `en + 0.12 + 0.11/en` (Numerical Recipes §14.3).
pub fn ks_two_sample(x: &[f64], y: &[f64]) -> Result<TestResult> {
    if x.is_empty() || y.is_empty() {
        return Err(Error::InvalidInput(
            "KS test requires two non-empty samples".into(),
        ));
    }
    let mut xs = x.to_vec();
    let mut ys = y.to_vec();
    xs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    ys.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    #[allow(clippy::cast_precision_loss)]
    let (nx, ny) = (xs.len() as f64, ys.len() as f64);
    let mut d = 0.0_f64;
    let (mut i, mut j) = (0usize, 0usize);
    while i < xs.len() && j < ys.len() {
        let t = xs[i].min(ys[j]);
        while i < xs.len() && xs[i] <= t {
            i += 1;
        }
        while j < ys.len() && ys[j] <= t {
            j += 1;
        }
        #[allow(clippy::cast_precision_loss)]
        let gap = (i as f64 / nx - j as f64 / ny).abs();
        d = d.max(gap);
    }

    let en = (nx * ny / (nx + ny)).sqrt();
    let p = kolmogorov_sf((en + 0.12 + 0.11 / en) * d);
    Ok(TestResult {
        statistic: d,
        p_value: p,
    })
}

/// Permutation test on the difference of sample means.
///
/// The pooled sample is reshuffled `n_resamples` times with a seeded
/// [`Lcg64`]; the p-value uses the add-one estimator
/// `(hits + 1) / (n_resamples + 1)`, which never returns exactly zero.
#[allow(clippy::cast_precision_loss)]
pub fn permutation_mean_diff(
    x: &[f64],
    y: &[f64],
    n_resamples: usize,
    alternative: Alternative,
    seed: u64,
) -> Result<TestResult> {
    if x.is_empty() || y.is_empty() || n_resamples == 0 {
        return Err(Error::InvalidInput(
            "permutation test requires two non-empty samples and at least one resample".into(),
        ));
    }
    let observed = mean(x) - mean(y);
    let mut pool: Vec<f64> = x.iter().chain(y.iter()).copied().collect();
    let mut rng = Lcg64::new(seed);
    let mut hits = 0usize;
    for _ in 0..n_resamples {
        rng.shuffle(&mut pool);
        let diff = mean(&pool[..x.len()]) - mean(&pool[x.len()..]);
        let hit = match alternative {
            Alternative::Less => diff <= observed,
            Alternative::Greater => diff >= observed,
            Alternative::TwoSided => diff.abs() >= observed.abs(),
        };
        if hit {
            hits += 1;
        }
    }
    Ok(TestResult {
        statistic: observed,
        p_value: (hits + 1) as f64 / (n_resamples + 1) as f64,
    })
}

/// Pearson correlation coefficient of two equal-length samples.
///
/// [`Error::InvalidInput`] for mismatched lengths, fewer than two
/// points, or a zero-variance sample.
#[allow(clippy::cast_precision_loss)]
pub fn pearson_r(x: &[f64], y: &[f64]) -> Result<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return Err(Error::InvalidInput(format!(
            "Pearson r requires two equal-length samples of at least 2 points, got {} and {}",
            x.len(),
            y.len()
        )));
    }
    let (mx, my) = (mean(x), mean(y));
    let mut sxy = 0.0_f64;
    let mut sxx = 0.0_f64;
    let mut syy = 0.0_f64;
    for (&a, &b) in x.iter().zip(y) {
        sxy += (a - mx) * (b - my);
        sxx += (a - mx) * (a - mx);
        syy += (b - my) * (b - my);
    }
    if sxx == 0.0 || syy == 0.0 {
        return Err(Error::InvalidInput(
            "Pearson r undefined for a zero-variance sample".into(),
        ));
    }
    Ok(sxy / (sxx * syy).sqrt())
}

/// Outcome of a chi-square test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChiSquareResult {
    pub statistic: f64,
    pub df: f64,
    pub p_value: f64,
}

/// Chi-square homogeneity test on a 2×k contingency table.
///
/// Columns where both rows are zero are dropped (they carry no
/// information); df is `surviving_columns - 1`.
#[allow(clippy::cast_precision_loss)]
pub fn chi_square_2xk(row_a: &[u64], row_b: &[u64]) -> Result<ChiSquareResult> {
    if row_a.len() != row_b.len() || row_a.is_empty() {
        return Err(Error::InvalidInput(
            "chi-square requires two equal-length count rows".into(),
        ));
    }
    let cols: Vec<(u64, u64)> = row_a
        .iter()
        .zip(row_b)
        .map(|(&a, &b)| (a, b))
        .filter(|&(a, b)| a + b > 0)
        .collect();
    if cols.len() < 2 {
        return Err(Error::InvalidInput(
            "chi-square needs at least two non-empty columns".into(),
        ));
    }
    let total_a: u64 = cols.iter().map(|&(a, _)| a).sum();
    let total_b: u64 = cols.iter().map(|&(_, b)| b).sum();
    if total_a == 0 || total_b == 0 {
        return Err(Error::InvalidInput(
            "chi-square needs both rows non-empty".into(),
        ));
    }
    let grand = (total_a + total_b) as f64;
    let mut statistic = 0.0_f64;
    for &(a, b) in &cols {
        let col_total = (a + b) as f64;
        let ea = total_a as f64 * col_total / grand;
        let eb = total_b as f64 * col_total / grand;
        statistic += (a as f64 - ea).powi(2) / ea + (b as f64 - eb).powi(2) / eb;
    }
    let df = (cols.len() - 1) as f64;
    Ok(ChiSquareResult {
        statistic,
        df,
        p_value: chi_squared_sf(statistic, df),
    })
}

/// Fisher's method for combining independent p-values.
///
/// X = -2 Σ ln pᵢ follows chi-square with 2k degrees of freedom under
/// the joint null. Zero p-values are clamped to f64::MIN_POSITIVE so
/// the log stays finite.
#[allow(clippy::cast_precision_loss)]
pub fn fisher_combine(p_values: &[f64]) -> Result<ChiSquareResult> {
    if p_values.is_empty() {
        return Err(Error::InvalidInput("Fisher combine of zero p-values".into()));
    }
    if p_values.iter().any(|p| !(0.0..=1.0).contains(p)) {
        return Err(Error::InvalidInput(
            "Fisher combine requires p-values in [0, 1]".into(),
        ));
    }
    let statistic = -2.0
        * p_values
            .iter()
            .map(|&p| p.max(f64::MIN_POSITIVE).ln())
            .sum::<f64>();
    let df = 2.0 * p_values.len() as f64;
    Ok(ChiSquareResult {
        statistic,
        df,
        p_value: chi_squared_sf(statistic, df),
    })
}

/// Per-column outcome of the water-column randomization test.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnShuffleResult {
    pub column: WaterColumn,
    /// Hour-of-day occupancy counts for the unshuffled stream.
    pub observed: [u64; 24],
    /// Fisher-combined p-value over the shuffle replicates.
    pub p_combined: f64,
}

/// Water-column randomization test.
///
/// Null hypothesis: hour-of-day occupancy within a water column is
/// indistinguishable from a random relabelling of the columns. For each
/// replicate the column labels are reshuffled across records and each
/// column's observed hourly counts are tested against the shuffled
/// counts with [`chi_square_2xk`]; the per-replicate p-values are
/// combined per column with Fisher's method. A small combined p means
/// column occupancy is structured by time of day.
pub fn water_column_shuffle_test(
    records: &[EnrichedRecord],
    n_shuffles: usize,
    seed: u64,
) -> Result<Vec<ColumnShuffleResult>> {
    if records.is_empty() {
        return Err(Error::EmptyResult("shuffle test: no records".into()));
    }
    if n_shuffles == 0 {
        return Err(Error::InvalidInput(
            "shuffle test requires at least one replicate".into(),
        ));
    }

    let hours: Vec<usize> = records
        .iter()
        .map(|r| {
            usize::try_from(chrono::Timelike::hour(&r.sensor.timestamp.time()))
                .unwrap_or(0)
                .min(23)
        })
        .collect();
    let mut labels: Vec<WaterColumn> = records.iter().map(|r| r.water_column).collect();

    let count = |labels: &[WaterColumn], column: WaterColumn| -> [u64; 24] {
        let mut counts = [0u64; 24];
        for (&label, &hour) in labels.iter().zip(&hours) {
            if label == column {
                counts[hour] += 1;
            }
        }
        counts
    };

    let observed: Vec<(WaterColumn, [u64; 24])> = WaterColumn::ALL
        .iter()
        .map(|&c| (c, count(&labels, c)))
        .filter(|(_, counts)| counts.iter().sum::<u64>() > 0)
        .collect();
    if observed.is_empty() {
        return Err(Error::EmptyResult("shuffle test: no occupied columns".into()));
    }

    let mut rng = Lcg64::new(seed);
    let mut per_column_ps: Vec<Vec<f64>> = vec![Vec::with_capacity(n_shuffles); observed.len()];
    for _ in 0..n_shuffles {
        rng.shuffle(&mut labels);
        for (slot, (column, observed_counts)) in per_column_ps.iter_mut().zip(&observed) {
            let shuffled = count(&labels, *column);
            let p = chi_square_2xk(observed_counts, &shuffled)?.p_value;
            slot.push(p);
        }
    }

    observed
        .iter()
        .zip(&per_column_ps)
        .map(|(&(column, observed), ps)| {
            Ok(ColumnShuffleResult {
                column,
                observed,
                p_combined: fisher_combine(ps)?.p_value,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    use crate::telemetry::record::{
        fractional_hours, DiurnalInterval, SensorRecord, TimeOfDay,
    };

    fn ts(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 5, 26)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn activity_rec(timestamp: NaiveDateTime, activity: f64, depth: f64) -> EnrichedRecord {
        EnrichedRecord {
            sensor: SensorRecord {
                tag_id: 1002,
                fish_id: 1002,
                timestamp,
                depth,
                raw_channel_value: activity / crate::telemetry::channel::ACTIVITY_SLOPE,
                signal_quality: 30.0,
                geometric_precision: Some(1.0),
            },
            channel: ChannelType::Activity,
            activity,
            temperature: -1.0,
            time_of_day: TimeOfDay::Day,
            interval: DiurnalInterval::T1200To1400,
            water_column: WaterColumn::from_depth(depth),
            time_of_day_hours: fractional_hours(timestamp),
        }
    }

    #[test]
    fn lcg_is_deterministic_per_seed() {
        let mut a = Lcg64::new(42);
        let mut b = Lcg64::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
        let mut c = Lcg64::new(43);
        let matches = (0..100).filter(|_| a.next_u64() == c.next_u64()).count();
        assert!(matches < 3, "different seeds should diverge");
    }

    #[test]
    fn lcg_f64_in_unit_interval() {
        let mut rng = Lcg64::new(7);
        for _ in 0..1000 {
            let u = rng.next_f64();
            assert!((0.0..1.0).contains(&u));
        }
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = Lcg64::new(99);
        let mut v: Vec<u32> = (0..50).collect();
        rng.shuffle(&mut v);
        let mut sorted = v.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
        assert_ne!(v, (0..50).collect::<Vec<_>>(), "50 items should move");
    }

    #[test]
    fn summary_over_activity_channel_only() {
        let records = vec![
            activity_rec(ts(1, 0), 1.0, 2.0),
            activity_rec(ts(2, 0), 3.0, 2.0),
            activity_rec(ts(3, 0), 5.0, 2.0),
        ];
        let s = activity_summary(&records).unwrap();
        assert_eq!(s.count, 3);
        assert!((s.mean - 3.0).abs() < 1e-12);
        assert!((s.median - 3.0).abs() < 1e-12);
        assert!((s.min - 1.0).abs() < 1e-12);
        assert!((s.max - 5.0).abs() < 1e-12);
        // population std of {1,3,5} = sqrt(8/3)
        assert!((s.std - (8.0_f64 / 3.0).sqrt()).abs() < 1e-12);
        assert!(matches!(
            activity_summary(&[]),
            Err(Error::EmptyResult(_))
        ));
    }

    #[test]
    fn ks_identical_samples_have_zero_distance() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let r = ks_two_sample(&x, &x).unwrap();
        assert!(r.statistic.abs() < 1e-15);
        assert!((r.p_value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn ks_disjoint_samples_have_distance_one() {
        let x = [1.0, 2.0, 3.0];
        let y = [10.0, 11.0, 12.0];
        let r = ks_two_sample(&x, &y).unwrap();
        assert!((r.statistic - 1.0).abs() < 1e-15);
        assert!(r.p_value < 0.05);
    }

    #[test]
    fn ks_known_statistic() {
        // F1 jumps at {1,2,3,4}, F2 at {3,4,5,6}: max gap is 0.5 at t=2.
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [3.0, 4.0, 5.0, 6.0];
        let r = ks_two_sample(&x, &y).unwrap();
        assert!((r.statistic - 0.5).abs() < 1e-15);
    }

    #[test]
    fn permutation_test_is_seed_stable() {
        let x = [5.0, 6.0, 7.0, 8.0];
        let y = [1.0, 2.0, 3.0, 4.0];
        let a = permutation_mean_diff(&x, &y, 500, Alternative::Greater, 42).unwrap();
        let b = permutation_mean_diff(&x, &y, 500, Alternative::Greater, 42).unwrap();
        assert_eq!(a.p_value.to_bits(), b.p_value.to_bits());
        assert!((a.statistic - 4.0).abs() < 1e-12);
        // Complete separation: only the identity-like splits reach 4.0.
        assert!(a.p_value < 0.1);
    }

    #[test]
    fn permutation_p_value_never_zero() {
        let x = [100.0, 101.0];
        let y = [1.0, 2.0];
        let r = permutation_mean_diff(&x, &y, 999, Alternative::Greater, 1).unwrap();
        assert!(r.p_value >= 1.0 / 1000.0);
    }

    #[test]
    fn pearson_known_values() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let up = [2.0, 4.0, 6.0, 8.0];
        let down = [8.0, 6.0, 4.0, 2.0];
        assert!((pearson_r(&x, &up).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson_r(&x, &down).unwrap() + 1.0).abs() < 1e-12);
        assert!(matches!(
            pearson_r(&x, &[1.0, 1.0, 1.0, 1.0]),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            pearson_r(&x, &[1.0]),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn chi_square_homogeneous_rows() {
        // Identical rows: statistic 0, p-value 1.
        let r = chi_square_2xk(&[10, 20, 30], &[10, 20, 30]).unwrap();
        assert!(r.statistic.abs() < 1e-12);
        assert!((r.p_value - 1.0).abs() < 1e-12);
        assert!((r.df - 2.0).abs() < 1e-15);
    }

    #[test]
    fn chi_square_2x2_known_value() {
        // [[10, 20], [20, 10]]: expected 15 everywhere, X² = 4·25/15 = 20/3.
        let r = chi_square_2xk(&[10, 20], &[20, 10]).unwrap();
        assert!((r.statistic - 20.0 / 3.0).abs() < 1e-12);
        assert!((r.df - 1.0).abs() < 1e-15);
        assert!((r.p_value - chi_squared_sf(20.0 / 3.0, 1.0)).abs() < 1e-15);
    }

    #[test]
    fn chi_square_drops_empty_columns() {
        let with_empty = chi_square_2xk(&[10, 0, 20], &[20, 0, 10]).unwrap();
        let without = chi_square_2xk(&[10, 20], &[20, 10]).unwrap();
        assert!((with_empty.statistic - without.statistic).abs() < 1e-15);
        assert!((with_empty.df - without.df).abs() < 1e-15);
    }

    #[test]
    fn fisher_combine_uniform_null() {
        // k p-values of exp(-1): X = 2k, mean of chi2(2k), p ≈ 0.4-0.5.
        let p = (-1.0_f64).exp();
        let r = fisher_combine(&[p, p, p]).unwrap();
        assert!((r.statistic - 6.0).abs() < 1e-12);
        assert!((r.df - 6.0).abs() < 1e-15);
        assert!(r.p_value > 0.3 && r.p_value < 0.6);
        assert!(matches!(fisher_combine(&[]), Err(Error::InvalidInput(_))));
        assert!(matches!(
            fisher_combine(&[0.5, 1.5]),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn shuffle_test_detects_structured_occupancy() {
        // Upper column occupied only at night hours, lower only at midday:
        // strongly structured, so combined p-values should be small.
        let mut records = Vec::new();
        for i in 0..120 {
            records.push(activity_rec(ts(i % 4, (i * 7) % 60), 1.0, 1.0)); // 00:00-03:59, 0-3 m
            records.push(activity_rec(ts(12 + i % 4, (i * 11) % 60), 1.0, 8.0)); // midday, 6-9 m
        }
        let results = water_column_shuffle_test(&records, 20, 42).unwrap();
        assert_eq!(results.len(), 2);
        for r in &results {
            assert!(
                r.p_combined < 0.01,
                "{} combined p {} should be small",
                r.column,
                r.p_combined
            );
            assert_eq!(r.observed.iter().sum::<u64>(), 120);
        }
    }

    #[test]
    fn shuffle_test_is_seed_stable() {
        let records: Vec<EnrichedRecord> = (0..60)
            .map(|i| activity_rec(ts(i % 24, (i * 13) % 60), 1.0, f64::from(i % 9)))
            .collect();
        let a = water_column_shuffle_test(&records, 10, 7).unwrap();
        let b = water_column_shuffle_test(&records, 10, 7).unwrap();
        assert_eq!(a, b);
    }
}
