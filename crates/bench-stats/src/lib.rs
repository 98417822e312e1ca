//! Derived statistics over batches of `ns/op` samples: moments, least-squares
//! fit, and iterated 3-sigma outlier removal.

/// Moments and derived values computed over one (sorted) set of samples.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Stats {
    pub min: i64,
    pub max: i64,
    pub mean: f64,
    pub median: i64,
    pub stddev: f64,
    pub stderr: f64,
    pub ci99: f64,
    pub skew: f64,
    pub kurtosis: f64,
    pub timecorr: f64,
}

/// Result of a full `compute_stats`-style pass: raw stats, outlier-corrected
/// stats, how many samples were dropped, and the surviving count.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Analysis {
    pub raw: Stats,
    pub corrected: Stats,
    pub outliers: usize,
    pub batches_final: usize,
}

/// Least-squares fit of `y = a + b*x`. When `x` is `None`, `x[i] = i` is
/// used. Returns `(NaN, NaN)` when the fit is degenerate (denominator zero).
pub fn fit_line(x: Option<&[i64]>, y: &[i64]) -> (f64, f64) {
    let count = y.len();
    let (mut sumx, mut sumy, mut sumxy, mut sumx2) = (0.0f64, 0.0f64, 0.0f64, 0.0f64);
    for i in 0..count {
        let xi = match x {
            Some(xs) => xs[i] as f64,
            None => i as f64,
        };
        let yi = y[i] as f64;
        sumx += xi;
        sumx2 += xi * xi;
        sumy += yi;
        sumxy += xi * yi;
    }
    let denom = (count as f64 * sumx2) - (sumx * sumx);
    if denom == 0.0 {
        (f64::NAN, f64::NAN)
    } else {
        let a = ((sumy * sumx2) - (sumx * sumxy)) / denom;
        let b = ((count as f64 * sumxy) - (sumx * sumy)) / denom;
        (a, b)
    }
}

/// Computes moments over `data[..count]`. `data` must already be sorted;
/// the median is read directly off the sorted order. `count` must be
/// nonzero; callers guard the empty case before reaching here.
fn crunch_stats(data: &[i64], count: usize) -> Stats {
    let sum: i64 = data[..count].iter().sum();
    let mean = sum as f64 / count as f64;
    let median = data[count / 2];
    let (_, timecorr) = fit_line(None, &data[..count]);

    let mut min = i64::MAX;
    let mut max = i64::MIN;
    let (mut std, mut sk, mut ku) = (0.0f64, 0.0f64, 0.0f64);
    for &v in &data[..count] {
        if v > max {
            max = v;
        }
        if v < min {
            min = v;
        }
        let diff = v as f64 - mean;
        let diff2 = diff * diff;
        std += diff2;
        let diff3 = diff2 * diff;
        sk += diff3;
        ku += diff3 * diff;
    }

    let cm1 = (count - 1) as f64;
    let stddev = (std / cm1).sqrt();
    let stderr = stddev / (count as f64).sqrt();
    let ci99 = stderr * 2.576;
    let std3 = stddev * stddev * stddev;
    let skew = sk / (cm1 * std3);
    let kurtosis = (ku / (cm1 * (std3 * stddev))) - 3.0;

    Stats {
        min,
        max,
        mean,
        median,
        stddev,
        stderr,
        ci99,
        skew,
        kurtosis,
        timecorr,
    }
}

/// Drops samples outside `[mean-3*stddev, mean+3*stddev]` from a *sorted*
/// slice, compacting survivors to the front. Returns the number dropped.
pub fn remove_outliers(data: &mut [i64], count: usize, stats: &Stats) -> usize {
    let outmin = (stats.mean - 3.0 * stats.stddev).round() as i64;
    let outmax = (stats.mean + 3.0 * stats.stddev).round() as i64;

    let mut min_idx = count;
    for (i, &v) in data[..count].iter().enumerate() {
        if v >= outmin {
            min_idx = i;
            break;
        }
    }

    let mut max_idx: isize = -1;
    for i in (0..count).rev() {
        if data[i] <= outmax {
            max_idx = i as isize;
            break;
        }
    }

    if min_idx > 0 {
        let mut i = 0usize;
        let mut idx = min_idx;
        while idx as isize <= max_idx && i < count {
            data[i] = data[idx];
            idx += 1;
            i += 1;
        }
        count - i
    } else {
        count - (max_idx + 1) as usize
    }
}

/// Sorts `data`, then applies `crunch_stats` followed by iterated 3-sigma
/// outlier removal (bypassed for populations of 40 or fewer), mirroring
/// `compute_stats`. A run that recorded no batches at all (killed before
/// its first result landed) yields a defaulted, zeroed `Analysis` instead
/// of panicking, matching the original's tolerance of `ba_count == 0`.
pub fn analyze(data: &mut [i64]) -> Analysis {
    let mut count = data.len();
    if count == 0 {
        return Analysis::default();
    }
    data.sort_unstable();

    let raw = crunch_stats(data, count);
    let mut corrected = raw;
    let mut outliers = 0usize;

    if count > 40 {
        loop {
            let removed = remove_outliers(data, count, &corrected);
            outliers += removed;
            count -= removed;
            corrected = crunch_stats(data, count);
            if removed == 0 || count <= 40 {
                break;
            }
        }
    }

    Analysis {
        raw,
        corrected,
        outliers,
        batches_final: count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_line_recovers_exact_linear_series() {
        let y: Vec<i64> = (0..50).map(|i| 10 + 3 * i).collect();
        let (a, b) = fit_line(None, &y);
        assert!((a - 10.0).abs() < 1e-6, "a={a}");
        assert!((b - 3.0).abs() < 1e-6, "b={b}");
    }

    #[test]
    fn fit_line_degenerate_single_point_is_nan() {
        let y = [5i64];
        let (a, b) = fit_line(None, &y);
        assert!(a.is_nan());
        assert!(b.is_nan());
    }

    #[test]
    fn ci99_matches_stderr_times_constant() {
        let mut data: Vec<i64> = (1..=200).collect();
        let analysis = analyze(&mut data);
        let expected = analysis.raw.stderr * 2.576;
        assert!((analysis.raw.ci99 - expected).abs() < 1e-9);
    }

    #[test]
    fn outlier_removal_is_a_fixed_point() {
        let mut data: Vec<i64> = (1..=500).collect();
        data.extend([1_000_000, -1_000_000, 2_000_000]);
        let analysis = analyze(&mut data);
        let mut tail = data[..analysis.batches_final].to_vec();
        let removed_again = remove_outliers(&mut tail, analysis.batches_final, &analysis.corrected);
        assert_eq!(removed_again, 0);
    }

    #[test]
    fn corrected_bounds_contain_every_surviving_sample() {
        let mut data: Vec<i64> = (1..=300).collect();
        data.push(50_000);
        let analysis = analyze(&mut data);
        for &v in &data[..analysis.batches_final] {
            assert!(v >= analysis.corrected.min);
            assert!(v <= analysis.corrected.max);
        }
    }

    #[test]
    fn small_population_bypasses_outlier_removal() {
        let mut data: Vec<i64> = vec![1, 2, 3, 1_000_000];
        let analysis = analyze(&mut data);
        assert_eq!(analysis.outliers, 0);
        assert_eq!(analysis.batches_final, 4);
    }

    #[test]
    fn median_is_upper_middle_of_sorted_data() {
        let mut data: Vec<i64> = vec![40, 10, 30, 20];
        let analysis = analyze(&mut data);
        assert_eq!(analysis.raw.median, 30);
    }

    #[test]
    fn empty_input_yields_a_defaulted_analysis_instead_of_panicking() {
        let mut data: Vec<i64> = vec![];
        let analysis = analyze(&mut data);
        assert_eq!(analysis.batches_final, 0);
        assert_eq!(analysis.outliers, 0);
        assert_eq!(analysis.raw, Stats::default());
        assert_eq!(analysis.corrected, Stats::default());
    }
}
