//! 32-bucket histogram over the corrected sample set (C8). The 95th
//! percentile edge is found by scanning downward from `n·95/100` past any
//! non-positive sample; degenerate all-non-positive data reports
//! "no valid data" rather than panicking on a zero-width bucket. The range
//! itself runs from the sorted minimum (`samples[0]`, even if non-positive)
//! up to that edge, matching the original's `ba_data[0]`-anchored buckets.

pub struct HistogramBucket {
    pub lower: i64,
    pub upper: i64,
    pub count: usize,
}

pub struct Histogram {
    pub buckets: Vec<HistogramBucket>,
    /// Samples above the 95th-percentile edge, folded into one summary count
    /// rather than given their own buckets.
    pub above_v95: usize,
    pub no_valid_data: bool,
}

const BUCKET_COUNT: usize = 32;

/// `samples` must already be sorted ascending (the corrected prefix
/// `bench_stats::analyze` produces).
pub fn build(samples: &[i64]) -> Histogram {
    let n = samples.len();
    if n == 0 {
        return Histogram {
            buckets: Vec::new(),
            above_v95: 0,
            no_valid_data: true,
        };
    }

    let mut idx = (n * 95 / 100) as i64;
    while idx >= 0 && samples[idx as usize] <= 0 {
        idx -= 1;
    }
    if idx < 0 {
        return Histogram {
            buckets: Vec::new(),
            above_v95: 0,
            no_valid_data: true,
        };
    }
    let v95 = samples[idx as usize];

    // The sorted minimum, same as the original's `ba_data[0]` — kept even
    // when non-positive, so a handful of non-positive leading samples widen
    // the low end of the range instead of being dropped from it.
    let min = samples[0];

    let width = ((v95 - min + 1) + BUCKET_COUNT as i64 - 1) / BUCKET_COUNT as i64;
    let width = width.max(1);

    let mut buckets: Vec<HistogramBucket> = (0..BUCKET_COUNT)
        .map(|i| HistogramBucket {
            lower: min + i as i64 * width,
            upper: min + (i as i64 + 1) * width,
            count: 0,
        })
        .collect();
    let mut above_v95 = 0usize;

    for &v in samples {
        if v > v95 {
            above_v95 += 1;
            continue;
        }
        let bucket = (((v - min) / width) as usize).min(BUCKET_COUNT - 1);
        buckets[bucket].count += 1;
    }

    Histogram {
        buckets,
        above_v95,
        no_valid_data: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_thirty_two_buckets_for_ordinary_data() {
        let data: Vec<i64> = (1..=1000).collect();
        let h = build(&data);
        assert!(!h.no_valid_data);
        assert_eq!(h.buckets.len(), 32);
        let bucketed: usize = h.buckets.iter().map(|b| b.count).sum::<usize>() + h.above_v95;
        assert_eq!(bucketed, data.len());
    }

    #[test]
    fn all_non_positive_data_is_degenerate() {
        let data = vec![-5, -4, -3, 0];
        let h = build(&data);
        assert!(h.no_valid_data);
    }

    #[test]
    fn leading_non_positive_samples_widen_the_range_instead_of_being_dropped() {
        let mut data = vec![-10, 0];
        data.extend(1..=100);
        let h = build(&data);
        assert!(!h.no_valid_data);
        assert_eq!(h.buckets[0].lower, -10);
        let bucketed: usize = h.buckets.iter().map(|b| b.count).sum::<usize>() + h.above_v95;
        assert_eq!(bucketed, data.len());
    }
}
