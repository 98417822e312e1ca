//! Clock overhead and resolution calibration, run once at startup unless
//! overridden by `-O`/`-R`.

const NSECITER: usize = 1000 * 1000 * 20;
const RES_SAMPLES: usize = 10_000;

/// Samples `(now_ns() - now_ns())` `n` times (after 3 warm-up reads),
/// applies iterated 3-sigma outlier removal, and returns the rounded mean.
pub fn measure_overhead_n(n: usize) -> u64 {
    let _ = bench_clock::now_ns();
    let _ = bench_clock::now_ns();
    let _ = bench_clock::now_ns();

    let mut data: Vec<i64> = Vec::with_capacity(n);
    for _ in 0..n {
        let s = bench_clock::now_ns();
        let e = bench_clock::now_ns();
        data.push(e as i64 - s as i64);
    }

    let analysis = bench_stats::analyze(&mut data);
    analysis.corrected.mean.round() as u64
}

pub fn measure_overhead() -> u64 {
    measure_overhead_n(NSECITER)
}

/// Finds the smallest busy-loop length producing a strictly positive delta
/// between two clock reads, then samples `RES_SAMPLES` intervals scaled by
/// that length; the result is the smallest strictly positive difference
/// between consecutive samples, or 1 if every difference was zero.
pub fn measure_resolution() -> u64 {
    measure_resolution_with_samples(RES_SAMPLES)
}

pub fn measure_resolution_with_samples(samples: usize) -> u64 {
    let mut nops: u64 = 1;
    let mut maxiter: u64 = 1000;
    loop {
        let mut found = false;
        for i in 1..=maxiter {
            let start = bench_clock::now_ns();
            busy_loop(i);
            let stop = bench_clock::now_ns();
            if stop > start {
                nops = i;
                found = true;
                break;
            }
        }
        if found {
            break;
        }
        maxiter *= 10;
    }

    let mut y = vec![0i64; samples];
    for (i, slot) in y.iter_mut().enumerate() {
        let start = bench_clock::now_ns();
        busy_loop(nops * i as u64);
        let stop = bench_clock::now_ns();
        *slot = stop as i64 - start as i64;
    }

    let mut res = y[0];
    for i in 1..samples {
        let diff = y[i] - y[i - 1];
        if diff > 0 && res > diff {
            res = diff;
        }
    }
    if res <= 0 {
        1
    } else {
        res as u64
    }
}

#[inline(never)]
fn busy_loop(mut n: u64) {
    while n > 0 {
        std::hint::black_box(n);
        n -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overhead_is_small_and_nonzero_for_native_clock() {
        let overhead = measure_overhead_n(5_000);
        assert!(overhead < 1_000_000, "overhead={overhead}");
    }

    #[test]
    fn resolution_is_at_least_one_ns() {
        let res = measure_resolution_with_samples(200);
        assert!(res >= 1);
    }
}
