//! The trivial baseline plug-in (S1): `benchmark` does nothing but count its
//! own iterations in a tight loop, so the measured `ns/call` is close to
//! pure framework/measurement overhead.

use bench_plugin::{BatchResult, Plugin};

#[derive(Debug, Default)]
pub struct NoopPlugin;

impl Plugin for NoopPlugin {
    fn benchmark(&self, _tsd: &mut [u8], batch_size: u64, result: &mut BatchResult) {
        let mut count = 0u64;
        for _ in 0..batch_size {
            count = std::hint::black_box(count) + 1;
        }
        result.count = count;
        result.errors = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_every_iteration() {
        let plugin = NoopPlugin;
        let mut result = BatchResult::default();
        plugin.benchmark(&mut [], 1000, &mut result);
        assert_eq!(result.count, 1000);
        assert_eq!(result.errors, 0);
    }
}
