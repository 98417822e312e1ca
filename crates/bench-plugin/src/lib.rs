//! The plug-in boundary: the capability set a benchmark implementation
//! provides to the framework. Kept out of scope by the core specification
//! and modelled here as a polymorphic trait with sum-type errors, so
//! plug-ins become separate compilation units linked against the framework
//! rather than process globals mutated during option parsing.

pub use bench_ipc::BatchResult;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("plug-in setup failed: {0}")]
    Setup(String),
    #[error("unrecognized option -{0}")]
    UnknownOption(char),
}

/// A benchmark implementation. Every hook except `benchmark` has a
/// no-op/zero default so a minimal plug-in need only implement one method.
pub trait Plugin: Send + Sync {
    /// Bytes of thread-specific scratch space this plug-in needs per
    /// worker thread.
    fn tsd_size(&self) -> usize {
        0
    }

    /// Called once, before any worker process is spawned.
    fn init(&self) -> Result<(), PluginError> {
        Ok(())
    }

    /// Called once per run, before workers start. A failure here is fatal.
    fn initrun(&self) -> Result<(), PluginError> {
        Ok(())
    }

    /// Called once per worker thread before its measurement loop starts.
    /// Returns an error count folded into that thread's fatal-error tally.
    fn initworker(&self, _tsd: &mut [u8]) -> u32 {
        0
    }

    /// Called at the top of every batch iteration, before the timed region.
    fn initbatch(&self, _tsd: &mut [u8]) -> u32 {
        0
    }

    /// The timed call. Must run exactly `batch_size` internal iterations
    /// (or fewer, recording the shortfall in `result.errors`) and set
    /// `result.count`/`result.errors` itself; this keeps the framework's
    /// timed region to exactly two clock reads and one call.
    fn benchmark(&self, tsd: &mut [u8], batch_size: u64, result: &mut BatchResult);

    /// Called after every batch's result has been aggregated.
    fn finibatch(&self, _tsd: &mut [u8]) -> u32 {
        0
    }

    /// Called once per worker thread after its measurement loop ends.
    fn finiworker(&self, _tsd: &mut [u8]) -> u32 {
        0
    }

    /// Called once per run, after all workers have finished. A failure
    /// here is recorded but does not change the run's outcome.
    fn finirun(&self) -> Result<(), PluginError> {
        Ok(())
    }

    /// Called once, after the run's statistics have been computed.
    fn fini(&self) -> Result<(), PluginError> {
        Ok(())
    }

    /// Handles a plug-in-specific command-line flag not recognized by the
    /// framework's own flag set.
    fn optswitch(&self, opt: char, _arg: Option<&str>) -> Result<(), PluginError> {
        Err(PluginError::UnknownOption(opt))
    }

    /// A short result string appended to the data line, e.g. an operation
    /// count or checksum specific to this plug-in.
    fn result(&self) -> String {
        String::new()
    }
}
