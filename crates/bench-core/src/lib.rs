//! The measurement loop and supervisor (C6 + C7): everything between
//! calibration and the final report.

mod error;
mod process;
mod supervisor;
mod timer;
mod worker;

pub use error::CoreError;
pub use supervisor::{run, SupervisorOutcome};
