//! Process-shared barrier and aggregation record (C4 + C5): the N-party
//! rendezvous primitive and the shared sample ring it funnels results into.

mod error;
mod layout;
mod mapping;
mod result;
mod shared_state;
mod tsd;

#[cfg(not(feature = "sysv-barrier"))]
mod barrier_condvar;
#[cfg(not(feature = "sysv-barrier"))]
mod sync_condvar;

#[cfg(feature = "sysv-barrier")]
mod barrier_sysv;
#[cfg(feature = "sysv-barrier")]
mod sync_sysv;

pub use error::IpcError;
pub use layout::Killed;
pub use mapping::SharedMapping;
pub use result::BatchResult;
pub use shared_state::{Setup, SharedState, Snapshot, DEF_DATASIZE, MIN_DATASIZE};
pub use tsd::TsdSegment;
