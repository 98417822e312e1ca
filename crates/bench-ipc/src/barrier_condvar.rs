//! The condvar realization of the N-party barrier round, following
//! `barrier_queue`'s pthread branch: increment waiters under the lock, the
//! arrival that fills `hwm` flips the phase and broadcasts, everyone else
//! waits for the phase to change.

use crate::error::IpcError;
use crate::layout::Header;
use crate::result::BatchResult;
use crate::shared_state::{aggregate, decide_termination};
use crate::sync_condvar as sync;
use std::sync::atomic::Ordering;

pub(crate) fn init(header: &Header) -> Result<(), IpcError> {
    sync::init(header)
}

pub(crate) fn enter(
    header: &Header,
    data: *mut i64,
    result: Option<BatchResult>,
) -> Result<bool, IpcError> {
    sync::lock(header)?;

    if let Some(r) = result {
        aggregate(header, data, r);
    }

    let phase = header.phase.load(Ordering::Relaxed);
    if phase >= 0 {
        let waiters = header.waiters.load(Ordering::Relaxed) + 1;
        header.waiters.store(waiters, Ordering::Relaxed);

        if waiters == header.hwm as i32 {
            header.waiters.store(0, Ordering::Relaxed);
            let next = if result.is_some() {
                decide_termination(header, phase)
            } else {
                phase + 1
            };
            header.phase.store(next, Ordering::Relaxed);
            sync::broadcast(header)?;
        }

        while header.phase.load(Ordering::Relaxed) == phase {
            sync::wait(header)?;
        }
    }

    let terminal = header.phase.load(Ordering::Relaxed) < 0;
    sync::unlock(header)?;
    Ok(terminal)
}
