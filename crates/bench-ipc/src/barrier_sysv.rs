//! The three-semaphore realization of the barrier round: sem0 is a mutex
//! admitting one arrival at a time, sem1 counts how many non-last arrivals
//! have passed through, sem2 is the release gate the last arrival signals
//! `hwm-1` times. Mirrors `barrier_queue`'s `USE_SEMOP` branch; the
//! termination decision is layered in identically to the condvar
//! realization rather than the original's simpler unconditional
//! phase-advance, so both realizations expose the same observable contract.

use crate::error::IpcError;
use crate::layout::Header;
use crate::result::BatchResult;
use crate::shared_state::{aggregate, decide_termination};
use crate::sync_sysv::{self as sys, sembuf};
use std::sync::atomic::Ordering;

pub(crate) fn init(header: &Header) -> Result<(), IpcError> {
    let semid = sys::semget(3).map_err(IpcError::SemGet)?;
    let hwm = header.hwm as i16;
    let mut setup = [sembuf(0, hwm - 1, 0)];
    sys::semop(semid, &mut setup).map_err(IpcError::SemOp)?;
    header.sync.semid.store(semid, Ordering::Relaxed);
    Ok(())
}

pub(crate) fn destroy(header: &Header) -> Result<(), IpcError> {
    let semid = header.sync.semid.load(Ordering::Relaxed);
    sys::remove(semid).map_err(IpcError::SemCtlRemove)
}

pub(crate) fn enter(
    header: &Header,
    data: *mut i64,
    result: Option<BatchResult>,
) -> Result<bool, IpcError> {
    let semid = header.sync.semid.load(Ordering::Relaxed);
    let hwm = header.hwm as i16;

    let mut admit = [sembuf(0, -(hwm - 1), 0)];
    sys::semop(semid, &mut admit).map_err(IpcError::SemOp)?;

    let mut try_last = [sembuf(1, -(hwm - 1), libc::IPC_NOWAIT as i16)];
    let is_last = sys::semop_nowait(semid, &mut try_last).map_err(IpcError::SemOp)?;

    let terminal = if !is_last {
        if let Some(r) = result {
            aggregate(header, data, r);
        }
        header.waiters.fetch_add(1, Ordering::Relaxed);

        let mut release_mutex = [sembuf(0, hwm - 1, 0), sembuf(1, 1, 0)];
        sys::semop(semid, &mut release_mutex).map_err(IpcError::SemOp)?;

        let mut wait_release = [sembuf(0, 1, 0), sembuf(2, -1, 0)];
        sys::semop(semid, &mut wait_release).map_err(IpcError::SemOp)?;

        header.phase.load(Ordering::Acquire) < 0
    } else {
        if let Some(r) = result {
            aggregate(header, data, r);
        }
        header.waiters.store(0, Ordering::Relaxed);
        let phase = header.phase.load(Ordering::Relaxed);
        let next = if result.is_some() {
            decide_termination(header, phase)
        } else {
            phase + 1
        };
        header.phase.store(next, Ordering::Release);

        let mut release = [sembuf(2, hwm - 1, 0)];
        sys::semop(semid, &mut release).map_err(IpcError::SemOp)?;

        next < 0
    };

    Ok(terminal)
}
