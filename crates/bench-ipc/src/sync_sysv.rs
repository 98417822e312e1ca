//! Raw System V semaphore operations backing the semaphore barrier
//! realization, required in place of process-shared condition variables on
//! platforms where those are unreliable.

use std::io;

pub(crate) fn semget(nsems: i32) -> io::Result<i32> {
    let id = unsafe { libc::semget(libc::IPC_PRIVATE, nsems, 0o600) };
    if id == -1 {
        return Err(io::Error::last_os_error());
    }
    Ok(id)
}

pub(crate) fn semop(semid: i32, ops: &mut [libc::sembuf]) -> io::Result<()> {
    let ret = unsafe { libc::semop(semid, ops.as_mut_ptr(), ops.len()) };
    if ret == -1 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Like `semop`, but treats `EAGAIN` as "would block" rather than an error.
pub(crate) fn semop_nowait(semid: i32, ops: &mut [libc::sembuf]) -> io::Result<bool> {
    let ret = unsafe { libc::semop(semid, ops.as_mut_ptr(), ops.len()) };
    if ret == -1 {
        let err = io::Error::last_os_error();
        if err.raw_os_error() == Some(libc::EAGAIN) {
            return Ok(false);
        }
        return Err(err);
    }
    Ok(true)
}

pub(crate) fn remove(semid: i32) -> io::Result<()> {
    let ret = unsafe { libc::semctl(semid, 0, libc::IPC_RMID) };
    if ret < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

pub(crate) fn sembuf(num: u16, op: i16, flags: i16) -> libc::sembuf {
    libc::sembuf {
        sem_num: num,
        sem_op: op,
        sem_flg: flags,
    }
}
