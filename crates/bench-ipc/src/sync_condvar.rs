//! Process-shared mutex + condition variable barrier primitive. The pair
//! lives embedded in the shared mapping and is initialized with the
//! process-shared attribute so it works across `fork()`ed address spaces.

use crate::error::IpcError;
use crate::layout::Header;

pub(crate) fn init(header: &Header) -> Result<(), IpcError> {
    unsafe {
        let mut mattr: libc::pthread_mutexattr_t = std::mem::zeroed();
        let ret = libc::pthread_mutexattr_init(&mut mattr);
        if ret != 0 {
            return Err(IpcError::MutexAttrInit(ret));
        }
        let ret = libc::pthread_mutexattr_setpshared(&mut mattr, libc::PTHREAD_PROCESS_SHARED);
        if ret != 0 {
            return Err(IpcError::MutexAttrSetPshared(ret));
        }

        let mut cattr: libc::pthread_condattr_t = std::mem::zeroed();
        let ret = libc::pthread_condattr_init(&mut cattr);
        if ret != 0 {
            return Err(IpcError::CondAttrInit(ret));
        }
        let ret = libc::pthread_condattr_setpshared(&mut cattr, libc::PTHREAD_PROCESS_SHARED);
        if ret != 0 {
            return Err(IpcError::CondAttrSetPshared(ret));
        }

        let ret = libc::pthread_mutex_init(header.sync.lock.get(), &mattr);
        if ret != 0 {
            return Err(IpcError::MutexInit(ret));
        }
        let ret = libc::pthread_cond_init(header.sync.cv.get(), &cattr);
        if ret != 0 {
            return Err(IpcError::CondInit(ret));
        }
    }
    Ok(())
}

pub(crate) fn lock(header: &Header) -> Result<(), IpcError> {
    let ret = unsafe { libc::pthread_mutex_lock(header.sync.lock.get()) };
    if ret != 0 {
        return Err(IpcError::MutexLock(ret));
    }
    Ok(())
}

pub(crate) fn unlock(header: &Header) -> Result<(), IpcError> {
    let ret = unsafe { libc::pthread_mutex_unlock(header.sync.lock.get()) };
    if ret != 0 {
        return Err(IpcError::MutexUnlock(ret));
    }
    Ok(())
}

pub(crate) fn wait(header: &Header) -> Result<(), IpcError> {
    let ret = unsafe { libc::pthread_cond_wait(header.sync.cv.get(), header.sync.lock.get()) };
    if ret != 0 {
        return Err(IpcError::CondWait(ret));
    }
    Ok(())
}

pub(crate) fn broadcast(header: &Header) -> Result<(), IpcError> {
    let ret = unsafe { libc::pthread_cond_broadcast(header.sync.cv.get()) };
    if ret != 0 {
        return Err(IpcError::CondBroadcast(ret));
    }
    Ok(())
}
