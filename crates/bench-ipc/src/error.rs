use thiserror::Error;

#[derive(Debug, Error)]
pub enum IpcError {
    #[error("mmap() failed: {0}")]
    Mmap(#[source] std::io::Error),
    #[error("pthread_mutexattr_init() failed: {0}")]
    MutexAttrInit(i32),
    #[error("pthread_mutexattr_setpshared() failed: {0}")]
    MutexAttrSetPshared(i32),
    #[error("pthread_condattr_init() failed: {0}")]
    CondAttrInit(i32),
    #[error("pthread_condattr_setpshared() failed: {0}")]
    CondAttrSetPshared(i32),
    #[error("pthread_mutex_init() failed: {0}")]
    MutexInit(i32),
    #[error("pthread_cond_init() failed: {0}")]
    CondInit(i32),
    #[error("pthread_mutex_lock() failed: {0}")]
    MutexLock(i32),
    #[error("pthread_mutex_unlock() failed: {0}")]
    MutexUnlock(i32),
    #[error("pthread_cond_wait() failed: {0}")]
    CondWait(i32),
    #[error("pthread_cond_broadcast() failed: {0}")]
    CondBroadcast(i32),
    #[error("semget() failed: {0}")]
    SemGet(#[source] std::io::Error),
    #[error("semop() failed: {0}")]
    SemOp(#[source] std::io::Error),
    #[error("semctl(IPC_RMID) failed: {0}")]
    SemCtlRemove(#[source] std::io::Error),
}
