//! A POSIX interval timer armed once, used as the deadline watchdog: fires
//! `SIGALRM` some slack after the run's own deadline so a wedged worker
//! still gets reaped. No safe wrapper exists in `nix` for
//! `timer_create`/`timer_settime`, so this reaches for `libc` directly,
//! matching the corpus's convention for raw syscalls without one.

use std::io;
use std::mem::MaybeUninit;

pub struct DeadlineTimer {
    timerid: libc::timer_t,
}

impl DeadlineTimer {
    /// Arms a one-shot `CLOCK_MONOTONIC` timer that delivers `SIGALRM` at
    /// the given absolute nanosecond deadline.
    pub fn arm(deadline_ns: i64) -> io::Result<Self> {
        let mut sev: libc::sigevent = unsafe { std::mem::zeroed() };
        sev.sigev_notify = libc::SIGEV_SIGNAL;
        sev.sigev_signo = libc::SIGALRM;

        let mut timerid = MaybeUninit::<libc::timer_t>::uninit();
        let rc = unsafe { libc::timer_create(libc::CLOCK_MONOTONIC, &mut sev, timerid.as_mut_ptr()) };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        let timerid = unsafe { timerid.assume_init() };

        let spec = libc::itimerspec {
            it_interval: libc::timespec {
                tv_sec: 0,
                tv_nsec: 0,
            },
            it_value: libc::timespec {
                tv_sec: deadline_ns / 1_000_000_000,
                tv_nsec: deadline_ns % 1_000_000_000,
            },
        };
        let rc = unsafe { libc::timer_settime(timerid, libc::TIMER_ABSTIME, &spec, std::ptr::null_mut()) };
        if rc != 0 {
            let err = io::Error::last_os_error();
            unsafe {
                libc::timer_delete(timerid);
            }
            return Err(err);
        }

        Ok(Self { timerid })
    }
}

impl Drop for DeadlineTimer {
    fn drop(&mut self) {
        unsafe {
            libc::timer_delete(self.timerid);
        }
    }
}
