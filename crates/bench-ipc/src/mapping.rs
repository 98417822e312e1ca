//! Anonymous process-shared memory, the substrate every other type in this
//! crate is built on top of. Adapted from a file-backed mmap wrapper to an
//! anonymous one: nothing here needs a backing path since the region's
//! lifetime is scoped to a single supervisor run and it is shared purely by
//! `fork()` inheritance, not by path lookup.

use std::io;

pub struct SharedMapping {
    ptr: *mut u8,
    len: usize,
}

impl SharedMapping {
    pub fn new(len: usize) -> io::Result<Self> {
        assert!(len > 0, "SharedMapping::new: zero-length mapping");
        let ptr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        };
        if ptr == libc::MAP_FAILED {
            return Err(io::Error::last_os_error());
        }
        Ok(Self {
            ptr: ptr as *mut u8,
            len,
        })
    }

    pub fn as_mut_ptr(&self) -> *mut u8 {
        self.ptr
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Drop for SharedMapping {
    fn drop(&mut self) {
        unsafe {
            libc::munmap(self.ptr as *mut libc::c_void, self.len);
        }
    }
}

// SAFETY: the mapping is MAP_SHARED — every accessor goes through a raw
// pointer and is responsible for its own synchronization (the barrier, the
// seqlock-free ring index, or single-writer-before-fork discipline).
unsafe impl Send for SharedMapping {}
unsafe impl Sync for SharedMapping {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_a_byte_through_the_mapping() {
        let m = SharedMapping::new(4096).unwrap();
        unsafe {
            *m.as_mut_ptr() = 0xAB;
            assert_eq!(*m.as_mut_ptr(), 0xAB);
        }
        assert_eq!(m.len(), 4096);
    }
}
