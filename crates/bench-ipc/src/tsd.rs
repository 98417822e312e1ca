//! Per-(process, thread) scratch region the plug-in may use, padded to a
//! 128-byte boundary per slot to avoid false sharing between threads
//! hammering adjacent slots.

use crate::mapping::SharedMapping;
use std::io;

const SLOT_ALIGN: usize = 128;

fn pad(size: usize) -> usize {
    if size == 0 {
        return SLOT_ALIGN;
    }
    size.div_ceil(SLOT_ALIGN) * SLOT_ALIGN
}

pub struct TsdSegment {
    mapping: SharedMapping,
    slot_size: usize,
}

unsafe impl Send for TsdSegment {}
unsafe impl Sync for TsdSegment {}

impl TsdSegment {
    pub fn create(hwm: usize, requested_slot_size: usize) -> io::Result<Self> {
        let slot_size = pad(requested_slot_size);
        let mapping = SharedMapping::new(slot_size * hwm.max(1))?;
        Ok(Self { mapping, slot_size })
    }

    pub fn slot_size(&self) -> usize {
        self.slot_size
    }

    /// Returns the byte slice for slot `index`. Callers are responsible for
    /// not aliasing a slot across threads other than its owner.
    ///
    /// # Safety
    /// The caller must ensure `index < hwm` and that no two threads obtain
    /// overlapping slots concurrently.
    pub unsafe fn slot(&self, index: usize) -> &mut [u8] {
        let base = self.mapping.as_mut_ptr().add(index * self.slot_size);
        std::slice::from_raw_parts_mut(base, self.slot_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_padded_and_disjoint() {
        let tsd = TsdSegment::create(4, 17).unwrap();
        assert_eq!(tsd.slot_size(), 128);
        unsafe {
            tsd.slot(0)[0] = 1;
            tsd.slot(1)[0] = 2;
            assert_eq!(tsd.slot(0)[0], 1);
            assert_eq!(tsd.slot(1)[0], 2);
        }
    }
}
