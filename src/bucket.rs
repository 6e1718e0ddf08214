//! Fixed-geometry bucket storage.

use crate::config::BLEN;

/// A block of `BLEN` key/value slots probed as a unit.
///
/// Keys sit in their own contiguous array so a probe is a tight linear
/// scan (and stays open to a SIMD compare in an accelerated build). A slot
/// is occupied iff its key is non-zero; the single user entry with key 0
/// lives out of band in the map's zero cell, never here.
#[derive(Clone, Copy)]
pub(crate) struct Bucket<V> {
    pub(crate) keys: [u32; BLEN],
    pub(crate) vals: [V; BLEN],
}

impl<V: Copy + Default> Bucket<V> {
    pub(crate) fn empty() -> Self {
        Self {
            keys: [0; BLEN],
            vals: [V::default(); BLEN],
        }
    }

    /// Slot index holding `key`. Callers must not pass the sentinel key 0.
    pub(crate) fn find(&self, key: u32) -> Option<usize> {
        self.keys.iter().position(|&k| k == key)
    }

    pub(crate) fn free_slot(&self) -> Option<usize> {
        self.keys.iter().position(|&k| k == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bucket_is_all_free() {
        let b: Bucket<u64> = Bucket::empty();
        assert_eq!(b.free_slot(), Some(0));
        assert_eq!(b.find(7), None);
    }

    #[test]
    fn find_and_free_slot_scan_in_order() {
        let mut b: Bucket<u64> = Bucket::empty();
        b.keys[0] = 9;
        b.vals[0] = 90;
        b.keys[2] = 7;
        b.vals[2] = 70;

        assert_eq!(b.find(7), Some(2));
        assert_eq!(b.find(9), Some(0));
        assert_eq!(b.free_slot(), Some(1));
    }
}
