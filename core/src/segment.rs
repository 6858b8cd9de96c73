use crate::memory_map::{HRAM_SIZE, OAM_SIZE, VRAM_SIZE, WRAM_SIZE};
use std::fmt;

/// A fixed-size block of system RAM.
///
/// Offsets come from the bus decode table, so an out-of-range offset is a
/// caller bug and panics.
#[derive(Clone, PartialEq, Eq)]
pub struct MemorySegment<const SIZE: usize> {
    bytes: Box<[u8; SIZE]>,
}

pub type VideoRam = MemorySegment<VRAM_SIZE>; // 8000-9FFF
pub type WorkRam = MemorySegment<WRAM_SIZE>; // C000-DFFF
pub type ObjectAttributeMemory = MemorySegment<OAM_SIZE>; // FE00-FE9F
pub type HighRam = MemorySegment<HRAM_SIZE>; // FF80-FFFE

impl<const SIZE: usize> MemorySegment<SIZE> {
    pub fn new() -> Self {
        MemorySegment {
            bytes: Box::new([0; SIZE]),
        }
    }

    #[inline]
    pub fn read(&self, offset: usize) -> u8 {
        self.bytes[offset]
    }

    #[inline]
    pub fn write(&mut self, offset: usize, value: u8) {
        self.bytes[offset] = value;
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..]
    }

    pub const fn len(&self) -> usize {
        SIZE
    }

    pub const fn is_empty(&self) -> bool {
        SIZE == 0
    }
}

impl<const SIZE: usize> Default for MemorySegment<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const SIZE: usize> fmt::Debug for MemorySegment<SIZE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySegment").field("size", &SIZE).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_zeroed_and_writes_in_place() {
        let mut vram = VideoRam::new();
        assert_eq!(vram.len(), 0x2000);
        assert!(vram.as_slice().iter().all(|&b| b == 0));
        vram.write(0x1FFF, 0xAB);
        assert_eq!(vram.read(0x1FFF), 0xAB);
        assert_eq!(vram.as_slice()[0x1FFF], 0xAB);
    }

    #[test]
    #[should_panic]
    fn out_of_range_offset_panics() {
        let oam = ObjectAttributeMemory::new();
        oam.read(OAM_SIZE);
    }
}
