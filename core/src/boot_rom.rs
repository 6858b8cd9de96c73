use crate::error::LoadError;
use crate::memory_map::BOOT_ROM_SIZE;

/// The boot program overlaid on 0000-00FF until FF50 is written.
#[derive(Clone, PartialEq, Eq)]
pub struct BootRom {
    bytes: Box<[u8; BOOT_ROM_SIZE]>,
}

impl BootRom {
    /// Images shorter than 256 bytes are padded with 0xFF.
    pub fn new(image: &[u8]) -> Result<Self, LoadError> {
        if image.len() > BOOT_ROM_SIZE {
            return Err(LoadError::BootRomTooLarge {
                len: image.len(),
                max: BOOT_ROM_SIZE,
            });
        }
        let mut bytes = Box::new([0xFF; BOOT_ROM_SIZE]);
        bytes[..image.len()].copy_from_slice(image);
        Ok(BootRom { bytes })
    }

    pub fn read(&self, address: u16) -> u8 {
        self.bytes[address as usize]
    }
}

impl std::fmt::Debug for BootRom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootRom").field("size", &BOOT_ROM_SIZE).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_image_is_padded() {
        let boot = BootRom::new(&[0x31, 0xFE, 0xFF]).unwrap();
        assert_eq!(boot.read(0x0000), 0x31);
        assert_eq!(boot.read(0x0002), 0xFF);
        assert_eq!(boot.read(0x00FF), 0xFF);
    }

    #[test]
    fn oversized_image_rejected() {
        assert_eq!(
            BootRom::new(&[0; 257]).unwrap_err(),
            LoadError::BootRomTooLarge { len: 257, max: 256 }
        );
    }
}
