//! Cartridge storage and header parsing.

use crate::error::{AddressDecodeFailure, LoadError};
use crate::mbc::{ControllerKind, Mbc, MbcType, Translation};
use crate::memory_map::{
    EXT_RAM_BANK_SIZE, EXT_RAM_END, EXT_RAM_START, ROM_BANK_0_START, ROM_BANK_N_END, ROM_BANK_SIZE,
};

// --- Header Layout ---
const TITLE_START: usize = 0x0134;
const TITLE_END: usize = 0x0143;
const CARTRIDGE_TYPE_ADDR: usize = 0x0147;
const ROM_SIZE_ADDR: usize = 0x0148;
const RAM_SIZE_ADDR: usize = 0x0149;
const HEADER_CHECKSUM_ADDR: usize = 0x014D;

const MIN_ROM_SIZE: usize = 2 * ROM_BANK_SIZE; // 32 KiB
const SMALL_RAM_SIZE: usize = 0x800; // 2 KiB

/// Fields decoded from the cartridge header (0100-014F).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartridgeHeader {
    pub title: String,
    pub cartridge_type: u8,
    pub mbc_type: MbcType,
    pub has_ram: bool,
    pub has_battery: bool,
    pub rom_size: usize,
    pub ram_size: usize,
    pub header_checksum: u8,
}

impl CartridgeHeader {
    pub fn parse(rom: &[u8]) -> Result<Self, LoadError> {
        if rom.len() < MIN_ROM_SIZE {
            return Err(LoadError::RomTooSmall {
                len: rom.len(),
                min: MIN_ROM_SIZE,
            });
        }

        let title = rom[TITLE_START..=TITLE_END]
            .iter()
            .take_while(|&&b| b != 0)
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' })
            .collect::<String>()
            .trim_end()
            .to_string();

        let cartridge_type = rom[CARTRIDGE_TYPE_ADDR];
        let (mbc_type, has_ram, has_battery) = MbcType::from_header(cartridge_type)
            .ok_or(LoadError::UnknownCartridgeType(cartridge_type))?;

        let rom_size_code = rom[ROM_SIZE_ADDR];
        if rom_size_code > 0x08 {
            return Err(LoadError::InvalidRomSizeCode(rom_size_code));
        }
        let rom_size = MIN_ROM_SIZE << rom_size_code;

        let ram_size_code = rom[RAM_SIZE_ADDR];
        let declared_ram = match ram_size_code {
            0x00 => 0,
            0x01 => SMALL_RAM_SIZE,
            0x02 => EXT_RAM_BANK_SIZE,
            0x03 => 4 * EXT_RAM_BANK_SIZE,
            0x04 => 16 * EXT_RAM_BANK_SIZE,
            0x05 => 8 * EXT_RAM_BANK_SIZE,
            code => return Err(LoadError::InvalidRamSizeCode(code)),
        };
        let ram_size = if has_ram {
            declared_ram
        } else {
            if declared_ram != 0 {
                log::warn!(
                    "Cartridge type {:02X} has no RAM but header declares {} bytes; ignoring",
                    cartridge_type,
                    declared_ram
                );
            }
            0
        };

        Ok(CartridgeHeader {
            title,
            cartridge_type,
            mbc_type,
            has_ram,
            has_battery,
            rom_size,
            ram_size,
            header_checksum: rom[HEADER_CHECKSUM_ADDR],
        })
    }

    /// Recomputes the header checksum over 0134-014C.
    pub fn compute_checksum(rom: &[u8]) -> u8 {
        rom[TITLE_START..HEADER_CHECKSUM_ADDR]
            .iter()
            .fold(0u8, |x, &b| x.wrapping_sub(b).wrapping_sub(1))
    }
}

/// ROM, optional RAM and the controller that maps them into the CPU window.
#[derive(Debug, Clone)]
pub struct Cartridge {
    rom: Vec<u8>,
    ram: Vec<u8>,
    mbc: Mbc,
    has_battery: bool,
    header: Option<CartridgeHeader>,
}

impl Cartridge {
    /// Builds a cartridge with an explicit controller and RAM size.
    pub fn new(rom: Vec<u8>, ram_size: usize, kind: ControllerKind) -> Result<Self, LoadError> {
        if rom.len() < MIN_ROM_SIZE {
            return Err(LoadError::RomTooSmall {
                len: rom.len(),
                min: MIN_ROM_SIZE,
            });
        }
        if rom.len() % ROM_BANK_SIZE != 0 {
            return Err(LoadError::RomNotBankAligned { len: rom.len() });
        }
        if ram_size != 0 && ram_size != SMALL_RAM_SIZE && ram_size % EXT_RAM_BANK_SIZE != 0 {
            return Err(LoadError::InvalidRamSize(ram_size));
        }

        let mbc = Mbc::new(kind, rom.len(), ram_size);
        Ok(Cartridge {
            rom,
            ram: vec![0; ram_size],
            mbc,
            has_battery: false,
            header: None,
        })
    }

    /// Builds a cartridge from a full ROM image, taking controller and RAM size
    /// from its header.
    pub fn from_rom(rom: Vec<u8>) -> Result<Self, LoadError> {
        let header = CartridgeHeader::parse(&rom)?;
        let kind = ControllerKind::try_from(header.mbc_type)?;

        if rom.len() < header.rom_size {
            return Err(LoadError::TruncatedRom {
                declared: header.rom_size,
                len: rom.len(),
            });
        }
        if rom.len() > header.rom_size {
            log::warn!(
                "ROM is {} bytes, header declares {}; extra data is still mapped",
                rom.len(),
                header.rom_size
            );
        }
        let checksum = CartridgeHeader::compute_checksum(&rom);
        if checksum != header.header_checksum {
            log::warn!(
                "Header checksum mismatch: computed {:02X}, header says {:02X}",
                checksum,
                header.header_checksum
            );
        }

        log::debug!(
            "Cartridge '{}': {} ({:02X}), ROM {} bytes, RAM {} bytes",
            header.title,
            header.mbc_type.name(),
            header.cartridge_type,
            rom.len(),
            header.ram_size
        );

        let mut cartridge = Cartridge::new(rom, header.ram_size, kind)?;
        cartridge.has_battery = header.has_battery;
        cartridge.header = Some(header);
        Ok(cartridge)
    }

    /// Reads a byte from 0000-7FFF or A000-BFFF.
    pub fn read(&self, address: u16) -> Result<u8, AddressDecodeFailure> {
        match self.mbc.translate_read(address)? {
            Translation::Rom(offset) => {
                self.rom
                    .get(offset)
                    .copied()
                    .ok_or(AddressDecodeFailure::RomOffsetOutOfRange {
                        address,
                        offset,
                        len: self.rom.len(),
                    })
            }
            Translation::Ram(offset) => {
                self.ram
                    .get(offset)
                    .copied()
                    .ok_or(AddressDecodeFailure::RamOffsetOutOfRange {
                        address,
                        offset,
                        len: self.ram.len(),
                    })
            }
            Translation::OpenBus => Ok(0xFF),
        }
    }

    /// Control writes go to the controller; RAM writes land only while RAM is enabled.
    pub fn write(&mut self, address: u16, value: u8) -> Result<(), AddressDecodeFailure> {
        match address {
            ROM_BANK_0_START..=ROM_BANK_N_END => {
                self.mbc.apply_write(address, value);
                Ok(())
            }
            EXT_RAM_START..=EXT_RAM_END => match self.mbc.translate_read(address)? {
                Translation::Ram(offset) => {
                    let len = self.ram.len();
                    let slot = self.ram.get_mut(offset).ok_or(
                        AddressDecodeFailure::RamOffsetOutOfRange {
                            address,
                            offset,
                            len,
                        },
                    )?;
                    *slot = value;
                    Ok(())
                }
                _ => Ok(()), // disabled or absent
            },
            _ => Err(AddressDecodeFailure::OutsideCartridge { address }),
        }
    }

    pub fn mbc(&self) -> &Mbc {
        &self.mbc
    }

    pub fn header(&self) -> Option<&CartridgeHeader> {
        self.header.as_ref()
    }

    pub fn rom_size(&self) -> usize {
        self.rom.len()
    }

    pub fn has_battery(&self) -> bool {
        self.has_battery
    }

    /// Persistent RAM contents, for save files.
    pub fn ram(&self) -> &[u8] {
        &self.ram
    }

    /// Restores persistent RAM from a save file of exactly the RAM size.
    pub fn load_ram(&mut self, data: &[u8]) -> Result<(), LoadError> {
        if data.len() != self.ram.len() {
            return Err(LoadError::SaveSizeMismatch {
                len: data.len(),
                expected: self.ram.len(),
            });
        }
        self.ram.copy_from_slice(data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KIB: usize = 1024;

    /// ROM where every byte of bank N holds N.
    fn banked_rom(banks: usize) -> Vec<u8> {
        (0..banks)
            .flat_map(|bank| std::iter::repeat(bank as u8).take(ROM_BANK_SIZE))
            .collect()
    }

    fn rom_with_header(cartridge_type: u8, rom_code: u8, ram_code: u8) -> Vec<u8> {
        let mut rom = banked_rom(2 << rom_code);
        rom[TITLE_START..TITLE_START + 5].copy_from_slice(b"BOBA!");
        rom[TITLE_START + 5..=TITLE_END].fill(0);
        rom[CARTRIDGE_TYPE_ADDR] = cartridge_type;
        rom[ROM_SIZE_ADDR] = rom_code;
        rom[RAM_SIZE_ADDR] = ram_code;
        rom[HEADER_CHECKSUM_ADDR] = CartridgeHeader::compute_checksum(&rom);
        rom
    }

    #[test]
    fn parses_header() {
        let rom = rom_with_header(0x03, 0x02, 0x03);
        let header = CartridgeHeader::parse(&rom).unwrap();
        assert_eq!(header.title, "BOBA!");
        assert_eq!(header.mbc_type, MbcType::Mbc1);
        assert!(header.has_battery);
        assert_eq!(header.rom_size, 128 * KIB);
        assert_eq!(header.ram_size, 32 * KIB);
        assert_eq!(header.header_checksum, CartridgeHeader::compute_checksum(&rom));
    }

    #[test]
    fn from_rom_picks_controller_and_ram() {
        let cart = Cartridge::from_rom(rom_with_header(0x02, 0x01, 0x02)).unwrap();
        assert_eq!(cart.mbc().kind(), ControllerKind::Type1);
        assert_eq!(cart.ram().len(), 8 * KIB);
        assert!(!cart.has_battery());
        assert_eq!(cart.header().map(|h| h.title.as_str()), Some("BOBA!"));
    }

    #[test]
    fn from_rom_rejects_unsupported_and_truncated() {
        assert_eq!(
            Cartridge::from_rom(rom_with_header(0x13, 0x00, 0x00)).unwrap_err(),
            LoadError::UnsupportedController("MBC3")
        );
        assert_eq!(
            Cartridge::from_rom(rom_with_header(0xEE, 0x00, 0x00)).unwrap_err(),
            LoadError::UnknownCartridgeType(0xEE)
        );

        let mut rom = rom_with_header(0x01, 0x02, 0x00);
        rom.truncate(64 * KIB);
        assert_eq!(
            Cartridge::from_rom(rom).unwrap_err(),
            LoadError::TruncatedRom {
                declared: 128 * KIB,
                len: 64 * KIB
            }
        );
    }

    #[test]
    fn rejects_bad_sizes() {
        assert!(matches!(
            Cartridge::new(vec![0; 16 * KIB], 0, ControllerKind::None),
            Err(LoadError::RomTooSmall { .. })
        ));
        assert!(matches!(
            Cartridge::new(vec![0; 40 * KIB], 0, ControllerKind::None),
            Err(LoadError::RomNotBankAligned { .. })
        ));
        assert_eq!(
            Cartridge::new(vec![0; 32 * KIB], 3 * KIB, ControllerKind::None).unwrap_err(),
            LoadError::InvalidRamSize(3 * KIB)
        );
    }

    #[test]
    fn reads_selected_bank() {
        let mut cart = Cartridge::new(banked_rom(8), 0, ControllerKind::Type1).unwrap();
        assert_eq!(cart.read(0x0000), Ok(0));
        assert_eq!(cart.read(0x4000), Ok(1));
        cart.write(0x2000, 0x07).unwrap();
        assert_eq!(cart.read(0x7FFF), Ok(7));
    }

    #[test]
    fn ram_writes_gated_by_enable() {
        let mut cart = Cartridge::new(banked_rom(2), 8 * KIB, ControllerKind::Type1).unwrap();
        cart.write(0xA000, 0x42).unwrap();
        assert_eq!(cart.ram()[0], 0x00);
        assert_eq!(cart.read(0xA000), Ok(0xFF));

        cart.write(0x0000, 0x0A).unwrap();
        cart.write(0xA000, 0x42).unwrap();
        assert_eq!(cart.read(0xA000), Ok(0x42));

        cart.write(0x0000, 0x00).unwrap();
        assert_eq!(cart.read(0xA000), Ok(0xFF));
        assert_eq!(cart.ram()[0], 0x42);
    }

    #[test]
    fn save_ram_round_trip_requires_exact_size() {
        let mut cart = Cartridge::new(banked_rom(2), 2 * KIB, ControllerKind::None).unwrap();
        let save = vec![0x5A; 2 * KIB];
        cart.load_ram(&save).unwrap();
        assert_eq!(cart.read(0xA7FF), Ok(0x5A));
        assert_eq!(
            cart.load_ram(&[0; 16]).unwrap_err(),
            LoadError::SaveSizeMismatch {
                len: 16,
                expected: 2 * KIB
            }
        );
    }

    #[test]
    fn non_cartridge_address_fails() {
        let mut cart = Cartridge::new(banked_rom(2), 0, ControllerKind::None).unwrap();
        assert_eq!(
            cart.read(0xC000),
            Err(AddressDecodeFailure::OutsideCartridge { address: 0xC000 })
        );
        assert!(cart.write(0xC000, 0).is_err());
    }
}
