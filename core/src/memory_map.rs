//! Address-space layout and the central address decoder.

use std::ops::RangeInclusive;

// --- Memory Map Constants ---
pub const BOOT_ROM_START: u16 = 0x0000;
pub const BOOT_ROM_END: u16 = 0x00FF;
pub const BOOT_ROM_SIZE: usize = (BOOT_ROM_END - BOOT_ROM_START + 1) as usize; // 256 bytes

pub const ROM_BANK_0_START: u16 = 0x0000;
pub const ROM_BANK_0_END: u16 = 0x3FFF;
pub const ROM_BANK_SIZE: usize = (ROM_BANK_0_END - ROM_BANK_0_START + 1) as usize; // 16 KiB

pub const ROM_BANK_N_START: u16 = 0x4000;
pub const ROM_BANK_N_END: u16 = 0x7FFF;

pub const VRAM_START: u16 = 0x8000;
pub const VRAM_END: u16 = 0x9FFF;
pub const VRAM_SIZE: usize = (VRAM_END - VRAM_START + 1) as usize; // 8 KiB

pub const EXT_RAM_START: u16 = 0xA000;
pub const EXT_RAM_END: u16 = 0xBFFF;
pub const EXT_RAM_BANK_SIZE: usize = (EXT_RAM_END - EXT_RAM_START + 1) as usize; // 8 KiB

pub const WRAM_START: u16 = 0xC000;
pub const WRAM_END: u16 = 0xDFFF;
pub const WRAM_SIZE: usize = (WRAM_END - WRAM_START + 1) as usize; // 8 KiB

// Mirrors C000-DDFF
pub const ECHO_RAM_START: u16 = 0xE000;
pub const ECHO_RAM_END: u16 = 0xFDFF;

pub const OAM_START: u16 = 0xFE00;
pub const OAM_END: u16 = 0xFE9F;
pub const OAM_SIZE: usize = (OAM_END - OAM_START + 1) as usize; // 160 bytes

pub const NOT_USABLE_START: u16 = 0xFEA0;
pub const NOT_USABLE_END: u16 = 0xFEFF;

// The IO block owns everything from FF00 up, HRAM and IE included.
pub const IO_REGISTERS_START: u16 = 0xFF00;
pub const IO_REGISTERS_END: u16 = 0xFFFF;

pub const HRAM_START: u16 = 0xFF80;
pub const HRAM_END: u16 = 0xFFFE;
pub const HRAM_SIZE: usize = (HRAM_END - HRAM_START + 1) as usize; // 127 bytes

pub const INTERRUPT_ENABLE_REGISTER: u16 = 0xFFFF;

// --- Specific I/O Register Addresses ---
pub const P1_JOYP_ADDR: u16 = 0xFF00; // Joypad (R/W)
pub const IF_ADDR: u16 = 0xFF0F; // Interrupt Flag (R/W)

// --- LCD Registers ---
// Range: 0xFF40 - 0xFF4B
pub const PPU_REGISTERS_START: u16 = 0xFF40;
pub const PPU_REGISTERS_END: u16 = 0xFF4B;
pub const PPU_REGISTER_COUNT: usize = (PPU_REGISTERS_END - PPU_REGISTERS_START + 1) as usize;

pub const LCDC_ADDR: u16 = 0xFF40; // LCD Control (R/W)
pub const STAT_ADDR: u16 = 0xFF41; // LCD Status (R/W)
pub const SCY_ADDR: u16 = 0xFF42; // Scroll Y (R/W)
pub const SCX_ADDR: u16 = 0xFF43; // Scroll X (R/W)
pub const LY_ADDR: u16 = 0xFF44; // LCD Y Coordinate (R)
pub const LYC_ADDR: u16 = 0xFF45; // LY Compare (R/W)
pub const DMA_ADDR: u16 = 0xFF46; // OAM DMA source page (W)
pub const BGP_ADDR: u16 = 0xFF47; // BG Palette Data (R/W)
pub const OBP0_ADDR: u16 = 0xFF48; // Object Palette 0 Data (R/W)
pub const OBP1_ADDR: u16 = 0xFF49; // Object Palette 1 Data (R/W)
pub const WY_ADDR: u16 = 0xFF4A; // Window Y Position (R/W)
pub const WX_ADDR: u16 = 0xFF4B; // Window X Position plus 7 (R/W)

pub const BOOT_ROM_DISABLE_ADDR: u16 = 0xFF50; // Boot ROM Disable (W, one-way)

// --- Interrupt Bits (for IF Register 0xFF0F and IE Register 0xFFFF) ---
// Bit position corresponds to the interrupt priority (0 = highest)
pub const VBLANK_INTERRUPT_BIT: u8 = 0;
pub const LCD_STAT_INTERRUPT_BIT: u8 = 1;
pub const TIMER_INTERRUPT_BIT: u8 = 2;
pub const SERIAL_INTERRUPT_BIT: u8 = 3;
pub const JOYPAD_INTERRUPT_BIT: u8 = 4;

/// Top-level owner of an address, as seen by the system bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// 0000-00FF: boot ROM while the overlay is active, cartridge ROM otherwise.
    BootOverlay,
    CartridgeRom,
    VideoRam,
    CartridgeRam,
    WorkRam,
    EchoRam,
    ObjectAttributeMemory,
    NotUsable,
    Io,
}

impl Region {
    pub const ALL: [Region; 9] = [
        Region::BootOverlay,
        Region::CartridgeRom,
        Region::VideoRam,
        Region::CartridgeRam,
        Region::WorkRam,
        Region::EchoRam,
        Region::ObjectAttributeMemory,
        Region::NotUsable,
        Region::Io,
    ];

    /// The inclusive address range this region covers.
    pub const fn range(self) -> RangeInclusive<u16> {
        match self {
            Region::BootOverlay => BOOT_ROM_START..=BOOT_ROM_END,
            Region::CartridgeRom => (BOOT_ROM_END + 1)..=ROM_BANK_N_END,
            Region::VideoRam => VRAM_START..=VRAM_END,
            Region::CartridgeRam => EXT_RAM_START..=EXT_RAM_END,
            Region::WorkRam => WRAM_START..=WRAM_END,
            Region::EchoRam => ECHO_RAM_START..=ECHO_RAM_END,
            Region::ObjectAttributeMemory => OAM_START..=OAM_END,
            Region::NotUsable => NOT_USABLE_START..=NOT_USABLE_END,
            Region::Io => IO_REGISTERS_START..=IO_REGISTERS_END,
        }
    }
}

/// Maps a CPU address to the region that owns it.
///
/// The match is exhaustive over `u16`, so every address has exactly one owner.
pub const fn decode(address: u16) -> Region {
    match address {
        BOOT_ROM_START..=BOOT_ROM_END => Region::BootOverlay,
        0x0100..=ROM_BANK_N_END => Region::CartridgeRom,
        VRAM_START..=VRAM_END => Region::VideoRam,
        EXT_RAM_START..=EXT_RAM_END => Region::CartridgeRam,
        WRAM_START..=WRAM_END => Region::WorkRam,
        ECHO_RAM_START..=ECHO_RAM_END => Region::EchoRam,
        OAM_START..=OAM_END => Region::ObjectAttributeMemory,
        NOT_USABLE_START..=NOT_USABLE_END => Region::NotUsable,
        IO_REGISTERS_START..=IO_REGISTERS_END => Region::Io,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_address_has_exactly_one_owner() {
        for address in 0x0000..=0xFFFFu16 {
            let owners: Vec<Region> = Region::ALL
                .iter()
                .copied()
                .filter(|region| region.range().contains(&address))
                .collect();
            assert_eq!(owners.len(), 1, "address {address:04X} owned by {owners:?}");
            assert_eq!(decode(address), owners[0], "address {address:04X}");
        }
    }

    #[test]
    fn region_boundaries() {
        assert_eq!(decode(0x00FF), Region::BootOverlay);
        assert_eq!(decode(0x0100), Region::CartridgeRom);
        assert_eq!(decode(0x7FFF), Region::CartridgeRom);
        assert_eq!(decode(0x8000), Region::VideoRam);
        assert_eq!(decode(0xBFFF), Region::CartridgeRam);
        assert_eq!(decode(0xDFFF), Region::WorkRam);
        assert_eq!(decode(0xE000), Region::EchoRam);
        assert_eq!(decode(0xFDFF), Region::EchoRam);
        assert_eq!(decode(0xFE9F), Region::ObjectAttributeMemory);
        assert_eq!(decode(0xFEA0), Region::NotUsable);
        assert_eq!(decode(0xFF00), Region::Io);
        assert_eq!(decode(0xFFFF), Region::Io);
    }
}
