use crate::boot_rom::BootRom;
use crate::cartridge::Cartridge;
use crate::io::{IoRegisters, PpuRegisters};
use crate::joypad::{Button, JoypadState};
use crate::memory_map::{
    self, DMA_ADDR, ECHO_RAM_START, OAM_SIZE, OAM_START, Region, VRAM_START, WRAM_START,
};
use crate::segment::{ObjectAttributeMemory, VideoRam, WorkRam};
use std::fmt;

/// Byte-level access to the address space, as the processor sees it.
pub trait Bus {
    fn read_byte(&self, address: u16) -> u8;

    fn write_byte(&mut self, address: u16, value: u8);

    /// Little-endian 16-bit read.
    fn read_word(&self, address: u16) -> u16 {
        let low = self.read_byte(address) as u16;
        let high = self.read_byte(address.wrapping_add(1)) as u16;
        (high << 8) | low
    }

    /// Little-endian 16-bit write.
    fn write_word(&mut self, address: u16, value: u16) {
        let low = (value & 0xFF) as u8;
        let high = (value >> 8) as u8;
        self.write_byte(address, low);
        self.write_byte(address.wrapping_add(1), high);
    }
}

/// What the picture unit may touch: read-only VRAM and OAM, its own registers,
/// and interrupt requests.
pub trait VideoBus {
    fn video_ram(&self) -> &[u8];

    fn object_attribute_memory(&self) -> &[u8];

    fn ppu_registers(&self) -> &PpuRegisters;

    fn ppu_registers_mut(&mut self) -> &mut PpuRegisters;

    fn request_interrupt(&mut self, bit: u8);
}

/// The console's unified 16-bit address space.
///
/// Owns every storage region for the session. Reads and writes are total over
/// `u16`: hardware-defined gaps yield 0xFF, and only a broken bank computation
/// (an `AddressDecodeFailure`) can stop a read.
#[derive(Clone)]
pub struct MemoryBus {
    cartridge: Cartridge,
    boot_rom: Option<BootRom>,
    vram: VideoRam,            // 8000-9FFF
    wram: WorkRam,             // C000-DFFF, echoed at E000-FDFF
    oam: ObjectAttributeMemory, // FE00-FE9F
    io: IoRegisters,           // FF00-FFFF
}

impl MemoryBus {
    /// Creates the bus for one session. Without a boot image the bus starts in
    /// the state the boot ROM would have left behind.
    pub fn new(cartridge: Cartridge, boot_rom: Option<BootRom>) -> Self {
        let io = if boot_rom.is_some() {
            IoRegisters::new()
        } else {
            IoRegisters::post_boot()
        };
        MemoryBus {
            cartridge,
            boot_rom,
            vram: VideoRam::new(),
            wram: WorkRam::new(),
            oam: ObjectAttributeMemory::new(),
            io,
        }
    }

    /// Whether 0000-00FF currently shows the boot ROM.
    pub fn boot_overlay_active(&self) -> bool {
        self.boot_rom.is_some() && !self.io.boot_rom_disabled()
    }

    pub fn cartridge(&self) -> &Cartridge {
        &self.cartridge
    }

    pub fn cartridge_mut(&mut self) -> &mut Cartridge {
        &mut self.cartridge
    }

    pub fn io(&self) -> &IoRegisters {
        &self.io
    }

    /// Input-layer setter for one button.
    pub fn set_button(&mut self, button: Button, pressed: bool) {
        self.io.set_button(button, pressed);
    }

    pub fn joypad_state(&self) -> &JoypadState {
        self.io.joypad().get_state()
    }

    fn read_cartridge(&self, address: u16) -> u8 {
        match self.cartridge.read(address) {
            Ok(value) => value,
            Err(failure) => {
                log::error!("Cartridge read at {:04X} failed: {}", address, failure);
                panic!("address decode failure: {failure}");
            }
        }
    }

    fn write_cartridge(&mut self, address: u16, value: u8) {
        if let Err(failure) = self.cartridge.write(address, value) {
            log::error!("Cartridge write at {:04X} failed: {}", address, failure);
            panic!("address decode failure: {failure}");
        }
    }

    /// Copies 160 bytes from `page << 8` into OAM.
    fn dma_transfer(&mut self, page: u8) {
        // E0-FF pages read through the echo mapping.
        let page = if page >= 0xE0 { page - 0x20 } else { page };
        let source = (page as u16) << 8;
        log::debug!("OAM DMA from {:04X}", source);
        for i in 0..OAM_SIZE {
            let byte = self.read_byte(source + i as u16);
            self.oam.write(i, byte);
        }
    }
}

impl Bus for MemoryBus {
    fn read_byte(&self, address: u16) -> u8 {
        match memory_map::decode(address) {
            Region::BootOverlay => match &self.boot_rom {
                Some(boot) if !self.io.boot_rom_disabled() => boot.read(address),
                _ => self.read_cartridge(address),
            },
            Region::CartridgeRom | Region::CartridgeRam => self.read_cartridge(address),
            Region::VideoRam => self.vram.read((address - VRAM_START) as usize),
            Region::WorkRam => self.wram.read((address - WRAM_START) as usize),
            Region::EchoRam => self.wram.read((address - ECHO_RAM_START) as usize),
            Region::ObjectAttributeMemory => self.oam.read((address - OAM_START) as usize),
            Region::NotUsable => 0xFF,
            Region::Io => self.io.read(address),
        }
    }

    fn write_byte(&mut self, address: u16, value: u8) {
        match memory_map::decode(address) {
            // The overlay is read-only; writes still reach the controller.
            Region::BootOverlay | Region::CartridgeRom | Region::CartridgeRam => {
                self.write_cartridge(address, value)
            }
            Region::VideoRam => self.vram.write((address - VRAM_START) as usize, value),
            Region::WorkRam => self.wram.write((address - WRAM_START) as usize, value),
            Region::EchoRam => self.wram.write((address - ECHO_RAM_START) as usize, value),
            Region::ObjectAttributeMemory => {
                self.oam.write((address - OAM_START) as usize, value)
            }
            Region::NotUsable => {
                log::trace!("Write to unusable area ignored: {:04X} = {:02X}", address, value);
            }
            Region::Io => {
                self.io.write(address, value);
                if address == DMA_ADDR {
                    self.dma_transfer(value);
                }
            }
        }
    }
}

impl VideoBus for MemoryBus {
    fn video_ram(&self) -> &[u8] {
        self.vram.as_slice()
    }

    fn object_attribute_memory(&self) -> &[u8] {
        self.oam.as_slice()
    }

    fn ppu_registers(&self) -> &PpuRegisters {
        self.io.ppu()
    }

    fn ppu_registers_mut(&mut self) -> &mut PpuRegisters {
        self.io.ppu_mut()
    }

    fn request_interrupt(&mut self, bit: u8) {
        self.io.request_interrupt(bit);
    }
}

// Implement Debug for easier printing/logging
impl fmt::Debug for MemoryBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryBus")
            .field("rom (size)", &self.cartridge.rom_size())
            .field("cartridge ram (size)", &self.cartridge.ram().len())
            .field("mbc", self.cartridge.mbc())
            .field("boot_overlay_active", &self.boot_overlay_active())
            .field("vram (size)", &self.vram.len())
            .field("wram (size)", &self.wram.len())
            .field("oam (size)", &self.oam.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mbc::ControllerKind;
    use crate::memory_map::{
        BOOT_ROM_DISABLE_ADDR, IF_ADDR, JOYPAD_INTERRUPT_BIT, LY_ADDR, P1_JOYP_ADDR,
        VBLANK_INTERRUPT_BIT,
    };

    fn bus_with_rom(rom_banks: usize, ram_size: usize) -> MemoryBus {
        let rom = (0..rom_banks * 0x4000).map(|i| (i / 0x4000) as u8 ^ (i as u8)).collect();
        let cart = Cartridge::new(rom, ram_size, ControllerKind::Type1).unwrap();
        MemoryBus::new(cart, None)
    }

    #[test]
    fn word_access_is_little_endian() {
        let mut bus = bus_with_rom(2, 0);
        bus.write_word(0xC100, 0xBEEF);
        assert_eq!(bus.read_byte(0xC100), 0xEF);
        assert_eq!(bus.read_byte(0xC101), 0xBE);
        assert_eq!(bus.read_word(0xC100), 0xBEEF);
    }

    #[test]
    fn unusable_area_is_open_bus() {
        let mut bus = bus_with_rom(2, 0);
        bus.write_byte(0xFEA0, 0x12);
        assert_eq!(bus.read_byte(0xFEA0), 0xFF);
        assert_eq!(bus.read_byte(0xFEFF), 0xFF);
    }

    #[test]
    fn rom_writes_reach_controller_not_storage() {
        let mut bus = bus_with_rom(4, 0);
        let before = bus.read_byte(0x0150);
        bus.write_byte(0x0150, !before);
        assert_eq!(bus.read_byte(0x0150), before);
        bus.write_byte(0x2100, 0x03);
        assert_eq!(bus.cartridge().mbc().registers().rom_bank_number(), 3);
        assert_eq!(bus.read_byte(0x4000), 3);
    }

    #[test]
    fn no_boot_image_starts_post_boot() {
        let mut bus = bus_with_rom(2, 0);
        assert!(!bus.boot_overlay_active());
        assert_eq!(bus.read_byte(0x0000), 0x00);
        assert_eq!(bus.read_byte(0x0001), 0x01);
        bus.write_byte(BOOT_ROM_DISABLE_ADDR, 0x01);
        assert_eq!(bus.read_byte(0x0001), 0x01);
    }

    #[test]
    fn oam_dma_copies_a_page() {
        let mut bus = bus_with_rom(2, 0);
        for i in 0..0xA0u16 {
            bus.write_byte(0xC000 + i, i as u8);
        }
        bus.write_byte(DMA_ADDR, 0xC0);
        for i in 0..0xA0u16 {
            assert_eq!(bus.read_byte(0xFE00 + i), i as u8);
        }
        assert_eq!(bus.read_byte(DMA_ADDR), 0xC0);
    }

    #[test]
    fn oam_dma_from_echo_page_reads_work_ram() {
        let mut bus = bus_with_rom(2, 0);
        bus.write_byte(0xD000, 0x77);
        bus.write_byte(DMA_ADDR, 0xF0);
        assert_eq!(bus.object_attribute_memory()[0], 0x77);
    }

    #[test]
    fn video_view_sees_processor_writes() {
        let mut bus = bus_with_rom(2, 0);
        bus.write_byte(0x8010, 0xA5);
        bus.write_byte(0xFE03, 0x5A);
        assert_eq!(bus.video_ram()[0x10], 0xA5);
        assert_eq!(bus.object_attribute_memory()[3], 0x5A);

        bus.ppu_registers_mut().set_ly(0x90);
        assert_eq!(bus.read_byte(LY_ADDR), 0x90);
        bus.request_interrupt(VBLANK_INTERRUPT_BIT);
        assert_eq!(bus.read_byte(IF_ADDR) & 0x01, 0x01);
    }

    #[test]
    fn button_setter_reaches_joypad_register() {
        let mut bus = bus_with_rom(2, 0);
        bus.write_byte(IF_ADDR, 0x00);
        bus.write_byte(P1_JOYP_ADDR, 0x20); // directions
        bus.set_button(Button::Down, true);
        assert_eq!(bus.read_byte(P1_JOYP_ADDR), 0xF7);
        assert!(bus.joypad_state().down);
        assert_eq!(bus.read_byte(IF_ADDR), 0xE0 | (1 << JOYPAD_INTERRUPT_BIT));
    }
}
