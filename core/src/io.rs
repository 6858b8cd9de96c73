//! Memory-mapped IO block covering FF00-FFFF.

use crate::joypad::{Button, Joypad};
use crate::memory_map::{
    BGP_ADDR, BOOT_ROM_DISABLE_ADDR, HRAM_END, HRAM_START, IF_ADDR, INTERRUPT_ENABLE_REGISTER,
    JOYPAD_INTERRUPT_BIT, LCDC_ADDR, LY_ADDR, P1_JOYP_ADDR, PPU_REGISTER_COUNT,
    PPU_REGISTERS_END, PPU_REGISTERS_START, STAT_ADDR,
};
use crate::segment::HighRam;

const IF_USED_BITS: u8 = 0x1F;

/// Sub-register an IO address selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoRegister {
    Joypad,
    InterruptFlag,
    /// Index into the picture-unit register file (FF40 = 0).
    Ppu(usize),
    BootRomDisable,
    HighRam(usize),
    InterruptEnable,
    Unmapped,
}

pub fn decode_io(address: u16) -> IoRegister {
    match address {
        P1_JOYP_ADDR => IoRegister::Joypad,
        IF_ADDR => IoRegister::InterruptFlag,
        PPU_REGISTERS_START..=PPU_REGISTERS_END => {
            IoRegister::Ppu((address - PPU_REGISTERS_START) as usize)
        }
        BOOT_ROM_DISABLE_ADDR => IoRegister::BootRomDisable,
        HRAM_START..=HRAM_END => IoRegister::HighRam((address - HRAM_START) as usize),
        INTERRUPT_ENABLE_REGISTER => IoRegister::InterruptEnable,
        _ => IoRegister::Unmapped,
    }
}

/// LCD registers FF40-FF4B. The bus stores them verbatim; the picture unit
/// gives them meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PpuRegisters {
    registers: [u8; PPU_REGISTER_COUNT],
}

impl PpuRegisters {
    /// Reads by absolute address (FF40-FF4B).
    pub fn read(&self, address: u16) -> u8 {
        self.registers[Self::index(address)]
    }

    /// Writes by absolute address (FF40-FF4B).
    pub fn write(&mut self, address: u16, value: u8) {
        self.registers[Self::index(address)] = value;
    }

    pub fn lcdc(&self) -> u8 {
        self.read(LCDC_ADDR)
    }

    pub fn stat(&self) -> u8 {
        self.read(STAT_ADDR)
    }

    pub fn ly(&self) -> u8 {
        self.read(LY_ADDR)
    }

    pub fn set_ly(&mut self, line: u8) {
        self.write(LY_ADDR, line);
    }

    fn index(address: u16) -> usize {
        debug_assert!(
            (PPU_REGISTERS_START..=PPU_REGISTERS_END).contains(&address),
            "{address:04X} is not a PPU register"
        );
        (address - PPU_REGISTERS_START) as usize
    }
}

#[derive(Debug, Clone)]
pub struct IoRegisters {
    joypad: Joypad,
    interrupt_flag: u8,
    interrupt_enable: u8,
    ppu: PpuRegisters,
    boot_rom_disabled: bool,
    hram: HighRam,
}

impl Default for IoRegisters {
    fn default() -> Self {
        Self::new()
    }
}

impl IoRegisters {
    /// Power-on state, as seen by a boot ROM.
    pub fn new() -> Self {
        IoRegisters {
            joypad: Joypad::new(),
            interrupt_flag: 0,
            interrupt_enable: 0,
            ppu: PpuRegisters::default(),
            boot_rom_disabled: false,
            hram: HighRam::new(),
        }
    }

    /// State left behind by the boot ROM, for sessions started without one.
    pub fn post_boot() -> Self {
        let mut io = Self::new();
        io.interrupt_flag = 0xE1 & IF_USED_BITS;
        io.ppu.write(LCDC_ADDR, 0x91);
        io.ppu.write(STAT_ADDR, 0x85);
        io.ppu.write(BGP_ADDR, 0xFC);
        io.boot_rom_disabled = true;
        io
    }

    pub fn read(&self, address: u16) -> u8 {
        match decode_io(address) {
            IoRegister::Joypad => self.joypad.read_p1(),
            IoRegister::InterruptFlag => self.interrupt_flag | !IF_USED_BITS,
            IoRegister::Ppu(_) => self.ppu.read(address),
            // Write-only latch
            IoRegister::BootRomDisable => 0xFF,
            IoRegister::HighRam(offset) => self.hram.read(offset),
            IoRegister::InterruptEnable => self.interrupt_enable,
            IoRegister::Unmapped => 0xFF,
        }
    }

    pub fn write(&mut self, address: u16, value: u8) {
        match decode_io(address) {
            IoRegister::Joypad => self.joypad.write_p1(value),
            IoRegister::InterruptFlag => self.interrupt_flag = value & IF_USED_BITS,
            IoRegister::Ppu(_) => self.ppu.write(address, value),
            IoRegister::BootRomDisable => {
                if value & 0x01 != 0 && !self.boot_rom_disabled {
                    log::debug!("Boot ROM overlay disabled");
                    self.boot_rom_disabled = true;
                }
            }
            IoRegister::HighRam(offset) => self.hram.write(offset, value),
            IoRegister::InterruptEnable => self.interrupt_enable = value,
            IoRegister::Unmapped => {
                log::trace!("Unmapped IO write ignored: {:04X} = {:02X}", address, value);
            }
        }
    }

    /// Sets one bit of IF.
    pub fn request_interrupt(&mut self, bit: u8) {
        self.interrupt_flag |= (1 << bit) & IF_USED_BITS;
    }

    pub fn set_button(&mut self, button: Button, pressed: bool) {
        if self.joypad.set_button(button, pressed) {
            self.request_interrupt(JOYPAD_INTERRUPT_BIT);
        }
    }

    pub fn joypad(&self) -> &Joypad {
        &self.joypad
    }

    pub fn ppu(&self) -> &PpuRegisters {
        &self.ppu
    }

    pub fn ppu_mut(&mut self) -> &mut PpuRegisters {
        &mut self.ppu
    }

    pub fn boot_rom_disabled(&self) -> bool {
        self.boot_rom_disabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_map::{DMA_ADDR, TIMER_INTERRUPT_BIT, VBLANK_INTERRUPT_BIT, WX_ADDR};

    #[test]
    fn io_decode_table() {
        assert_eq!(decode_io(0xFF00), IoRegister::Joypad);
        assert_eq!(decode_io(0xFF0F), IoRegister::InterruptFlag);
        assert_eq!(decode_io(0xFF40), IoRegister::Ppu(0));
        assert_eq!(decode_io(0xFF4B), IoRegister::Ppu(11));
        assert_eq!(decode_io(0xFF50), IoRegister::BootRomDisable);
        assert_eq!(decode_io(0xFF80), IoRegister::HighRam(0));
        assert_eq!(decode_io(0xFFFE), IoRegister::HighRam(0x7E));
        assert_eq!(decode_io(0xFFFF), IoRegister::InterruptEnable);
        assert_eq!(decode_io(0xFF01), IoRegister::Unmapped);
        assert_eq!(decode_io(0xFF7F), IoRegister::Unmapped);
    }

    #[test]
    fn interrupt_flag_upper_bits_read_as_one() {
        let mut io = IoRegisters::new();
        assert_eq!(io.read(IF_ADDR), 0xE0);
        io.write(IF_ADDR, 0xFF);
        assert_eq!(io.read(IF_ADDR), 0xFF);
        io.write(IF_ADDR, 0x00);
        io.request_interrupt(VBLANK_INTERRUPT_BIT);
        io.request_interrupt(TIMER_INTERRUPT_BIT);
        assert_eq!(io.read(IF_ADDR), 0xE5);
    }

    #[test]
    fn interrupt_enable_holds_full_byte() {
        let mut io = IoRegisters::new();
        io.write(INTERRUPT_ENABLE_REGISTER, 0x1F);
        assert_eq!(io.read(INTERRUPT_ENABLE_REGISTER), 0x1F);
    }

    #[test]
    fn ppu_registers_are_verbatim() {
        let mut io = IoRegisters::new();
        for address in PPU_REGISTERS_START..=PPU_REGISTERS_END {
            io.write(address, address as u8 ^ 0x5A);
        }
        assert_eq!(io.read(WX_ADDR), 0x4B ^ 0x5A);
        assert_eq!(io.read(DMA_ADDR), 0x46 ^ 0x5A);
        assert_eq!(io.ppu().lcdc(), 0x40 ^ 0x5A);
    }

    #[test]
    fn unmapped_reads_open_bus() {
        let mut io = IoRegisters::new();
        io.write(0xFF01, 0x12);
        assert_eq!(io.read(0xFF01), 0xFF);
        assert_eq!(io.read(BOOT_ROM_DISABLE_ADDR), 0xFF);
    }

    #[test]
    fn boot_disable_is_one_way() {
        let mut io = IoRegisters::new();
        io.write(BOOT_ROM_DISABLE_ADDR, 0x00);
        assert!(!io.boot_rom_disabled());
        io.write(BOOT_ROM_DISABLE_ADDR, 0x01);
        assert!(io.boot_rom_disabled());
        io.write(BOOT_ROM_DISABLE_ADDR, 0x00);
        assert!(io.boot_rom_disabled());
    }

    #[test]
    fn button_press_raises_joypad_interrupt() {
        let mut io = IoRegisters::new();
        io.write(P1_JOYP_ADDR, 0x10); // actions
        io.set_button(Button::B, true);
        assert_eq!(io.read(IF_ADDR) & (1 << JOYPAD_INTERRUPT_BIT), 1 << JOYPAD_INTERRUPT_BIT);
        assert_eq!(io.read(P1_JOYP_ADDR), 0xFD);
    }

    #[test]
    fn post_boot_values() {
        let io = IoRegisters::post_boot();
        assert_eq!(io.read(LCDC_ADDR), 0x91);
        assert_eq!(io.read(BGP_ADDR), 0xFC);
        assert_eq!(io.read(IF_ADDR), 0xE1);
        assert_eq!(io.read(P1_JOYP_ADDR), 0xFF);
        assert!(io.boot_rom_disabled());
    }
}
