// src/mbc.rs

use crate::error::{AddressDecodeFailure, LoadError};
use crate::memory_map::{
    EXT_RAM_BANK_SIZE, EXT_RAM_END, EXT_RAM_START, ROM_BANK_0_END, ROM_BANK_0_START,
    ROM_BANK_N_END, ROM_BANK_N_START, ROM_BANK_SIZE,
};
use lazy_static::lazy_static;
use std::collections::HashMap;

/// ROM size from which MBC1 routes the secondary register to the upper bank bits.
pub const LARGE_ROM_THRESHOLD: usize = 0x10_0000; // 1 MiB

/// Memory Bank Controller family named by the cartridge header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MbcType {
    NoMbc,
    Mbc1,
    Mbc2,
    Mbc3,
    Mbc5,
}

lazy_static! {
    // Header byte 0x0147 -> (controller, has RAM, has battery)
    static ref CARTRIDGE_TYPES: HashMap<u8, (MbcType, bool, bool)> = {
        let mut table = HashMap::new();
        table.insert(0x00, (MbcType::NoMbc, false, false)); // ROM ONLY
        table.insert(0x01, (MbcType::Mbc1, false, false));
        table.insert(0x02, (MbcType::Mbc1, true, false)); // MBC1+RAM
        table.insert(0x03, (MbcType::Mbc1, true, true)); // MBC1+RAM+BATT
        table.insert(0x05, (MbcType::Mbc2, true, false));
        table.insert(0x06, (MbcType::Mbc2, true, true));
        table.insert(0x08, (MbcType::NoMbc, true, false)); // ROM+RAM
        table.insert(0x09, (MbcType::NoMbc, true, true)); // ROM+RAM+BATT
        table.insert(0x0F, (MbcType::Mbc3, false, true)); // MBC3+TIMER+BATT
        table.insert(0x10, (MbcType::Mbc3, true, true)); // MBC3+TIMER+RAM+BATT
        table.insert(0x11, (MbcType::Mbc3, false, false));
        table.insert(0x12, (MbcType::Mbc3, true, false));
        table.insert(0x13, (MbcType::Mbc3, true, true));
        table.insert(0x19, (MbcType::Mbc5, false, false));
        table.insert(0x1A, (MbcType::Mbc5, true, false));
        table.insert(0x1B, (MbcType::Mbc5, true, true));
        table.insert(0x1C, (MbcType::Mbc5, false, false)); // +RUMBLE
        table.insert(0x1D, (MbcType::Mbc5, true, false));
        table.insert(0x1E, (MbcType::Mbc5, true, true));
        table
    };
}

impl MbcType {
    /// Determines MBC Type, RAM presence, and Battery presence from the cartridge type code.
    pub fn from_header(cartridge_type_code: u8) -> Option<(Self, bool, bool)> {
        CARTRIDGE_TYPES.get(&cartridge_type_code).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            MbcType::NoMbc => "ROM ONLY",
            MbcType::Mbc1 => "MBC1",
            MbcType::Mbc2 => "MBC2",
            MbcType::Mbc3 => "MBC3",
            MbcType::Mbc5 => "MBC5",
        }
    }
}

/// The controller variants this crate implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerKind {
    None,
    Type1,
}

impl TryFrom<MbcType> for ControllerKind {
    type Error = LoadError;

    fn try_from(mbc_type: MbcType) -> Result<Self, Self::Error> {
        match mbc_type {
            MbcType::NoMbc => Ok(ControllerKind::None),
            MbcType::Mbc1 => Ok(ControllerKind::Type1),
            other => Err(LoadError::UnsupportedController(other.name())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BankingMode {
    #[default]
    Simple,
    Advanced,
}

/// Control state written through the cartridge ROM window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankRegisters {
    ram_enabled: bool,
    rom_bank_number: u8, // 5 bits, never 0 after a write
    secondary: u8,       // 2 bits: upper ROM bank bits or RAM bank, depending on mode
    banking_mode: BankingMode,
}

impl Default for BankRegisters {
    fn default() -> Self {
        BankRegisters {
            ram_enabled: false,
            rom_bank_number: 1,
            secondary: 0,
            banking_mode: BankingMode::Simple,
        }
    }
}

impl BankRegisters {
    pub fn ram_enabled(&self) -> bool {
        self.ram_enabled
    }

    pub fn rom_bank_number(&self) -> u8 {
        self.rom_bank_number
    }

    pub fn secondary_register(&self) -> u8 {
        self.secondary
    }

    pub fn banking_mode(&self) -> BankingMode {
        self.banking_mode
    }
}

/// Where a cartridge read lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Translation {
    Rom(usize),
    Ram(usize),
    /// Nothing drives the bus; the read yields 0xFF.
    OpenBus,
}

/// Address translation policy for one cartridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mbc {
    kind: ControllerKind,
    rom_size: usize,
    ram_size: usize,
    registers: BankRegisters,
}

impl Mbc {
    pub fn new(kind: ControllerKind, rom_size: usize, ram_size: usize) -> Self {
        Mbc {
            kind,
            rom_size,
            ram_size,
            registers: BankRegisters::default(),
        }
    }

    pub fn kind(&self) -> ControllerKind {
        self.kind
    }

    pub fn registers(&self) -> &BankRegisters {
        &self.registers
    }

    pub fn rom_bank_count(&self) -> usize {
        (self.rom_size / ROM_BANK_SIZE).max(1)
    }

    /// Whether the RAM window currently maps to storage.
    pub fn ram_accessible(&self) -> bool {
        self.ram_size > 0
            && match self.kind {
                ControllerKind::None => true,
                ControllerKind::Type1 => self.registers.ram_enabled,
            }
    }

    /// Resolves a cartridge address to a ROM or RAM offset.
    pub fn translate_read(&self, address: u16) -> Result<Translation, AddressDecodeFailure> {
        match self.kind {
            ControllerKind::None => self.translate_direct(address),
            ControllerKind::Type1 => self.translate_mbc1(address),
        }
    }

    /// Applies a write to the control region (0000-7FFF).
    pub fn apply_write(&mut self, address: u16, value: u8) {
        match self.kind {
            ControllerKind::None => {
                log::trace!("ROM write ignored: {:04X} = {:02X}", address, value);
            }
            ControllerKind::Type1 => self.write_mbc1(address, value),
        }
    }

    fn translate_direct(&self, address: u16) -> Result<Translation, AddressDecodeFailure> {
        match address {
            ROM_BANK_0_START..=ROM_BANK_N_END => Ok(Translation::Rom(address as usize)),
            EXT_RAM_START..=EXT_RAM_END => Ok(self.ram_translation(0, address)),
            _ => Err(AddressDecodeFailure::OutsideCartridge { address }),
        }
    }

    fn translate_mbc1(&self, address: u16) -> Result<Translation, AddressDecodeFailure> {
        let regs = &self.registers;
        match address {
            ROM_BANK_0_START..=ROM_BANK_0_END => {
                let bank = match regs.banking_mode {
                    BankingMode::Simple => 0,
                    BankingMode::Advanced => regs.secondary as usize,
                };
                Ok(Translation::Rom(self.rom_offset(bank, address - ROM_BANK_0_START)))
            }
            ROM_BANK_N_START..=ROM_BANK_N_END => {
                let bank = ((regs.secondary as usize) << 5) | regs.rom_bank_number as usize;
                Ok(Translation::Rom(self.rom_offset(bank, address - ROM_BANK_N_START)))
            }
            EXT_RAM_START..=EXT_RAM_END => {
                if !regs.ram_enabled {
                    return Ok(Translation::OpenBus);
                }
                let bank = match regs.banking_mode {
                    BankingMode::Simple => 0,
                    BankingMode::Advanced => regs.secondary as usize,
                };
                Ok(self.ram_translation(bank, address))
            }
            _ => Err(AddressDecodeFailure::OutsideCartridge { address }),
        }
    }

    fn rom_offset(&self, bank: usize, offset_in_bank: u16) -> usize {
        (bank % self.rom_bank_count()) * ROM_BANK_SIZE + offset_in_bank as usize
    }

    fn ram_translation(&self, bank: usize, address: u16) -> Translation {
        if self.ram_size == 0 {
            return Translation::OpenBus;
        }
        // 2 KiB parts mirror through the window; larger parts wrap by bank.
        let offset = bank * EXT_RAM_BANK_SIZE + (address - EXT_RAM_START) as usize;
        Translation::Ram(offset % self.ram_size)
    }

    fn write_mbc1(&mut self, address: u16, value: u8) {
        match address {
            0x0000..=0x1FFF => {
                let enabled = (value & 0x0F) == 0x0A;
                if enabled != self.registers.ram_enabled {
                    log::debug!("MBC1: RAM {}", if enabled { "enabled" } else { "disabled" });
                }
                self.registers.ram_enabled = enabled;
            }
            0x2000..=0x3FFF => {
                let mut bank = value & 0x1F;
                if bank == 0 {
                    bank = 1;
                }
                // Bank counts under 32 would leave high bits pointing past the ROM.
                let bank = (bank as usize % self.rom_bank_count()) as u8;
                log::debug!("MBC1: ROM bank -> {}", bank);
                self.registers.rom_bank_number = bank;
            }
            0x4000..=0x5FFF => {
                if self.rom_size >= LARGE_ROM_THRESHOLD {
                    self.registers.secondary = value & 0x03;
                    log::debug!("MBC1: secondary register -> {}", self.registers.secondary);
                } else {
                    log::trace!("MBC1: secondary write {:02X} ignored on small ROM", value);
                }
            }
            0x6000..=0x7FFF => {
                self.registers.banking_mode = if value & 0x01 == 0 {
                    BankingMode::Simple
                } else {
                    BankingMode::Advanced
                };
                log::debug!("MBC1: banking mode -> {:?}", self.registers.banking_mode);
            }
            _ => {}
        }
    }
}
