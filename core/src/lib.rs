//! Memory subsystem of the handheld console: cartridge bank switching and the
//! unified 16-bit address bus shared by the processor and picture unit.

pub mod boot_rom;
pub mod cartridge;
pub mod emulator;
pub mod error;
pub mod io;
pub mod joypad;
pub mod mbc;
pub mod memory_bus;
pub mod memory_map;
pub mod segment;

pub use boot_rom::BootRom;
pub use cartridge::{Cartridge, CartridgeHeader};
pub use emulator::{CpuResult, Emulator, PictureUnit, Processor};
pub use error::{AddressDecodeFailure, LoadError};
pub use joypad::Button;
pub use mbc::{BankingMode, ControllerKind, MbcType};
pub use memory_bus::{Bus, MemoryBus, VideoBus};
