use thiserror::Error;

/// A bank computation or decode produced an address no storage can serve.
///
/// Only a defect in the controller arithmetic or the decode table can produce
/// one of these; the bus treats it as fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressDecodeFailure {
    #[error("address {address:#06X} is not a cartridge address")]
    OutsideCartridge { address: u16 },
    #[error("address {address:#06X} translated to ROM offset {offset:#X}, ROM is {len:#X} bytes")]
    RomOffsetOutOfRange {
        address: u16,
        offset: usize,
        len: usize,
    },
    #[error("address {address:#06X} translated to RAM offset {offset:#X}, RAM is {len:#X} bytes")]
    RamOffsetOutOfRange {
        address: u16,
        offset: usize,
        len: usize,
    },
}

/// Rejected ROM, boot or save images.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("ROM is {len} bytes, minimum is {min}")]
    RomTooSmall { len: usize, min: usize },
    #[error("ROM size {len} is not a multiple of the 16 KiB bank size")]
    RomNotBankAligned { len: usize },
    #[error("ROM header declares {declared} bytes but image has {len}")]
    TruncatedRom { declared: usize, len: usize },
    #[error("unknown cartridge type code {0:#04X}")]
    UnknownCartridgeType(u8),
    #[error("cartridge controller {0} is not supported")]
    UnsupportedController(&'static str),
    #[error("invalid ROM size code {0:#04X}")]
    InvalidRomSizeCode(u8),
    #[error("invalid RAM size code {0:#04X}")]
    InvalidRamSizeCode(u8),
    #[error("cartridge RAM size {0} must be 0, 2 KiB or a multiple of 8 KiB")]
    InvalidRamSize(usize),
    #[error("boot image is {len} bytes, maximum is {max}")]
    BootRomTooLarge { len: usize, max: usize },
    #[error("save data is {len} bytes, cartridge RAM is {expected}")]
    SaveSizeMismatch { len: usize, expected: usize },
}
