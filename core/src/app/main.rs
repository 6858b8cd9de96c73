use boba_bus::{BootRom, Bus, Cartridge, MemoryBus};
use std::{env, fs};

mod config;

use config::Config;

const BYTES_PER_BANK_LINE: u16 = 16;

fn main() {
    let config = match Config::from_args(env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = run(&config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(config: &Config) -> Result<(), String> {
    println!("Loading ROM: {}", config.rom_path.display());
    let rom_data = fs::read(&config.rom_path)
        .map_err(|e| format!("Failed to read ROM '{}': {}", config.rom_path.display(), e))?;
    let mut cartridge = Cartridge::from_rom(rom_data).map_err(|e| e.to_string())?;

    if let Some(header) = cartridge.header() {
        println!("Title:      {}", header.title);
        println!(
            "Controller: {} (type {:02X}, battery: {})",
            header.mbc_type.name(),
            header.cartridge_type,
            header.has_battery
        );
        println!("ROM size:   {} bytes", header.rom_size);
        println!("RAM size:   {} bytes", header.ram_size);
    }

    if let Some(save_path) = &config.save_path {
        match fs::read(save_path) {
            Ok(save) => {
                cartridge.load_ram(&save).map_err(|e| e.to_string())?;
                println!("Loaded save RAM from {}", save_path.display());
            }
            Err(e) => println!("No save loaded ({}): {}", save_path.display(), e),
        }
    }

    let boot_rom = match &config.boot_rom_path {
        Some(path) => {
            let image = fs::read(path)
                .map_err(|e| format!("Failed to read boot ROM '{}': {}", path.display(), e))?;
            Some(BootRom::new(&image).map_err(|e| e.to_string())?)
        }
        None => None,
    };

    let mut memory_bus = MemoryBus::new(cartridge, boot_rom);
    println!("Boot overlay active: {}", memory_bus.boot_overlay_active());

    let bank_count = memory_bus.cartridge().mbc().rom_bank_count();
    for bank in 1..=config.banks_to_show.min(bank_count.saturating_sub(1)) {
        // Only the low five bits reach the register; larger banks need the secondary register.
        memory_bus.write_byte(0x2000, bank as u8);
        let line: Vec<String> = (0..BYTES_PER_BANK_LINE)
            .map(|i| format!("{:02X}", memory_bus.read_byte(0x4000 + i)))
            .collect();
        println!(
            "Bank {:3} (reg {:02X}): {}",
            bank,
            memory_bus.cartridge().mbc().registers().rom_bank_number(),
            line.join(" ")
        );
    }

    Ok(())
}
