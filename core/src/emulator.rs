//! Session driver that alternates the processor and the picture unit over one bus.

use crate::memory_bus::{Bus, MemoryBus, VideoBus};

// Type alias for step results reported by the processor
pub type CpuResult<T> = Result<T, String>;

/// Instruction-execution core. Executes one instruction per call and reports
/// the T-cycles it took.
pub trait Processor {
    fn step(&mut self, bus: &mut dyn Bus) -> CpuResult<u32>;
}

/// Rendering core. Advances by the cycles the processor just spent.
pub trait PictureUnit {
    fn step(&mut self, cycles: u32, bus: &mut dyn VideoBus);
}

/// Owns the bus for one session and hands each collaborator a capability to
/// it in turn.
pub struct Emulator<C, P> {
    pub cpu: C,
    pub ppu: P,
    memory_bus: MemoryBus,
    total_cycles: u64,
}

impl<C: Processor, P: PictureUnit> Emulator<C, P> {
    pub fn new(cpu: C, ppu: P, memory_bus: MemoryBus) -> Self {
        Emulator {
            cpu,
            ppu,
            memory_bus,
            total_cycles: 0,
        }
    }

    /// Executes exactly one CPU instruction, then lets the PPU catch up.
    /// Returns the cycles executed.
    pub fn step(&mut self) -> CpuResult<u32> {
        let executed_cycles = self.cpu.step(&mut self.memory_bus)?;
        self.ppu.step(executed_cycles, &mut self.memory_bus);
        self.total_cycles += u64::from(executed_cycles);
        Ok(executed_cycles)
    }

    /// Steps until at least `budget` cycles have run. Returns the cycles actually run.
    pub fn run_cycles(&mut self, budget: u32) -> CpuResult<u32> {
        let mut cycles_run: u32 = 0;
        while cycles_run < budget {
            let executed = self.step()?;
            if executed == 0 {
                return Err("processor made no progress".to_string());
            }
            cycles_run = cycles_run.saturating_add(executed);
        }
        Ok(cycles_run)
    }

    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    pub fn memory_bus(&self) -> &MemoryBus {
        &self.memory_bus
    }

    pub fn memory_bus_mut(&mut self) -> &mut MemoryBus {
        &mut self.memory_bus
    }

    /// Ends the session, returning the bus (e.g. to persist cartridge RAM).
    pub fn into_memory_bus(self) -> MemoryBus {
        self.memory_bus
    }
}
