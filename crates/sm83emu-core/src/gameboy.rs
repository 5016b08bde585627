use crate::{
    cartridge::Cartridge,
    cpu::{Cpu, StubPolicy},
    error::ExecError,
    hardware::DmgRevision,
    memory_map::MemoryMap,
    registers::Registers,
};

/// CPU plus the address space it runs against.
///
/// Each instance is fully independent; nothing is shared between machines.
#[derive(Clone, Default)]
pub struct GameBoy {
    pub cpu: Cpu,
    pub memory: MemoryMap,
}

impl GameBoy {
    /// Zeroed registers and memory, PC at 0x0000.
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            memory: MemoryMap::new(),
        }
    }

    /// Registers as the boot ROM leaves them, PC at the cartridge entry point.
    pub fn new_post_boot(revision: DmgRevision) -> Self {
        Self {
            cpu: Cpu::with_registers(Registers::post_boot(revision)),
            memory: MemoryMap::new(),
        }
    }

    pub fn set_stub_policy(&mut self, policy: StubPolicy) {
        self.cpu.stub_policy = policy;
    }

    pub fn load_cartridge(&mut self, cart: &Cartridge) {
        self.memory.load_rom(&cart.rom);
    }

    pub fn try_step(&mut self) -> Result<(), ExecError> {
        self.cpu.try_step(&mut self.memory)
    }

    pub fn step(&mut self) {
        self.cpu.step(&mut self.memory);
    }

    /// Executes up to `max_steps` instructions and returns how many ran, or
    /// the first error.
    pub fn run(&mut self, max_steps: u64) -> Result<u64, ExecError> {
        for done in 0..max_steps {
            if let Err(err) = self.try_step() {
                log::debug!("stopped after {done} instructions");
                return Err(err);
            }
        }
        Ok(max_steps)
    }

    /// Restores the given register state and clears RAM, keeping ROM bank 0.
    pub fn reset(&mut self, regs: Registers) {
        let policy = self.cpu.stub_policy;
        self.cpu = Cpu::with_registers(regs);
        self.cpu.stub_policy = policy;
        self.memory.clear_ram();
    }
}
