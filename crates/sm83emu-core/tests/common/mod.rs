#![allow(dead_code)]

use sm83emu_core::gameboy::GameBoy;

/// Test programs run from work RAM so ROM padding never gets in the way.
pub const ORIGIN: u16 = 0xC000;

/// Machine with `program` at [`ORIGIN`], PC pointing at it and SP at the top
/// of HRAM.
pub fn load_program(program: &[u8]) -> GameBoy {
    let mut gb = GameBoy::new();
    for (i, &byte) in program.iter().enumerate() {
        gb.memory.write_byte(ORIGIN + i as u16, byte);
    }
    gb.cpu.regs.pc = ORIGIN;
    gb.cpu.regs.sp = 0xFFFE;
    gb
}

/// Runs `steps` instructions, failing the test on any execution error.
pub fn run(gb: &mut GameBoy, steps: usize) {
    for _ in 0..steps {
        gb.try_step().expect("instruction should execute");
    }
}
