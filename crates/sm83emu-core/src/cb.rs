//! Second-level decoder for opcodes following the 0xCB prefix.
//!
//! `x` picks the family (rotate/shift, BIT, RES, SET), `y` the rotate flavour
//! or bit index, and `z` the target through the same register table as the
//! main decoder.

use crate::alu::{self, RotOp};
use crate::cpu::Cpu;
use crate::decode::{Fields, R};
use crate::memory_map::MemoryMap;

impl Cpu {
    pub(crate) fn execute_cb(&mut self, mem: &mut MemoryMap) {
        let opcode = self.fetch8(mem);
        let Fields { x, y, z, .. } = Fields::split(opcode);
        let target = R[z as usize];
        let val = self.read_operand(mem, target);
        match x {
            0 => {
                let res = alu::rotate(&mut self.regs, RotOp::from_index(y), val);
                self.write_operand(mem, target, res);
            }
            // BIT (HL) only reads.
            1 => alu::bit(&mut self.regs, y, val),
            2 => self.write_operand(mem, target, val & !(1 << y)),
            _ => self.write_operand(mem, target, val | (1 << y)),
        }
    }
}
