use log::warn;

use crate::alu::{self, AluOp, RotOp};
use crate::decode::{self, CC, Fields, Operand8, R, RP, RP2};
use crate::disasm;
use crate::error::ExecError;
use crate::memory_map::MemoryMap;
use crate::registers::{Flag, Reg8, Reg16, Registers};

#[cfg(feature = "cpu-trace")]
macro_rules! cpu_trace {
    ($($arg:tt)*) => {
        log::trace!(target: "sm83emu::cpu", $($arg)*);
    };
}
#[cfg(not(feature = "cpu-trace"))]
macro_rules! cpu_trace {
    ($($arg:tt)*) => {};
}

// Clock ratio per machine cycle. The counter is advisory; nothing is
// scheduled from it.
const CYCLES_PER_M_CYCLE: u64 = 4;

const OP_STOP: u8 = 0x10;
const OP_HALT: u8 = 0x76;
const OP_RETI: u8 = 0xD9;

/// What the stub handler does with HALT, STOP, DI, EI and RETI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StubPolicy {
    /// Refuse with [`ExecError::Unimplemented`].
    #[default]
    Abort,
    /// Log a warning and perform only the non-interrupt part of the
    /// instruction (STOP skips its padding byte, RETI returns).
    Warn,
}

#[derive(Clone, Debug, Default)]
pub struct Cpu {
    pub regs: Registers,
    /// Address of the most recent bus access (fetch, read or write).
    pub bus_addr: u16,
    pub cycles: u64,
    pub instructions: u64,
    pub stub_policy: StubPolicy,
}

impl Cpu {
    pub fn new() -> Self {
        Self::with_registers(Registers::new())
    }

    pub fn with_registers(regs: Registers) -> Self {
        Self {
            regs,
            bus_addr: 0,
            cycles: 0,
            instructions: 0,
            stub_policy: StubPolicy::default(),
        }
    }

    /// Executes one instruction, panicking with a diagnostic if the opcode is
    /// illegal or stubbed out.
    pub fn step(&mut self, mem: &mut MemoryMap) {
        if let Err(err) = self.try_step(mem) {
            panic!("{err}; {}", self.debug_state());
        }
    }

    /// Fetches, decodes and executes exactly one instruction.
    pub fn try_step(&mut self, mem: &mut MemoryMap) -> Result<(), ExecError> {
        let pc = self.regs.pc;
        cpu_trace!(
            "{:04X}: {:<16} {}",
            pc,
            disasm::disassemble(&mem.as_bytes()[pc as usize..], pc).0,
            self.regs
        );
        let opcode = self.fetch8(mem);
        self.execute(opcode, pc, mem)?;
        self.instructions += 1;
        Ok(())
    }

    /// Formatted CPU state string for debugging.
    pub fn debug_state(&self) -> String {
        format!(
            "{} BUS:{:04X} CY:{} IN:{}",
            self.regs, self.bus_addr, self.cycles, self.instructions
        )
    }

    #[inline(always)]
    fn tick(&mut self, m_cycles: u8) {
        self.cycles += CYCLES_PER_M_CYCLE * m_cycles as u64;
    }

    #[inline(always)]
    pub(crate) fn fetch8(&mut self, mem: &MemoryMap) -> u8 {
        let val = self.read8(mem, self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        val
    }

    #[inline(always)]
    fn fetch16(&mut self, mem: &MemoryMap) -> u16 {
        let lo = self.fetch8(mem) as u16;
        let hi = self.fetch8(mem) as u16;
        (hi << 8) | lo
    }

    #[inline(always)]
    pub(crate) fn read8(&mut self, mem: &MemoryMap, addr: u16) -> u8 {
        self.bus_addr = addr;
        self.tick(1);
        mem.read_byte(addr)
    }

    #[inline(always)]
    pub(crate) fn write8(&mut self, mem: &mut MemoryMap, addr: u16, val: u8) {
        self.bus_addr = addr;
        self.tick(1);
        mem.write_byte(addr, val);
    }

    fn push16(&mut self, mem: &mut MemoryMap, val: u16) {
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        self.write8(mem, self.regs.sp, (val >> 8) as u8);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        self.write8(mem, self.regs.sp, val as u8);
    }

    fn pop16(&mut self, mem: &MemoryMap) -> u16 {
        let lo = self.read8(mem, self.regs.sp) as u16;
        self.regs.sp = self.regs.sp.wrapping_add(1);
        let hi = self.read8(mem, self.regs.sp) as u16;
        self.regs.sp = self.regs.sp.wrapping_add(1);
        (hi << 8) | lo
    }

    pub(crate) fn read_operand(&mut self, mem: &MemoryMap, op: Operand8) -> u8 {
        match op {
            Operand8::Reg(reg) => self.regs.read8(reg),
            Operand8::IndirectHl => self.read8(mem, self.regs.hl()),
        }
    }

    pub(crate) fn write_operand(&mut self, mem: &mut MemoryMap, op: Operand8, val: u8) {
        match op {
            Operand8::Reg(reg) => self.regs.write8(reg, val),
            Operand8::IndirectHl => {
                let addr = self.regs.hl();
                self.write8(mem, addr, val);
            }
        }
    }

    fn execute(&mut self, opcode: u8, pc: u16, mem: &mut MemoryMap) -> Result<(), ExecError> {
        if decode::is_illegal(opcode) {
            return Err(ExecError::IllegalOpcode { opcode, pc });
        }

        let fields = Fields::split(opcode);
        match fields.x {
            0 => self.execute_x0(opcode, pc, fields, mem),
            1 => {
                if opcode == OP_HALT {
                    return self.stub(opcode, pc, mem);
                }
                let val = self.read_operand(mem, R[fields.z as usize]);
                self.write_operand(mem, R[fields.y as usize], val);
                Ok(())
            }
            2 => {
                let val = self.read_operand(mem, R[fields.z as usize]);
                alu::accumulate(&mut self.regs, AluOp::from_index(fields.y), val);
                Ok(())
            }
            _ => self.execute_x3(opcode, pc, fields, mem),
        }
    }

    fn execute_x0(
        &mut self,
        opcode: u8,
        pc: u16,
        Fields { y, z, p, q, .. }: Fields,
        mem: &mut MemoryMap,
    ) -> Result<(), ExecError> {
        match z {
            0 => match y {
                0 => {}
                1 => {
                    let addr = self.fetch16(mem);
                    let [lo, hi] = self.regs.sp.to_le_bytes();
                    self.write8(mem, addr, lo);
                    self.write8(mem, addr.wrapping_add(1), hi);
                }
                2 => return self.stub(opcode, pc, mem),
                3 => self.jump_relative(mem, true),
                _ => {
                    let taken = CC[(y - 4) as usize].holds(self.regs.f());
                    self.jump_relative(mem, taken);
                }
            },
            1 => {
                let pair = RP[p as usize];
                if q == 0 {
                    let val = self.fetch16(mem);
                    self.regs.write16(pair, val);
                } else {
                    let val = self.regs.read16(pair);
                    alu::add16_hl(&mut self.regs, val);
                    self.tick(1);
                }
            }
            2 => {
                let addr = match p {
                    0 => self.regs.read16(Reg16::BC),
                    1 => self.regs.read16(Reg16::DE),
                    2 => {
                        let hl = self.regs.hl();
                        self.regs.set_hl(hl.wrapping_add(1));
                        hl
                    }
                    _ => {
                        let hl = self.regs.hl();
                        self.regs.set_hl(hl.wrapping_sub(1));
                        hl
                    }
                };
                if q == 0 {
                    let a = self.regs.a();
                    self.write8(mem, addr, a);
                } else {
                    let val = self.read8(mem, addr);
                    self.regs.set_a(val);
                }
            }
            3 => {
                let pair = RP[p as usize];
                let val = self.regs.read16(pair);
                let val = if q == 0 {
                    val.wrapping_add(1)
                } else {
                    val.wrapping_sub(1)
                };
                self.regs.write16(pair, val);
                self.tick(1);
            }
            4 => {
                let target = R[y as usize];
                let val = self.read_operand(mem, target);
                let res = alu::inc8(&mut self.regs, val);
                self.write_operand(mem, target, res);
            }
            5 => {
                let target = R[y as usize];
                let val = self.read_operand(mem, target);
                let res = alu::dec8(&mut self.regs, val);
                self.write_operand(mem, target, res);
            }
            6 => {
                let val = self.fetch8(mem);
                self.write_operand(mem, R[y as usize], val);
            }
            _ => match y {
                0..=3 => {
                    // RLCA, RRCA, RLA, RRA: CB rotations on A with Z forced clear.
                    let a = self.regs.a();
                    let res = alu::rotate(&mut self.regs, RotOp::from_index(y), a);
                    self.regs.set_a(res);
                    self.regs.clear_flag(Flag::Z);
                }
                4 => alu::daa(&mut self.regs),
                5 => alu::cpl(&mut self.regs),
                6 => alu::scf(&mut self.regs),
                _ => alu::ccf(&mut self.regs),
            },
        }
        Ok(())
    }

    fn execute_x3(
        &mut self,
        opcode: u8,
        pc: u16,
        Fields { y, z, p, q, .. }: Fields,
        mem: &mut MemoryMap,
    ) -> Result<(), ExecError> {
        match z {
            0 => match y {
                0..=3 => {
                    self.tick(1);
                    if CC[y as usize].holds(self.regs.f()) {
                        self.regs.pc = self.pop16(mem);
                        self.tick(1);
                    }
                }
                4 => {
                    let offset = self.fetch8(mem);
                    let a = self.regs.a();
                    self.write8(mem, 0xFF00 | offset as u16, a);
                }
                5 => {
                    let offset = self.fetch8(mem) as i8;
                    let sp = self.regs.sp;
                    self.regs.sp = alu::add_sp_i8(&mut self.regs, sp, offset);
                    self.tick(2);
                }
                6 => {
                    let offset = self.fetch8(mem);
                    let val = self.read8(mem, 0xFF00 | offset as u16);
                    self.regs.set_a(val);
                }
                _ => {
                    let offset = self.fetch8(mem) as i8;
                    let sp = self.regs.sp;
                    let res = alu::add_sp_i8(&mut self.regs, sp, offset);
                    self.regs.set_hl(res);
                    self.tick(1);
                }
            },
            1 => {
                if q == 0 {
                    let val = self.pop16(mem);
                    self.regs.write16(RP2[p as usize], val);
                } else {
                    match p {
                        0 => {
                            self.regs.pc = self.pop16(mem);
                            self.tick(1);
                        }
                        1 => return self.stub(opcode, pc, mem),
                        2 => self.regs.pc = self.regs.hl(),
                        _ => {
                            self.regs.sp = self.regs.hl();
                            self.tick(1);
                        }
                    }
                }
            }
            2 => match y {
                0..=3 => {
                    let addr = self.fetch16(mem);
                    if CC[y as usize].holds(self.regs.f()) {
                        self.regs.pc = addr;
                        self.tick(1);
                    }
                }
                4 => {
                    let addr = 0xFF00 | self.regs.read8(Reg8::C) as u16;
                    let a = self.regs.a();
                    self.write8(mem, addr, a);
                }
                5 => {
                    let addr = self.fetch16(mem);
                    let a = self.regs.a();
                    self.write8(mem, addr, a);
                }
                6 => {
                    let addr = 0xFF00 | self.regs.read8(Reg8::C) as u16;
                    let val = self.read8(mem, addr);
                    self.regs.set_a(val);
                }
                _ => {
                    let addr = self.fetch16(mem);
                    let val = self.read8(mem, addr);
                    self.regs.set_a(val);
                }
            },
            3 => match y {
                0 => {
                    self.regs.pc = self.fetch16(mem);
                    self.tick(1);
                }
                1 => self.execute_cb(mem),
                6 | 7 => return self.stub(opcode, pc, mem),
                _ => return Err(ExecError::IllegalOpcode { opcode, pc }),
            },
            4 => {
                if y > 3 {
                    return Err(ExecError::IllegalOpcode { opcode, pc });
                }
                let addr = self.fetch16(mem);
                if CC[y as usize].holds(self.regs.f()) {
                    self.call(mem, addr);
                }
            }
            5 => {
                if q == 0 {
                    let val = self.regs.read16(RP2[p as usize]);
                    self.tick(1);
                    self.push16(mem, val);
                } else if p == 0 {
                    let addr = self.fetch16(mem);
                    self.call(mem, addr);
                } else {
                    return Err(ExecError::IllegalOpcode { opcode, pc });
                }
            }
            6 => {
                let val = self.fetch8(mem);
                alu::accumulate(&mut self.regs, AluOp::from_index(y), val);
            }
            _ => {
                let ret = self.regs.pc;
                self.tick(1);
                self.push16(mem, ret);
                self.regs.pc = (y as u16) * 8;
            }
        }
        Ok(())
    }

    /// JR: the offset is relative to the address after the operand byte.
    fn jump_relative(&mut self, mem: &MemoryMap, taken: bool) {
        let offset = self.fetch8(mem) as i8;
        if taken {
            self.regs.pc = self.regs.pc.wrapping_add(offset as i16 as u16);
            self.tick(1);
        }
    }

    fn call(&mut self, mem: &mut MemoryMap, addr: u16) {
        let ret = self.regs.pc;
        self.tick(1);
        self.push16(mem, ret);
        self.regs.pc = addr;
    }

    /// Explicit landing point for opcodes whose interrupt/power semantics are
    /// not modelled.
    fn stub(&mut self, opcode: u8, pc: u16, mem: &mut MemoryMap) -> Result<(), ExecError> {
        let mnemonic = disasm::mnemonic(opcode);
        match self.stub_policy {
            StubPolicy::Abort => Err(ExecError::Unimplemented {
                opcode,
                pc,
                mnemonic,
            }),
            StubPolicy::Warn => {
                warn!("{mnemonic} at PC=${pc:04X} is not emulated; continuing");
                match opcode {
                    OP_STOP => {
                        self.fetch8(mem);
                    }
                    OP_RETI => {
                        self.regs.pc = self.pop16(mem);
                        self.tick(1);
                    }
                    _ => {}
                }
                Ok(())
            }
        }
    }
}
