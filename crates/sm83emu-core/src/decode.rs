//! Opcode bit fields and the operand tables they index.
//!
//! Layout follows the usual Z80-family decomposition:
//!
//! ```text
//!   7 6 | 5 4 3 | 2 1 0
//!    x  |   y   |   z
//!       | p | q |
//! ```

use crate::registers::{FLAG_C, FLAG_Z, Reg8, Reg16};

/// Opcodes with no defined behaviour on the SM83.
pub const ILLEGAL_OPCODES: [u8; 11] = [
    0xD3, 0xDB, 0xDD, 0xE3, 0xE4, 0xEB, 0xEC, 0xED, 0xF4, 0xFC, 0xFD,
];

pub const CB_PREFIX: u8 = 0xCB;

#[inline]
pub const fn is_illegal(opcode: u8) -> bool {
    let mut i = 0;
    while i < ILLEGAL_OPCODES.len() {
        if ILLEGAL_OPCODES[i] == opcode {
            return true;
        }
        i += 1;
    }
    false
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fields {
    pub x: u8,
    pub y: u8,
    pub z: u8,
    pub p: u8,
    pub q: u8,
}

impl Fields {
    #[inline(always)]
    pub const fn split(opcode: u8) -> Self {
        let y = (opcode >> 3) & 0x07;
        Self {
            x: opcode >> 6,
            y,
            z: opcode & 0x07,
            p: y >> 1,
            q: y & 0x01,
        }
    }
}

/// 8-bit operand: a register, or the byte HL points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand8 {
    Reg(Reg8),
    IndirectHl,
}

/// Indexed by `y` or `z`. Entry 6 is `(HL)`.
pub const R: [Operand8; 8] = [
    Operand8::Reg(Reg8::B),
    Operand8::Reg(Reg8::C),
    Operand8::Reg(Reg8::D),
    Operand8::Reg(Reg8::E),
    Operand8::Reg(Reg8::H),
    Operand8::Reg(Reg8::L),
    Operand8::IndirectHl,
    Operand8::Reg(Reg8::A),
];

/// Register pairs for LD/INC/DEC/ADD HL.
pub const RP: [Reg16; 4] = [Reg16::BC, Reg16::DE, Reg16::HL, Reg16::SP];

/// Register pairs for PUSH/POP.
pub const RP2: [Reg16; 4] = [Reg16::BC, Reg16::DE, Reg16::HL, Reg16::AF];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Condition {
    Nz,
    Z,
    Nc,
    C,
}

pub const CC: [Condition; 4] = [Condition::Nz, Condition::Z, Condition::Nc, Condition::C];

impl Condition {
    /// Evaluates the condition against a flag byte.
    #[inline]
    pub const fn holds(self, f: u8) -> bool {
        match self {
            Condition::Nz => f & FLAG_Z == 0,
            Condition::Z => f & FLAG_Z != 0,
            Condition::Nc => f & FLAG_C == 0,
            Condition::C => f & FLAG_C != 0,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Condition::Nz => "NZ",
            Condition::Z => "Z",
            Condition::Nc => "NC",
            Condition::C => "C",
        }
    }
}

pub fn operand_name(op: Operand8) -> &'static str {
    match op {
        Operand8::Reg(Reg8::A) => "A",
        Operand8::Reg(Reg8::F) => "F",
        Operand8::Reg(Reg8::B) => "B",
        Operand8::Reg(Reg8::C) => "C",
        Operand8::Reg(Reg8::D) => "D",
        Operand8::Reg(Reg8::E) => "E",
        Operand8::Reg(Reg8::H) => "H",
        Operand8::Reg(Reg8::L) => "L",
        Operand8::IndirectHl => "(HL)",
    }
}

pub fn pair_name(pair: Reg16) -> &'static str {
    match pair {
        Reg16::AF => "AF",
        Reg16::BC => "BC",
        Reg16::DE => "DE",
        Reg16::HL => "HL",
        Reg16::SP => "SP",
        Reg16::PC => "PC",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_fields() {
        // LD B,(HL)
        let f = Fields::split(0x46);
        assert_eq!((f.x, f.y, f.z), (1, 0, 6));
        // PUSH AF
        let f = Fields::split(0xF5);
        assert_eq!((f.x, f.z, f.p, f.q), (3, 5, 3, 0));
        assert_eq!(RP2[f.p as usize], Reg16::AF);
    }

    #[test]
    fn illegal_opcodes_are_the_unused_x3_slots() {
        let illegal: Vec<u8> = (0..=0xFFu8).filter(|&op| is_illegal(op)).collect();
        assert_eq!(
            illegal,
            [0xD3, 0xDB, 0xDD, 0xE3, 0xE4, 0xEB, 0xEC, 0xED, 0xF4, 0xFC, 0xFD]
        );
        assert!(!is_illegal(0xCB));
        assert!(!is_illegal(0xD9));
    }
}
