//! SM83 register file.
//!
//! The four general pairs are stored as `u16` words; the 8-bit registers are
//! mask/shift views into them (high byte = first letter of the pair name).

use std::fmt;

use crate::hardware::DmgRevision;

// CPU flag bits as documented in gbdev.io/pandocs/The_CPU_Flags.html
pub const FLAG_Z: u8 = 0x80; // Zero
pub const FLAG_N: u8 = 0x40; // Subtract
pub const FLAG_H: u8 = 0x20; // Half Carry
pub const FLAG_C: u8 = 0x10; // Carry

/// Bits of F that exist in hardware; the low nibble always reads as zero.
pub const FLAG_MASK: u8 = 0xF0;

// Post-boot CPU state from gbdev.io/pandocs/Power_Up_State.html
const BOOT_PC: u16 = 0x0100;
const BOOT_SP: u16 = 0xFFFE;

const DMG0_BOOT_AF: u16 = 0x0100;
const DMG0_BOOT_BC: u16 = 0xFF13;
const DMG0_BOOT_DE: u16 = 0x00C1;
const DMG0_BOOT_HL: u16 = 0x8403;

const DMG_ABC_BOOT_AF: u16 = 0x01B0;
const DMG_ABC_BOOT_BC: u16 = 0x0013;
const DMG_ABC_BOOT_DE: u16 = 0x00D8;
const DMG_ABC_BOOT_HL: u16 = 0x014D;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reg8 {
    A,
    F,
    B,
    C,
    D,
    E,
    H,
    L,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reg16 {
    AF,
    BC,
    DE,
    HL,
    SP,
    PC,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flag {
    Z,
    N,
    H,
    C,
}

impl Flag {
    #[inline]
    pub const fn mask(self) -> u8 {
        match self {
            Flag::Z => FLAG_Z,
            Flag::N => FLAG_N,
            Flag::H => FLAG_H,
            Flag::C => FLAG_C,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Registers {
    af: u16,
    bc: u16,
    de: u16,
    hl: u16,
    pub sp: u16,
    pub pc: u16,
}

#[inline(always)]
const fn high(word: u16) -> u8 {
    (word >> 8) as u8
}

#[inline(always)]
const fn low(word: u16) -> u8 {
    word as u8
}

#[inline(always)]
const fn with_high(word: u16, val: u8) -> u16 {
    (word & 0x00FF) | ((val as u16) << 8)
}

#[inline(always)]
const fn with_low(word: u16, val: u8) -> u16 {
    (word & 0xFF00) | val as u16
}

impl Registers {
    /// All registers zeroed, the state the core boots into.
    pub const fn new() -> Self {
        Self {
            af: 0,
            bc: 0,
            de: 0,
            hl: 0,
            sp: 0,
            pc: 0,
        }
    }

    /// Register contents left behind by the DMG boot ROM, for frontends that
    /// start execution at the cartridge entry point.
    pub const fn post_boot(revision: DmgRevision) -> Self {
        let (af, bc, de, hl) = match revision {
            DmgRevision::Rev0 => (DMG0_BOOT_AF, DMG0_BOOT_BC, DMG0_BOOT_DE, DMG0_BOOT_HL),
            DmgRevision::RevA | DmgRevision::RevB | DmgRevision::RevC => (
                DMG_ABC_BOOT_AF,
                DMG_ABC_BOOT_BC,
                DMG_ABC_BOOT_DE,
                DMG_ABC_BOOT_HL,
            ),
        };
        Self {
            af,
            bc,
            de,
            hl,
            sp: BOOT_SP,
            pc: BOOT_PC,
        }
    }

    pub fn read8(&self, reg: Reg8) -> u8 {
        match reg {
            Reg8::A => high(self.af),
            Reg8::F => low(self.af),
            Reg8::B => high(self.bc),
            Reg8::C => low(self.bc),
            Reg8::D => high(self.de),
            Reg8::E => low(self.de),
            Reg8::H => high(self.hl),
            Reg8::L => low(self.hl),
        }
    }

    pub fn write8(&mut self, reg: Reg8, val: u8) {
        match reg {
            Reg8::A => self.af = with_high(self.af, val),
            Reg8::F => self.af = with_low(self.af, val & FLAG_MASK),
            Reg8::B => self.bc = with_high(self.bc, val),
            Reg8::C => self.bc = with_low(self.bc, val),
            Reg8::D => self.de = with_high(self.de, val),
            Reg8::E => self.de = with_low(self.de, val),
            Reg8::H => self.hl = with_high(self.hl, val),
            Reg8::L => self.hl = with_low(self.hl, val),
        }
    }

    pub fn read16(&self, pair: Reg16) -> u16 {
        match pair {
            Reg16::AF => self.af,
            Reg16::BC => self.bc,
            Reg16::DE => self.de,
            Reg16::HL => self.hl,
            Reg16::SP => self.sp,
            Reg16::PC => self.pc,
        }
    }

    pub fn write16(&mut self, pair: Reg16, val: u16) {
        match pair {
            Reg16::AF => self.af = val & (0xFF00 | FLAG_MASK as u16),
            Reg16::BC => self.bc = val,
            Reg16::DE => self.de = val,
            Reg16::HL => self.hl = val,
            Reg16::SP => self.sp = val,
            Reg16::PC => self.pc = val,
        }
    }

    #[inline]
    pub fn a(&self) -> u8 {
        high(self.af)
    }

    #[inline]
    pub fn set_a(&mut self, val: u8) {
        self.af = with_high(self.af, val);
    }

    #[inline]
    pub fn f(&self) -> u8 {
        low(self.af)
    }

    #[inline]
    pub fn set_f(&mut self, val: u8) {
        self.af = with_low(self.af, val & FLAG_MASK);
    }

    #[inline]
    pub fn hl(&self) -> u16 {
        self.hl
    }

    #[inline]
    pub fn set_hl(&mut self, val: u16) {
        self.hl = val;
    }

    #[inline]
    pub fn flag(&self, which: Flag) -> bool {
        self.f() & which.mask() != 0
    }

    /// Sets `which` when `on` is true and clears it otherwise.
    ///
    /// Branch-free: `on` is widened to an all-ones or all-zeros mask.
    #[inline]
    pub fn assign_flag(&mut self, which: Flag, on: bool) {
        let mask = which.mask() as u16;
        let fill = (on as u16).wrapping_neg();
        self.af = (self.af & !mask) | (fill & mask);
    }

    #[inline]
    pub fn set_flag(&mut self, which: Flag) {
        self.af |= which.mask() as u16;
    }

    #[inline]
    pub fn clear_flag(&mut self, which: Flag) {
        self.af &= !(which.mask() as u16);
    }

    #[inline]
    pub fn clear_all_flags(&mut self) {
        self.af &= 0xFF00;
    }

    /// Carry flag as a 0/1 operand for ADC/SBC/RL/RR.
    #[inline]
    pub fn carry_bit(&self) -> u8 {
        (self.f() & FLAG_C) >> 4
    }
}

impl fmt::Display for Registers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AF:{:04X} BC:{:04X} DE:{:04X} HL:{:04X} SP:{:04X} PC:{:04X}",
            self.af, self.bc, self.de, self.hl, self.sp, self.pc
        )
    }
}
