//! Result and flag computation shared by the main and CB-prefixed decoders.
//!
//! Every helper writes flags through [`Registers::assign_flag`], so the low
//! nibble of F can never pick up stray bits.

use crate::registers::{Flag, Registers};

/// Accumulator operation selected by bits 3-5 of the ALU opcodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
}

impl AluOp {
    pub const TABLE: [AluOp; 8] = [
        AluOp::Add,
        AluOp::Adc,
        AluOp::Sub,
        AluOp::Sbc,
        AluOp::And,
        AluOp::Xor,
        AluOp::Or,
        AluOp::Cp,
    ];

    #[inline]
    pub fn from_index(index: u8) -> Self {
        Self::TABLE[(index & 0x07) as usize]
    }
}

/// Rotate/shift flavour selected by bits 3-5 of CB opcodes 0x00-0x3F.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotOp {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Swap,
    Srl,
}

impl RotOp {
    pub const TABLE: [RotOp; 8] = [
        RotOp::Rlc,
        RotOp::Rrc,
        RotOp::Rl,
        RotOp::Rr,
        RotOp::Sla,
        RotOp::Sra,
        RotOp::Swap,
        RotOp::Srl,
    ];

    #[inline]
    pub fn from_index(index: u8) -> Self {
        Self::TABLE[(index & 0x07) as usize]
    }
}

/// Applies `op` to A and `operand`. CP leaves A untouched.
pub fn accumulate(regs: &mut Registers, op: AluOp, operand: u8) {
    let a = regs.a();
    let result = match op {
        AluOp::Add => add8(regs, a, operand, 0),
        AluOp::Adc => {
            let carry = regs.carry_bit();
            add8(regs, a, operand, carry)
        }
        AluOp::Sub => sub8(regs, a, operand, 0),
        AluOp::Sbc => {
            let carry = regs.carry_bit();
            sub8(regs, a, operand, carry)
        }
        AluOp::And => logic8(regs, a & operand, true),
        AluOp::Xor => logic8(regs, a ^ operand, false),
        AluOp::Or => logic8(regs, a | operand, false),
        AluOp::Cp => {
            sub8(regs, a, operand, 0);
            return;
        }
    };
    regs.set_a(result);
}

pub fn add8(regs: &mut Registers, a: u8, operand: u8, carry: u8) -> u8 {
    let wide = a as u16 + operand as u16 + carry as u16;
    let result = wide as u8;
    regs.assign_flag(Flag::Z, result == 0);
    regs.assign_flag(Flag::N, false);
    regs.assign_flag(Flag::H, (a & 0x0F) + (operand & 0x0F) + carry > 0x0F);
    regs.assign_flag(Flag::C, wide > 0xFF);
    result
}

/// Borrow flags compare the subtrahend against the minuend rather than
/// inspecting the wrapped difference.
pub fn sub8(regs: &mut Registers, a: u8, operand: u8, carry: u8) -> u8 {
    let result = a.wrapping_sub(operand).wrapping_sub(carry);
    regs.assign_flag(Flag::Z, result == 0);
    regs.assign_flag(Flag::N, true);
    regs.assign_flag(Flag::H, (operand & 0x0F) + carry > (a & 0x0F));
    regs.assign_flag(Flag::C, operand as u16 + carry as u16 > a as u16);
    result
}

fn logic8(regs: &mut Registers, result: u8, half: bool) -> u8 {
    regs.assign_flag(Flag::Z, result == 0);
    regs.assign_flag(Flag::N, false);
    regs.assign_flag(Flag::H, half);
    regs.assign_flag(Flag::C, false);
    result
}

/// 8-bit increment; carry is preserved.
pub fn inc8(regs: &mut Registers, val: u8) -> u8 {
    let result = val.wrapping_add(1);
    regs.assign_flag(Flag::Z, result == 0);
    regs.assign_flag(Flag::N, false);
    regs.assign_flag(Flag::H, val & 0x0F == 0x0F);
    result
}

/// 8-bit decrement; carry is preserved.
pub fn dec8(regs: &mut Registers, val: u8) -> u8 {
    let result = val.wrapping_sub(1);
    regs.assign_flag(Flag::Z, result == 0);
    regs.assign_flag(Flag::N, true);
    regs.assign_flag(Flag::H, val & 0x0F == 0);
    result
}

/// ADD HL,rr. Z is preserved; H is set when the low bytes sum past 0xFF.
pub fn add16_hl(regs: &mut Registers, val: u16) {
    let hl = regs.hl();
    let wide = hl as u32 + val as u32;
    regs.assign_flag(Flag::N, false);
    regs.assign_flag(Flag::H, (hl & 0x00FF) + (val & 0x00FF) > 0x00FF);
    regs.assign_flag(Flag::C, wide > 0xFFFF);
    regs.set_hl(wide as u16);
}

/// SP plus a signed immediate, shared by ADD SP,e8 and LD HL,SP+e8.
///
/// H and C come from unsigned addition of the low byte of SP and the raw
/// offset byte; Z and N are always cleared.
pub fn add_sp_i8(regs: &mut Registers, sp: u16, offset: i8) -> u16 {
    let off = offset as i16 as u16;
    regs.assign_flag(Flag::Z, false);
    regs.assign_flag(Flag::N, false);
    regs.assign_flag(Flag::H, (sp & 0x000F) + (off & 0x000F) > 0x000F);
    regs.assign_flag(Flag::C, (sp & 0x00FF) + (off & 0x00FF) > 0x00FF);
    sp.wrapping_add(off)
}

/// Decimal-adjusts A after a BCD add or subtract. N is preserved.
pub fn daa(regs: &mut Registers) {
    let mut a = regs.a();
    let mut carry = regs.flag(Flag::C);
    if regs.flag(Flag::N) {
        if carry {
            a = a.wrapping_sub(0x60);
        }
        if regs.flag(Flag::H) {
            a = a.wrapping_sub(0x06);
        }
    } else {
        if carry || a > 0x99 {
            a = a.wrapping_add(0x60);
            carry = true;
        }
        if regs.flag(Flag::H) || a & 0x0F > 0x09 {
            a = a.wrapping_add(0x06);
        }
    }
    regs.assign_flag(Flag::Z, a == 0);
    regs.assign_flag(Flag::H, false);
    regs.assign_flag(Flag::C, carry);
    regs.set_a(a);
}

pub fn cpl(regs: &mut Registers) {
    regs.set_a(!regs.a());
    regs.set_flag(Flag::N);
    regs.set_flag(Flag::H);
}

pub fn scf(regs: &mut Registers) {
    regs.clear_flag(Flag::N);
    regs.clear_flag(Flag::H);
    regs.set_flag(Flag::C);
}

pub fn ccf(regs: &mut Registers) {
    let carry = regs.flag(Flag::C);
    regs.clear_flag(Flag::N);
    regs.clear_flag(Flag::H);
    regs.assign_flag(Flag::C, !carry);
}

/// Rotates or shifts `val`, updating all four flags.
pub fn rotate(regs: &mut Registers, op: RotOp, val: u8) -> u8 {
    let carry_in = regs.carry_bit();
    let (result, carry_out) = match op {
        RotOp::Rlc => (val.rotate_left(1), val & 0x80 != 0),
        RotOp::Rrc => (val.rotate_right(1), val & 0x01 != 0),
        RotOp::Rl => ((val << 1) | carry_in, val & 0x80 != 0),
        RotOp::Rr => ((val >> 1) | (carry_in << 7), val & 0x01 != 0),
        RotOp::Sla => (val << 1, val & 0x80 != 0),
        RotOp::Sra => ((val >> 1) | (val & 0x80), val & 0x01 != 0),
        RotOp::Swap => (val.rotate_left(4), false),
        RotOp::Srl => (val >> 1, val & 0x01 != 0),
    };
    regs.assign_flag(Flag::Z, result == 0);
    regs.assign_flag(Flag::N, false);
    regs.assign_flag(Flag::H, false);
    regs.assign_flag(Flag::C, carry_out);
    result
}

/// BIT n: tests without writing back; carry is preserved.
pub fn bit(regs: &mut Registers, index: u8, val: u8) {
    regs.assign_flag(Flag::Z, val & (1 << (index & 0x07)) == 0);
    regs.assign_flag(Flag::N, false);
    regs.assign_flag(Flag::H, true);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::{FLAG_C, FLAG_H, FLAG_N, FLAG_Z};

    fn regs_with(a: u8, f: u8) -> Registers {
        let mut regs = Registers::new();
        regs.set_a(a);
        regs.set_f(f);
        regs
    }

    #[test]
    fn add_half_carry() {
        let mut regs = regs_with(0x0F, 0);
        accumulate(&mut regs, AluOp::Add, 0x01);
        assert_eq!(regs.a(), 0x10);
        assert_eq!(regs.f(), FLAG_H);
    }

    #[test]
    fn add_overflow_sets_zero_and_carry() {
        let mut regs = regs_with(0xFF, 0);
        accumulate(&mut regs, AluOp::Add, 0x01);
        assert_eq!(regs.a(), 0x00);
        assert_eq!(regs.f(), FLAG_Z | FLAG_H | FLAG_C);
    }

    #[test]
    fn adc_includes_carry() {
        let mut regs = regs_with(0x0E, FLAG_C);
        accumulate(&mut regs, AluOp::Adc, 0x01);
        assert_eq!(regs.a(), 0x10);
        assert_eq!(regs.f(), FLAG_H);
    }

    #[test]
    fn sub_borrow() {
        let mut regs = regs_with(0x10, 0);
        accumulate(&mut regs, AluOp::Sub, 0x01);
        assert_eq!(regs.a(), 0x0F);
        assert_eq!(regs.f(), FLAG_N | FLAG_H);

        let mut regs = regs_with(0x01, 0);
        accumulate(&mut regs, AluOp::Sub, 0x02);
        assert_eq!(regs.a(), 0xFF);
        assert_eq!(regs.f(), FLAG_N | FLAG_H | FLAG_C);
    }

    #[test]
    fn sbc_with_carry_in_reaching_zero() {
        let mut regs = regs_with(0x10, FLAG_C);
        accumulate(&mut regs, AluOp::Sbc, 0x0F);
        assert_eq!(regs.a(), 0x00);
        assert_eq!(regs.f(), FLAG_Z | FLAG_N | FLAG_H);

        let mut regs = regs_with(0x00, FLAG_C);
        accumulate(&mut regs, AluOp::Sbc, 0xFF);
        assert_eq!(regs.a(), 0x00);
        assert_eq!(regs.f(), FLAG_Z | FLAG_N | FLAG_H | FLAG_C);
    }

    #[test]
    fn cp_leaves_accumulator() {
        let mut regs = regs_with(0x42, 0);
        accumulate(&mut regs, AluOp::Cp, 0x42);
        assert_eq!(regs.a(), 0x42);
        assert_eq!(regs.f(), FLAG_Z | FLAG_N);
    }

    #[test]
    fn logic_flags() {
        let mut regs = regs_with(0xF0, FLAG_C | FLAG_N);
        accumulate(&mut regs, AluOp::And, 0x0F);
        assert_eq!(regs.a(), 0);
        assert_eq!(regs.f(), FLAG_Z | FLAG_H);

        let mut regs = regs_with(0xF0, FLAG_C | FLAG_H);
        accumulate(&mut regs, AluOp::Or, 0x0F);
        assert_eq!(regs.a(), 0xFF);
        assert_eq!(regs.f(), 0);

        let mut regs = regs_with(0x5A, FLAG_C);
        accumulate(&mut regs, AluOp::Xor, 0x5A);
        assert_eq!(regs.a(), 0);
        assert_eq!(regs.f(), FLAG_Z);
    }

    #[test]
    fn inc_dec_preserve_carry() {
        let mut regs = regs_with(0, FLAG_C);
        assert_eq!(inc8(&mut regs, 0xFF), 0x00);
        assert_eq!(regs.f(), FLAG_Z | FLAG_H | FLAG_C);

        let mut regs = regs_with(0, 0);
        assert_eq!(dec8(&mut regs, 0x10), 0x0F);
        assert_eq!(regs.f(), FLAG_N | FLAG_H);
        assert_eq!(dec8(&mut regs, 0x01), 0x00);
        assert_eq!(regs.f(), FLAG_Z | FLAG_N);
    }

    #[test]
    fn add_hl_keeps_zero() {
        let mut regs = regs_with(0, FLAG_Z | FLAG_N);
        regs.set_hl(0x0FFF);
        add16_hl(&mut regs, 0x0001);
        assert_eq!(regs.hl(), 0x1000);
        assert_eq!(regs.f(), FLAG_Z | FLAG_H);

        regs.set_hl(0xFFFF);
        add16_hl(&mut regs, 0x0001);
        assert_eq!(regs.hl(), 0x0000);
        assert_eq!(regs.f(), FLAG_Z | FLAG_H | FLAG_C);
    }

    #[test]
    fn add_hl_half_carry_from_low_byte() {
        let mut regs = regs_with(0, 0);
        regs.set_hl(0x00FF);
        add16_hl(&mut regs, 0x0001);
        assert_eq!(regs.hl(), 0x0100);
        assert_eq!(regs.f(), FLAG_H);

        regs.set_hl(0x0F00);
        add16_hl(&mut regs, 0x0100);
        assert_eq!(regs.hl(), 0x1000);
        assert_eq!(regs.f(), 0);
    }

    #[test]
    fn add_sp_uses_low_byte() {
        let mut regs = regs_with(0, FLAG_Z | FLAG_N);
        assert_eq!(add_sp_i8(&mut regs, 0x00FF, 1), 0x0100);
        assert_eq!(regs.f(), FLAG_H | FLAG_C);

        assert_eq!(add_sp_i8(&mut regs, 0x1000, -1), 0x0FFF);
        assert_eq!(regs.f(), 0);

        assert_eq!(add_sp_i8(&mut regs, 0x0001, -1), 0x0000);
        assert_eq!(regs.f(), FLAG_H | FLAG_C);
    }

    #[test]
    fn daa_vectors() {
        // 0x09 + 0x06 left A at 0x0F without H.
        let mut regs = regs_with(0x0F, 0);
        daa(&mut regs);
        assert_eq!(regs.a(), 0x15);

        let mut regs = regs_with(0x0F, FLAG_H);
        daa(&mut regs);
        assert_eq!(regs.a(), 0x15);
        assert!(!regs.flag(Flag::H));

        // 0x99 + 0x01 = 0x9A -> 0x00 with carry.
        let mut regs = regs_with(0x9A, 0);
        daa(&mut regs);
        assert_eq!(regs.a(), 0x00);
        assert_eq!(regs.f(), FLAG_Z | FLAG_C);

        // 0x10 - 0x01 = 0x0F (H) -> 0x09.
        let mut regs = regs_with(0x0F, FLAG_N | FLAG_H);
        daa(&mut regs);
        assert_eq!(regs.a(), 0x09);
        assert_eq!(regs.f(), FLAG_N);
    }

    #[test]
    fn rotations() {
        let mut regs = regs_with(0, 0);
        assert_eq!(rotate(&mut regs, RotOp::Rlc, 0x85), 0x0B);
        assert_eq!(regs.f(), FLAG_C);

        assert_eq!(rotate(&mut regs, RotOp::Rl, 0x00), 0x01);
        assert_eq!(regs.f(), 0);

        assert_eq!(rotate(&mut regs, RotOp::Rr, 0x01), 0x00);
        assert_eq!(regs.f(), FLAG_Z | FLAG_C);

        assert_eq!(rotate(&mut regs, RotOp::Sra, 0x81), 0xC0);
        assert_eq!(regs.f(), FLAG_C);

        assert_eq!(rotate(&mut regs, RotOp::Swap, 0xF1), 0x1F);
        assert_eq!(regs.f(), 0);

        assert_eq!(rotate(&mut regs, RotOp::Srl, 0x01), 0x00);
        assert_eq!(regs.f(), FLAG_Z | FLAG_C);
    }
}
