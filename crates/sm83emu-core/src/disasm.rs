//! Text rendering of SM83 instructions for traces and diagnostics.

use crate::alu::{AluOp, RotOp};
use crate::decode::{self, CB_PREFIX, CC, Fields, R, RP, RP2, operand_name, pair_name};

fn alu_name(op: AluOp) -> &'static str {
    match op {
        AluOp::Add => "ADD A,",
        AluOp::Adc => "ADC A,",
        AluOp::Sub => "SUB ",
        AluOp::Sbc => "SBC A,",
        AluOp::And => "AND ",
        AluOp::Xor => "XOR ",
        AluOp::Or => "OR ",
        AluOp::Cp => "CP ",
    }
}

fn rot_name(op: RotOp) -> &'static str {
    match op {
        RotOp::Rlc => "RLC",
        RotOp::Rrc => "RRC",
        RotOp::Rl => "RL",
        RotOp::Rr => "RR",
        RotOp::Sla => "SLA",
        RotOp::Sra => "SRA",
        RotOp::Swap => "SWAP",
        RotOp::Srl => "SRL",
    }
}

/// Mnemonic family of a single opcode byte, without operands.
pub fn mnemonic(opcode: u8) -> &'static str {
    if decode::is_illegal(opcode) {
        return "ILLEGAL";
    }
    match opcode {
        0x00 => "NOP",
        0x10 => "STOP",
        0x76 => "HALT",
        0xCB => "PREFIX CB",
        0xD9 => "RETI",
        0xF3 => "DI",
        0xFB => "EI",
        0x07 => "RLCA",
        0x0F => "RRCA",
        0x17 => "RLA",
        0x1F => "RRA",
        0x27 => "DAA",
        0x2F => "CPL",
        0x37 => "SCF",
        0x3F => "CCF",
        0x18 | 0x20 | 0x28 | 0x30 | 0x38 => "JR",
        0xC3 | 0xC2 | 0xCA | 0xD2 | 0xDA | 0xE9 => "JP",
        0xCD | 0xC4 | 0xCC | 0xD4 | 0xDC => "CALL",
        0xC9 | 0xC0 | 0xC8 | 0xD0 | 0xD8 => "RET",
        0xE8 | 0x09 | 0x19 | 0x29 | 0x39 => "ADD",
        _ => {
            let f = Fields::split(opcode);
            match (f.x, f.z) {
                (0, 3) | (0, 4) if f.z == 4 || f.q == 0 => "INC",
                (0, 3) | (0, 5) => "DEC",
                (2, _) | (3, 6) => match AluOp::from_index(f.y) {
                    AluOp::Add => "ADD",
                    AluOp::Adc => "ADC",
                    AluOp::Sub => "SUB",
                    AluOp::Sbc => "SBC",
                    AluOp::And => "AND",
                    AluOp::Xor => "XOR",
                    AluOp::Or => "OR",
                    AluOp::Cp => "CP",
                },
                (3, 1) if f.q == 0 => "POP",
                (3, 5) => "PUSH",
                (3, 7) => "RST",
                (3, 0) if f.y == 4 || f.y == 6 => "LDH",
                (3, 2) if f.y == 4 || f.y == 6 => "LDH",
                _ => "LD",
            }
        }
    }
}

/// Decodes the instruction at the start of `bytes`, returning its text and
/// length. `addr` is where the instruction lives, for relative jump targets.
/// Missing trailing bytes read as zero.
pub fn disassemble(bytes: &[u8], addr: u16) -> (String, u16) {
    let byte = |i: usize| bytes.get(i).copied().unwrap_or(0);
    let op = byte(0);
    let n8 = byte(1);
    let n16 = u16::from_le_bytes([byte(1), byte(2)]);

    if op == CB_PREFIX {
        return (disassemble_cb(n8), 2);
    }
    if decode::is_illegal(op) {
        return (format!("DB ${op:02X}"), 1);
    }

    let Fields { x, y, z, p, q } = Fields::split(op);
    let r = |i: u8| operand_name(R[i as usize]);
    let rp = |i: u8| pair_name(RP[i as usize]);
    let cc = |i: u8| CC[i as usize].name();
    let rel = || addr.wrapping_add(2).wrapping_add(n8 as i8 as u16);

    match (x, z) {
        (0, 0) => match y {
            0 => ("NOP".into(), 1),
            1 => (format!("LD (${n16:04X}),SP"), 3),
            2 => ("STOP".into(), 2),
            3 => (format!("JR ${:04X}", rel()), 2),
            _ => (format!("JR {},${:04X}", cc(y - 4), rel()), 2),
        },
        (0, 1) if q == 0 => (format!("LD {},${n16:04X}", rp(p)), 3),
        (0, 1) => (format!("ADD HL,{}", rp(p)), 1),
        (0, 2) => {
            let target = ["(BC)", "(DE)", "(HL+)", "(HL-)"][p as usize];
            if q == 0 {
                (format!("LD {target},A"), 1)
            } else {
                (format!("LD A,{target}"), 1)
            }
        }
        (0, 3) => (
            format!("{} {}", if q == 0 { "INC" } else { "DEC" }, rp(p)),
            1,
        ),
        (0, 4) => (format!("INC {}", r(y)), 1),
        (0, 5) => (format!("DEC {}", r(y)), 1),
        (0, 6) => (format!("LD {},${n8:02X}", r(y)), 2),
        (0, _) => (mnemonic(op).into(), 1),
        (1, _) if op == 0x76 => ("HALT".into(), 1),
        (1, _) => (format!("LD {},{}", r(y), r(z)), 1),
        (2, _) => (format!("{}{}", alu_name(AluOp::from_index(y)), r(z)), 1),
        (_, 0) => match y {
            0..=3 => (format!("RET {}", cc(y)), 1),
            4 => (format!("LDH ($FF{n8:02X}),A"), 2),
            5 => (format!("ADD SP,{}", n8 as i8), 2),
            6 => (format!("LDH A,($FF{n8:02X})"), 2),
            _ => (format!("LD HL,SP{:+}", n8 as i8), 2),
        },
        (_, 1) if q == 0 => (format!("POP {}", pair_name(RP2[p as usize])), 1),
        (_, 1) => match p {
            0 => ("RET".into(), 1),
            1 => ("RETI".into(), 1),
            2 => ("JP HL".into(), 1),
            _ => ("LD SP,HL".into(), 1),
        },
        (_, 2) => match y {
            0..=3 => (format!("JP {},${n16:04X}", cc(y)), 3),
            4 => ("LD ($FF00+C),A".into(), 1),
            5 => (format!("LD (${n16:04X}),A"), 3),
            6 => ("LD A,($FF00+C)".into(), 1),
            _ => (format!("LD A,(${n16:04X})"), 3),
        },
        (_, 3) if y == 0 => (format!("JP ${n16:04X}"), 3),
        (_, 4) => (format!("CALL {},${n16:04X}", cc(y)), 3),
        (_, 5) if q == 0 => (format!("PUSH {}", pair_name(RP2[p as usize])), 1),
        (_, 5) => (format!("CALL ${n16:04X}"), 3),
        (_, 6) => (format!("{}${n8:02X}", alu_name(AluOp::from_index(y))), 2),
        (_, 7) => (format!("RST ${:02X}", y * 8), 1),
        _ => (mnemonic(op).into(), 1),
    }
}

fn disassemble_cb(op: u8) -> String {
    let Fields { x, y, z, .. } = Fields::split(op);
    let target = operand_name(R[z as usize]);
    match x {
        0 => format!("{} {target}", rot_name(RotOp::from_index(y))),
        1 => format!("BIT {y},{target}"),
        2 => format!("RES {y},{target}"),
        _ => format!("SET {y},{target}"),
    }
}

/// Hex dump of `len` bytes starting at `addr`, e.g. `"CB 7C"`.
pub fn format_bytes(mem: &[u8], addr: u16, len: u16) -> String {
    (0..len)
        .map(|i| {
            let b = mem.get(addr as usize + i as usize).copied().unwrap_or(0);
            format!("{b:02X}")
        })
        .collect::<Vec<_>>()
        .join(" ")
}
