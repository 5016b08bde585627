//! Sharp SM83 (Game Boy CPU) instruction core.
//!
//! This crate contains the platform-agnostic part of the emulator: the flat
//! 64 KiB memory map, the register file, and the fetch/decode/execute engine.
//! Frontends drive it through [`gameboy::GameBoy`] or by calling
//! [`cpu::Cpu::step`] against their own [`memory_map::MemoryMap`].

/// Flag and result computation for arithmetic, logic and shift opcodes.
pub mod alu;

/// Cartridge header parsing and ROM loading.
pub mod cartridge;

/// Fetch/decode/execute engine.
pub mod cpu;

/// Opcode bit fields and operand tables.
pub mod decode;

/// Instruction disassembly for traces and diagnostics.
pub mod disasm;

/// Error types.
pub mod error;

/// High-level facade pairing a CPU with its memory map.
pub mod gameboy;

/// Hardware revisions.
pub mod hardware;

/// Address-space layout and storage.
pub mod memory_map;

/// CPU registers and flag bits.
pub mod registers;

mod cb;
