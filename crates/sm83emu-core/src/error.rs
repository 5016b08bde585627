use thiserror::Error;

/// Reasons the CPU refuses to execute an instruction.
///
/// None of these are recoverable: they indicate a bad ROM or a gap in the
/// core, and the frontend is expected to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExecError {
    /// One of the eleven opcodes the SM83 leaves undefined. Hardware locks up.
    #[error("illegal opcode ${opcode:02X} at PC=${pc:04X}")]
    IllegalOpcode { opcode: u8, pc: u16 },

    /// Opcode routed to the stub handler (HALT, STOP, DI, EI, RETI).
    #[error("unimplemented opcode ${opcode:02X} ({mnemonic}) at PC=${pc:04X}")]
    Unimplemented {
        opcode: u8,
        pc: u16,
        mnemonic: &'static str,
    },
}

impl ExecError {
    pub fn opcode(&self) -> u8 {
        match *self {
            ExecError::IllegalOpcode { opcode, .. } | ExecError::Unimplemented { opcode, .. } => {
                opcode
            }
        }
    }

    /// Address the opcode was fetched from.
    pub fn pc(&self) -> u16 {
        match *self {
            ExecError::IllegalOpcode { pc, .. } | ExecError::Unimplemented { pc, .. } => pc,
        }
    }
}

#[derive(Debug, Error)]
pub enum CartridgeError {
    #[error("failed to read ROM: {0}")]
    Io(#[from] std::io::Error),

    #[error("ROM image is empty")]
    Empty,
}
