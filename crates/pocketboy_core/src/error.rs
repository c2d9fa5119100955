use thiserror::Error;

/// An opcode byte that has no entry in the decode tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("invalid {} opcode 0x{opcode:02X}", table_name(.prefixed))]
pub struct DecodeError {
    pub opcode: u8,
    pub prefixed: bool,
}

fn table_name(prefixed: &bool) -> &'static str {
    if *prefixed {
        "prefixed"
    } else {
        "non-prefixed"
    }
}

/// Fatal conditions raised while stepping the CPU.
///
/// Both variants leave the register file exactly as it was before the
/// failing fetch, so callers can dump state for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("{source} at PC=0x{pc:04X}")]
    Decode {
        #[source]
        source: DecodeError,
        pc: u16,
    },
    /// A decoded instruction that the configured executor does not carry.
    #[error("encountered unimplemented instruction {instruction} at PC=0x{pc:04X}")]
    Unimplemented { instruction: String, pc: u16 },
}

impl CpuError {
    /// Address of the instruction that failed.
    pub fn pc(&self) -> u16 {
        match self {
            CpuError::Decode { pc, .. } | CpuError::Unimplemented { pc, .. } => *pc,
        }
    }
}
