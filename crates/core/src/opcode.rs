/// Module defining the subset of EVM opcodes the selfdestruct scanner cares about.
///
/// Only the instructions that influence the scan are named: halting instructions, `JUMPDEST`,
/// the `PUSH1`..`PUSH32` family (whose immediates must be skipped), `DELEGATECALL` and
/// `SELFDESTRUCT`. Every other byte is carried as `Other(u8)`.
use std::fmt;

pub const STOP: u8 = 0x00;
pub const JUMPDEST: u8 = 0x5b;
pub const PUSH1: u8 = 0x60;
pub const PUSH32: u8 = 0x7f;
pub const RETURN: u8 = 0xf3;
pub const DELEGATECALL: u8 = 0xf4;
pub const REVERT: u8 = 0xfd;
pub const INVALID: u8 = 0xfe;
pub const SELFDESTRUCT: u8 = 0xff;

/// Enumeration of the scanner-relevant EVM opcodes.
///
/// `PUSH(n)` carries the number of immediate bytes (1 to 32) that follow the opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    STOP,     // 0x00
    JUMPDEST, // 0x5b
    /// `PUSHn` with `n` immediate bytes; only 1..=32 names a real instruction.
    PUSH(u8),
    // f0x range - calls & termination
    RETURN,       // 0xf3
    DELEGATECALL, // 0xf4
    REVERT,       // 0xfd
    INVALID,      // 0xfe
    SELFDESTRUCT, // 0xff
    // Catch-all for opcodes the scan does not distinguish
    Other(u8),
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opcode::STOP => write!(f, "STOP"),
            Opcode::JUMPDEST => write!(f, "JUMPDEST"),
            Opcode::PUSH(n) => write!(f, "PUSH{n}"),
            Opcode::RETURN => write!(f, "RETURN"),
            Opcode::DELEGATECALL => write!(f, "DELEGATECALL"),
            Opcode::REVERT => write!(f, "REVERT"),
            Opcode::INVALID => write!(f, "INVALID"),
            Opcode::SELFDESTRUCT => write!(f, "SELFDESTRUCT"),
            Opcode::Other(byte) => write!(f, "UNKNOWN{byte:02x}"),
        }
    }
}

impl Opcode {
    /// Parses a raw byte into an `Opcode` and its immediate data size.
    ///
    /// # Returns
    /// A tuple containing the `Opcode` variant and the number of immediate bytes that follow
    /// it in the bytecode (1 for `PUSH1` up to 32 for `PUSH32`, 0 for everything else).
    ///
    /// # Examples
    /// ```
    /// use govscan_core::opcode::Opcode;
    ///
    /// assert_eq!(Opcode::parse(0x60), (Opcode::PUSH(1), 1));
    /// assert_eq!(Opcode::parse(0x7f), (Opcode::PUSH(32), 32));
    /// assert_eq!(Opcode::parse(0xff), (Opcode::SELFDESTRUCT, 0));
    /// ```
    pub const fn parse(byte: u8) -> (Self, usize) {
        match byte {
            STOP => (Opcode::STOP, 0),
            JUMPDEST => (Opcode::JUMPDEST, 0),
            PUSH1..=PUSH32 => {
                let n = byte - PUSH1 + 1;
                (Opcode::PUSH(n), n as usize)
            }
            RETURN => (Opcode::RETURN, 0),
            DELEGATECALL => (Opcode::DELEGATECALL, 0),
            REVERT => (Opcode::REVERT, 0),
            INVALID => (Opcode::INVALID, 0),
            SELFDESTRUCT => (Opcode::SELFDESTRUCT, 0),
            other => (Opcode::Other(other), 0),
        }
    }

    /// Returns `true` for instructions that end execution of the current block.
    ///
    /// Bytes after a halting instruction are dead until the next `JUMPDEST`.
    pub const fn is_halting(&self) -> bool {
        matches!(
            self,
            Opcode::STOP | Opcode::RETURN | Opcode::REVERT | Opcode::INVALID | Opcode::SELFDESTRUCT
        )
    }

    /// Converts the opcode back to its byte representation.
    pub const fn to_byte(&self) -> u8 {
        match self {
            Opcode::STOP => STOP,
            Opcode::JUMPDEST => JUMPDEST,
            // wraps for n outside 1..=32, which `parse` never produces
            Opcode::PUSH(n) => PUSH1.wrapping_add(*n).wrapping_sub(1),
            Opcode::RETURN => RETURN,
            Opcode::DELEGATECALL => DELEGATECALL,
            Opcode::REVERT => REVERT,
            Opcode::INVALID => INVALID,
            Opcode::SELFDESTRUCT => SELFDESTRUCT,
            Opcode::Other(byte) => *byte,
        }
    }
}
