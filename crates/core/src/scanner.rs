//! Module implementing the linear selfdestruct / delegatecall scan over deployed bytecode.
//!
//! The scan walks the byte sequence once, left to right, skipping `PUSH` immediates and
//! tracking whether the current position follows a halting instruction. Code after a halt is
//! considered dead until the next `JUMPDEST`; a `SELFDESTRUCT` or `DELEGATECALL` in dead code is
//! not reported. This is a conservative heuristic and not a control-flow reachability proof:
//! dynamic jumps into what looks like push data are not modelled.
//!
//! # Usage
//! ```
//! use govscan_core::scanner::{BytecodeVerdict, classify_bytecode};
//!
//! // PUSH1 0xff, STOP: the 0xff is push data, not an instruction
//! assert_eq!(classify_bytecode(&[0x60, 0xff, 0x00]), BytecodeVerdict::Safe);
//! assert_eq!(classify_bytecode(&[0xff]), BytecodeVerdict::SelfDestruct);
//! assert_eq!(classify_bytecode(&[0xf4, 0x00]), BytecodeVerdict::DelegateCall);
//! ```
use crate::opcode::Opcode;
use serde::{Deserialize, Serialize};
use std::fmt;
use tiny_keccak::{Hasher, Keccak};

/// Outcome of scanning a non-empty piece of bytecode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BytecodeVerdict {
    /// No reachable `SELFDESTRUCT` and no reachable `DELEGATECALL`.
    Safe,
    /// No reachable `SELFDESTRUCT`, but at least one reachable `DELEGATECALL`.
    DelegateCall,
    /// A reachable `SELFDESTRUCT`.
    SelfDestruct,
}

impl fmt::Display for BytecodeVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BytecodeVerdict::Safe => write!(f, "safe"),
            BytecodeVerdict::DelegateCall => write!(f, "delegatecall"),
            BytecodeVerdict::SelfDestruct => write!(f, "selfdestruct"),
        }
    }
}

/// Detailed result of a single scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    pub verdict: BytecodeVerdict,
    /// program counter of the live `SELFDESTRUCT` that stopped the scan
    pub selfdestruct_pc: Option<usize>,
    /// program counters of every live `DELEGATECALL` visited before the scan stopped
    pub delegatecall_pcs: Vec<usize>,
    /// number of instructions visited (push immediates are not counted)
    pub instructions_scanned: usize,
    /// the last `PUSH` announced more immediate bytes than the code contains
    pub truncated_push: bool,
    /// length of the scanned code in bytes
    pub code_len: usize,
}

/// Classifies bytecode as safe, delegatecall-capable or selfdestruct-capable.
///
/// Total over any input; an empty slice is `Safe`.
pub fn classify_bytecode(code: &[u8]) -> BytecodeVerdict {
    scan_bytecode(code).verdict
}

/// Runs the linear scan and returns the verdict together with the positions that produced it.
pub fn scan_bytecode(code: &[u8]) -> ScanReport {
    let mut halted = false;
    let mut delegatecall_pcs = Vec::new();
    let mut instructions_scanned = 0;
    let mut truncated_push = false;

    let mut pc = 0;
    while pc < code.len() {
        let (opcode, imm_size) = Opcode::parse(code[pc]);
        instructions_scanned += 1;

        match opcode {
            Opcode::SELFDESTRUCT if !halted => {
                tracing::debug!("live SELFDESTRUCT at pc {:#06x}", pc);
                return ScanReport {
                    verdict: BytecodeVerdict::SelfDestruct,
                    selfdestruct_pc: Some(pc),
                    delegatecall_pcs,
                    instructions_scanned,
                    truncated_push,
                    code_len: code.len(),
                };
            }
            Opcode::DELEGATECALL if !halted => {
                tracing::trace!("live DELEGATECALL at pc {:#06x}", pc);
                delegatecall_pcs.push(pc);
            }
            Opcode::JUMPDEST => halted = false,
            _ => {}
        }

        if opcode.is_halting() {
            halted = true;
        }

        // Immediates are data; never read them as instructions.
        if imm_size > 0 && pc + imm_size >= code.len() {
            truncated_push = true;
        }
        pc += 1 + imm_size;
    }

    let verdict = if delegatecall_pcs.is_empty() {
        BytecodeVerdict::Safe
    } else {
        BytecodeVerdict::DelegateCall
    };
    tracing::debug!(
        "scanned {} instructions over {} bytes: {}",
        instructions_scanned,
        code.len(),
        verdict
    );

    ScanReport {
        verdict,
        selfdestruct_pc: None,
        delegatecall_pcs,
        instructions_scanned,
        truncated_push,
        code_len: code.len(),
    }
}

/// Computes the Keccak-256 code hash of the given bytecode.
pub fn code_hash(code: &[u8]) -> [u8; 32] {
    let mut keccak = Keccak::v256();
    keccak.update(code);
    let mut hash = [0u8; 32];
    keccak.finalize(&mut hash);
    hash
}
