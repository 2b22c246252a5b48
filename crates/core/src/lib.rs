pub mod account;
pub mod decoder;
pub mod opcode;
pub mod scanner;

pub use account::{AccountCategory, AccountFacts, Severity, TrustSet, classify_account};
pub use opcode::Opcode;
pub use revm::primitives::Address;
pub use scanner::{BytecodeVerdict, ScanReport, classify_bytecode, code_hash, scan_bytecode};
