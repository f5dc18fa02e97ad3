//! Solana message compilation, signing and wire format.
//!
//! Instructions are compiled into a deterministic account table and a
//! [`Message`] (legacy) or [`MessageV0`] (with address lookup tables), then
//! wrapped in a [`Transaction`] / [`VersionedTransaction`] and signed with any
//! mix of keypairs, presigned signatures and null signers. Every structure
//! encodes to the network's exact byte layout by hand; nothing here talks to
//! a node.

mod compiled_keys;
pub mod error;
pub mod instruction;
pub mod message;
pub mod nonce;
pub mod system_instruction;
pub mod transaction;

// Re-export key public types for ergonomic imports.
pub use compiled_keys::MAX_ACCOUNT_KEYS;
pub use error::{CompileError, SanitizeError, TransactionError};
pub use instruction::{AccountMeta, CompiledInstruction, Instruction};
pub use message::{
    hash_raw_message, AddressLookupTableAccount, LoadedAddresses, Message,
    MessageAddressTableLookup, MessageHeader, MessageV0, VersionedMessage, MESSAGE_HASH_DOMAIN,
    MESSAGE_HEADER_LENGTH, MESSAGE_VERSION_PREFIX, PACKET_DATA_SIZE,
};
pub use nonce::{get_nonce_pubkey_from_instruction, uses_durable_nonce};
pub use system_instruction::SYSTEM_PROGRAM_ID;
pub use transaction::{Transaction, TransactionVersion, VersionedTransaction};
