//! Leaf types for building Solana transactions.
//!
//! Addresses, hashes, signatures, keypairs and the signer sum type, plus the
//! compact-length codec and byte reader every wire structure is built from.
//! Ed25519 comes from `ed25519-dalek`, the curve check from
//! `curve25519-dalek`, and base58 from `bs58`.

mod base58;
pub mod error;
pub mod hash;
pub mod keypair;
pub mod pda;
pub mod pubkey;
mod random;
pub mod short_vec;
pub mod signature;
pub mod signer;
pub mod wire;

// Re-export key public types for ergonomic imports.
pub use error::{DecodeError, ParseError, PresignerError, PubkeyError, SignerError};
pub use hash::{hash, hashv, Hash, HASH_BYTES};
pub use keypair::Keypair;
pub use pda::{MAX_SEEDS, MAX_SEED_LEN, PDA_MARKER};
pub use pubkey::{Pubkey, PUBKEY_BYTES};
pub use signature::{Signature, SIGNATURE_BYTES};
pub use signer::{NullSigner, Presigner, Signer};
pub use wire::{Wire, WireReader};
