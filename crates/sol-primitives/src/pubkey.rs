//! 32-byte account and program addresses.
//!
//! A `Pubkey` is printed and parsed as base58. Ordering is by raw bytes, which
//! is the order the account-key compiler uses to break ties.

use std::fmt;
use std::str::FromStr;

use crate::base58;
use crate::error::{DecodeError, ParseError, PubkeyError};
use crate::pda;
use crate::random::unique_bytes;
use crate::wire::{Wire, WireReader};

/// Number of bytes in a public key.
pub const PUBKEY_BYTES: usize = 32;

#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pubkey([u8; PUBKEY_BYTES]);

impl Pubkey {
    pub const fn new_from_array(bytes: [u8; PUBKEY_BYTES]) -> Self {
        Self(bytes)
    }

    /// A random key, for tests and placeholders.
    pub fn new_unique() -> Self {
        Self(unique_bytes())
    }

    pub const fn to_bytes(self) -> [u8; PUBKEY_BYTES] {
        self.0
    }

    pub const fn as_array(&self) -> &[u8; PUBKEY_BYTES] {
        &self.0
    }

    /// Whether the bytes decompress to a point on the Ed25519 curve.
    pub fn is_on_curve(&self) -> bool {
        pda::is_on_curve(&self.0)
    }

    pub fn create_with_seed(
        base: &Pubkey,
        seed: &str,
        owner: &Pubkey,
    ) -> Result<Pubkey, PubkeyError> {
        pda::create_with_seed(base, seed, owner)
    }

    pub fn create_program_address(
        seeds: &[&[u8]],
        program_id: &Pubkey,
    ) -> Result<Pubkey, PubkeyError> {
        pda::create_program_address(seeds, program_id)
    }

    pub fn find_program_address(
        seeds: &[&[u8]],
        program_id: &Pubkey,
    ) -> Result<(Pubkey, u8), PubkeyError> {
        pda::find_program_address(seeds, program_id)
    }

    pub fn try_find_program_address(seeds: &[&[u8]], program_id: &Pubkey) -> Option<(Pubkey, u8)> {
        pda::try_find_program_address(seeds, program_id)
    }
}

impl AsRef<[u8]> for Pubkey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; PUBKEY_BYTES]> for Pubkey {
    fn from(bytes: [u8; PUBKEY_BYTES]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Pubkey {
    type Error = ParseError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        <[u8; PUBKEY_BYTES]>::try_from(bytes)
            .map(Self)
            .map_err(|_| ParseError::WrongSize { kind: "pubkey" })
    }
}

impl FromStr for Pubkey {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        base58::decode_fixed(s, "pubkey").map(Self)
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&base58::encode(&self.0))
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&base58::encode(&self.0))
    }
}

base58::impl_base58_serde!(Pubkey);

impl Wire for Pubkey {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.0);
    }

    fn decode(reader: &mut WireReader<'_>) -> Result<Self, DecodeError> {
        reader.read_array().map(Self)
    }
}
