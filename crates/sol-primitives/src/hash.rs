//! 32-byte SHA-256 hashes, used for recent blockhashes.

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};

use crate::base58;
use crate::error::{DecodeError, ParseError};
use crate::random::unique_bytes;
use crate::wire::{Wire, WireReader};

/// Number of bytes in a hash.
pub const HASH_BYTES: usize = 32;

#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hash([u8; HASH_BYTES]);

impl Hash {
    pub const fn new_from_array(bytes: [u8; HASH_BYTES]) -> Self {
        Self(bytes)
    }

    /// A random hash, for tests and placeholders.
    pub fn new_unique() -> Self {
        Self(unique_bytes())
    }

    pub const fn to_bytes(self) -> [u8; HASH_BYTES] {
        self.0
    }
}

/// SHA-256 of the concatenation of `vals`.
pub fn hashv(vals: &[&[u8]]) -> Hash {
    let mut hasher = Sha256::new();
    for val in vals {
        hasher.update(val);
    }
    Hash(hasher.finalize().into())
}

/// SHA-256 of `val`.
pub fn hash(val: &[u8]) -> Hash {
    hashv(&[val])
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; HASH_BYTES]> for Hash {
    fn from(bytes: [u8; HASH_BYTES]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Hash {
    type Error = ParseError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        <[u8; HASH_BYTES]>::try_from(bytes)
            .map(Self)
            .map_err(|_| ParseError::WrongSize { kind: "hash" })
    }
}

impl FromStr for Hash {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        base58::decode_fixed(s, "hash").map(Self)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&base58::encode(&self.0))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&base58::encode(&self.0))
    }
}

base58::impl_base58_serde!(Hash);

impl Wire for Hash {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.0);
    }

    fn decode(reader: &mut WireReader<'_>) -> Result<Self, DecodeError> {
        reader.read_array().map(Self)
    }
}
