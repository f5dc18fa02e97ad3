//! 64-byte Ed25519 signatures.
//!
//! The all-zero value is the "unsigned" placeholder written into every slot
//! of a fresh transaction.

use std::fmt;
use std::str::FromStr;

use ed25519_dalek::VerifyingKey;

use crate::base58;
use crate::error::{DecodeError, ParseError};
use crate::pubkey::Pubkey;
use crate::random::unique_bytes;
use crate::wire::{Wire, WireReader};

/// Number of bytes in a signature.
pub const SIGNATURE_BYTES: usize = 64;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Signature([u8; SIGNATURE_BYTES]);

impl Default for Signature {
    fn default() -> Self {
        Self([0u8; SIGNATURE_BYTES])
    }
}

impl Signature {
    pub const fn from_array(bytes: [u8; SIGNATURE_BYTES]) -> Self {
        Self(bytes)
    }

    /// A random (and therefore invalid) signature, for tests and placeholders.
    pub fn new_unique() -> Self {
        Self(unique_bytes())
    }

    pub const fn to_bytes(self) -> [u8; SIGNATURE_BYTES] {
        self.0
    }

    /// True for the all-zero placeholder.
    pub fn is_default(&self) -> bool {
        self.0 == [0u8; SIGNATURE_BYTES]
    }

    /// Strict Ed25519 verification of `message` against `pubkey_bytes`.
    ///
    /// Returns `false` for keys that are not valid curve points.
    pub fn verify(&self, pubkey_bytes: &[u8], message: &[u8]) -> bool {
        let Ok(key_bytes) = <[u8; 32]>::try_from(pubkey_bytes) else {
            return false;
        };
        let Ok(verifying_key) = VerifyingKey::from_bytes(&key_bytes) else {
            return false;
        };
        let signature = ed25519_dalek::Signature::from_bytes(&self.0);
        verifying_key.verify_strict(message, &signature).is_ok()
    }

    /// [`Signature::verify`] against a typed key.
    pub fn verify_pubkey(&self, pubkey: &Pubkey, message: &[u8]) -> bool {
        self.verify(pubkey.as_ref(), message)
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; SIGNATURE_BYTES]> for Signature {
    fn from(bytes: [u8; SIGNATURE_BYTES]) -> Self {
        Self(bytes)
    }
}

impl From<ed25519_dalek::Signature> for Signature {
    fn from(sig: ed25519_dalek::Signature) -> Self {
        Self(sig.to_bytes())
    }
}

impl TryFrom<&[u8]> for Signature {
    type Error = ParseError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        <[u8; SIGNATURE_BYTES]>::try_from(bytes)
            .map(Self)
            .map_err(|_| ParseError::WrongSize { kind: "signature" })
    }
}

impl FromStr for Signature {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        base58::decode_fixed(s, "signature").map(Self)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&base58::encode(&self.0))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&base58::encode(&self.0))
    }
}

base58::impl_base58_serde!(Signature);

impl Wire for Signature {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.0);
    }

    fn decode(reader: &mut WireReader<'_>) -> Result<Self, DecodeError> {
        reader.read_array().map(Self)
    }
}
