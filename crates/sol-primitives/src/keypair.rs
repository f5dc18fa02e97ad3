//! Ed25519 keypairs.
//!
//! The secret half is held in an `ed25519_dalek::SigningKey`, which zeroizes
//! itself on drop. Seeds copied in from callers are wiped as soon as the
//! signing key has been built.

use std::fmt;

use ed25519_dalek::{Signer as _, SigningKey, KEYPAIR_LENGTH, SECRET_KEY_LENGTH};
use rand::rngs::OsRng;
use zeroize::Zeroize;

use crate::base58;
use crate::error::{ParseError, SignerError};
use crate::pubkey::Pubkey;
use crate::signature::Signature;

#[derive(Clone, PartialEq, Eq)]
pub struct Keypair(SigningKey);

impl Keypair {
    /// Generate a new keypair from OS randomness.
    pub fn new() -> Self {
        Self(SigningKey::generate(&mut OsRng))
    }

    /// Build a keypair from the first 32 bytes of `seed`.
    pub fn from_seed(seed: &[u8]) -> Result<Self, SignerError> {
        if seed.len() < SECRET_KEY_LENGTH {
            return Err(SignerError::InvalidInput("Seed is too short".into()));
        }
        let mut secret = [0u8; SECRET_KEY_LENGTH];
        secret.copy_from_slice(&seed[..SECRET_KEY_LENGTH]);
        let signing_key = SigningKey::from_bytes(&secret);
        secret.zeroize();
        Ok(Self(signing_key))
    }

    /// Parse the 64-byte `secret || public` form, checking that the public
    /// half matches the secret.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignerError> {
        let mut arr: [u8; KEYPAIR_LENGTH] = bytes.try_into().map_err(|_| {
            SignerError::InvalidKeypair(format!(
                "expected {KEYPAIR_LENGTH} bytes, got {}",
                bytes.len()
            ))
        })?;
        let result = SigningKey::from_keypair_bytes(&arr)
            .map(Self)
            .map_err(|e| SignerError::InvalidKeypair(e.to_string()));
        arr.zeroize();
        result
    }

    /// The 64-byte `secret || public` form.
    pub fn to_bytes(&self) -> [u8; KEYPAIR_LENGTH] {
        self.0.to_keypair_bytes()
    }

    pub fn from_base58_string(s: &str) -> Result<Self, ParseError> {
        let mut bytes: [u8; KEYPAIR_LENGTH] = base58::decode_fixed(s, "keypair")?;
        let result = Self::from_bytes(&bytes).map_err(|_| ParseError::Invalid { kind: "keypair" });
        bytes.zeroize();
        result
    }

    pub fn to_base58_string(&self) -> String {
        let mut bytes = self.to_bytes();
        let encoded = base58::encode(&bytes);
        bytes.zeroize();
        encoded
    }

    /// The 32-byte secret seed.
    pub fn secret(&self) -> &[u8; SECRET_KEY_LENGTH] {
        self.0.as_bytes()
    }

    pub fn pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.0.verifying_key().to_bytes())
    }

    pub fn sign_message(&self, message: &[u8]) -> Signature {
        Signature::from(self.0.sign(message))
    }
}

impl Default for Keypair {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({})", self.pubkey())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_seed_is_deterministic() {
        let kp = Keypair::from_seed(&[8u8; 32]).unwrap();
        assert_eq!(
            kp.pubkey().to_string(),
            "2KW2XRd9kwqet15Aha2oK3tYvd3nWbTFH1MBiRAv1BE1"
        );
        assert_eq!(kp, Keypair::from_seed(&[8u8; 32]).unwrap());
    }

    #[test]
    fn from_seed_uses_first_32_bytes() {
        let mut long = [8u8; 40];
        long[35] = 1;
        assert_eq!(
            Keypair::from_seed(&long).unwrap().pubkey(),
            Keypair::from_seed(&[8u8; 32]).unwrap().pubkey()
        );
    }

    #[test]
    fn from_seed_too_short() {
        let err = Keypair::from_seed(&[0u8; 31]).unwrap_err();
        assert_eq!(err, SignerError::InvalidInput("Seed is too short".into()));
    }

    #[test]
    fn bytes_roundtrip() {
        let kp = Keypair::new();
        let bytes = kp.to_bytes();
        assert_eq!(&bytes[..32], kp.secret());
        assert_eq!(&bytes[32..], kp.pubkey().as_ref());
        assert_eq!(Keypair::from_bytes(&bytes).unwrap(), kp);
    }

    #[test]
    fn from_bytes_rejects_mismatched_public_half() {
        let mut bytes = Keypair::new().to_bytes();
        bytes[32..].copy_from_slice(Keypair::new().pubkey().as_ref());
        assert!(matches!(
            Keypair::from_bytes(&bytes),
            Err(SignerError::InvalidKeypair(_))
        ));
    }

    #[test]
    fn from_bytes_rejects_wrong_length() {
        let err = Keypair::from_bytes(&[0u8; 32]).unwrap_err();
        assert_eq!(
            err,
            SignerError::InvalidKeypair("expected 64 bytes, got 32".into())
        );
    }

    #[test]
    fn base58_roundtrip() {
        let kp = Keypair::new();
        let s = kp.to_base58_string();
        assert_eq!(Keypair::from_base58_string(&s).unwrap(), kp);
    }

    #[test]
    fn base58_rejects_garbage() {
        assert_eq!(
            Keypair::from_base58_string("abc").unwrap_err(),
            ParseError::WrongSize { kind: "keypair" }
        );
    }

    #[test]
    fn sign_message_verifies() {
        let kp = Keypair::new();
        let sig = kp.sign_message(b"message");
        assert!(sig.verify_pubkey(&kp.pubkey(), b"message"));
    }

    #[test]
    fn debug_hides_secret() {
        let kp = Keypair::from_seed(&[8u8; 32]).unwrap();
        let debug = format!("{kp:?}");
        assert_eq!(debug, "Keypair(2KW2XRd9kwqet15Aha2oK3tYvd3nWbTFH1MBiRAv1BE1)");
    }

    #[test]
    fn new_keypairs_differ() {
        assert_ne!(Keypair::new().pubkey(), Keypair::new().pubkey());
    }
}
