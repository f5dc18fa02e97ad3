//! Anything that can fill a transaction's signature slot.
//!
//! [`Signer`] is a closed set: a full [`Keypair`], a [`Presigner`] carrying a
//! signature produced elsewhere, or a [`NullSigner`] that only reserves the
//! slot with the all-zero placeholder.

use crate::error::{PresignerError, SignerError};
use crate::keypair::Keypair;
use crate::pubkey::Pubkey;
use crate::signature::Signature;

/// A pubkey with a signature computed out of band.
///
/// The signature is only handed out for the exact message it signs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presigner {
    pubkey: Pubkey,
    signature: Signature,
}

impl Presigner {
    pub fn new(pubkey: &Pubkey, signature: &Signature) -> Self {
        Self {
            pubkey: *pubkey,
            signature: *signature,
        }
    }

    pub fn pubkey(&self) -> Pubkey {
        self.pubkey
    }

    pub fn try_sign_message(&self, message: &[u8]) -> Result<Signature, PresignerError> {
        if self.signature.verify_pubkey(&self.pubkey, message) {
            Ok(self.signature)
        } else {
            Err(PresignerError::VerificationFailure)
        }
    }
}

/// A pubkey whose signature will be supplied later; signs with the default
/// signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NullSigner {
    pubkey: Pubkey,
}

impl NullSigner {
    pub fn new(pubkey: &Pubkey) -> Self {
        Self { pubkey: *pubkey }
    }

    pub fn pubkey(&self) -> Pubkey {
        self.pubkey
    }
}

#[derive(Debug, Clone)]
pub enum Signer {
    Keypair(Keypair),
    Presigner(Presigner),
    Null(NullSigner),
}

impl Signer {
    pub fn pubkey(&self) -> Pubkey {
        match self {
            Signer::Keypair(kp) => kp.pubkey(),
            Signer::Presigner(p) => p.pubkey(),
            Signer::Null(n) => n.pubkey(),
        }
    }

    /// Produce the signature for `message`.
    pub fn try_sign_message(&self, message: &[u8]) -> Result<Signature, SignerError> {
        match self {
            Signer::Keypair(kp) => Ok(kp.sign_message(message)),
            Signer::Presigner(p) => Ok(p.try_sign_message(message)?),
            Signer::Null(_) => Ok(Signature::default()),
        }
    }
}

/// Signers are equal when they sign for the same key.
impl PartialEq for Signer {
    fn eq(&self, other: &Self) -> bool {
        self.pubkey() == other.pubkey()
    }
}

impl Eq for Signer {}

impl From<Keypair> for Signer {
    fn from(kp: Keypair) -> Self {
        Signer::Keypair(kp)
    }
}

impl From<&Keypair> for Signer {
    fn from(kp: &Keypair) -> Self {
        Signer::Keypair(kp.clone())
    }
}

impl From<Presigner> for Signer {
    fn from(p: Presigner) -> Self {
        Signer::Presigner(p)
    }
}

impl From<NullSigner> for Signer {
    fn from(n: NullSigner) -> Self {
        Signer::Null(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keypair_signer_signs() {
        let kp = Keypair::new();
        let signer = Signer::from(&kp);
        let sig = signer.try_sign_message(b"msg").unwrap();
        assert!(sig.verify_pubkey(&kp.pubkey(), b"msg"));
    }

    #[test]
    fn presigner_returns_stored_signature_for_same_message() {
        let kp = Keypair::new();
        let sig = kp.sign_message(b"msg");
        let presigner = Presigner::new(&kp.pubkey(), &sig);
        assert_eq!(presigner.try_sign_message(b"msg").unwrap(), sig);
    }

    #[test]
    fn presigner_rejects_other_message() {
        let kp = Keypair::new();
        let sig = kp.sign_message(b"msg");
        let signer = Signer::from(Presigner::new(&kp.pubkey(), &sig));
        assert_eq!(
            signer.try_sign_message(b"other"),
            Err(SignerError::Presigner(PresignerError::VerificationFailure))
        );
    }

    #[test]
    fn null_signer_yields_default_signature() {
        let signer = Signer::from(NullSigner::new(&Pubkey::new_unique()));
        assert_eq!(signer.try_sign_message(b"anything").unwrap(), Signature::default());
    }

    #[test]
    fn equality_is_by_pubkey() {
        let kp = Keypair::new();
        let sig = kp.sign_message(b"msg");
        let as_keypair = Signer::from(&kp);
        let as_presigner = Signer::from(Presigner::new(&kp.pubkey(), &sig));
        let as_null = Signer::from(NullSigner::new(&kp.pubkey()));
        assert_eq!(as_keypair, as_presigner);
        assert_eq!(as_presigner, as_null);
        assert_ne!(as_keypair, Signer::from(Keypair::new()));
    }

    #[test]
    fn pubkey_dispatch() {
        let key = Pubkey::new_unique();
        assert_eq!(Signer::from(NullSigner::new(&key)).pubkey(), key);
    }
}
