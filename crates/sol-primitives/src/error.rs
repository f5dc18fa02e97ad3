use thiserror::Error;

/// Failure to parse a base58 string into a fixed-size value.
///
/// The two variants are kept apart so callers can tell "this was not base58"
/// from "this was base58 but the wrong length".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("string decoded to wrong size for {kind}")]
    WrongSize { kind: &'static str },

    #[error("failed to decode string to {kind}")]
    Invalid { kind: &'static str },
}

/// Wire-format decoding errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unexpected end of data")]
    UnexpectedEnd,

    #[error("compact length overflow")]
    LengthOverflow,

    #[error("compact length is not canonically encoded")]
    AliasedLength,

    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),

    #[error("unknown message version: {0}")]
    UnknownVersion(u8),

    #[error("invalid boolean byte: {0}")]
    InvalidBool(u8),
}

/// Address derivation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PubkeyError {
    #[error("length of the seed is too long for address generation")]
    MaxSeedLengthExceeded,

    #[error("provided seeds do not result in a valid address")]
    InvalidSeeds,

    #[error("provided owner is not allowed")]
    IllegalOwner,

    #[error("unable to find a viable program address bump seed")]
    NoViableBumpSeed,
}

/// A presigned signature did not verify against the requested message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PresignerError {
    #[error("pre-generated signature cannot verify data")]
    VerificationFailure,
}

/// Signing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignerError {
    #[error("keypair-pubkey mismatch")]
    KeypairPubkeyMismatch,

    #[error("not enough signers")]
    NotEnoughSigners,

    #[error("too many signers")]
    TooManySigners,

    #[error("presigner error")]
    Presigner(#[from] PresignerError),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid keypair: {0}")]
    InvalidKeypair(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_parse_wrong_size() {
        let err = ParseError::WrongSize { kind: "signature" };
        assert_eq!(err.to_string(), "string decoded to wrong size for signature");
    }

    #[test]
    fn display_parse_invalid() {
        let err = ParseError::Invalid { kind: "hash" };
        assert_eq!(err.to_string(), "failed to decode string to hash");
    }

    #[test]
    fn display_decode_errors() {
        assert_eq!(DecodeError::UnexpectedEnd.to_string(), "unexpected end of data");
        assert_eq!(
            DecodeError::TrailingBytes(3).to_string(),
            "3 trailing bytes after value"
        );
        assert_eq!(
            DecodeError::UnknownVersion(1).to_string(),
            "unknown message version: 1"
        );
    }

    #[test]
    fn display_pubkey_errors() {
        assert_eq!(
            PubkeyError::InvalidSeeds.to_string(),
            "provided seeds do not result in a valid address"
        );
        assert_eq!(
            PubkeyError::NoViableBumpSeed.to_string(),
            "unable to find a viable program address bump seed"
        );
    }

    #[test]
    fn display_signer_errors() {
        assert_eq!(
            SignerError::KeypairPubkeyMismatch.to_string(),
            "keypair-pubkey mismatch"
        );
        assert_eq!(SignerError::NotEnoughSigners.to_string(), "not enough signers");
        assert_eq!(SignerError::TooManySigners.to_string(), "too many signers");
    }

    #[test]
    fn presigner_error_converts_into_signer_error() {
        let err: SignerError = PresignerError::VerificationFailure.into();
        assert_eq!(err, SignerError::Presigner(PresignerError::VerificationFailure));
        assert_eq!(err.to_string(), "presigner error");
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> = Box::new(SignerError::InvalidInput("test".into()));
        assert!(err.to_string().contains("test"));
    }

    #[test]
    fn debug_format_works() {
        let err = PubkeyError::MaxSeedLengthExceeded;
        let debug = format!("{:?}", err);
        assert!(debug.contains("MaxSeedLengthExceeded"));
    }
}
