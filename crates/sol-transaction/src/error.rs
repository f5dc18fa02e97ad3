use sol_primitives::{DecodeError, Pubkey, SignerError};
use thiserror::Error;

/// Errors from turning instructions into a message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("too many account keys: {0} exceeds the 256-entry account table")]
    TooManyAccountKeys(usize),

    #[error("program id `{0}` not found in the account table")]
    ProgramIdNotFound(Pubkey),

    #[error("encountered unknown account key `{0}` during instruction compilation")]
    UnknownInstructionKey(Pubkey),

    #[error("address lookup table index overflowed during compilation")]
    AddressTableLookupIndexOverflow,

    #[error("length {0} does not fit a compact-u16 prefix")]
    LengthOverflow(usize),
}

/// Structural problems in a message received from elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanitizeError {
    #[error("index out of bounds")]
    IndexOutOfBounds,

    #[error("value out of bounds")]
    ValueOutOfBounds,

    #[error("invalid value")]
    InvalidValue,
}

/// Transaction-level failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    #[error("transaction did not pass signature verification")]
    SignatureFailure,

    #[error("transaction failed to sanitize accounts offsets correctly: {0}")]
    Sanitize(#[from] SanitizeError),

    #[error("transaction failed to decode: {0}")]
    Decode(#[from] DecodeError),

    #[error("signing failed: {0}")]
    Signer(#[from] SignerError),

    #[error("message compilation failed: {0}")]
    Compile(#[from] CompileError),
}
