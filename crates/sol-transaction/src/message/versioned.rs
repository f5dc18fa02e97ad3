//! Either message format, dispatched on the first wire byte.
//!
//! A legacy message starts with `num_required_signatures`, which is always
//! below 128. Any first byte with the high bit set is a version prefix; the
//! low seven bits give the version, and only version 0 is known.

use sol_primitives::wire::{self, Wire, WireReader};
use sol_primitives::{DecodeError, Hash, Pubkey};

use super::v0::{MessageAddressTableLookup, MessageV0};
use super::{hash_raw_message, Message, MessageHeader, MESSAGE_VERSION_PREFIX};
use crate::error::SanitizeError;
use crate::instruction::CompiledInstruction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionedMessage {
    Legacy(Message),
    V0(MessageV0),
}

impl Default for VersionedMessage {
    fn default() -> Self {
        Self::Legacy(Message::default())
    }
}

impl VersionedMessage {
    pub fn header(&self) -> &MessageHeader {
        match self {
            Self::Legacy(message) => &message.header,
            Self::V0(message) => &message.header,
        }
    }

    /// The inline account keys; V0 lookups are not resolved.
    pub fn static_account_keys(&self) -> &[Pubkey] {
        match self {
            Self::Legacy(message) => &message.account_keys,
            Self::V0(message) => &message.account_keys,
        }
    }

    pub fn recent_blockhash(&self) -> &Hash {
        match self {
            Self::Legacy(message) => &message.recent_blockhash,
            Self::V0(message) => &message.recent_blockhash,
        }
    }

    pub fn set_recent_blockhash(&mut self, recent_blockhash: Hash) {
        match self {
            Self::Legacy(message) => message.recent_blockhash = recent_blockhash,
            Self::V0(message) => message.recent_blockhash = recent_blockhash,
        }
    }

    pub fn instructions(&self) -> &[CompiledInstruction] {
        match self {
            Self::Legacy(message) => &message.instructions,
            Self::V0(message) => &message.instructions,
        }
    }

    /// `None` for legacy messages.
    pub fn address_table_lookups(&self) -> Option<&[MessageAddressTableLookup]> {
        match self {
            Self::Legacy(_) => None,
            Self::V0(message) => Some(&message.address_table_lookups),
        }
    }

    /// `None` for legacy, `Some(0)` for V0.
    pub fn version(&self) -> Option<u8> {
        match self {
            Self::Legacy(_) => None,
            Self::V0(_) => Some(0),
        }
    }

    pub fn is_signer(&self, index: usize) -> bool {
        index < usize::from(self.header().num_required_signatures)
    }

    pub fn is_maybe_writable(&self, index: usize) -> bool {
        match self {
            Self::Legacy(message) => message.is_writable(index),
            Self::V0(message) => message.is_maybe_writable(index),
        }
    }

    pub fn is_key_called_as_program(&self, key_index: usize) -> bool {
        match self {
            Self::Legacy(message) => message.is_key_called_as_program(key_index),
            Self::V0(message) => message.is_key_called_as_program(key_index),
        }
    }

    pub fn is_non_loader_key(&self, key_index: usize) -> bool {
        match self {
            Self::Legacy(message) => message.is_non_loader_key(key_index),
            Self::V0(message) => message.is_non_loader_key(key_index),
        }
    }

    pub fn sanitize(&self) -> Result<(), SanitizeError> {
        match self {
            Self::Legacy(message) => message.sanitize(),
            Self::V0(message) => message.sanitize(),
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        wire::encode_to_vec(self)
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, DecodeError> {
        wire::decode_exact(data)
    }

    pub fn hash(&self) -> Hash {
        hash_raw_message(&self.serialize())
    }
}

impl From<Message> for VersionedMessage {
    fn from(message: Message) -> Self {
        Self::Legacy(message)
    }
}

impl From<MessageV0> for VersionedMessage {
    fn from(message: MessageV0) -> Self {
        Self::V0(message)
    }
}

impl Wire for VersionedMessage {
    fn encode(&self, out: &mut Vec<u8>) {
        match self {
            Self::Legacy(message) => message.encode(out),
            Self::V0(message) => {
                out.push(MESSAGE_VERSION_PREFIX);
                message.encode(out);
            }
        }
    }

    fn decode(reader: &mut WireReader<'_>) -> Result<Self, DecodeError> {
        let first = reader.peek_u8()?;
        if first & MESSAGE_VERSION_PREFIX == 0 {
            return Message::decode(reader).map(Self::Legacy);
        }

        reader.read_u8()?;
        match first & !MESSAGE_VERSION_PREFIX {
            0 => MessageV0::decode(reader).map(Self::V0),
            version => Err(DecodeError::UnknownVersion(version)),
        }
    }
}
