//! Messages: the signed payload of a transaction.
//!
//! # Wire format (legacy)
//!
//! ```text
//!   header (3 bytes)
//!     [num_required_signatures, num_readonly_signed, num_readonly_unsigned]
//!   compact-u16 account count | account keys (32 bytes each)
//!   recent blockhash (32 bytes)
//!   compact-u16 instruction count | instructions
//!     each: program_id_index u8 | compact-u16 + account indices | compact-u16 + data
//! ```
//!
//! A V0 message is the same layout behind a `0x80` prefix byte, followed by
//! its address-table lookups; see [`v0`] and [`versioned`].

pub mod v0;
pub mod versioned;

use serde::{Deserialize, Serialize};
use sol_primitives::wire::{self, Wire, WireReader};
use sol_primitives::{DecodeError, Hash, Pubkey};

use crate::compiled_keys::{self, CompiledKeys};
use crate::error::{CompileError, SanitizeError};
use crate::instruction::{CompiledInstruction, Instruction};
use crate::system_instruction::{self, BPF_LOADER_UPGRADEABLE_ID};

pub use v0::{AddressLookupTableAccount, LoadedAddresses, MessageAddressTableLookup, MessageV0};
pub use versioned::VersionedMessage;

/// High bit set on the first byte marks a versioned message.
pub const MESSAGE_VERSION_PREFIX: u8 = 0x80;

/// Serialized size of [`MessageHeader`].
pub const MESSAGE_HEADER_LENGTH: usize = 3;

/// Maximum size of a serialized transaction that fits in one network packet.
pub const PACKET_DATA_SIZE: usize = 1232;

/// Domain tag prepended to message bytes before hashing.
pub const MESSAGE_HASH_DOMAIN: &[u8] = b"solana-tx-message-v1";

/// Domain-separated BLAKE3 hash of serialized message bytes.
pub fn hash_raw_message(message_bytes: &[u8]) -> Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(MESSAGE_HASH_DOMAIN);
    hasher.update(message_bytes);
    Hash::new_from_array(*hasher.finalize().as_bytes())
}

// ---------------------------------------------------------------------------
// MessageHeader
// ---------------------------------------------------------------------------

/// Counts that partition the account table into its four categories.
///
/// The first `num_required_signatures` keys sign; the last
/// `num_readonly_signed_accounts` of those are read-only. The last
/// `num_readonly_unsigned_accounts` of the remaining keys are read-only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageHeader {
    pub num_required_signatures: u8,
    pub num_readonly_signed_accounts: u8,
    pub num_readonly_unsigned_accounts: u8,
}

impl Wire for MessageHeader {
    fn encode(&self, out: &mut Vec<u8>) {
        out.push(self.num_required_signatures);
        out.push(self.num_readonly_signed_accounts);
        out.push(self.num_readonly_unsigned_accounts);
    }

    fn decode(reader: &mut WireReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            num_required_signatures: reader.read_u8()?,
            num_readonly_signed_accounts: reader.read_u8()?,
            num_readonly_unsigned_accounts: reader.read_u8()?,
        })
    }
}

// ---------------------------------------------------------------------------
// Legacy Message
// ---------------------------------------------------------------------------

/// A legacy message: every account is listed inline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub header: MessageHeader,
    pub account_keys: Vec<Pubkey>,
    pub recent_blockhash: Hash,
    pub instructions: Vec<CompiledInstruction>,
}

impl Message {
    /// Compile `instructions` with a default blockhash.
    pub fn try_new(
        instructions: &[Instruction],
        payer: Option<&Pubkey>,
    ) -> Result<Self, CompileError> {
        Self::new_with_blockhash(instructions, payer, &Hash::default())
    }

    /// Compile `instructions` into a message referencing `blockhash`.
    pub fn new_with_blockhash(
        instructions: &[Instruction],
        payer: Option<&Pubkey>,
        blockhash: &Hash,
    ) -> Result<Self, CompileError> {
        let compiled_keys = CompiledKeys::compile(instructions, payer.copied());
        let (header, account_keys) = compiled_keys.try_into_message_components()?;
        let instructions = compiled_keys::compile_instructions(instructions, &account_keys)?;

        log::debug!(
            "compiled legacy message: {} accounts, {} signers ({} readonly), {} readonly unsigned, {} instructions",
            account_keys.len(),
            header.num_required_signatures,
            header.num_readonly_signed_accounts,
            header.num_readonly_unsigned_accounts,
            instructions.len()
        );

        Ok(Self {
            header,
            account_keys,
            recent_blockhash: *blockhash,
            instructions,
        })
    }

    /// A message whose first instruction advances `nonce_account_pubkey`.
    ///
    /// The blockhash is left at its default; it must be set to the nonce
    /// value when signing.
    pub fn new_with_nonce(
        mut instructions: Vec<Instruction>,
        payer: Option<&Pubkey>,
        nonce_account_pubkey: &Pubkey,
        nonce_authority_pubkey: &Pubkey,
    ) -> Result<Self, CompileError> {
        let advance =
            system_instruction::advance_nonce_account(nonce_account_pubkey, nonce_authority_pubkey);
        instructions.insert(0, advance);
        Self::try_new(&instructions, payer)
    }

    /// Assemble a message from already-compiled parts, without validation.
    pub fn new_with_compiled_instructions(
        num_required_signatures: u8,
        num_readonly_signed_accounts: u8,
        num_readonly_unsigned_accounts: u8,
        account_keys: Vec<Pubkey>,
        recent_blockhash: Hash,
        instructions: Vec<CompiledInstruction>,
    ) -> Self {
        Self {
            header: MessageHeader {
                num_required_signatures,
                num_readonly_signed_accounts,
                num_readonly_unsigned_accounts,
            },
            account_keys,
            recent_blockhash,
            instructions,
        }
    }

    /// Compile `ix` against this message's account table.
    pub fn compile_instruction(
        &self,
        ix: &Instruction,
    ) -> Result<CompiledInstruction, CompileError> {
        let mut compiled =
            compiled_keys::compile_instructions(std::slice::from_ref(ix), &self.account_keys)?;
        compiled
            .pop()
            .ok_or(CompileError::ProgramIdNotFound(ix.program_id))
    }

    pub fn serialize(&self) -> Vec<u8> {
        wire::encode_to_vec(self)
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, DecodeError> {
        wire::decode_exact(data)
    }

    /// Domain-separated hash of the serialized message.
    pub fn hash(&self) -> Hash {
        hash_raw_message(&self.serialize())
    }

    pub fn hash_raw_message(message_bytes: &[u8]) -> Hash {
        hash_raw_message(message_bytes)
    }

    // -- Queries ------------------------------------------------------------

    /// The program invoked by the instruction at `instruction_index`.
    pub fn program_id(&self, instruction_index: usize) -> Option<&Pubkey> {
        self.instructions
            .get(instruction_index)?
            .program_id(&self.account_keys)
    }

    pub fn program_index(&self, instruction_index: usize) -> Option<usize> {
        Some(usize::from(self.instructions.get(instruction_index)?.program_id_index))
    }

    /// The program of each instruction, in instruction order.
    pub fn program_ids(&self) -> Vec<&Pubkey> {
        self.instructions
            .iter()
            .filter_map(|ix| ix.program_id(&self.account_keys))
            .collect()
    }

    /// True if the account at `key_index` appears in any instruction's accounts.
    pub fn is_key_passed_to_program(&self, key_index: usize) -> bool {
        let Ok(key_index) = u8::try_from(key_index) else {
            return false;
        };
        self.instructions
            .iter()
            .any(|ix| ix.accounts.contains(&key_index))
    }

    /// True if the account at `key_index` is invoked by any instruction.
    pub fn is_key_called_as_program(&self, key_index: usize) -> bool {
        let Ok(key_index) = u8::try_from(key_index) else {
            return false;
        };
        self.instructions
            .iter()
            .any(|ix| ix.program_id_index == key_index)
    }

    /// False only for keys that are invoked but never passed as an account.
    pub fn is_non_loader_key(&self, key_index: usize) -> bool {
        !self.is_key_called_as_program(key_index) || self.is_key_passed_to_program(key_index)
    }

    /// Position of the account at `index` in [`Message::program_ids`].
    pub fn program_position(&self, index: usize) -> Option<usize> {
        let key = self.account_keys.get(index)?;
        self.program_ids().iter().position(|&program_id| program_id == key)
    }

    pub fn maybe_executable(&self, index: usize) -> bool {
        self.program_position(index).is_some()
    }

    /// Whether `index` falls in a writable category of the header.
    pub fn is_writable_index(&self, index: usize) -> bool {
        let num_required = usize::from(self.header.num_required_signatures);
        let num_readonly_signed = usize::from(self.header.num_readonly_signed_accounts);
        let num_readonly_unsigned = usize::from(self.header.num_readonly_unsigned_accounts);
        index < num_required.saturating_sub(num_readonly_signed)
            || (index >= num_required
                && index < self.account_keys.len().saturating_sub(num_readonly_unsigned))
    }

    /// Writable by header position, with invoked programs demoted to
    /// read-only unless the upgradeable loader is present.
    pub fn is_writable(&self, index: usize) -> bool {
        self.is_writable_index(index) && !self.demote_program_id(index)
    }

    fn demote_program_id(&self, index: usize) -> bool {
        self.is_key_called_as_program(index) && !self.is_upgradeable_loader_present()
    }

    pub fn is_signer(&self, index: usize) -> bool {
        index < usize::from(self.header.num_required_signatures)
    }

    /// The keys that must sign, in signature-slot order.
    pub fn signer_keys(&self) -> Vec<&Pubkey> {
        let last_key = self
            .account_keys
            .len()
            .min(usize::from(self.header.num_required_signatures));
        self.account_keys[..last_key].iter().collect()
    }

    pub fn has_duplicates(&self) -> bool {
        let mut seen = std::collections::BTreeSet::new();
        self.account_keys.iter().any(|key| !seen.insert(key))
    }

    pub fn is_upgradeable_loader_present(&self) -> bool {
        self.account_keys.contains(&BPF_LOADER_UPGRADEABLE_ID)
    }

    /// Check the header and every index against the account table.
    pub fn sanitize(&self) -> Result<(), SanitizeError> {
        let num_keys = self.account_keys.len();
        if usize::from(self.header.num_required_signatures)
            + usize::from(self.header.num_readonly_unsigned_accounts)
            > num_keys
        {
            return Err(SanitizeError::IndexOutOfBounds);
        }

        // The payer must be a writable signer.
        if self.header.num_readonly_signed_accounts >= self.header.num_required_signatures {
            return Err(SanitizeError::IndexOutOfBounds);
        }

        for ci in &self.instructions {
            if usize::from(ci.program_id_index) >= num_keys {
                return Err(SanitizeError::IndexOutOfBounds);
            }
            // The payer cannot be invoked.
            if ci.program_id_index == 0 {
                return Err(SanitizeError::IndexOutOfBounds);
            }
            if ci.accounts.iter().any(|ai| usize::from(*ai) >= num_keys) {
                return Err(SanitizeError::IndexOutOfBounds);
            }
        }

        Ok(())
    }
}

impl Wire for Message {
    fn encode(&self, out: &mut Vec<u8>) {
        self.header.encode(out);
        wire::write_compact_vec(out, &self.account_keys);
        self.recent_blockhash.encode(out);
        wire::write_compact_vec(out, &self.instructions);
    }

    fn decode(reader: &mut WireReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            header: MessageHeader::decode(reader)?,
            account_keys: reader.read_compact_vec()?,
            recent_blockhash: Hash::decode(reader)?,
            instructions: reader.read_compact_vec()?,
        })
    }
}
