//! Account-key compiler.
//!
//! Merges every account requested by a set of instructions (plus the fee
//! payer) into one deduplicated table, ordered:
//!
//! ```text
//!   [payer, writable signers] [readonly signers] [writable non-signers] [readonly non-signers]
//! ```
//!
//! Within a category keys sort by raw bytes. Flags are OR-ed across requests,
//! so an account is a signer (or writable) if any instruction asks for it.

use std::collections::BTreeMap;

use sol_primitives::Pubkey;

use crate::error::CompileError;
use crate::instruction::{CompiledInstruction, Instruction};
use crate::message::v0::{AddressLookupTableAccount, LoadedAddresses, MessageAddressTableLookup};
use crate::message::MessageHeader;

/// Largest account table a 1-byte index can address.
pub const MAX_ACCOUNT_KEYS: usize = 256;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct CompiledKeyMeta {
    is_signer: bool,
    is_writable: bool,
    is_invoked: bool,
}

/// Keys referenced by a set of instructions, with their merged flags.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct CompiledKeys {
    payer: Option<Pubkey>,
    key_meta_map: BTreeMap<Pubkey, CompiledKeyMeta>,
}

impl CompiledKeys {
    /// Collect and merge every key referenced by `instructions` and `payer`.
    pub(crate) fn compile(instructions: &[Instruction], payer: Option<Pubkey>) -> Self {
        let mut key_meta_map = BTreeMap::<Pubkey, CompiledKeyMeta>::new();
        for ix in instructions {
            key_meta_map.entry(ix.program_id).or_default().is_invoked = true;
            for account_meta in &ix.accounts {
                let meta = key_meta_map.entry(account_meta.pubkey).or_default();
                meta.is_signer |= account_meta.is_signer;
                meta.is_writable |= account_meta.is_writable;
            }
        }

        if let Some(payer) = payer {
            let meta = key_meta_map.entry(payer).or_default();
            meta.is_signer = true;
            meta.is_writable = true;
        }

        Self {
            payer,
            key_meta_map,
        }
    }

    fn keys_where(&self, filter: impl Fn(&CompiledKeyMeta) -> bool) -> Vec<Pubkey> {
        self.key_meta_map
            .iter()
            .filter(|(key, meta)| Some(**key) != self.payer && filter(*meta))
            .map(|(key, _)| *key)
            .collect()
    }

    /// Split into the message header and the ordered static account table.
    pub(crate) fn try_into_message_components(
        self,
    ) -> Result<(MessageHeader, Vec<Pubkey>), CompileError> {
        let writable_signer_keys: Vec<Pubkey> = self
            .payer
            .into_iter()
            .chain(self.keys_where(|meta| meta.is_signer && meta.is_writable))
            .collect();
        let readonly_signer_keys = self.keys_where(|meta| meta.is_signer && !meta.is_writable);
        let writable_non_signer_keys = self.keys_where(|meta| !meta.is_signer && meta.is_writable);
        let readonly_non_signer_keys =
            self.keys_where(|meta| !meta.is_signer && !meta.is_writable);

        let total = writable_signer_keys.len()
            + readonly_signer_keys.len()
            + writable_non_signer_keys.len()
            + readonly_non_signer_keys.len();
        if total > MAX_ACCOUNT_KEYS {
            return Err(CompileError::TooManyAccountKeys(total));
        }

        let try_into_u8 = |num: usize| -> Result<u8, CompileError> {
            u8::try_from(num).map_err(|_| CompileError::TooManyAccountKeys(total))
        };

        let header = MessageHeader {
            num_required_signatures: try_into_u8(
                writable_signer_keys.len() + readonly_signer_keys.len(),
            )?,
            num_readonly_signed_accounts: try_into_u8(readonly_signer_keys.len())?,
            num_readonly_unsigned_accounts: try_into_u8(readonly_non_signer_keys.len())?,
        };

        let static_account_keys = std::iter::empty()
            .chain(writable_signer_keys)
            .chain(readonly_signer_keys)
            .chain(writable_non_signer_keys)
            .chain(readonly_non_signer_keys)
            .collect();

        Ok((header, static_account_keys))
    }

    /// Move the non-signer, non-program keys found in `lookup_table_account`
    /// out of the static table and into a table lookup.
    ///
    /// Returns `None` when the table holds none of this message's keys.
    pub(crate) fn try_extract_table_lookup(
        &mut self,
        lookup_table_account: &AddressLookupTableAccount,
    ) -> Result<Option<(MessageAddressTableLookup, LoadedAddresses)>, CompileError> {
        let (writable_indexes, drained_writable_keys) = self
            .try_drain_keys_found_in_lookup_table(&lookup_table_account.addresses, |meta| {
                !meta.is_signer && !meta.is_invoked && meta.is_writable
            })?;
        let (readonly_indexes, drained_readonly_keys) = self
            .try_drain_keys_found_in_lookup_table(&lookup_table_account.addresses, |meta| {
                !meta.is_signer && !meta.is_invoked && !meta.is_writable
            })?;

        if writable_indexes.is_empty() && readonly_indexes.is_empty() {
            return Ok(None);
        }

        Ok(Some((
            MessageAddressTableLookup {
                account_key: lookup_table_account.key,
                writable_indexes,
                readonly_indexes,
            },
            LoadedAddresses {
                writable: drained_writable_keys,
                readonly: drained_readonly_keys,
            },
        )))
    }

    fn try_drain_keys_found_in_lookup_table(
        &mut self,
        lookup_table_addresses: &[Pubkey],
        key_meta_filter: impl Fn(&CompiledKeyMeta) -> bool,
    ) -> Result<(Vec<u8>, Vec<Pubkey>), CompileError> {
        let mut lookup_table_indexes = Vec::new();
        let mut drained_keys = Vec::new();

        for search_key in self
            .key_meta_map
            .iter()
            .filter(|(_, meta)| key_meta_filter(*meta))
            .map(|(key, _)| key)
        {
            if let Some(key_index) = lookup_table_addresses.iter().position(|key| key == search_key)
            {
                let index = u8::try_from(key_index)
                    .map_err(|_| CompileError::AddressTableLookupIndexOverflow)?;
                lookup_table_indexes.push(index);
                drained_keys.push(*search_key);
            }
        }

        for key in &drained_keys {
            self.key_meta_map.remove(key);
        }

        Ok((lookup_table_indexes, drained_keys))
    }
}

/// Rewrite `instructions` as indices into `account_keys`.
///
/// Per-instruction account order is preserved. Fails if the instruction
/// count, any account list or any data payload is longer than a compact-u16
/// prefix can describe.
pub(crate) fn compile_instructions(
    instructions: &[Instruction],
    account_keys: &[Pubkey],
) -> Result<Vec<CompiledInstruction>, CompileError> {
    if account_keys.len() > MAX_ACCOUNT_KEYS {
        return Err(CompileError::TooManyAccountKeys(account_keys.len()));
    }
    check_compact_length(instructions.len())?;

    // First occurrence wins if a key is listed twice.
    let mut index_of = BTreeMap::<&Pubkey, u8>::new();
    for (index, key) in account_keys.iter().enumerate() {
        // Length was checked above, so every index fits in a byte.
        index_of.entry(key).or_insert(index as u8);
    }

    instructions
        .iter()
        .map(|ix| {
            check_compact_length(ix.accounts.len())?;
            check_compact_length(ix.data.len())?;
            let program_id_index = *index_of
                .get(&ix.program_id)
                .ok_or(CompileError::ProgramIdNotFound(ix.program_id))?;
            let accounts = ix
                .accounts
                .iter()
                .map(|meta| {
                    index_of
                        .get(&meta.pubkey)
                        .copied()
                        .ok_or(CompileError::UnknownInstructionKey(meta.pubkey))
                })
                .collect::<Result<Vec<u8>, _>>()?;
            Ok(CompiledInstruction {
                program_id_index,
                accounts,
                data: ix.data.clone(),
            })
        })
        .collect()
}

fn check_compact_length(len: usize) -> Result<(), CompileError> {
    if len > usize::from(u16::MAX) {
        return Err(CompileError::LengthOverflow(len));
    }
    Ok(())
}
