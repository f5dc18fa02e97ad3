//! Version 0 messages, which may load accounts from on-chain lookup tables.
//!
//! Account indices in a V0 message address the concatenation of the static
//! keys, then every lookup's writable entries (in lookup order), then every
//! lookup's readonly entries.

use serde::{Deserialize, Serialize};
use sol_primitives::wire::{self, Wire, WireReader};
use sol_primitives::{DecodeError, Hash, Pubkey};

use super::{hash_raw_message, MessageHeader, MESSAGE_VERSION_PREFIX};
use crate::compiled_keys::{self, CompiledKeys, MAX_ACCOUNT_KEYS};
use crate::error::{CompileError, SanitizeError};
use crate::instruction::{CompiledInstruction, Instruction};
use crate::system_instruction::BPF_LOADER_UPGRADEABLE_ID;

/// The contents of an on-chain address lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressLookupTableAccount {
    pub key: Pubkey,
    pub addresses: Vec<Pubkey>,
}

/// References into one lookup table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageAddressTableLookup {
    pub account_key: Pubkey,
    pub writable_indexes: Vec<u8>,
    pub readonly_indexes: Vec<u8>,
}

impl Wire for MessageAddressTableLookup {
    fn encode(&self, out: &mut Vec<u8>) {
        self.account_key.encode(out);
        wire::write_compact_bytes(out, &self.writable_indexes);
        wire::write_compact_bytes(out, &self.readonly_indexes);
    }

    fn decode(reader: &mut WireReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            account_key: Pubkey::decode(reader)?,
            writable_indexes: reader.read_compact_bytes()?,
            readonly_indexes: reader.read_compact_bytes()?,
        })
    }
}

/// Addresses resolved through lookup tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedAddresses {
    pub writable: Vec<Pubkey>,
    pub readonly: Vec<Pubkey>,
}

impl FromIterator<LoadedAddresses> for LoadedAddresses {
    fn from_iter<T: IntoIterator<Item = LoadedAddresses>>(iter: T) -> Self {
        let (writable, readonly): (Vec<Vec<Pubkey>>, Vec<Vec<Pubkey>>) = iter
            .into_iter()
            .map(|addresses| (addresses.writable, addresses.readonly))
            .unzip();
        Self {
            writable: writable.into_iter().flatten().collect(),
            readonly: readonly.into_iter().flatten().collect(),
        }
    }
}

impl LoadedAddresses {
    pub fn len(&self) -> usize {
        self.writable.len() + self.readonly.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageV0 {
    pub header: MessageHeader,
    pub account_keys: Vec<Pubkey>,
    pub recent_blockhash: Hash,
    pub instructions: Vec<CompiledInstruction>,
    pub address_table_lookups: Vec<MessageAddressTableLookup>,
}

impl MessageV0 {
    /// Compile `instructions`, moving every key found in `address_lookup_table_accounts`
    /// that is neither a signer nor an invoked program into table lookups.
    pub fn try_compile(
        payer: &Pubkey,
        instructions: &[Instruction],
        address_lookup_table_accounts: &[AddressLookupTableAccount],
        recent_blockhash: Hash,
    ) -> Result<Self, CompileError> {
        let mut compiled_keys = CompiledKeys::compile(instructions, Some(*payer));

        let mut address_table_lookups = Vec::with_capacity(address_lookup_table_accounts.len());
        let mut loaded_addresses_list = Vec::with_capacity(address_lookup_table_accounts.len());
        for lookup_table_account in address_lookup_table_accounts {
            if let Some((lookup, loaded_addresses)) =
                compiled_keys.try_extract_table_lookup(lookup_table_account)?
            {
                address_table_lookups.push(lookup);
                loaded_addresses_list.push(loaded_addresses);
            }
        }

        let (header, static_keys) = compiled_keys.try_into_message_components()?;
        let dynamic_keys: LoadedAddresses = loaded_addresses_list.into_iter().collect();

        let all_keys: Vec<Pubkey> = static_keys
            .iter()
            .chain(&dynamic_keys.writable)
            .chain(&dynamic_keys.readonly)
            .copied()
            .collect();
        let instructions = compiled_keys::compile_instructions(instructions, &all_keys)?;

        log::debug!(
            "compiled v0 message: {} static accounts, {} loaded from {} lookup tables, {} instructions",
            static_keys.len(),
            dynamic_keys.len(),
            address_table_lookups.len(),
            instructions.len()
        );

        Ok(Self {
            header,
            account_keys: static_keys,
            recent_blockhash,
            instructions,
            address_table_lookups,
        })
    }

    /// Versioned wire form, including the `0x80` prefix.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = vec![MESSAGE_VERSION_PREFIX];
        self.encode(&mut out);
        out
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = WireReader::new(data);
        let prefix = reader.read_u8()?;
        if prefix != MESSAGE_VERSION_PREFIX {
            return Err(DecodeError::UnknownVersion(prefix & !MESSAGE_VERSION_PREFIX));
        }
        let message = Self::decode(&mut reader)?;
        reader.finish()?;
        Ok(message)
    }

    pub fn hash(&self) -> Hash {
        hash_raw_message(&self.serialize())
    }

    /// Total addressable accounts: static keys plus every lookup entry.
    pub fn num_loaded_accounts(&self) -> usize {
        self.account_keys.len()
            + self
                .address_table_lookups
                .iter()
                .map(|lookup| lookup.writable_indexes.len() + lookup.readonly_indexes.len())
                .sum::<usize>()
    }

    pub fn sanitize(&self) -> Result<(), SanitizeError> {
        let num_static_account_keys = self.account_keys.len();
        if usize::from(self.header.num_required_signatures)
            + usize::from(self.header.num_readonly_unsigned_accounts)
            > num_static_account_keys
        {
            return Err(SanitizeError::IndexOutOfBounds);
        }

        // The payer must be a writable signer.
        if self.header.num_readonly_signed_accounts >= self.header.num_required_signatures {
            return Err(SanitizeError::InvalidValue);
        }

        // Each lookup must load at least one account.
        if self
            .address_table_lookups
            .iter()
            .any(|lookup| lookup.writable_indexes.is_empty() && lookup.readonly_indexes.is_empty())
        {
            return Err(SanitizeError::InvalidValue);
        }

        let total_account_keys = self.num_loaded_accounts();
        if total_account_keys > MAX_ACCOUNT_KEYS {
            return Err(SanitizeError::IndexOutOfBounds);
        }

        for ci in &self.instructions {
            // The payer cannot be invoked.
            if ci.program_id_index == 0 {
                return Err(SanitizeError::IndexOutOfBounds);
            }
            // Programs may not be loaded from a lookup table.
            if usize::from(ci.program_id_index) >= num_static_account_keys {
                return Err(SanitizeError::IndexOutOfBounds);
            }
            if ci.accounts.iter().any(|ai| usize::from(*ai) >= total_account_keys) {
                return Err(SanitizeError::IndexOutOfBounds);
            }
        }

        Ok(())
    }

    // -- Queries ------------------------------------------------------------

    pub fn is_key_called_as_program(&self, key_index: usize) -> bool {
        let Ok(key_index) = u8::try_from(key_index) else {
            return false;
        };
        self.instructions
            .iter()
            .any(|ix| ix.program_id_index == key_index)
    }

    pub fn is_key_passed_to_program(&self, key_index: usize) -> bool {
        let Ok(key_index) = u8::try_from(key_index) else {
            return false;
        };
        self.instructions
            .iter()
            .any(|ix| ix.accounts.contains(&key_index))
    }

    pub fn is_non_loader_key(&self, key_index: usize) -> bool {
        !self.is_key_called_as_program(key_index) || self.is_key_passed_to_program(key_index)
    }

    pub fn is_signer(&self, index: usize) -> bool {
        index < usize::from(self.header.num_required_signatures)
    }

    fn is_writable_index(&self, key_index: usize) -> bool {
        let num_account_keys = self.account_keys.len();
        let num_signed_accounts = usize::from(self.header.num_required_signatures);
        if key_index >= num_account_keys {
            let loaded_addresses_index = key_index - num_account_keys;
            let num_writable_dynamic_addresses: usize = self
                .address_table_lookups
                .iter()
                .map(|lookup| lookup.writable_indexes.len())
                .sum();
            loaded_addresses_index < num_writable_dynamic_addresses
        } else if key_index >= num_signed_accounts {
            let num_unsigned_accounts = num_account_keys - num_signed_accounts;
            let num_writable_unsigned_accounts = num_unsigned_accounts
                .saturating_sub(usize::from(self.header.num_readonly_unsigned_accounts));
            key_index - num_signed_accounts < num_writable_unsigned_accounts
        } else {
            let num_writable_signed_accounts = num_signed_accounts
                .saturating_sub(usize::from(self.header.num_readonly_signed_accounts));
            key_index < num_writable_signed_accounts
        }
    }

    /// Writability before lookup tables are resolved: invoked programs are
    /// demoted unless the upgradeable loader is a static key.
    pub fn is_maybe_writable(&self, key_index: usize) -> bool {
        self.is_writable_index(key_index)
            && !(self.is_key_called_as_program(key_index) && !self.is_upgradeable_loader_present())
    }

    pub fn is_upgradeable_loader_present(&self) -> bool {
        self.account_keys.contains(&BPF_LOADER_UPGRADEABLE_ID)
    }
}

/// Body only; the version prefix is written by the caller.
impl Wire for MessageV0 {
    fn encode(&self, out: &mut Vec<u8>) {
        self.header.encode(out);
        wire::write_compact_vec(out, &self.account_keys);
        self.recent_blockhash.encode(out);
        wire::write_compact_vec(out, &self.instructions);
        wire::write_compact_vec(out, &self.address_table_lookups);
    }

    fn decode(reader: &mut WireReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            header: MessageHeader::decode(reader)?,
            account_keys: reader.read_compact_vec()?,
            recent_blockhash: Hash::decode(reader)?,
            instructions: reader.read_compact_vec()?,
            address_table_lookups: reader.read_compact_vec()?,
        })
    }
}
