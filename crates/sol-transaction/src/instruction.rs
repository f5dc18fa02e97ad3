//! Instructions in their requested and compiled forms.
//!
//! An [`Instruction`] names its accounts by pubkey together with signer and
//! writable requests. Once a message is compiled, each instruction becomes a
//! [`CompiledInstruction`] that refers to accounts by 1-byte index into the
//! message's account table.

use serde::{Deserialize, Serialize};
use sol_primitives::wire::{self, Wire, WireReader};
use sol_primitives::{DecodeError, Pubkey};

// ---------------------------------------------------------------------------
// AccountMeta
// ---------------------------------------------------------------------------

/// An account reference with signer/writable requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountMeta {
    pub pubkey: Pubkey,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    /// A writable account.
    pub fn new(pubkey: Pubkey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: true,
        }
    }

    /// A read-only account.
    pub fn new_readonly(pubkey: Pubkey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: false,
        }
    }

    /// Fixed-width byte form: `pubkey(32) | is_signer u8 | is_writable u8`.
    pub fn to_bytes(&self) -> Vec<u8> {
        wire::encode_to_vec(&FixedAccountMeta(self.clone()))
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, DecodeError> {
        wire::decode_exact::<FixedAccountMeta>(data).map(|m| m.0)
    }
}

/// Wire adapter for the fixed-width layout used by [`AccountMeta::to_bytes`].
struct FixedAccountMeta(AccountMeta);

impl Wire for FixedAccountMeta {
    fn encode(&self, out: &mut Vec<u8>) {
        self.0.pubkey.encode(out);
        out.push(self.0.is_signer as u8);
        out.push(self.0.is_writable as u8);
    }

    fn decode(reader: &mut WireReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self(AccountMeta {
            pubkey: Pubkey::decode(reader)?,
            is_signer: reader.read_bool()?,
            is_writable: reader.read_bool()?,
        }))
    }
}

// ---------------------------------------------------------------------------
// Instruction
// ---------------------------------------------------------------------------

/// A call to a program, before compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instruction {
    pub program_id: Pubkey,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

impl Instruction {
    pub fn new_with_bytes(program_id: Pubkey, data: &[u8], accounts: Vec<AccountMeta>) -> Self {
        Self {
            program_id,
            accounts,
            data: data.to_vec(),
        }
    }

    /// Fixed-width byte form:
    /// `program_id(32) | u64 count | (pubkey, is_signer, is_writable)* | u64 len | data`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(32 + 8 + self.accounts.len() * 34 + 8 + self.data.len());
        self.program_id.encode(&mut out);
        out.extend_from_slice(&(self.accounts.len() as u64).to_le_bytes());
        for meta in &self.accounts {
            FixedAccountMeta(meta.clone()).encode(&mut out);
        }
        out.extend_from_slice(&(self.data.len() as u64).to_le_bytes());
        out.extend_from_slice(&self.data);
        out
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = WireReader::new(data);
        let program_id = Pubkey::decode(&mut reader)?;

        let num_accounts = read_u64_len(&mut reader)?;
        let mut accounts = Vec::with_capacity(num_accounts.min(reader.remaining() / 34));
        for _ in 0..num_accounts {
            accounts.push(FixedAccountMeta::decode(&mut reader)?.0);
        }

        let data_len = read_u64_len(&mut reader)?;
        let ix_data = reader.read_bytes(data_len)?.to_vec();
        reader.finish()?;

        Ok(Self {
            program_id,
            accounts,
            data: ix_data,
        })
    }
}

fn read_u64_len(reader: &mut WireReader<'_>) -> Result<usize, DecodeError> {
    usize::try_from(reader.read_u64_le()?).map_err(|_| DecodeError::LengthOverflow)
}

// ---------------------------------------------------------------------------
// CompiledInstruction
// ---------------------------------------------------------------------------

/// An instruction whose program and accounts are indices into a message's
/// account table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub accounts: Vec<u8>,
    pub data: Vec<u8>,
}

impl CompiledInstruction {
    pub fn new_from_raw_parts(program_id_index: u8, data: Vec<u8>, accounts: Vec<u8>) -> Self {
        Self {
            program_id_index,
            accounts,
            data,
        }
    }

    /// The program this instruction invokes, if its index is in range.
    pub fn program_id<'a>(&self, account_keys: &'a [Pubkey]) -> Option<&'a Pubkey> {
        account_keys.get(usize::from(self.program_id_index))
    }
}

impl Wire for CompiledInstruction {
    fn encode(&self, out: &mut Vec<u8>) {
        out.push(self.program_id_index);
        wire::write_compact_bytes(out, &self.accounts);
        wire::write_compact_bytes(out, &self.data);
    }

    fn decode(reader: &mut WireReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            program_id_index: reader.read_u8()?,
            accounts: reader.read_compact_bytes()?,
            data: reader.read_compact_bytes()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_instruction() -> Instruction {
        Instruction::new_with_bytes(
            Pubkey::new_from_array([9; 32]),
            &[1, 2, 3],
            vec![
                AccountMeta::new(Pubkey::new_from_array([1; 32]), true),
                AccountMeta::new_readonly(Pubkey::new_from_array([2; 32]), false),
            ],
        )
    }

    // -- AccountMeta --------------------------------------------------------

    #[test]
    fn account_meta_constructors() {
        let key = Pubkey::new_unique();
        let meta = AccountMeta::new(key, true);
        assert!(meta.is_signer && meta.is_writable);
        let meta = AccountMeta::new_readonly(key, false);
        assert!(!meta.is_signer && !meta.is_writable);
    }

    #[test]
    fn account_meta_bytes_layout() {
        let meta = AccountMeta::new_readonly(Pubkey::new_from_array([1; 32]), true);
        let bytes = meta.to_bytes();
        assert_eq!(bytes.len(), 34);
        assert_eq!(&bytes[32..], &[1, 0]);
        assert_eq!(AccountMeta::from_bytes(&bytes).unwrap(), meta);
    }

    #[test]
    fn account_meta_rejects_bad_bool() {
        let mut bytes = AccountMeta::new(Pubkey::default(), false).to_bytes();
        bytes[32] = 2;
        assert_eq!(
            AccountMeta::from_bytes(&bytes),
            Err(DecodeError::InvalidBool(2))
        );
    }

    #[test]
    fn account_meta_serde_is_camel_case() {
        let meta = AccountMeta::new(Pubkey::default(), true);
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["pubkey"], "11111111111111111111111111111111");
        assert_eq!(json["isSigner"], true);
        assert_eq!(json["isWritable"], true);
    }

    // -- Instruction --------------------------------------------------------

    #[test]
    fn instruction_bytes_layout() {
        let ix = sample_instruction();
        let bytes = ix.to_bytes();
        // program id + count + 2 metas + data len + data
        assert_eq!(bytes.len(), 32 + 8 + 2 * 34 + 8 + 3);
        assert_eq!(&bytes[32..40], &2u64.to_le_bytes());
        assert_eq!(&bytes[bytes.len() - 11..bytes.len() - 3], &3u64.to_le_bytes());
        assert_eq!(Instruction::from_bytes(&bytes).unwrap(), ix);
    }

    #[test]
    fn instruction_from_bytes_rejects_truncation_and_trailing() {
        let bytes = sample_instruction().to_bytes();
        assert_eq!(
            Instruction::from_bytes(&bytes[..bytes.len() - 1]),
            Err(DecodeError::UnexpectedEnd)
        );
        let mut extra = bytes.clone();
        extra.push(0);
        assert_eq!(
            Instruction::from_bytes(&extra),
            Err(DecodeError::TrailingBytes(1))
        );
    }

    #[test]
    fn instruction_from_bytes_huge_count_fails_cleanly() {
        let mut bytes = vec![0u8; 32];
        bytes.extend_from_slice(&u64::MAX.to_le_bytes());
        assert!(Instruction::from_bytes(&bytes).is_err());
    }

    #[test]
    fn instruction_serde_roundtrip() {
        let ix = sample_instruction();
        let json = serde_json::to_string(&ix).unwrap();
        assert!(json.contains("\"programId\""));
        assert_eq!(serde_json::from_str::<Instruction>(&json).unwrap(), ix);
    }

    // -- CompiledInstruction ------------------------------------------------

    #[test]
    fn compiled_instruction_wire_layout() {
        let ix = CompiledInstruction::new_from_raw_parts(2, vec![7, 7], vec![0, 1]);
        let bytes = wire::encode_to_vec(&ix);
        assert_eq!(bytes, vec![2, 2, 0, 1, 2, 7, 7]);
        assert_eq!(wire::decode_exact::<CompiledInstruction>(&bytes).unwrap(), ix);
    }

    #[test]
    fn compiled_instruction_program_id_lookup() {
        let keys = [Pubkey::new_unique(), Pubkey::new_unique()];
        let ix = CompiledInstruction::new_from_raw_parts(1, vec![], vec![]);
        assert_eq!(ix.program_id(&keys), Some(&keys[1]));
        let ix = CompiledInstruction::new_from_raw_parts(5, vec![], vec![]);
        assert_eq!(ix.program_id(&keys), None);
    }

    #[test]
    fn compiled_instruction_serde_is_camel_case() {
        let ix = CompiledInstruction::new_from_raw_parts(1, vec![9], vec![0]);
        let json = serde_json::to_value(&ix).unwrap();
        assert_eq!(json["programIdIndex"], 1);
        assert_eq!(json["accounts"], serde_json::json!([0]));
    }
}
