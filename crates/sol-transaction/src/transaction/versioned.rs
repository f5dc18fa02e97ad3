//! Transactions carrying either message format.

use sol_primitives::wire::{self, Wire, WireReader};
use sol_primitives::{DecodeError, Hash, Pubkey, Signature, Signer, SignerError};

use super::{verify_signatures, Transaction};
use crate::error::{SanitizeError, TransactionError};
use crate::instruction::CompiledInstruction;
use crate::message::{hash_raw_message, VersionedMessage};
use crate::nonce;

/// Which message format a transaction carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionVersion {
    Legacy,
    Number(u8),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionedTransaction {
    pub signatures: Vec<Signature>,
    pub message: VersionedMessage,
}

impl VersionedTransaction {
    /// Sign `message` with exactly its required signers.
    ///
    /// `signers` may be in any order but must match the required signer keys
    /// one to one. A [`sol_primitives::NullSigner`] fills its slot with the
    /// default signature.
    pub fn try_new(message: VersionedMessage, signers: &[Signer]) -> Result<Self, SignerError> {
        let num_required = usize::from(message.header().num_required_signatures);
        let expected_keys = message
            .static_account_keys()
            .get(..num_required)
            .ok_or_else(|| {
                SignerError::InvalidInput("message has fewer keys than required signers".into())
            })?;

        match signers.len().cmp(&num_required) {
            std::cmp::Ordering::Greater => return Err(SignerError::TooManySigners),
            std::cmp::Ordering::Less => return Err(SignerError::NotEnoughSigners),
            std::cmp::Ordering::Equal => {}
        }

        let signer_keys: Vec<Pubkey> = signers.iter().map(Signer::pubkey).collect();
        let signer_indexes = expected_keys
            .iter()
            .map(|expected| {
                signer_keys
                    .iter()
                    .position(|key| key == expected)
                    .ok_or(SignerError::KeypairPubkeyMismatch)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let message_data = message.serialize();
        let signatures = signer_indexes
            .into_iter()
            .map(|index| signers[index].try_sign_message(&message_data))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            signatures,
            message,
        })
    }

    /// Assemble from parts without checking that they agree.
    pub fn populate(message: VersionedMessage, signatures: Vec<Signature>) -> Self {
        Self {
            signatures,
            message,
        }
    }

    pub fn from_legacy(tx: Transaction) -> Self {
        Self {
            signatures: tx.signatures,
            message: VersionedMessage::Legacy(tx.message),
        }
    }

    /// `None` if the message is not legacy.
    pub fn into_legacy_transaction(self) -> Option<Transaction> {
        match self.message {
            VersionedMessage::Legacy(message) => Some(Transaction {
                signatures: self.signatures,
                message,
            }),
            VersionedMessage::V0(_) => None,
        }
    }

    pub fn version(&self) -> TransactionVersion {
        match self.message.version() {
            None => TransactionVersion::Legacy,
            Some(version) => TransactionVersion::Number(version),
        }
    }

    pub fn sanitize(&self) -> Result<(), SanitizeError> {
        self.message.sanitize()?;

        let num_required = usize::from(self.message.header().num_required_signatures);
        match num_required.cmp(&self.signatures.len()) {
            std::cmp::Ordering::Greater => return Err(SanitizeError::IndexOutOfBounds),
            std::cmp::Ordering::Less => return Err(SanitizeError::InvalidValue),
            std::cmp::Ordering::Equal => {}
        }

        if self.signatures.len() > self.message.static_account_keys().len() {
            return Err(SanitizeError::IndexOutOfBounds);
        }
        Ok(())
    }

    pub fn verify_with_results(&self) -> Vec<bool> {
        verify_signatures(
            &self.signatures,
            self.message.static_account_keys(),
            &self.message.serialize(),
        )
    }

    /// Verify every signature and return the message hash.
    pub fn verify_and_hash_message(&self) -> Result<Hash, TransactionError> {
        let message_bytes = self.message.serialize();
        let num_required = usize::from(self.message.header().num_required_signatures);
        let verified = verify_signatures(
            &self.signatures,
            self.message.static_account_keys(),
            &message_bytes,
        );
        if self.signatures.len() != num_required || !verified.into_iter().all(|ok| ok) {
            return Err(TransactionError::SignatureFailure);
        }
        Ok(hash_raw_message(&message_bytes))
    }

    /// Every slot is filled and verifies against its key.
    pub fn is_signed(&self) -> bool {
        let num_required = usize::from(self.message.header().num_required_signatures);
        self.signatures.len() == num_required
            && self.signatures.iter().all(|signature| !signature.is_default())
            && self.verify_with_results().into_iter().all(|ok| ok)
    }

    /// The leading `AdvanceNonceAccount` instruction, if present.
    pub fn uses_durable_nonce(&self) -> Option<&CompiledInstruction> {
        nonce::versioned_uses_durable_nonce(&self.message)
    }

    pub fn get_nonce_pubkey_from_instruction(&self, ix: &CompiledInstruction) -> Option<&Pubkey> {
        nonce::get_nonce_pubkey_from_instruction(ix, self.message.static_account_keys())
    }

    pub fn serialize(&self) -> Vec<u8> {
        wire::encode_to_vec(self)
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, DecodeError> {
        wire::decode_exact(data)
    }
}

impl From<Transaction> for VersionedTransaction {
    fn from(tx: Transaction) -> Self {
        Self::from_legacy(tx)
    }
}

impl Wire for VersionedTransaction {
    fn encode(&self, out: &mut Vec<u8>) {
        wire::write_compact_vec(out, &self.signatures);
        self.message.encode(out);
    }

    fn decode(reader: &mut WireReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            signatures: reader.read_compact_vec()?,
            message: VersionedMessage::decode(reader)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{AddressLookupTableAccount, Message, MessageV0};
    use crate::system_instruction;
    use sol_primitives::{Keypair, NullSigner};

    fn v0_message(payer: &Keypair, other: &Keypair) -> VersionedMessage {
        let to = Pubkey::new_unique();
        let ixs = [
            system_instruction::transfer(&payer.pubkey(), &to, 1),
            system_instruction::transfer(&other.pubkey(), &to, 2),
        ];
        MessageV0::try_compile(&payer.pubkey(), &ixs, &[], Hash::new_unique())
            .unwrap()
            .into()
    }

    // -- try_new ------------------------------------------------------------

    #[test]
    fn try_new_orders_signatures_by_key() {
        let (a, b) = (Keypair::new(), Keypair::new());
        let message = v0_message(&a, &b);
        // Signers given in reverse order.
        let tx = VersionedTransaction::try_new(message, &[Signer::from(&b), Signer::from(&a)])
            .unwrap();
        let data = tx.message.serialize();
        assert!(tx.signatures[0].verify_pubkey(&a.pubkey(), &data));
        assert!(tx.signatures[1].verify_pubkey(&b.pubkey(), &data));
        assert!(tx.is_signed());
        assert_eq!(tx.sanitize(), Ok(()));
    }

    #[test]
    fn try_new_signer_count_errors() {
        let (a, b) = (Keypair::new(), Keypair::new());
        let message = v0_message(&a, &b);
        assert_eq!(
            VersionedTransaction::try_new(message.clone(), &[Signer::from(&a)]),
            Err(SignerError::NotEnoughSigners)
        );
        let c = Keypair::new();
        assert_eq!(
            VersionedTransaction::try_new(
                message,
                &[Signer::from(&a), Signer::from(&b), Signer::from(&c)]
            ),
            Err(SignerError::TooManySigners)
        );
    }

    #[test]
    fn try_new_duplicate_signer_is_mismatch() {
        let (a, b) = (Keypair::new(), Keypair::new());
        let message = v0_message(&a, &b);
        assert_eq!(
            VersionedTransaction::try_new(message, &[Signer::from(&a), Signer::from(&a)]),
            Err(SignerError::KeypairPubkeyMismatch)
        );
    }

    #[test]
    fn try_new_with_null_signer() {
        let (a, b) = (Keypair::new(), Keypair::new());
        let message = v0_message(&a, &b);
        let tx = VersionedTransaction::try_new(
            message,
            &[Signer::from(&a), Signer::from(NullSigner::new(&b.pubkey()))],
        )
        .unwrap();
        assert!(tx.signatures[1].is_default());
        assert!(!tx.is_signed());
        assert_eq!(tx.verify_with_results(), vec![true, false]);
    }

    #[test]
    fn try_new_rejects_short_key_table() {
        let message = Message::new_with_compiled_instructions(
            2,
            0,
            0,
            vec![Pubkey::new_unique()],
            Hash::default(),
            vec![],
        );
        let result = VersionedTransaction::try_new(message.into(), &[]);
        assert!(matches!(result, Err(SignerError::InvalidInput(_))));
    }

    // -- Conversions --------------------------------------------------------

    #[test]
    fn legacy_conversion_roundtrip() {
        let (a, b) = (Keypair::new(), Keypair::new());
        let to = Pubkey::new_unique();
        let ixs = [
            system_instruction::transfer(&a.pubkey(), &to, 1),
            system_instruction::transfer(&b.pubkey(), &to, 2),
        ];
        let legacy = Transaction::new_signed_with_payer(
            &ixs,
            Some(&a.pubkey()),
            &[Signer::from(&a), Signer::from(&b)],
            Hash::new_unique(),
        )
        .unwrap();

        let versioned = VersionedTransaction::from(legacy.clone());
        assert_eq!(versioned.version(), TransactionVersion::Legacy);
        assert_eq!(versioned.serialize(), legacy.serialize());
        assert!(versioned.is_signed());
        assert_eq!(versioned.into_legacy_transaction(), Some(legacy));
    }

    #[test]
    fn v0_has_no_legacy_form() {
        let (a, b) = (Keypair::new(), Keypair::new());
        let tx = VersionedTransaction::try_new(
            v0_message(&a, &b),
            &[Signer::from(&a), Signer::from(&b)],
        )
        .unwrap();
        assert_eq!(tx.version(), TransactionVersion::Number(0));
        assert_eq!(tx.into_legacy_transaction(), None);
    }

    // -- Verification -------------------------------------------------------

    #[test]
    fn verify_and_hash_message() {
        let (a, b) = (Keypair::new(), Keypair::new());
        let mut tx = VersionedTransaction::try_new(
            v0_message(&a, &b),
            &[Signer::from(&a), Signer::from(&b)],
        )
        .unwrap();
        assert_eq!(tx.verify_and_hash_message(), Ok(tx.message.hash()));

        tx.message.set_recent_blockhash(Hash::new_unique());
        assert_eq!(
            tx.verify_and_hash_message(),
            Err(TransactionError::SignatureFailure)
        );
    }

    #[test]
    fn sanitize_signature_count() {
        let (a, b) = (Keypair::new(), Keypair::new());
        let mut tx = VersionedTransaction::try_new(
            v0_message(&a, &b),
            &[Signer::from(&a), Signer::from(&b)],
        )
        .unwrap();
        tx.signatures.push(Signature::default());
        assert_eq!(tx.sanitize(), Err(SanitizeError::InvalidValue));
        tx.signatures.truncate(1);
        assert_eq!(tx.sanitize(), Err(SanitizeError::IndexOutOfBounds));
    }

    // -- Durable nonce ------------------------------------------------------

    #[test]
    fn v0_nonce_detection() {
        let payer = Keypair::new();
        let nonce_account = Pubkey::new_unique();
        let ixs = [
            system_instruction::advance_nonce_account(&nonce_account, &payer.pubkey()),
            system_instruction::transfer(&payer.pubkey(), &Pubkey::new_unique(), 1),
        ];
        let message =
            MessageV0::try_compile(&payer.pubkey(), &ixs, &[], Hash::new_unique()).unwrap();
        let tx = VersionedTransaction::populate(message.into(), vec![Signature::default()]);
        let ix = tx.uses_durable_nonce().unwrap();
        assert_eq!(tx.get_nonce_pubkey_from_instruction(ix), Some(&nonce_account));
    }

    // -- Codec --------------------------------------------------------------

    #[test]
    fn serialize_roundtrip_with_lookups() {
        let payer = Keypair::new();
        let looked_up = Pubkey::new_unique();
        let table = AddressLookupTableAccount {
            key: Pubkey::new_unique(),
            addresses: vec![looked_up],
        };
        let ix = system_instruction::transfer(&payer.pubkey(), &looked_up, 7);
        let message =
            MessageV0::try_compile(&payer.pubkey(), &[ix], &[table], Hash::new_unique()).unwrap();
        assert_eq!(message.address_table_lookups.len(), 1);

        let tx = VersionedTransaction::try_new(message.into(), &[Signer::from(&payer)]).unwrap();
        let bytes = tx.serialize();
        assert_eq!(VersionedTransaction::deserialize(&bytes).unwrap(), tx);
    }

    #[test]
    fn deserialize_rejects_unknown_version() {
        let (a, b) = (Keypair::new(), Keypair::new());
        let tx = VersionedTransaction::try_new(
            v0_message(&a, &b),
            &[Signer::from(&a), Signer::from(&b)],
        )
        .unwrap();
        let mut bytes = tx.serialize();
        // One-byte signature count, then two signatures.
        bytes[1 + 2 * 64] = 0x81;
        assert_eq!(
            VersionedTransaction::deserialize(&bytes),
            Err(DecodeError::UnknownVersion(1))
        );
    }
}
