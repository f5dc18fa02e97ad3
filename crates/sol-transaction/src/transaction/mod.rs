//! Signed transactions.
//!
//! # Wire format
//!
//! ```text
//!   compact-u16 signature count | signatures (64 bytes each)
//!   message (legacy or versioned, see [`crate::message`])
//! ```
//!
//! Signature slot `i` belongs to `message.account_keys[i]`; there is one slot
//! per required signer. An unfilled slot holds the all-zero signature.

pub mod versioned;

use serde::{Deserialize, Serialize};
use sol_primitives::wire::{self, Wire, WireReader};
use sol_primitives::{DecodeError, Hash, Pubkey, Signature, Signer, SignerError};

use crate::error::{CompileError, SanitizeError, TransactionError};
use crate::instruction::{CompiledInstruction, Instruction};
use crate::message::{hash_raw_message, Message};
use crate::nonce;

pub use versioned::{TransactionVersion, VersionedTransaction};

/// A legacy transaction: a [`Message`] plus one signature per required signer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub signatures: Vec<Signature>,
    pub message: Message,
}

impl Transaction {
    // -- Construction -------------------------------------------------------

    /// Wrap `message` with every signature slot set to the default.
    pub fn new_unsigned(message: Message) -> Self {
        let num_required = usize::from(message.header.num_required_signatures);
        Self {
            signatures: vec![Signature::default(); num_required],
            message,
        }
    }

    /// Wrap and fully sign `message`.
    pub fn new(
        signers: &[Signer],
        message: Message,
        recent_blockhash: Hash,
    ) -> Result<Self, SignerError> {
        let mut tx = Self::new_unsigned(message);
        tx.sign(signers, recent_blockhash)?;
        Ok(tx)
    }

    /// Compile `instructions` into an unsigned transaction.
    pub fn new_with_payer(
        instructions: &[Instruction],
        payer: Option<&Pubkey>,
    ) -> Result<Self, CompileError> {
        let message = Message::try_new(instructions, payer)?;
        Ok(Self::new_unsigned(message))
    }

    /// Compile `instructions` and sign with every required signer.
    pub fn new_signed_with_payer(
        instructions: &[Instruction],
        payer: Option<&Pubkey>,
        signers: &[Signer],
        recent_blockhash: Hash,
    ) -> Result<Self, TransactionError> {
        let message = Message::try_new(instructions, payer)?;
        Ok(Self::new(signers, message, recent_blockhash)?)
    }

    /// Build from precompiled instructions.
    ///
    /// The account table is the signers' keys, then `keys`, then
    /// `program_ids`; the signers are writable and the programs read-only.
    pub fn new_with_compiled_instructions(
        signers: &[Signer],
        keys: &[Pubkey],
        recent_blockhash: Hash,
        program_ids: &[Pubkey],
        instructions: Vec<CompiledInstruction>,
    ) -> Result<Self, TransactionError> {
        let mut account_keys: Vec<Pubkey> = signers.iter().map(Signer::pubkey).collect();
        account_keys.extend_from_slice(keys);
        account_keys.extend_from_slice(program_ids);

        let total = account_keys.len();
        let num_signers =
            u8::try_from(signers.len()).map_err(|_| CompileError::TooManyAccountKeys(total))?;
        let num_programs =
            u8::try_from(program_ids.len()).map_err(|_| CompileError::TooManyAccountKeys(total))?;

        let message = Message::new_with_compiled_instructions(
            num_signers,
            0,
            num_programs,
            account_keys,
            Hash::default(),
            instructions,
        );
        Ok(Self::new(signers, message, recent_blockhash)?)
    }

    /// Assemble from parts without checking that they agree.
    pub fn populate(message: Message, signatures: Vec<Signature>) -> Self {
        Self {
            signatures,
            message,
        }
    }

    // -- Accessors ----------------------------------------------------------

    pub fn message(&self) -> &Message {
        &self.message
    }

    /// The bytes every signature commits to.
    pub fn message_data(&self) -> Vec<u8> {
        self.message.serialize()
    }

    /// Data of the instruction at `instruction_index`.
    pub fn data(&self, instruction_index: usize) -> Option<&[u8]> {
        self.message
            .instructions
            .get(instruction_index)
            .map(|ix| ix.data.as_slice())
    }

    fn key_index(&self, instruction_index: usize, accounts_index: usize) -> Option<usize> {
        self.message
            .instructions
            .get(instruction_index)?
            .accounts
            .get(accounts_index)
            .map(|&index| usize::from(index))
    }

    /// The account passed at `accounts_index` of instruction `instruction_index`.
    pub fn key(&self, instruction_index: usize, accounts_index: usize) -> Option<&Pubkey> {
        self.key_index(instruction_index, accounts_index)
            .and_then(|index| self.message.account_keys.get(index))
    }

    /// Like [`Transaction::key`], but only if that account is a signer.
    pub fn signer_key(&self, instruction_index: usize, accounts_index: usize) -> Option<&Pubkey> {
        match self.key_index(instruction_index, accounts_index) {
            Some(index) if index < self.signatures.len() => self.message.account_keys.get(index),
            _ => None,
        }
    }

    // -- Signing ------------------------------------------------------------

    /// Sign with `signers` and require every slot to end up filled.
    pub fn sign(&mut self, signers: &[Signer], recent_blockhash: Hash) -> Result<(), SignerError> {
        self.partial_sign(signers, recent_blockhash)?;
        if self.signatures.iter().any(Signature::is_default) {
            return Err(SignerError::NotEnoughSigners);
        }
        Ok(())
    }

    /// Fill the slots belonging to `signers`, leaving the rest as they are.
    ///
    /// A new `recent_blockhash` changes the signed bytes, so every existing
    /// signature is cleared first. Nothing is touched if the slot count does
    /// not match the header or the first signer has no slot. Signers are
    /// applied in order; the first failure is returned and later signers are
    /// not applied.
    pub fn partial_sign(
        &mut self,
        signers: &[Signer],
        recent_blockhash: Hash,
    ) -> Result<(), SignerError> {
        let num_required = usize::from(self.message.header.num_required_signatures);
        if self.signatures.len() != num_required {
            return Err(SignerError::InvalidInput(format!(
                "transaction has {} signature slots but its message requires {num_required}",
                self.signatures.len()
            )));
        }
        if let Some(first) = signers.first() {
            self.signer_position(&first.pubkey())
                .ok_or(SignerError::KeypairPubkeyMismatch)?;
        }

        if self.message.recent_blockhash != recent_blockhash {
            log::debug!(
                "blockhash changed from {} to {}, clearing {} signatures",
                self.message.recent_blockhash,
                recent_blockhash,
                self.signatures.len()
            );
            self.message.recent_blockhash = recent_blockhash;
            self.signatures.fill(Signature::default());
        }

        let message_data = self.message_data();
        for signer in signers {
            let pubkey = signer.pubkey();
            let position = self
                .signer_position(&pubkey)
                .ok_or(SignerError::KeypairPubkeyMismatch)?;
            let signature = signer.try_sign_message(&message_data)?;
            log::trace!("signature slot {position} filled by {pubkey}");
            self.signatures[position] = signature;
        }
        Ok(())
    }

    fn signer_position(&self, pubkey: &Pubkey) -> Option<usize> {
        self.message
            .signer_keys()
            .iter()
            .position(|&key| key == pubkey)
            .filter(|&position| position < self.signatures.len())
    }

    /// Signature-slot index of each of `pubkeys`, or `None` if it is not a
    /// required signer.
    pub fn get_signing_keypair_positions(
        &self,
        pubkeys: &[Pubkey],
    ) -> Result<Vec<Option<usize>>, TransactionError> {
        let num_required = usize::from(self.message.header.num_required_signatures);
        let signed_keys = self
            .message
            .account_keys
            .get(..num_required)
            .ok_or(SanitizeError::IndexOutOfBounds)?;

        Ok(pubkeys
            .iter()
            .map(|pubkey| signed_keys.iter().position(|key| key == pubkey))
            .collect())
    }

    /// Overwrite every signer key and signature, then verify the result.
    pub fn replace_signatures(
        &mut self,
        signers: &[(Pubkey, Signature)],
    ) -> Result<(), TransactionError> {
        let num_required = usize::from(self.message.header.num_required_signatures);
        if signers.len() != num_required
            || self.signatures.len() != num_required
            || self.message.account_keys.len() < num_required
        {
            return Err(SanitizeError::IndexOutOfBounds.into());
        }

        for (i, (pubkey, signature)) in signers.iter().enumerate() {
            self.signatures[i] = *signature;
            self.message.account_keys[i] = *pubkey;
        }
        self.verify()
    }

    // -- Verification -------------------------------------------------------

    /// Every slot is filled and verifies against its key.
    pub fn is_signed(&self) -> bool {
        let num_required = usize::from(self.message.header.num_required_signatures);
        self.signatures.len() == num_required
            && self.signatures.iter().all(|signature| !signature.is_default())
            && self.verify_with_results().into_iter().all(|ok| ok)
    }

    pub fn verify(&self) -> Result<(), TransactionError> {
        self.verify_and_hash_message().map(|_| ())
    }

    /// Per-slot verification against the current message bytes.
    pub fn verify_with_results(&self) -> Vec<bool> {
        verify_signatures(
            &self.signatures,
            &self.message.account_keys,
            &self.message_data(),
        )
    }

    /// Verify every signature and return the message hash.
    pub fn verify_and_hash_message(&self) -> Result<Hash, TransactionError> {
        let message_bytes = self.message_data();
        let num_required = usize::from(self.message.header.num_required_signatures);
        if self.signatures.len() != num_required
            || !verify_signatures(&self.signatures, &self.message.account_keys, &message_bytes)
                .into_iter()
                .all(|ok| ok)
        {
            return Err(TransactionError::SignatureFailure);
        }
        Ok(hash_raw_message(&message_bytes))
    }

    // -- Durable nonce ------------------------------------------------------

    /// The leading `AdvanceNonceAccount` instruction, if present.
    pub fn uses_durable_nonce(&self) -> Option<&CompiledInstruction> {
        nonce::uses_durable_nonce(&self.message)
    }

    pub fn get_nonce_pubkey_from_instruction(&self, ix: &CompiledInstruction) -> Option<&Pubkey> {
        nonce::get_nonce_pubkey_from_instruction(ix, &self.message.account_keys)
    }

    // -- Codec --------------------------------------------------------------

    pub fn sanitize(&self) -> Result<(), SanitizeError> {
        self.message.sanitize()?;
        if usize::from(self.message.header.num_required_signatures) > self.signatures.len() {
            return Err(SanitizeError::IndexOutOfBounds);
        }
        if self.signatures.len() > self.message.account_keys.len() {
            return Err(SanitizeError::IndexOutOfBounds);
        }
        Ok(())
    }

    pub fn serialize(&self) -> Vec<u8> {
        wire::encode_to_vec(self)
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, DecodeError> {
        wire::decode_exact(data)
    }
}

pub(crate) fn verify_signatures(
    signatures: &[Signature],
    account_keys: &[Pubkey],
    message_bytes: &[u8],
) -> Vec<bool> {
    signatures
        .iter()
        .zip(account_keys)
        .map(|(signature, pubkey)| signature.verify_pubkey(pubkey, message_bytes))
        .collect()
}

impl Wire for Transaction {
    fn encode(&self, out: &mut Vec<u8>) {
        wire::write_compact_vec(out, &self.signatures);
        self.message.encode(out);
    }

    fn decode(reader: &mut WireReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            signatures: reader.read_compact_vec()?,
            message: Message::decode(reader)?,
        })
    }
}
