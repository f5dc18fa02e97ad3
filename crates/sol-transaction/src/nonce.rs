//! Durable-nonce detection.
//!
//! A durable-nonce transaction stores a nonce value in place of the recent
//! blockhash and must begin with a System Program `AdvanceNonceAccount`
//! instruction whose first account (the nonce account) is writable.

use sol_primitives::Pubkey;

use crate::instruction::CompiledInstruction;
use crate::message::{Message, VersionedMessage};
use crate::system_instruction::{ADVANCE_NONCE_ACCOUNT, SYSTEM_PROGRAM_ID};

fn advance_nonce_instruction<'a>(
    account_keys: &[Pubkey],
    instructions: &'a [CompiledInstruction],
    is_writable: impl Fn(usize) -> bool,
) -> Option<&'a CompiledInstruction> {
    instructions.first().filter(|ix| {
        ix.program_id(account_keys) == Some(&SYSTEM_PROGRAM_ID)
            && ix.data.starts_with(&ADVANCE_NONCE_ACCOUNT.to_le_bytes())
            && ix
                .accounts
                .first()
                .is_some_and(|&index| is_writable(usize::from(index)))
    })
}

/// The leading `AdvanceNonceAccount` instruction, if `message` has one.
pub fn uses_durable_nonce(message: &Message) -> Option<&CompiledInstruction> {
    advance_nonce_instruction(&message.account_keys, &message.instructions, |index| {
        message.is_writable(index)
    })
}

/// [`uses_durable_nonce`] for either message format.
pub fn versioned_uses_durable_nonce(message: &VersionedMessage) -> Option<&CompiledInstruction> {
    advance_nonce_instruction(
        message.static_account_keys(),
        message.instructions(),
        |index| message.is_maybe_writable(index),
    )
}

/// The nonce account named by an `AdvanceNonceAccount` instruction: the key
/// at its first account index.
pub fn get_nonce_pubkey_from_instruction<'a>(
    ix: &CompiledInstruction,
    account_keys: &'a [Pubkey],
) -> Option<&'a Pubkey> {
    ix.accounts
        .first()
        .and_then(|&index| account_keys.get(usize::from(index)))
}
