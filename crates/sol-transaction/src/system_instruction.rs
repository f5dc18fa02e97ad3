//! System Program instruction builders.
//!
//! Only the instructions needed for transfers and durable-nonce flows are
//! provided. Instruction data is a u32 LE discriminant followed by the
//! instruction's fixed-width arguments.

use sol_primitives::Pubkey;

use crate::instruction::{AccountMeta, Instruction};

// ---------------------------------------------------------------------------
// Well-known program and sysvar IDs
// ---------------------------------------------------------------------------

/// System Program ID: `11111111111111111111111111111111`
pub const SYSTEM_PROGRAM_ID: Pubkey = Pubkey::new_from_array([0u8; 32]);

/// Recent blockhashes sysvar: `SysvarRecentB1ockHashes11111111111111111111`
pub const RECENT_BLOCKHASHES_SYSVAR_ID: Pubkey = Pubkey::new_from_array([
    0x06, 0xa7, 0xd5, 0x17, 0x19, 0x2c, 0x56, 0x8e, 0xe0, 0x8a, 0x84, 0x5f, 0x73, 0xd2, 0x97, 0x88,
    0xcf, 0x03, 0x5c, 0x31, 0x45, 0xb2, 0x1a, 0xb3, 0x44, 0xd8, 0x06, 0x2e, 0xa9, 0x40, 0x00, 0x00,
]);

/// Rent sysvar: `SysvarRent111111111111111111111111111111111`
pub const RENT_SYSVAR_ID: Pubkey = Pubkey::new_from_array([
    0x06, 0xa7, 0xd5, 0x17, 0x19, 0x2c, 0x5c, 0x51, 0x21, 0x8c, 0xc9, 0x4c, 0x3d, 0x4a, 0xf1, 0x7f,
    0x58, 0xda, 0xee, 0x08, 0x9b, 0xa1, 0xfd, 0x44, 0xe3, 0xdb, 0xd9, 0x8a, 0x00, 0x00, 0x00, 0x00,
]);

/// Upgradeable BPF loader: `BPFLoaderUpgradeab1e11111111111111111111111`
pub const BPF_LOADER_UPGRADEABLE_ID: Pubkey = Pubkey::new_from_array([
    0x02, 0xa8, 0xf6, 0x91, 0x4e, 0x88, 0xa1, 0xb0, 0xe2, 0x10, 0x15, 0x3e, 0xf7, 0x63, 0xae, 0x2b,
    0x00, 0xc2, 0xb9, 0x3d, 0x16, 0xc1, 0x24, 0xd2, 0xc0, 0x53, 0x7a, 0x10, 0x04, 0x80, 0x00, 0x00,
]);

// ---------------------------------------------------------------------------
// Instruction discriminants
// ---------------------------------------------------------------------------

pub const TRANSFER: u32 = 2;
pub const ADVANCE_NONCE_ACCOUNT: u32 = 4;
pub const WITHDRAW_NONCE_ACCOUNT: u32 = 5;

fn instruction_data(discriminant: u32, args: &[u8]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + args.len());
    data.extend_from_slice(&discriminant.to_le_bytes());
    data.extend_from_slice(args);
    data
}

/// Move `lamports` from `from_pubkey` (signer) to `to_pubkey`.
///
/// Data: `[2, 0, 0, 0]` + u64 LE lamports = 12 bytes.
pub fn transfer(from_pubkey: &Pubkey, to_pubkey: &Pubkey, lamports: u64) -> Instruction {
    Instruction {
        program_id: SYSTEM_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*from_pubkey, true),
            AccountMeta::new(*to_pubkey, false),
        ],
        data: instruction_data(TRANSFER, &lamports.to_le_bytes()),
    }
}

/// Consume the stored nonce and replace it with a successor.
///
/// Must be the first instruction of a durable-nonce transaction.
pub fn advance_nonce_account(nonce_pubkey: &Pubkey, authorized_pubkey: &Pubkey) -> Instruction {
    Instruction {
        program_id: SYSTEM_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*nonce_pubkey, false),
            AccountMeta::new_readonly(RECENT_BLOCKHASHES_SYSVAR_ID, false),
            AccountMeta::new_readonly(*authorized_pubkey, true),
        ],
        data: instruction_data(ADVANCE_NONCE_ACCOUNT, &[]),
    }
}

/// Withdraw `lamports` from a nonce account to `to_pubkey`.
pub fn withdraw_nonce_account(
    nonce_pubkey: &Pubkey,
    authorized_pubkey: &Pubkey,
    to_pubkey: &Pubkey,
    lamports: u64,
) -> Instruction {
    Instruction {
        program_id: SYSTEM_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*nonce_pubkey, false),
            AccountMeta::new(*to_pubkey, false),
            AccountMeta::new_readonly(RECENT_BLOCKHASHES_SYSVAR_ID, false),
            AccountMeta::new_readonly(RENT_SYSVAR_ID, false),
            AccountMeta::new_readonly(*authorized_pubkey, true),
        ],
        data: instruction_data(WITHDRAW_NONCE_ACCOUNT, &lamports.to_le_bytes()),
    }
}
