//! Program-derived addresses.
//!
//! A PDA is `SHA-256(seed_0 || ... || seed_n || program_id || "ProgramDerivedAddress")`
//! that does NOT decompress to an Ed25519 point, so no private key exists
//! for it. [`find_program_address`] searches for a bump seed (255 down to 0)
//! that pushes the digest off the curve.

use sha2::{Digest, Sha256};

use crate::error::PubkeyError;
use crate::pubkey::{Pubkey, PUBKEY_BYTES};

/// Maximum number of seeds, including the bump.
pub const MAX_SEEDS: usize = 16;

/// Maximum length of a single seed.
pub const MAX_SEED_LEN: usize = 32;

/// The string appended to PDA derivation: "ProgramDerivedAddress".
pub const PDA_MARKER: &[u8; 21] = b"ProgramDerivedAddress";

/// Derive a program address from `seeds` and `program_id`.
///
/// Fails with [`PubkeyError::InvalidSeeds`] when the digest lies on the curve.
pub fn create_program_address(
    seeds: &[&[u8]],
    program_id: &Pubkey,
) -> Result<Pubkey, PubkeyError> {
    if seeds.len() > MAX_SEEDS {
        return Err(PubkeyError::MaxSeedLengthExceeded);
    }
    if seeds.iter().any(|seed| seed.len() > MAX_SEED_LEN) {
        return Err(PubkeyError::MaxSeedLengthExceeded);
    }

    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update(program_id.as_ref());
    hasher.update(PDA_MARKER);

    let hash: [u8; PUBKEY_BYTES] = hasher.finalize().into();

    if is_on_curve(&hash) {
        return Err(PubkeyError::InvalidSeeds);
    }

    Ok(Pubkey::new_from_array(hash))
}

/// Search bump seeds from 255 down to 0 and return the first off-curve
/// address with its bump.
pub fn try_find_program_address(seeds: &[&[u8]], program_id: &Pubkey) -> Option<(Pubkey, u8)> {
    for bump in (0u8..=255).rev() {
        let bump_seed = [bump];
        let mut with_bump: Vec<&[u8]> = Vec::with_capacity(seeds.len() + 1);
        with_bump.extend_from_slice(seeds);
        with_bump.push(&bump_seed);

        match create_program_address(&with_bump, program_id) {
            Ok(address) => {
                log::trace!("found program address {address} with bump {bump}");
                return Some((address, bump));
            }
            Err(PubkeyError::InvalidSeeds) => continue,
            // Seed limits fail identically for every bump.
            Err(_) => return None,
        }
    }

    None
}

/// Like [`try_find_program_address`], but reports why no address was found.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), PubkeyError> {
    if seeds.len() >= MAX_SEEDS || seeds.iter().any(|seed| seed.len() > MAX_SEED_LEN) {
        return Err(PubkeyError::MaxSeedLengthExceeded);
    }
    try_find_program_address(seeds, program_id).ok_or(PubkeyError::NoViableBumpSeed)
}

/// Derive an account address from a base key, a string seed and an owner.
///
/// `SHA-256(base || seed || owner)`. The owner may not itself end in the PDA
/// marker, otherwise the result could collide with a program address.
pub fn create_with_seed(base: &Pubkey, seed: &str, owner: &Pubkey) -> Result<Pubkey, PubkeyError> {
    if seed.len() > MAX_SEED_LEN {
        return Err(PubkeyError::MaxSeedLengthExceeded);
    }

    let owner_bytes = owner.as_ref();
    if owner_bytes.ends_with(PDA_MARKER) {
        return Err(PubkeyError::IllegalOwner);
    }

    let mut hasher = Sha256::new();
    hasher.update(base.as_ref());
    hasher.update(seed.as_bytes());
    hasher.update(owner_bytes);

    Ok(Pubkey::new_from_array(hasher.finalize().into()))
}

/// Check if 32 bytes represent a valid Ed25519 curve point.
///
/// Uses `curve25519-dalek` to attempt decompression. If it succeeds, the
/// point is on the curve.
pub fn is_on_curve(bytes: &[u8; PUBKEY_BYTES]) -> bool {
    curve25519_dalek::edwards::CompressedEdwardsY(*bytes)
        .decompress()
        .is_some()
}
