//! OS randomness behind the `new_unique` constructors.

use rand::rngs::OsRng;
use rand::RngCore;

/// `N` bytes straight from the operating system's CSPRNG.
pub(crate) fn unique_bytes<const N: usize>() -> [u8; N] {
    let mut buf = [0u8; N];
    OsRng.fill_bytes(&mut buf);
    buf
}
