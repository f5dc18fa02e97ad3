//! Base58 helpers shared by the fixed-size byte types.

use crate::error::ParseError;

/// Longest base58 string that can decode to `n` bytes.
pub(crate) const fn max_encoded_len(n: usize) -> usize {
    // log(256) / log(58) ~= 1.3658, rounded up per byte.
    (n * 1366).div_ceil(1000)
}

/// Decode a base58 string into exactly `N` bytes.
pub(crate) fn decode_fixed<const N: usize>(
    s: &str,
    kind: &'static str,
) -> Result<[u8; N], ParseError> {
    if s.len() > max_encoded_len(N) {
        return Err(ParseError::WrongSize { kind });
    }
    let bytes = bs58::decode(s)
        .into_vec()
        .map_err(|_| ParseError::Invalid { kind })?;
    bytes
        .try_into()
        .map_err(|_: Vec<u8>| ParseError::WrongSize { kind })
}

pub(crate) fn encode(bytes: &[u8]) -> String {
    bs58::encode(bytes).into_string()
}

/// Implement serde as a base58 string, via the type's `Display`/`FromStr`.
macro_rules! impl_base58_serde {
    ($ty:ty) => {
        impl serde::Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = <String as serde::Deserialize>::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use impl_base58_serde;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_len_for_common_sizes() {
        assert_eq!(max_encoded_len(32), 44);
        assert_eq!(max_encoded_len(64), 88);
    }

    #[test]
    fn decode_fixed_accepts_exact_size() {
        let arr: [u8; 32] = decode_fixed("11111111111111111111111111111111", "pubkey").unwrap();
        assert_eq!(arr, [0u8; 32]);
    }

    #[test]
    fn decode_fixed_wrong_size() {
        let err = decode_fixed::<32>("1111", "pubkey").unwrap_err();
        assert_eq!(err, ParseError::WrongSize { kind: "pubkey" });
    }

    #[test]
    fn decode_fixed_rejects_non_alphabet() {
        // '0', 'O', 'I' and 'l' are not in the base58 alphabet.
        let err = decode_fixed::<32>("0OIl", "hash").unwrap_err();
        assert_eq!(err, ParseError::Invalid { kind: "hash" });
    }

    #[test]
    fn decode_fixed_rejects_overlong_strings() {
        let long = "1".repeat(45);
        let err = decode_fixed::<32>(&long, "pubkey").unwrap_err();
        assert_eq!(err, ParseError::WrongSize { kind: "pubkey" });
    }
}
