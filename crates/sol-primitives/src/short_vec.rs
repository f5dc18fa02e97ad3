//! Compact length ("short vec") encoding.
//!
//! Every sequence length on the wire is prefixed with this variable-length
//! encoding: 7 bits of value per byte, least-significant group first, with
//! the high bit set on every byte except the last.
//!
//! ```text
//!   0x0000..=0x007f   -> 1 byte
//!   0x0080..=0x3fff   -> 2 bytes
//!   0x4000..=0xffff   -> 3 bytes
//! ```
//!
//! Decoding is strict: at most 3 bytes, the value must fit in a `u16`, and a
//! zero continuation byte (an aliased encoding of a shorter value) is rejected.

use crate::error::DecodeError;

/// Maximum number of bytes a decoded length may occupy.
pub const MAX_ENCODING_LENGTH: usize = 3;

/// Append the compact encoding of `len` to `out`.
pub fn encode_length_into(out: &mut Vec<u8>, len: usize) {
    let mut rem = len;
    loop {
        let mut byte = (rem & 0x7f) as u8;
        rem >>= 7;
        if rem > 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if rem == 0 {
            break;
        }
    }
}

/// Encode `len` in compact form.
pub fn encode_length(len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(MAX_ENCODING_LENGTH);
    encode_length_into(&mut out, len);
    out
}

/// Decode a compact length from the front of `data`.
///
/// Returns `(value, bytes_consumed)`.
pub fn decode_length(data: &[u8]) -> Result<(usize, usize), DecodeError> {
    let mut value: usize = 0;

    for nth in 0..MAX_ENCODING_LENGTH {
        let byte = *data.get(nth).ok_or(DecodeError::UnexpectedEnd)?;

        if byte == 0 && nth > 0 {
            return Err(DecodeError::AliasedLength);
        }

        let group = (byte & 0x7f) as usize;
        if nth == MAX_ENCODING_LENGTH - 1 && (byte & 0x80 != 0 || group > 0x03) {
            return Err(DecodeError::LengthOverflow);
        }

        value |= group << (nth * 7);

        if byte & 0x80 == 0 {
            return Ok((value, nth + 1));
        }
    }

    Err(DecodeError::LengthOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_one_byte_values() {
        assert_eq!(encode_length(0), vec![0x00]);
        assert_eq!(encode_length(5), vec![0x05]);
        assert_eq!(encode_length(0x7f), vec![0x7f]);
    }

    #[test]
    fn encode_two_byte_values() {
        assert_eq!(encode_length(0x80), vec![0x80, 0x01]);
        assert_eq!(encode_length(0xff), vec![0xff, 0x01]);
        assert_eq!(encode_length(0x100), vec![0x80, 0x02]);
        assert_eq!(encode_length(0x3fff), vec![0xff, 0x7f]);
    }

    #[test]
    fn encode_three_byte_values() {
        assert_eq!(encode_length(0x4000), vec![0x80, 0x80, 0x01]);
        assert_eq!(encode_length(0x7fff), vec![0xff, 0xff, 0x01]);
        assert_eq!(encode_length(u16::MAX as usize), vec![0xff, 0xff, 0x03]);
    }

    #[test]
    fn encoded_sequence_matches_reference_buffer() {
        // Lengths 0, 5, 0x7f, 0x80, 0xff, 0x100, 0x7fff appended back to back.
        let mut buf = Vec::new();
        for len in [0usize, 5, 0x7f, 0x80, 0xff, 0x100, 0x7fff] {
            encode_length_into(&mut buf, len);
        }
        assert_eq!(buf.len(), 12);
        assert_eq!(
            buf,
            vec![0x00, 0x05, 0x7f, 0x80, 0x01, 0xff, 0x01, 0x80, 0x02, 0xff, 0xff, 0x01]
        );
    }

    #[test]
    fn decode_roundtrip() {
        for value in [0usize, 1, 127, 128, 255, 256, 16383, 16384, 0x7fff, 65535] {
            let encoded = encode_length(value);
            let (decoded, len) = decode_length(&encoded).unwrap();
            assert_eq!(decoded, value, "roundtrip failed for {value}");
            assert_eq!(len, encoded.len());
        }
    }

    #[test]
    fn decode_ignores_following_bytes() {
        let (value, len) = decode_length(&[0x05, 0xaa, 0xbb]).unwrap();
        assert_eq!(value, 5);
        assert_eq!(len, 1);
    }

    #[test]
    fn decode_empty_input_fails() {
        assert_eq!(decode_length(&[]), Err(DecodeError::UnexpectedEnd));
    }

    #[test]
    fn decode_truncated_input_fails() {
        assert_eq!(decode_length(&[0x80]), Err(DecodeError::UnexpectedEnd));
        assert_eq!(decode_length(&[0x80, 0x80]), Err(DecodeError::UnexpectedEnd));
    }

    #[test]
    fn decode_rejects_aliased_encodings() {
        assert_eq!(decode_length(&[0x80, 0x00]), Err(DecodeError::AliasedLength));
        assert_eq!(
            decode_length(&[0xff, 0x80, 0x00]),
            Err(DecodeError::AliasedLength)
        );
    }

    #[test]
    fn decode_rejects_values_above_u16() {
        assert_eq!(
            decode_length(&[0xff, 0xff, 0x04]),
            Err(DecodeError::LengthOverflow)
        );
        assert_eq!(
            decode_length(&[0x80, 0x80, 0x80, 0x01]),
            Err(DecodeError::LengthOverflow)
        );
    }
}
