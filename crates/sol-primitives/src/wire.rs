//! Byte-level reader/writer for the wire format.
//!
//! Fixed-width integers are little-endian; sequence lengths use the compact
//! encoding from [`crate::short_vec`]. Types that appear on the wire implement
//! [`Wire`] so containers can be encoded generically.

use crate::error::DecodeError;
use crate::short_vec;

/// A value with a fixed binary layout on the wire.
pub trait Wire: Sized {
    /// Append the encoded value to `out`.
    fn encode(&self, out: &mut Vec<u8>);

    /// Read one value from the reader's current position.
    fn decode(reader: &mut WireReader<'_>) -> Result<Self, DecodeError>;
}

/// Cursor over an input buffer.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// The unread tail of the buffer.
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Look at the next byte without consuming it.
    pub fn peek_u8(&self) -> Result<u8, DecodeError> {
        self.data.get(self.pos).copied().ok_or(DecodeError::UnexpectedEnd)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let byte = self.peek_u8()?;
        self.pos += 1;
        Ok(byte)
    }

    pub fn read_bool(&mut self) -> Result<bool, DecodeError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(DecodeError::InvalidBool(other)),
        }
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < len {
            return Err(DecodeError::UnexpectedEnd);
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut arr = [0u8; N];
        arr.copy_from_slice(self.read_bytes(N)?);
        Ok(arr)
    }

    pub fn read_u32_le(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64_le(&mut self) -> Result<u64, DecodeError> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Read a compact-encoded length prefix.
    pub fn read_compact_len(&mut self) -> Result<usize, DecodeError> {
        let (len, consumed) = short_vec::decode_length(self.rest())?;
        self.pos += consumed;
        Ok(len)
    }

    /// Read a compact-length-prefixed byte string.
    pub fn read_compact_bytes(&mut self) -> Result<Vec<u8>, DecodeError> {
        let len = self.read_compact_len()?;
        Ok(self.read_bytes(len)?.to_vec())
    }

    /// Read a compact-length-prefixed sequence of `T`.
    pub fn read_compact_vec<T: Wire>(&mut self) -> Result<Vec<T>, DecodeError> {
        let len = self.read_compact_len()?;
        // Every element occupies at least one byte; never pre-allocate more
        // than the input could hold.
        let mut items = Vec::with_capacity(len.min(self.remaining()));
        for _ in 0..len {
            items.push(T::decode(self)?);
        }
        Ok(items)
    }

    /// Fail unless every input byte has been consumed.
    pub fn finish(self) -> Result<(), DecodeError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(DecodeError::TrailingBytes(n)),
        }
    }
}

/// Append a compact-length-prefixed byte string.
pub fn write_compact_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    short_vec::encode_length_into(out, bytes.len());
    out.extend_from_slice(bytes);
}

/// Append a compact-length-prefixed sequence.
pub fn write_compact_vec<T: Wire>(out: &mut Vec<u8>, items: &[T]) {
    short_vec::encode_length_into(out, items.len());
    for item in items {
        item.encode(out);
    }
}

/// Decode exactly one `T` from `data`, rejecting trailing bytes.
pub fn decode_exact<T: Wire>(data: &[u8]) -> Result<T, DecodeError> {
    let mut reader = WireReader::new(data);
    let value = T::decode(&mut reader)?;
    reader.finish()?;
    Ok(value)
}

/// Encode a single value into a fresh buffer.
pub fn encode_to_vec<T: Wire>(value: &T) -> Vec<u8> {
    let mut out = Vec::new();
    value.encode(&mut out);
    out
}
