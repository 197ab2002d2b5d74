//! State wire codec
//!
//! Every covenant state serializes to a fixed field sequence; its commitment
//! is `sha256(serialize(state))`, stored beside the output that carries it.
//!
//! ## Field encodings
//!
//! - integers: big-endian (`u64` = 8 bytes)
//! - `bool`: one byte, `0x00` or `0x01`
//! - `i8` slot indexes: one byte, two's complement
//! - variable byte strings: 1-byte length prefix, then the bytes
//!
//! Decoding is strict: short input, trailing bytes and out-of-domain values
//! are all rejected, so `deserialize(serialize(s)) == s` and every encoding
//! has exactly one decoding.

mod states;

use crate::errors::{CodecError, CodecResult};
use crate::types::StateHash;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Read};

/// Byte-exact serialization of a committed state
pub trait StateCodec: Sized {
    fn serialize(&self) -> Vec<u8>;

    fn deserialize(bytes: &[u8]) -> CodecResult<Self>;

    /// Commitment stored beside the output carrying this state
    fn state_hash(&self) -> StateHash {
        StateHash::of_bytes(&self.serialize())
    }
}

/// Append-only field writer
#[derive(Debug, Default)]
pub struct StateWriter {
    buf: Vec<u8>,
}

impl StateWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_u8(&mut self, value: u8) -> &mut Self {
        self.buf.push(value);
        self
    }

    pub fn put_bool(&mut self, value: bool) -> &mut Self {
        self.put_u8(u8::from(value))
    }

    pub fn put_i8(&mut self, value: i8) -> &mut Self {
        self.buf.push(value as u8);
        self
    }

    pub fn put_u64(&mut self, value: u64) -> &mut Self {
        // Writing into a Vec cannot fail
        let _ = self.buf.write_u64::<BigEndian>(value);
        self
    }

    pub fn put_fixed(&mut self, data: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(data);
        self
    }

    /// Length-prefixed bytes; state types bound every variable field well
    /// below 255 bytes
    pub fn put_var_bytes(&mut self, data: &[u8]) -> &mut Self {
        debug_assert!(data.len() <= u8::MAX as usize);
        self.buf.push(data.len() as u8);
        self.buf.extend_from_slice(data);
        self
    }

    pub fn finish(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buf)
    }
}

/// Strict field reader over a serialized state
pub struct StateReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> StateReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(bytes),
        }
    }

    pub fn read_u8(&mut self, field: &'static str) -> CodecResult<u8> {
        self.cursor
            .read_u8()
            .map_err(|_| CodecError::UnexpectedEof { field })
    }

    pub fn read_bool(&mut self, field: &'static str) -> CodecResult<bool> {
        match self.read_u8(field)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CodecError::InvalidValue {
                field,
                reason: format!("boolean byte must be 0 or 1, got {}", other),
            }),
        }
    }

    pub fn read_i8(&mut self, field: &'static str) -> CodecResult<i8> {
        self.cursor
            .read_i8()
            .map_err(|_| CodecError::UnexpectedEof { field })
    }

    pub fn read_u64(&mut self, field: &'static str) -> CodecResult<u64> {
        self.cursor
            .read_u64::<BigEndian>()
            .map_err(|_| CodecError::UnexpectedEof { field })
    }

    pub fn read_array32(&mut self, field: &'static str) -> CodecResult<[u8; 32]> {
        let mut out = [0u8; 32];
        self.cursor
            .read_exact(&mut out)
            .map_err(|_| CodecError::UnexpectedEof { field })?;
        Ok(out)
    }

    pub fn read_var_bytes(&mut self, field: &'static str) -> CodecResult<Vec<u8>> {
        let len = self.read_u8(field)? as usize;
        let mut out = vec![0u8; len];
        self.cursor
            .read_exact(&mut out)
            .map_err(|_| CodecError::UnexpectedEof { field })?;
        Ok(out)
    }

    /// Fail unless every byte has been consumed
    pub fn finish(self) -> CodecResult<()> {
        let total = self.cursor.get_ref().len() as u64;
        let remaining = total.saturating_sub(self.cursor.position());
        if remaining > 0 {
            return Err(CodecError::TrailingBytes(remaining as usize));
        }
        Ok(())
    }
}
