//! BER decoding.
//!
//! Zero-copy decoding over `Bytes`. Failures carry a [`DecodeErrorKind`] and the
//! offset where they were detected; callers log these and report a
//! `MalformedResponse` to the user.

use super::length::decode_length;
use super::tag;
use crate::error::internal::{DecodeError, DecodeErrorKind, DecodeResult};
use crate::oid::Oid;
use bytes::Bytes;

/// BER decoder that reads from a byte buffer.
pub(crate) struct Decoder {
    data: Bytes,
    offset: usize,
    /// Offset of `data[0]` within the outermost message.
    base: usize,
}

impl Decoder {
    pub fn new(data: Bytes) -> Self {
        Self {
            data,
            offset: 0,
            base: 0,
        }
    }

    #[cfg(test)]
    pub fn from_slice(data: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(data))
    }

    /// Absolute position in the outermost message.
    pub fn position(&self) -> usize {
        self.base + self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.offset >= self.data.len()
    }

    pub fn peek_tag(&self) -> Option<u8> {
        self.data.get(self.offset).copied()
    }

    fn fail<T>(&self, kind: DecodeErrorKind) -> DecodeResult<T> {
        Err(DecodeError::new(self.position(), kind))
    }

    pub fn read_tag(&mut self) -> DecodeResult<u8> {
        match self.peek_tag() {
            Some(tag) => {
                self.offset += 1;
                Ok(tag)
            }
            None => self.fail(DecodeErrorKind::TruncatedData),
        }
    }

    pub fn read_length(&mut self) -> DecodeResult<usize> {
        let (len, consumed) = decode_length(&self.data[self.offset..], self.position())?;
        self.offset += consumed;
        Ok(len)
    }

    /// Read `len` content bytes without copying.
    pub fn read_bytes(&mut self, len: usize) -> DecodeResult<Bytes> {
        let end = self.offset.saturating_add(len);
        if end > self.data.len() {
            return self.fail(DecodeErrorKind::TlvOverflow);
        }
        let bytes = self.data.slice(self.offset..end);
        self.offset = end;
        Ok(bytes)
    }

    /// Read a tag, check it, and return the content length.
    pub fn expect_tag(&mut self, expected: u8) -> DecodeResult<usize> {
        let actual = self.read_tag()?;
        if actual != expected {
            return Err(DecodeError::new(
                self.position() - 1,
                DecodeErrorKind::UnexpectedTag { expected, actual },
            ));
        }
        self.read_length()
    }

    pub fn read_integer(&mut self) -> DecodeResult<i32> {
        let len = self.expect_tag(tag::universal::INTEGER)?;
        self.read_integer_value(len)
    }

    /// Signed integer content. Non-minimal encodings are accepted as long as
    /// the value fits in 32 bits.
    pub fn read_integer_value(&mut self, len: usize) -> DecodeResult<i32> {
        if len == 0 {
            return self.fail(DecodeErrorKind::ZeroLengthInteger);
        }
        let at = self.position();
        let bytes = self.read_bytes(len)?;

        let negative = bytes[0] & 0x80 != 0;
        let mut value: i64 = if negative { -1 } else { 0 };
        for &byte in bytes.iter() {
            value = (value << 8) | i64::from(byte);
            if value > i64::from(i32::MAX) || value < i64::from(i32::MIN) {
                return Err(DecodeError::new(at, DecodeErrorKind::IntegerOverflow));
            }
        }
        Ok(value as i32)
    }

    /// Unsigned 32-bit content (Counter32, Gauge32, TimeTicks).
    pub fn read_unsigned32_value(&mut self, len: usize) -> DecodeResult<u32> {
        let value = self.read_unsigned_value(len, 5)?;
        u32::try_from(value)
            .or_else(|_| self.fail(DecodeErrorKind::IntegerOverflow))
    }

    /// Counter64 content.
    pub fn read_counter64_value(&mut self, len: usize) -> DecodeResult<u64> {
        if len > 9 {
            return self.fail(DecodeErrorKind::Integer64TooLong { length: len });
        }
        self.read_unsigned_value(len, 9)
    }

    fn read_unsigned_value(&mut self, len: usize, max_len: usize) -> DecodeResult<u64> {
        if len == 0 {
            return self.fail(DecodeErrorKind::ZeroLengthInteger);
        }
        if len > max_len {
            return self.fail(DecodeErrorKind::IntegerOverflow);
        }
        let bytes = self.read_bytes(len)?;
        let mut value: u64 = 0;
        for &byte in bytes.iter() {
            value = (value << 8) | u64::from(byte);
        }
        if len == max_len && bytes[0] != 0 {
            return self.fail(DecodeErrorKind::IntegerOverflow);
        }
        Ok(value)
    }

    pub fn read_octet_string(&mut self) -> DecodeResult<Bytes> {
        let len = self.expect_tag(tag::universal::OCTET_STRING)?;
        self.read_bytes(len)
    }

    #[cfg(test)]
    pub fn read_null(&mut self) -> DecodeResult<()> {
        let len = self.expect_tag(tag::universal::NULL)?;
        if len != 0 {
            return self.fail(DecodeErrorKind::InvalidNull);
        }
        Ok(())
    }

    pub fn read_oid(&mut self) -> DecodeResult<Oid> {
        let len = self.expect_tag(tag::universal::OBJECT_IDENTIFIER)?;
        self.read_oid_value(len)
    }

    pub fn read_oid_value(&mut self, len: usize) -> DecodeResult<Oid> {
        let at = self.position();
        let bytes = self.read_bytes(len)?;
        Oid::from_ber(&bytes).map_err(|kind| DecodeError::new(at, kind))
    }

    pub fn read_sequence(&mut self) -> DecodeResult<Decoder> {
        self.read_constructed(tag::universal::SEQUENCE)
    }

    /// Read a constructed TLV and return a decoder over its contents.
    pub fn read_constructed(&mut self, expected_tag: u8) -> DecodeResult<Decoder> {
        let len = self.expect_tag(expected_tag)?;
        self.sub_decoder(len)
    }

    /// Decoder over the next `len` bytes.
    pub fn sub_decoder(&mut self, len: usize) -> DecodeResult<Decoder> {
        let base = self.position();
        let data = self.read_bytes(len)?;
        Ok(Decoder {
            data,
            offset: 0,
            base,
        })
    }
}
