//! BER length encoding and decoding.
//!
//! Length encoding follows X.690 Section 8.1.3:
//! - Short form: Single byte, bit 8=0, value 0-127
//! - Long form: Initial byte (bit 8=1, bits 7-1=count), followed by length bytes
//! - Indefinite form (0x80): rejected

use crate::error::internal::{DecodeError, DecodeErrorKind, DecodeResult};

/// Maximum length accepted by the decoder (2 MiB).
pub const MAX_LENGTH: usize = 0x200000;

/// Encode a length in reverse order, ready to be pushed onto an
/// [`EncodeBuf`](super::EncodeBuf).
///
/// Returns the bytes and how many of them are valid.
pub fn encode_length(len: usize) -> ([u8; 5], usize) {
    let mut buf = [0u8; 5];

    if len <= 127 {
        buf[0] = len as u8;
        return (buf, 1);
    }

    let mut remaining = len;
    let mut count = 0;
    while remaining > 0 && count < 4 {
        buf[count] = remaining as u8;
        remaining >>= 8;
        count += 1;
    }
    buf[count] = 0x80 | count as u8;
    (buf, count + 1)
}

/// Decode a length, returning `(length, bytes_consumed)`.
///
/// `base_offset` is the position of `data` inside the enclosing message and is
/// only used for error reporting.
pub(crate) fn decode_length(data: &[u8], base_offset: usize) -> DecodeResult<(usize, usize)> {
    let Some(&first) = data.first() else {
        return Err(DecodeError::new(base_offset, DecodeErrorKind::TruncatedData));
    };

    if first == 0x80 {
        return Err(DecodeError::new(
            base_offset,
            DecodeErrorKind::IndefiniteLength,
        ));
    }

    if first & 0x80 == 0 {
        return Ok((first as usize, 1));
    }

    let num_octets = (first & 0x7F) as usize;
    if num_octets > 4 {
        return Err(DecodeError::new(
            base_offset,
            DecodeErrorKind::LengthTooLong { octets: num_octets },
        ));
    }
    if data.len() < 1 + num_octets {
        return Err(DecodeError::new(base_offset, DecodeErrorKind::TruncatedData));
    }

    // Non-minimal long forms are accepted (X.690 8.1.3.5 note 2).
    let len = data[1..=num_octets]
        .iter()
        .fold(0usize, |acc, &b| (acc << 8) | b as usize);

    if len > MAX_LENGTH {
        return Err(DecodeError::new(
            base_offset,
            DecodeErrorKind::LengthExceedsMax {
                length: len,
                max: MAX_LENGTH,
            },
        ));
    }

    Ok((len, 1 + num_octets))
}
