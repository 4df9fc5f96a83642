//! BER (Basic Encoding Rules) codec for SNMP.
//!
//! Encoding and decoding of the X.690 subset used by community-based SNMP.
//! Parsing is permissive about non-minimal encodings and strict about
//! lengths: indefinite lengths and anything over [`MAX_LENGTH`] are refused.

mod decode;
mod encode;
mod length;
pub mod tag;

pub(crate) use decode::Decoder;
pub use encode::EncodeBuf;
pub use length::{MAX_LENGTH, encode_length};
