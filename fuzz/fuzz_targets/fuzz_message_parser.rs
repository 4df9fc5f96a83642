#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;

use snmp_core::engine::message::{decode_response, encode_response};

fuzz_target!(|data: &[u8]| {
    let bytes = Bytes::copy_from_slice(data);

    // Anything that decodes must re-encode to something that decodes the same.
    if let Ok(message) = decode_response(bytes) {
        let encoded = encode_response(message.version, &message.community, &message.pdu);
        let again = decode_response(encoded).expect("re-encoded response must decode");
        assert_eq!(again, message);
    }
});
