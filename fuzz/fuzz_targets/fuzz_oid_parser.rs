#![no_main]

use libfuzzer_sys::fuzz_target;

use snmp_core::oid::Oid;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    // Dotted notation must survive a display/parse cycle.
    if let Ok(oid) = Oid::parse(s) {
        let reparsed = Oid::parse(&oid.to_string()).expect("displayed OID must parse");
        assert_eq!(reparsed, oid);
        let _ = oid.validate();
    }
});
