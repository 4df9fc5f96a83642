//! End-to-end operation tests over the mock engine.

mod common;

use common::*;
use snmp_core::{
    Client, Error, ErrorCategory, ErrorStatus, ManagedObject, MockEngine, PduErrorKind,
    RequestType, ResponsePdu, SessionErrorKind, Value, ValueType, VarBind, Version, oid,
};
use std::net::Ipv4Addr;
use std::time::Duration;

// =============================================================================
// GET / GETNEXT / SET
// =============================================================================

#[tokio::test]
async fn get_round_trips_octet_string() {
    init_tracing();
    let engine = MockEngine::new();
    engine.queue_bindings(vec![varbind(sys_descr(), "Linux core-sw1 6.1.0")]);

    let mut objs = objects(&[sys_descr()]);
    mock_client(&engine)
        .get(Version::V2c, COMMUNITY_RO, AGENT, &mut objs)
        .await
        .unwrap();

    assert_eq!(objs[0].oid(), &sys_descr());
    assert_eq!(objs[0].value_type(), ValueType::OctetString);
    assert_eq!(objs[0].value().as_str(), Some("Linux core-sw1 6.1.0"));
    assert_eq!(objs[0].error(), None);

    let sessions = engine.sessions();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].agent, "192.0.2.10:161".parse().unwrap());
    assert_eq!(&sessions[0].community[..], b"public");
    assert_eq!(sessions[0].version, Version::V2c);
    assert_eq!(engine.closed_sessions(), 1);
}

#[tokio::test]
async fn get_maps_mixed_types_in_order() {
    let engine = MockEngine::new();
    engine.queue_bindings(vec![
        varbind(sys_object_id(), oid!(1, 3, 6, 1, 4, 1, 8072, 3, 2, 10)),
        varbind(sys_uptime(), Value::TimeTicks(8_640_000)),
        varbind(sys_name(), "core-sw1"),
        VarBind::new(nonexistent_oid(), Value::NoSuchObject),
    ]);

    let mut objs = objects(&[sys_object_id(), sys_uptime(), sys_name(), nonexistent_oid()]);
    mock_client(&engine)
        .get(Version::V2c, COMMUNITY_RO, AGENT, &mut objs)
        .await
        .unwrap();

    let types: Vec<_> = objs.iter().map(ManagedObject::value_type).collect();
    assert_eq!(
        types,
        [
            ValueType::ObjectIdentifier,
            ValueType::TimeTicks,
            ValueType::OctetString,
            ValueType::NoSuchObject
        ]
    );
    assert_eq!(objs[1].value().to_string(), "1d 0h 0m 0s");
}

#[tokio::test]
async fn get_next_keeps_object_oids() {
    let engine = MockEngine::new();
    engine.queue_bindings(vec![varbind(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 2, 1), "eth0")]);

    let mut objs = objects(&[if_descr()]);
    mock_client(&engine)
        .get_next(Version::V1, COMMUNITY_RO, AGENT, &mut objs)
        .await
        .unwrap();

    assert_eq!(objs[0].oid(), &if_descr());
    assert_eq!(objs[0].value().as_str(), Some("eth0"));
    assert_eq!(engine.requests()[0].request_type(), RequestType::GetNext);
}

#[tokio::test]
async fn set_sends_object_values() {
    let engine = MockEngine::new();
    engine.queue_bindings(vec![
        varbind(sys_contact(), "noc@example.net"),
        varbind(sys_location(), "rack 12"),
    ]);

    let mut objs = vec![
        ManagedObject::with_value(sys_contact(), Value::from("noc@example.net")),
        ManagedObject::with_value(sys_location(), Value::from("rack 12")),
    ];
    mock_client(&engine)
        .set(Version::V2c, COMMUNITY_RW, AGENT, &mut objs)
        .await
        .unwrap();

    let request = &engine.requests()[0];
    assert_eq!(request.request_type(), RequestType::Set);
    assert_eq!(request.bindings()[0].value, Value::from("noc@example.net"));
    assert_eq!(request.bindings()[1].value, Value::from("rack 12"));
}

#[tokio::test]
async fn set_rejects_unencodable_value_before_opening() {
    let engine = MockEngine::new();
    let mut objs = vec![
        ManagedObject::with_value(sys_contact(), Value::from("noc")),
        ManagedObject::with_value(sys_location(), Value::Counter64(1)),
    ];

    let err = mock_client(&engine)
        .set(Version::V1, COMMUNITY_RW, AGENT, &mut objs)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Pdu {
            request_type: RequestType::Set,
            kind: PduErrorKind::ValueEncoding { index: 1 },
        }
    ));
    assert_eq!(engine.opened_sessions(), 0);
}

#[tokio::test]
async fn invalid_object_id_is_a_pdu_error() {
    let engine = MockEngine::new();
    let mut objs = vec![
        ManagedObject::new(sys_descr()),
        ManagedObject::new(oid!(7, 1)),
    ];
    let err = mock_client(&engine)
        .get(Version::V2c, COMMUNITY_RO, AGENT, &mut objs)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Pdu {
            kind: PduErrorKind::InvalidObjectId { index: 1 },
            ..
        }
    ));
}

// =============================================================================
// GETBULK
// =============================================================================

fn bulk_reply() -> Vec<VarBind> {
    let mut bindings = vec![varbind(oid!(1, 3, 6, 1, 2, 1, 1, 3, 0), Value::TimeTicks(500))];
    for i in 1..=5 {
        bindings.push(varbind(if_in_octets().child(i), Value::Counter32(i * 1000)));
    }
    bindings
}

#[tokio::test]
async fn get_bulk_maps_one_binding_per_object() {
    let engine = MockEngine::new();
    engine.queue_bindings(bulk_reply());

    let mut objs = objects(&[oid!(1, 3, 6, 1, 2, 1, 1, 3), if_in_octets()]);
    mock_client(&engine)
        .get_bulk(Version::V2c, COMMUNITY_RO, AGENT, &mut objs, 1, 5)
        .await
        .unwrap();

    assert_eq!(objs.len(), 2);
    assert_eq!(objs[0].value(), &Value::TimeTicks(500));
    assert_eq!(objs[1].value(), &Value::Counter32(1000));

    let request = &engine.requests()[0];
    assert_eq!(request.non_repeaters(), 1);
    assert_eq!(request.max_repetitions(), 5);
}

#[tokio::test]
async fn exchange_exposes_every_bulk_binding() {
    let engine = MockEngine::new();
    engine.queue_bindings(bulk_reply());

    let objs = objects(&[oid!(1, 3, 6, 1, 2, 1, 1, 3), if_in_octets()]);
    let response = mock_client(&engine)
        .exchange(RequestType::GetBulk, Version::V2c, COMMUNITY_RO, AGENT, &objs, 1, 5)
        .await
        .unwrap();

    assert_eq!(response.bindings.len(), 6);
    assert_eq!(response.bindings[5].oid, if_in_octets().child(5));
    assert_eq!(objs[1].value(), &Value::Null);
}

#[tokio::test]
async fn get_bulk_clamps_non_repeaters() {
    let engine = MockEngine::new();
    engine.queue_bindings(vec![varbind(sys_uptime(), Value::TimeTicks(1))]);

    let mut objs = objects(&[oid!(1, 3, 6, 1, 2, 1, 1, 3)]);
    mock_client(&engine)
        .get_bulk(Version::V2c, COMMUNITY_RO, AGENT, &mut objs, 9, 0)
        .await
        .unwrap();

    let request = &engine.requests()[0];
    assert_eq!(request.non_repeaters(), 1);
    assert_eq!(request.max_repetitions(), 0);
}

#[tokio::test]
async fn get_bulk_short_response_updates_prefix() {
    // Agent ran out of MIB after the non-repeater and one repetition of the
    // first repeater.
    let engine = MockEngine::new();
    engine.queue_bindings(vec![
        varbind(sys_uptime(), Value::TimeTicks(9)),
        VarBind::new(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 2, 1), Value::EndOfMibView),
    ]);

    let mut objs = objects(&[oid!(1, 3, 6, 1, 2, 1, 1, 3), if_descr(), if_in_octets()]);
    objs[2].set_value(Value::Counter32(77));
    mock_client(&engine)
        .get_bulk(Version::V2c, COMMUNITY_RO, AGENT, &mut objs, 1, 3)
        .await
        .unwrap();

    assert_eq!(objs[1].value(), &Value::EndOfMibView);
    assert_eq!(objs[2].value(), &Value::Counter32(77));
}

#[tokio::test]
async fn get_bulk_over_v1_is_rejected() {
    let engine = MockEngine::new();
    let mut objs = objects(&[if_descr()]);
    let err = mock_client(&engine)
        .get_bulk(
            Version::V1,
            COMMUNITY_RO,
            AGENT,
            &mut objs,
            snmp_core::DEFAULT_NON_REPEATERS,
            snmp_core::DEFAULT_MAX_REPETITIONS,
        )
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Pdu);
    assert!(matches!(
        err,
        Error::Pdu {
            kind: PduErrorKind::UnsupportedType,
            ..
        }
    ));
}

// =============================================================================
// Error status handling
// =============================================================================

#[tokio::test]
async fn v1_error_marks_the_named_object() {
    let engine = MockEngine::new();
    engine.queue_response(
        ResponsePdu::new(
            0,
            vec![
                varbind(sys_descr(), "router"),
                VarBind::null(nonexistent_oid()),
                varbind(sys_name(), "r1"),
            ],
        )
        .with_error(ErrorStatus::NoSuchName, 2),
    );

    let mut objs = objects(&[sys_descr(), nonexistent_oid(), sys_name()]);
    mock_client(&engine)
        .get(Version::V1, COMMUNITY_RO, AGENT, &mut objs)
        .await
        .unwrap();

    assert_eq!(objs[0].value().as_str(), Some("router"));
    assert_eq!(objs[1].error(), Some(ErrorStatus::NoSuchName));
    assert_eq!(objs[1].value(), &Value::Null);
    assert_eq!(objs[2].value().as_str(), Some("r1"));
}

#[tokio::test]
async fn v1_whole_pdu_error_fails() {
    let engine = MockEngine::new();
    engine.queue_response(
        ResponsePdu::new(0, vec![VarBind::null(sys_descr())]).with_error(ErrorStatus::TooBig, 0),
    );

    let mut objs = objects(&[sys_descr()]);
    let err = mock_client(&engine)
        .get(Version::V1, COMMUNITY_RO, AGENT, &mut objs)
        .await
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Protocol);
    assert!(matches!(
        err,
        Error::Snmp {
            status: ErrorStatus::TooBig,
            index: 0,
            ..
        }
    ));
    assert_eq!(objs[0].value(), &Value::Null);
}

#[tokio::test]
async fn v2c_error_carries_oid() {
    let engine = MockEngine::new();
    engine.queue_response(
        ResponsePdu::new(0, vec![varbind(sys_contact(), "x")]).with_error(ErrorStatus::NotWritable, 1),
    );

    let mut objs = vec![ManagedObject::with_value(sys_contact(), Value::from("x"))];
    let err = mock_client(&engine)
        .set(Version::V2c, COMMUNITY_RW, AGENT, &mut objs)
        .await
        .unwrap_err();

    match err {
        Error::Snmp { target, oid, .. } => {
            assert_eq!(target, Some("192.0.2.10:161".parse().unwrap()));
            assert_eq!(oid, Some(sys_contact()));
        }
        other => panic!("expected Snmp error, got {other:?}"),
    }
}

#[tokio::test]
async fn wrong_binding_count_is_malformed() {
    let engine = MockEngine::new();
    engine.queue_bindings(vec![varbind(sys_descr(), "a")]);

    let mut objs = objects(&[sys_descr(), sys_name()]);
    let err = mock_client(&engine)
        .get(Version::V2c, COMMUNITY_RO, AGENT, &mut objs)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::MalformedResponse { target: Some(_) }));
    assert_eq!(objs[0].value(), &Value::Null);
    assert_eq!(engine.closed_sessions(), 1);
}

// =============================================================================
// Sessions, retries and timeouts
// =============================================================================

#[tokio::test(start_paused = true)]
async fn timeout_is_bounded_by_retries() {
    let engine = MockEngine::new();
    let mut client = Client::builder().build_with_engine(engine.clone());
    client.set_timeout(Duration::from_millis(750));
    client.set_retries(3);

    let start = tokio::time::Instant::now();
    let mut objs = objects(&[sys_descr()]);
    let err = client
        .get(Version::V2c, COMMUNITY_RO, AGENT, &mut objs)
        .await
        .unwrap_err();

    assert_eq!(start.elapsed(), client.config().max_wait());
    assert_eq!(engine.attempts(), 4);
    match err {
        Error::Timeout { retries, elapsed, .. } => {
            assert_eq!(retries, 3);
            assert_eq!(elapsed, Duration::from_secs(3));
        }
        other => panic!("expected Timeout, got {other:?}"),
    }
    assert_eq!(engine.closed_sessions(), 1);
}

#[tokio::test(start_paused = true)]
async fn retry_recovers_after_silence() {
    let engine = MockEngine::new();
    engine.queue_timeout();
    engine.queue_bindings(vec![varbind(sys_name(), "r2")]);

    let mut objs = objects(&[sys_name()]);
    mock_client(&engine)
        .get(Version::V2c, COMMUNITY_RO, AGENT, &mut objs)
        .await
        .unwrap();

    assert_eq!(objs[0].value().as_str(), Some("r2"));
    assert_eq!(engine.attempts(), 2);
    assert_eq!(engine.requests().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn config_changes_apply_to_later_operations() {
    let engine = MockEngine::new();
    let mut client = mock_client(&engine);
    let mut objs = objects(&[sys_name()]);

    client.set_retries(0);
    let _ = client.get(Version::V2c, COMMUNITY_RO, AGENT, &mut objs).await;
    client.set_retries(5);
    client.set_port(1161);
    let _ = client.get(Version::V2c, COMMUNITY_RO, AGENT, &mut objs).await;

    let sessions = engine.sessions();
    assert_eq!(sessions[0].retries, 0);
    assert_eq!(sessions[0].agent.port(), 161);
    assert_eq!(sessions[1].retries, 5);
    assert_eq!(sessions[1].agent.port(), 1161);
    assert_eq!(engine.attempts(), 1 + 6);
}

#[tokio::test]
async fn network_error_is_not_retried() {
    let engine = MockEngine::new();
    engine.queue_network_error("connection refused");
    engine.queue_bindings(vec![varbind(sys_name(), "never")]);

    let mut objs = objects(&[sys_name()]);
    let err = mock_client(&engine)
        .get(Version::V2c, COMMUNITY_RO, AGENT, &mut objs)
        .await
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Transport);
    assert_eq!(engine.remaining_replies(), 1);
    assert_eq!(engine.closed_sessions(), 1);
}

#[tokio::test]
async fn engine_open_failure() {
    let engine = MockEngine::new();
    engine.fail_open(true);

    let mut objs = objects(&[sys_name()]);
    let err = mock_client(&engine)
        .get(Version::V2c, COMMUNITY_RO, AGENT, &mut objs)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Session {
            kind: SessionErrorKind::EngineInit,
            ..
        }
    ));
    assert!(engine.requests().is_empty());
}

#[tokio::test]
async fn unresolvable_hostname_never_reaches_engine() {
    let engine = MockEngine::new();
    let mut objs = objects(&[sys_name()]);
    let err = mock_client(&engine)
        .get(Version::V2c, COMMUNITY_RO, "nonexistent.invalid", &mut objs)
        .await
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Session);
    assert!(matches!(
        err,
        Error::Session {
            kind: SessionErrorKind::Resolution,
            ..
        }
    ));
    assert_eq!(engine.opened_sessions(), 0);
}

#[tokio::test(start_paused = true)]
async fn dropped_operation_closes_session() {
    let engine = MockEngine::new();
    let client = mock_client(&engine);
    let mut objs = objects(&[sys_name()]);

    let result = tokio::time::timeout(
        Duration::from_millis(50),
        client.get(Version::V2c, COMMUNITY_RO, AGENT, &mut objs),
    )
    .await;

    assert!(result.is_err());
    assert_eq!(engine.opened_sessions(), 1);
    assert_eq!(engine.closed_sessions(), 1);
}

#[tokio::test]
async fn concurrent_operations_use_separate_sessions() {
    let engine = MockEngine::new();
    for i in 0..4 {
        engine.queue_bindings(vec![varbind(sys_uptime(), Value::TimeTicks(i))]);
    }
    let client = std::sync::Arc::new(mock_client(&engine));

    let mut handles = Vec::new();
    for i in 0..4u8 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            let agent = Ipv4Addr::new(192, 0, 2, 100 + i).to_string();
            let mut objs = objects(&[sys_uptime()]);
            client
                .get(Version::V2c, COMMUNITY_RO, &agent, &mut objs)
                .await
                .map(|_| objs)
        }));
    }
    for handle in handles {
        let objs = handle.await.unwrap().unwrap();
        assert_eq!(objs[0].value_type(), ValueType::TimeTicks);
    }

    assert_eq!(engine.opened_sessions(), 4);
    assert_eq!(engine.closed_sessions(), 4);
}
