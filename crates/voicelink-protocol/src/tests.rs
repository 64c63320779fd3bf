//! Unit tests for the side-channel decoder.

use voicelink_types::Sender;

use crate::decode::{DeliveryIdScheme, SideChannelDecoder, SideChannelEvent};
use crate::error::ProtocolDecodeError;
use crate::frame::WireFrame;

const T0: u64 = 1_700_000_000_000;

fn decode(payload: &str) -> Result<SideChannelEvent, ProtocolDecodeError> {
    SideChannelDecoder::default().decode(payload.as_bytes(), T0)
}

// ── transcript frames ────────────────────────────────────────────────

#[test]
fn transcript_frame_decodes() {
    let event = decode(r#"{"type":"transcript","sender":"user","text":"What is RAG?","is_final":true}"#)
        .expect("decode should succeed");

    let message = match event {
        SideChannelEvent::Transcript(message) => message,
        other => panic!("expected transcript, got {:?}", other),
    };
    assert_eq!(message.id, format!("{}-user", T0));
    assert_eq!(message.sender, Sender::User);
    assert_eq!(message.text, "What is RAG?");
    assert_eq!(message.timestamp_ms, T0);
    assert!(message.is_final);
}

#[test]
fn transcript_defaults_to_final() {
    for payload in [
        r#"{"type":"transcript","sender":"agent","text":"hi"}"#,
        r#"{"type":"transcript","sender":"agent","text":"hi","is_final":null}"#,
    ] {
        match decode(payload) {
            Ok(SideChannelEvent::Transcript(message)) => assert!(message.is_final),
            other => panic!("unexpected: {:?}", other),
        }
    }
}

#[test]
fn partial_transcript_is_not_final() {
    match decode(r#"{"type":"transcript","sender":"agent","text":"Let me","is_final":false}"#) {
        Ok(SideChannelEvent::Transcript(message)) => {
            assert!(!message.is_final);
            assert_eq!(message.id, format!("{}-agent", T0));
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn transcript_with_unknown_sender_is_rejected() {
    let result = decode(r#"{"type":"transcript","sender":"system","text":"x"}"#);
    assert!(matches!(result, Err(ProtocolDecodeError::Json(_))));
}

#[test]
fn transcript_missing_text_is_rejected() {
    let result = decode(r#"{"type":"transcript","sender":"user"}"#);
    assert!(matches!(result, Err(ProtocolDecodeError::Json(_))));
}

// ── rag_sources frames ───────────────────────────────────────────────

#[test]
fn rag_sources_frame_preserves_order() {
    let payload = r#"{
        "type": "rag_sources",
        "query": "refund policy",
        "sources": [
            {"filename": "policy.pdf", "text": "Refunds within 30 days", "score": 0.91, "chunk_id": "c1"},
            {"filename": "faq.md", "text": "Contact support", "score": 0.44}
        ]
    }"#;

    let SideChannelEvent::Citations { sources, query } = decode(payload).unwrap() else {
        panic!("expected citations");
    };
    assert_eq!(query, "refund policy");
    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0].filename, "policy.pdf");
    assert_eq!(sources[1].filename, "faq.md");
    assert!((sources[1].score - 0.44).abs() < f64::EPSILON);
}

#[test]
fn empty_rag_batch_is_valid() {
    match decode(r#"{"type":"rag_sources","sources":[],"query":"q"}"#) {
        Ok(SideChannelEvent::Citations { sources, query }) => {
            assert!(sources.is_empty());
            assert_eq!(query, "q");
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn rag_sources_without_query_is_rejected() {
    let result = decode(r#"{"type":"rag_sources","sources":[]}"#);
    assert!(matches!(result, Err(ProtocolDecodeError::Json(_))));
}

// ── malformed and unknown frames ─────────────────────────────────────

#[test]
fn non_json_payload_is_rejected() {
    assert!(matches!(decode("not json"), Err(ProtocolDecodeError::Json(_))));
    assert!(matches!(decode(""), Err(ProtocolDecodeError::Json(_))));
}

#[test]
fn non_utf8_payload_is_rejected() {
    let result = SideChannelDecoder::default().decode(&[0xff, 0xfe, 0x00], T0);
    assert!(matches!(result, Err(ProtocolDecodeError::Utf8(_))));
}

#[test]
fn unknown_type_is_rejected() {
    let result = decode(r#"{"type":"agent_state","state":"thinking"}"#);
    assert!(matches!(result, Err(ProtocolDecodeError::UnknownType)));
}

#[test]
fn missing_type_is_rejected() {
    let result = decode(r#"{"sender":"user","text":"hi"}"#);
    assert!(matches!(result, Err(ProtocolDecodeError::Json(_))));
}

// ── delivery ids ─────────────────────────────────────────────────────

#[test]
fn timestamp_ids_collide_within_one_millisecond() {
    let mut decoder = SideChannelDecoder::new(DeliveryIdScheme::TimestampSender);
    let first = br#"{"type":"transcript","sender":"agent","text":"one"}"#;
    let second = br#"{"type":"transcript","sender":"agent","text":"two"}"#;
    let user = br#"{"type":"transcript","sender":"user","text":"three"}"#;

    let id = |event: SideChannelEvent| match event {
        SideChannelEvent::Transcript(m) => m.id,
        other => panic!("unexpected: {:?}", other),
    };

    let a = id(decoder.decode(first, T0).unwrap());
    let b = id(decoder.decode(second, T0).unwrap());
    let c = id(decoder.decode(user, T0).unwrap());
    let d = id(decoder.decode(second, T0 + 1).unwrap());

    assert_eq!(a, b, "same sender, same millisecond");
    assert_ne!(a, c, "different sender");
    assert_ne!(a, d, "different millisecond");
}

#[test]
fn sequenced_ids_never_collide() {
    let mut decoder = SideChannelDecoder::new(DeliveryIdScheme::Sequenced);
    let frame = br#"{"type":"transcript","sender":"agent","text":"x"}"#;

    let ids: Vec<String> = (0..3)
        .map(|_| match decoder.decode(frame, T0).unwrap() {
            SideChannelEvent::Transcript(m) => m.id,
            other => panic!("unexpected: {:?}", other),
        })
        .collect();

    assert_eq!(
        ids,
        vec![
            format!("{}-agent-1", T0),
            format!("{}-agent-2", T0),
            format!("{}-agent-3", T0)
        ]
    );
}

#[test]
fn rejected_frames_do_not_advance_sequence() {
    let mut decoder = SideChannelDecoder::new(DeliveryIdScheme::Sequenced);
    assert!(decoder.decode(b"garbage", T0).is_err());
    match decoder.decode(br#"{"type":"transcript","sender":"user","text":"x"}"#, T0) {
        Ok(SideChannelEvent::Transcript(m)) => assert_eq!(m.id, format!("{}-user-1", T0)),
        other => panic!("unexpected: {:?}", other),
    }
}

// ── wire shape ───────────────────────────────────────────────────────

#[test]
fn wire_frame_serializes_with_type_tag() {
    let frame = WireFrame::Transcript {
        sender: Sender::Agent,
        text: "hello".to_string(),
        is_final: Some(false),
    };
    let value = serde_json::to_value(&frame).unwrap();
    assert_eq!(value["type"], "transcript");
    assert_eq!(value["sender"], "agent");
    assert_eq!(value["is_final"], false);
}
