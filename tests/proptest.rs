//! Property-based tests for the codec and the OID tree.

mod common;

use bytes::Bytes;
use mibwalk::message::CommunityMessage;
use mibwalk::{MatchPolicy, Oid, Pdu, Value, VarBind};
use num_bigint::BigInt;
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

/// OIDs that survive BER: first arc 0 or 1 with the second below 40, or
/// first arc 2 with any second arc that still packs into 32 bits.
fn arb_oid() -> impl Strategy<Value = Oid> {
    let head = prop_oneof![
        (0u32..=1, 0u32..40),
        (Just(2u32), 0u32..=u32::MAX - 80),
    ];
    (head, prop::collection::vec(any::<u32>(), 0..=14))
        .prop_map(|((first, second), rest)| Oid::new([first, second].into_iter().chain(rest)))
}

/// Any arcs at all, weighted towards the edges of the first two.
fn arb_any_oid() -> impl Strategy<Value = Oid> {
    prop::collection::vec(prop_oneof![0u32..=45, u32::MAX - 100..=u32::MAX, any::<u32>()], 1..=8)
        .prop_map(|arcs| Oid::new(arcs))
}

fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(|n| Value::integer(n)),
        prop::collection::vec(any::<u8>(), 0..64).prop_map(|v| Value::OctetString(Bytes::from(v))),
        Just(Value::Null),
        arb_oid().prop_map(Value::ObjectIdentifier),
        any::<[u8; 4]>().prop_map(Value::IpAddress),
        any::<u32>().prop_map(Value::Counter32),
        any::<u32>().prop_map(Value::Gauge32),
        any::<u32>().prop_map(Value::TimeTicks),
        any::<u64>().prop_map(Value::Counter64),
    ]
}

fn arb_message() -> impl Strategy<Value = CommunityMessage> {
    (
        prop::collection::vec(any::<u8>(), 0..16),
        any::<i32>(),
        0i32..=5,
        prop::collection::vec((arb_oid(), arb_value()), 0..6),
    )
        .prop_map(|(community, request_id, error_status, varbinds)| {
            let varbinds: Vec<VarBind> = varbinds
                .into_iter()
                .map(|(oid, value)| VarBind::new(oid, value))
                .collect();
            let mut pdu = Pdu::get_response(request_id, varbinds);
            pdu.error_status = error_status;
            pdu.error_index = if error_status == 0 { 0 } else { 1 };
            CommunityMessage::new(community, pdu)
        })
}

// =============================================================================
// Codec properties
// =============================================================================

proptest! {
    #[test]
    fn message_survives_the_wire(msg in arb_message()) {
        let decoded = CommunityMessage::decode(msg.encode()).unwrap();
        prop_assert_eq!(decoded.community, msg.community);
        prop_assert_eq!(decoded.pdu, msg.pdu);
    }

    /// Every strict prefix of a valid message is rejected, never accepted
    /// and never a panic.
    #[test]
    fn truncated_message_is_rejected(msg in arb_message(), cut in any::<prop::sample::Index>()) {
        let wire = msg.encode();
        let len = cut.index(wire.len());
        let err = CommunityMessage::decode(wire.slice(..len)).unwrap_err();
        prop_assert!(err.is_decode(), "{:?}", err);
    }

    #[test]
    fn arbitrary_bytes_do_not_panic(data in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = CommunityMessage::decode(Bytes::from(data));
    }

    #[test]
    fn integers_of_any_size_round_trip(bytes in prop::collection::vec(any::<u8>(), 1..40), negative in any::<bool>()) {
        let mut n = BigInt::from_bytes_be(num_bigint::Sign::Plus, &bytes);
        if negative {
            n = -n;
        }
        let value = Value::Integer(n);
        prop_assert_eq!(Value::from_ber(value.to_ber()).unwrap(), value);
    }

    #[test]
    fn counter32_wraps(n in any::<i128>()) {
        let expected = n.rem_euclid(1i128 << 32) as u32;
        prop_assert_eq!(Value::counter32(n), Value::Counter32(expected));
    }

    #[test]
    fn gauge32_clamps(n in any::<i128>()) {
        let expected = n.clamp(0, u32::MAX as i128) as u32;
        prop_assert_eq!(Value::gauge32(n), Value::Gauge32(expected));
    }

    #[test]
    fn oid_text_round_trips(oid in arb_oid()) {
        prop_assert_eq!(Oid::parse(&oid.to_string()).unwrap(), oid);
    }

    /// An OID either survives BER unchanged or is refused up front.
    #[test]
    fn oid_is_encoded_faithfully_or_refused(oid in arb_any_oid()) {
        let text = oid.to_string();
        if oid.validate().is_ok() {
            prop_assert_eq!(&Oid::from_ber(&oid.to_ber()).unwrap(), &oid);
            prop_assert_eq!(Oid::parse(&text).unwrap(), oid);
        } else {
            prop_assert!(Oid::parse(&text).is_err(), "{} parsed", text);
            let mut value = Value::ObjectIdentifier(Oid::empty());
            prop_assert!(value.set_value(text.as_str()).is_err());
        }
    }
}

// =============================================================================
// Tree properties
// =============================================================================

proptest! {
    /// The nearest node's numeric path is always an arc-prefix of the query,
    /// and its OID is the longest such prefix in the tree.
    #[test]
    fn nearest_is_longest_known_prefix(tail in prop::collection::vec(0u32..12, 0..8)) {
        let tree = common::mib_tree();
        let query = Oid::new([1, 3, 6, 1, 2, 1].into_iter().chain(tail));

        let node = tree.find_nearest(&query).unwrap();
        let path = tree.path_numbers(node);
        prop_assert!(query.arcs().starts_with(&path));

        let next_arc = query.arcs().get(path.len()).copied();
        if let Some(arc) = next_arc {
            prop_assert!(tree.children(node).iter().all(|&c| tree.node(c).subid() != arc));
        }
    }

    /// Exact lookup finds a node only when its path is the whole query.
    #[test]
    fn exact_matches_only_whole_paths(tail in prop::collection::vec(0u32..12, 0..8)) {
        let tree = common::mib_tree();
        let query = Oid::new([1, 3, 6, 1, 2, 1].into_iter().chain(tail));

        let exact = tree.find_by_oid(&query.to_string(), MatchPolicy::Exact).unwrap();
        let nearest = tree.find_nearest(&query).unwrap();
        if tree.path_numbers(nearest).len() == query.len() {
            prop_assert_eq!(exact, Some(nearest));
        } else {
            prop_assert_eq!(exact, None);
        }
    }
}
