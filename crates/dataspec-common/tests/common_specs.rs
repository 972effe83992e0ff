//! Composed common specs used inside larger schemas

use dataspec_common::{
    ipv4_address, lowercased_str_set, optional_str, port_number, range_len, str_list_or_single, word_str,
};
use dataspec_core::{DictSpec, FailureKind, Reference, Spec};
use proptest::prelude::*;
use serde_json::json;

fn listener_spec() -> DictSpec {
    DictSpec::new()
        .named("listener")
        .key("name", word_str().with_constraint(range_len(1, 16)))
        .key("address", ipv4_address())
        .key("port", port_number().unwrap())
        .key("health_port", Reference::to("port"))
        .key("protocols", lowercased_str_set())
        .key("aliases", str_list_or_single().unwrap().with_default(json!([])))
        .key("description", optional_str().unwrap())
}

#[test]
fn test_listener_canonical_form() {
    let canonical = listener_spec()
        .check(&json!({
            "name": "edge_1",
            "address": " 192.168.1.10 ",
            "port": "8443",
            "protocols": ["HTTP", "http", "H2"],
            "aliases": "edge",
        }))
        .map_err(|e| e.message)
        .unwrap_or_else(|m| panic!("listener should be valid: {}", m));

    assert_eq!(
        canonical,
        json!({
            "name": "edge_1",
            "address": "192.168.1.10",
            "port": 8443,
            "protocols": ["http", "h2"],
            "aliases": ["edge"],
            "health_port": 8443,
            "description": null,
        })
    );
}

#[test]
fn test_listener_reports_every_problem() {
    let error = listener_spec()
        .check(&json!({
            "name": "bad name",
            "address": "not-an-ip",
            "port": 0,
            "protocols": "http",
            "extra": true,
        }))
        .unwrap_err();

    assert_eq!(error.summary, "Does not conform with listener schema");
    let kinds: Vec<FailureKind> = error.violations.iter().map(|v| v.kind).collect();
    assert_eq!(
        kinds,
        vec![
            FailureKind::ConstraintViolation,
            FailureKind::CanonicalizationFailed,
            FailureKind::ConstraintViolation,
            FailureKind::NotIterable,
            FailureKind::UnexpectedKey,
            FailureKind::UnresolvableReference,
        ]
    );
}

#[test]
fn test_list_or_single_under_typed_keys() {
    let spec = DictSpec::new().typed_key(word_str(), str_list_or_single().unwrap());
    let canonical = spec.check(&json!({"a": "x", "b": ["y", "z"]})).unwrap();
    assert_eq!(canonical, json!({"a": ["x"], "b": ["y", "z"]}));

    let error = spec.check(&json!({"not a word": "x"})).unwrap_err();
    assert!(error.has_violation(FailureKind::UnexpectedKey));
}

proptest! {
    /// Property: every in-range port, as integer or string, canonicalizes to itself
    #[test]
    fn prop_port_numbers(port in 1i64..=65535, as_string in any::<bool>()) {
        let input = if as_string { json!(port.to_string()) } else { json!(port) };
        prop_assert_eq!(port_number().unwrap().check(&input).unwrap(), json!(port));
    }

    /// Property: out-of-range ports are always rejected
    #[test]
    fn prop_out_of_range_ports(port in prop_oneof![i64::MIN..1, 65536i64..i64::MAX]) {
        prop_assert!(port_number().unwrap().check(&json!(port)).is_err());
    }

    /// Property: single strings and one-element lists canonicalize alike
    #[test]
    fn prop_single_equals_singleton_list(s in "[a-z]{1,10}") {
        let spec = str_list_or_single().unwrap();
        prop_assert_eq!(spec.check(&json!(s.clone())).unwrap(), spec.check(&json!([s])).unwrap());
    }
}
