//! Property-based tests for checking and canonicalization
//!
//! These tests verify that spec nodes behave consistently across a wide range
//! of generated inputs.

use dataspec_core::{
    Alternative, Collection, DictSpec, EnumSpec, IterSpec, Literal, Reference, SeqSpec, Spec, Type,
    TypeSpec, TypeTag,
};
use proptest::prelude::*;
use serde_json::{json, Value};

/// Strategy for generating random JSON values with controlled complexity
fn json_value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(n.into())),
        (-1.0e6f64..1.0e6).prop_map(|f| json!(f)),
        "[a-zA-Z0-9 ]{0,20}".prop_map(Value::String),
    ];

    leaf.prop_recursive(
        3,  // max depth
        16, // max size
        5,  // items per collection
        |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
                proptest::collection::hash_map("[a-z]{1,8}", inner, 0..5)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        },
    )
}

/// Strategy for generating values that are semantically empty
fn empty_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        Just(json!(0)),
        Just(json!(0.0)),
        Just(json!("")),
        Just(json!([])),
        Just(json!({})),
    ]
}

/// A representative schema touching every node kind
fn service_spec() -> DictSpec {
    let name = Type::new(TypeTag::STR).map(|v| json!(v.as_str().unwrap_or_default().trim().to_lowercase()));
    DictSpec::new()
        .named("service")
        .key("name", name)
        .key("port", TypeSpec::new([TypeTag::INT]).unwrap().with_default(8080))
        .key("public_port", Reference::to("port"))
        .key("mode", EnumSpec::new(["fast", "slow"]).unwrap())
        .key(
            "tags",
            TypeSpec::new(vec![
                Alternative::from(IterSpec::new(TypeTag::STR).with_collection(Collection::Set)),
                Alternative::from(Literal::Absent),
            ])
            .unwrap()
            .with_default(json!([])),
        )
        .key("origin", SeqSpec::new([TypeTag::NUMBER, TypeTag::NUMBER]))
}

fn service_input_strategy() -> impl Strategy<Value = Value> {
    (
        "[ ]{0,2}[A-Za-z]{1,12}[ ]{0,2}",
        proptest::option::of(0i64..65536),
        prop_oneof![Just("fast"), Just("slow")],
        proptest::collection::vec("[a-c]{1,2}", 0..6),
        (-100i64..100, -100.0f64..100.0),
    )
        .prop_map(|(name, port, mode, tags, (x, y))| {
            let mut input = json!({
                "name": name,
                "mode": mode,
                "tags": tags,
                "origin": [x, y],
            });
            if let Some(p) = port {
                input["port"] = json!(p);
            }
            input
        })
}

proptest! {
    /// Property: checking never panics on arbitrary input
    #[test]
    fn prop_check_never_panics(input in json_value_strategy()) {
        let spec = service_spec();
        let _ = spec.check(&input);
        let _ = IterSpec::new(TypeTag::ANY).check(&input);
        let _ = SeqSpec::new([TypeTag::INT, TypeTag::STR]).check(&input);
    }

    /// Property: the canonical value of an accepted input is a fixed point
    #[test]
    fn prop_canonicalization_is_idempotent(input in service_input_strategy()) {
        let spec = service_spec();
        let canonical = spec.check(&input).expect("generated input should be accepted");
        let again = spec.check(&canonical).expect("canonical value should be accepted");
        prop_assert_eq!(again, canonical);
    }

    /// Property: references always mirror their target
    #[test]
    fn prop_reference_mirrors_target(input in service_input_strategy()) {
        let canonical = service_spec().check(&input).expect("generated input should be accepted");
        prop_assert_eq!(&canonical["public_port"], &canonical["port"]);
    }

    /// Property: an unset value yields the default whatever the alternatives accept
    #[test]
    fn prop_default_bypass(empty in empty_value_strategy(), default in json_value_strategy()) {
        let spec = TypeSpec::new(vec![
            Alternative::from(TypeTag::ANY),
            Alternative::from(Literal::Absent),
        ])
        .unwrap()
        .with_default(default.clone());
        prop_assert_eq!(spec.check(&empty).unwrap(), default);
    }

    /// Property: enum canonicalization returns the stored instance
    #[test]
    fn prop_enum_returns_stored_instance(n in -1000i64..1000) {
        let spec = EnumSpec::new([json!(n), json!("other")]).unwrap();
        let canonical = spec.check(&json!(n as f64)).unwrap();
        prop_assert!(canonical.is_i64());
        prop_assert_eq!(canonical, json!(n));
    }

    /// Property: iterable count bounds hold on every accepted list
    #[test]
    fn prop_iterable_bounds(items in proptest::collection::vec(any::<i64>(), 0..8)) {
        let spec = IterSpec::new(TypeTag::INT).with_count(Some(1), Some(3)).unwrap();
        let result = spec.check(&json!(items));
        prop_assert_eq!(result.is_ok(), (1..=3).contains(&items.len()));
    }

    /// Property: one child message per failing position
    #[test]
    fn prop_sequence_aggregates_every_position(flags in proptest::collection::vec(any::<bool>(), 1..6)) {
        let spec = SeqSpec::new(flags.iter().map(|_| TypeTag::INT));
        let input: Vec<Value> = flags.iter().map(|&bad| if bad { json!("x") } else { json!(1) }).collect();
        let failing = flags.iter().filter(|&&bad| bad).count();

        match spec.check(&Value::Array(input)) {
            Ok(_) => prop_assert_eq!(failing, 0),
            Err(error) => prop_assert_eq!(error.child_messages().len(), failing),
        }
    }
}
