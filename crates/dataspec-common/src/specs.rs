//! Reusable composed specs
//!
//! Each function builds a fresh spec tree; callers are free to extend the
//! returned node with further constraints or defaults.

use crate::constraints::min_len;
use dataspec_core::{
    is_null_or_empty, Alternative, Collection, Constraint, IterSpec, SchemaError, TypeSpec, Type,
    TypeTag,
};
use regex::Regex;
use serde_json::Value;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::OnceLock;

static WORD_REGEX: OnceLock<Regex> = OnceLock::new();

fn word_regex() -> &'static Regex {
    WORD_REGEX.get_or_init(|| Regex::new(r"^\w*$").expect("word pattern is a valid regex"))
}

/// Explicit zeros and `false` are values here, not "unset"
fn optional(tag: TypeTag) -> Result<TypeSpec, SchemaError> {
    Ok(TypeSpec::new([tag])?.optional().with_unset_predicate(is_null_or_empty))
}

pub fn optional_bool() -> Result<TypeSpec, SchemaError> {
    optional(TypeTag::BOOL)
}

pub fn optional_str() -> Result<TypeSpec, SchemaError> {
    optional(TypeTag::STR)
}

pub fn optional_int() -> Result<TypeSpec, SchemaError> {
    optional(TypeTag::INT)
}

pub fn optional_float() -> Result<TypeSpec, SchemaError> {
    optional(TypeTag::FLOAT)
}

fn parsed_str<T, F>(parse: F) -> Type
where
    T: std::str::FromStr + 'static,
    T::Err: std::fmt::Display,
    F: Fn(T) -> Value + Send + Sync + 'static,
{
    Type::new(TypeTag::STR).try_map(move |v| {
        let s = v.as_str().unwrap_or_default();
        s.trim().parse::<T>().map(&parse).map_err(|e| e.to_string())
    })
}

/// An integer, or a string holding one
pub fn user_integer() -> Result<TypeSpec, SchemaError> {
    TypeSpec::new(vec![
        Alternative::from(TypeTag::INT),
        Alternative::from(parsed_str::<i64, _>(Value::from)),
    ])
}

/// A float, or a string holding one
pub fn user_float() -> Result<TypeSpec, SchemaError> {
    TypeSpec::new(vec![
        Alternative::from(TypeTag::FLOAT),
        Alternative::from(parsed_str::<f64, _>(Value::from)),
    ])
}

/// Integer first, then float; strings are parsed the same way
pub fn number() -> Result<TypeSpec, SchemaError> {
    TypeSpec::new([user_integer()?, user_float()?])
}

pub fn lowercased_str() -> Type {
    Type::new(TypeTag::STR).map(|v| Value::String(v.as_str().unwrap_or_default().to_lowercase()))
}

pub fn str_list() -> IterSpec {
    IterSpec::new(TypeTag::STR)
}

pub fn str_set() -> IterSpec {
    str_list().with_collection(Collection::Set)
}

pub fn lowercased_str_list() -> IterSpec {
    IterSpec::new(lowercased_str())
}

pub fn lowercased_str_set() -> IterSpec {
    lowercased_str_list().with_collection(Collection::Set)
}

/// A list of `tag` values, or a single value wrapped into a one-element list
pub fn list_or_single(tag: TypeTag) -> Result<TypeSpec, SchemaError> {
    TypeSpec::new(vec![
        Alternative::from(IterSpec::new(tag.clone())),
        Alternative::from(Type::new(tag).map(|v| Value::Array(vec![v.clone()]))),
    ])
}

pub fn str_list_or_single() -> Result<TypeSpec, SchemaError> {
    list_or_single(TypeTag::STR)
}

/// Dotted-quad address, rendered canonically
pub fn ipv4_address() -> Type {
    parsed_str::<Ipv4Addr, _>(|addr| Value::String(addr.to_string()))
}

/// IPv6 address, rendered in its compressed canonical form
pub fn ipv6_address() -> Type {
    parsed_str::<Ipv6Addr, _>(|addr| Value::String(addr.to_string()))
}

pub fn port_number() -> Result<TypeSpec, SchemaError> {
    Ok(user_integer()?.with_constraint(Constraint::new(
        |v| v.as_i64().map(|n| (1..=65535).contains(&n)).unwrap_or(false),
        "Must be in port number range 1-65535",
    )))
}

/// A string of word characters only
pub fn word_str() -> Type {
    Type::new(TypeTag::STR).with_constraint(Constraint::new(
        |v| v.as_str().map(|s| word_regex().is_match(s)).unwrap_or(false),
        "Must contain only word characters",
    ))
}

pub fn word_str_min_len_3() -> Type {
    word_str().with_constraint(min_len(3))
}
