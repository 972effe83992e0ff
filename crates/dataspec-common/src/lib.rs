//! Dataspec Common - reusable specs built on `dataspec-core`
//!
//! ```rust
//! use dataspec_common::{port_number, str_list_or_single};
//! use dataspec_core::Spec;
//! use serde_json::json;
//!
//! assert_eq!(port_number().unwrap().check(&json!("443")).unwrap(), json!(443));
//! assert_eq!(str_list_or_single().unwrap().check(&json!("a")).unwrap(), json!(["a"]));
//! ```
//!
//! Copyright (c) 2025 Dataspec Team
//! Licensed under the Apache-2.0 license

pub mod constraints;
pub mod specs;

pub use constraints::{contains, exact_len, max_len, max_value, min_len, min_value, range_len, range_value};
pub use specs::{
    ipv4_address, ipv6_address, list_or_single, lowercased_str, lowercased_str_list, lowercased_str_set,
    number, optional_bool, optional_float, optional_int, optional_str, port_number, str_list,
    str_list_or_single, str_set, user_float, user_integer, word_str, word_str_min_len_3,
};
