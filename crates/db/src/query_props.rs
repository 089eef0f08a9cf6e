//! Property-based tests for the query builder.
//!
//! - Literal filters always encode as `key=eq.<value>`
//! - Explicit operators are used verbatim
//! - Parameters appear only when requested

use proptest::prelude::*;

use super::{FilterOp, QueryBuilder, QuerySpec};

/// Column names: plain identifiers, which the encoder leaves untouched.
fn column() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,15}"
}

/// Values made of characters that survive form encoding unchanged.
fn plain_value() -> impl Strategy<Value = String> {
    "[A-Za-z0-9._*-]{1,24}"
}

fn operator() -> impl Strategy<Value = FilterOp> {
    prop::sample::select(FilterOp::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_literal_filter_is_eq(key in column(), value in plain_value()) {
        let spec = QuerySpec::new().eq(key.clone(), value.clone());
        let built = QueryBuilder::new("/rest/v1").build("members", &spec);
        let expected = format!("{key}=eq.{value}");
        prop_assert!(built.params.split('&').any(|pair| pair == expected));
    }

    #[test]
    fn prop_operator_verbatim(key in column(), op in operator(), value in plain_value()) {
        let spec = QuerySpec::new().filter(key.clone(), op, value.clone());
        let built = QueryBuilder::new("").build("members", &spec);
        prop_assert_eq!(built.params, format!("{key}={}.{value}", op.as_str()));
    }

    #[test]
    fn prop_filters_keep_insertion_order(
        pairs in prop::collection::vec((column(), plain_value()), 1..8)
    ) {
        let spec = pairs
            .iter()
            .fold(QuerySpec::new(), |spec, (k, v)| spec.eq(k.clone(), v.clone()));
        let built = QueryBuilder::new("/api/database").build("t", &spec);
        let expected: Vec<String> = pairs.iter().map(|(k, v)| format!("{k}=eq.{v}")).collect();
        prop_assert_eq!(built.params, expected.join("&"));
    }

    #[test]
    fn prop_optional_params_only_when_set(
        select in prop::option::of(plain_value()),
        order in prop::option::of(plain_value()),
        limit in prop::option::of(0u32..1000),
    ) {
        let spec = QuerySpec { select: select.clone(), order: order.clone(), limit, ..QuerySpec::new() };
        let built = QueryBuilder::new("/rest/v1").build("members", &spec);
        prop_assert_eq!(built.params.contains("select="), select.is_some());
        prop_assert_eq!(built.params.contains("order="), order.is_some());
        prop_assert_eq!(built.params.contains("limit="), limit.is_some());
        prop_assert_eq!(built.path_and_query().contains('?'), !built.params.is_empty());
    }
}
