//! Canonical query strings.
//!
//! Keys are emitted in ascending order so the same parameters always produce
//! the same URL. Everything outside the RFC 3986 unreserved set is escaped,
//! which covers `: / ? & = ; + ! @ # $ ( ) ' , *` and space (`%20`, never `+`).

use std::collections::BTreeMap;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Query parameters. `BTreeMap` iteration order is the encoding order.
pub type QueryParams = BTreeMap<String, String>;

// https://tools.ietf.org/html/rfc3986#section-2.3
const ESCAPE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub fn escape(s: &str) -> String {
    utf8_percent_encode(s, ESCAPE_SET).to_string()
}

/// Encode `params` as `k1=v1&k2=v2`, keys ascending, no trailing separator.
pub fn encode_query(params: &QueryParams) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", escape(k), escape(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Like [`encode_query`] for mappings whose iteration order is arbitrary.
pub fn encode_query_from<I, K, V>(params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let sorted: QueryParams = params
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect();
    encode_query(&sorted)
}
