//! Diagram-safe entity identifiers.
//!
//! Two forms, with disjoint ranges:
//!
//! - plain: `schema_table`, used when the schema is `[A-Za-z0-9]+` and the
//!   table is `[A-Za-z0-9_]+`. The schema holds no `_`, so the first `_`
//!   is always the separator. Always starts with an alphanumeric.
//! - escaped: `_<n>_<enc(schema)>_<enc(table)>`, where `n` is the length of
//!   `enc(schema)` and `enc` keeps ASCII alphanumerics and writes any other
//!   character as `_<hex codepoint>_`. Always starts with `_`.
//!
//! Both forms decode back to the original pair, so the mapping is injective.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Safe identifier for one (schema, table) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(schema: &str, table: &str) -> Self {
        if is_plain(schema, table) {
            return EntityId(format!("{}_{}", schema, table));
        }

        let schema_enc = encode(schema);
        EntityId(format!(
            "_{}_{}_{}",
            schema_enc.len(),
            schema_enc,
            encode(table)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Recover the (schema, table) pair, or `None` if `id` is not a
    /// canonical identifier.
    pub fn decode(id: &str) -> Option<(String, String)> {
        if let Some(rest) = id.strip_prefix('_') {
            let (len, rest) = rest.split_once('_')?;
            let len: usize = len.parse().ok()?;
            if rest.len() < len + 1 || !rest.is_char_boundary(len) {
                return None;
            }
            let (schema_enc, rest) = rest.split_at(len);
            let table_enc = rest.strip_prefix('_')?;
            let schema = decode_part(schema_enc)?;
            let table = decode_part(table_enc)?;
            // Pairs that qualify for the plain form never use this one
            if is_plain(&schema, &table) {
                return None;
            }
            return Some((schema, table));
        }

        let (schema, table) = id.split_once('_')?;
        is_plain(schema, table).then(|| (schema.to_string(), table.to_string()))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn is_plain(schema: &str, table: &str) -> bool {
    !schema.is_empty()
        && !table.is_empty()
        && schema.bytes().all(|b| b.is_ascii_alphanumeric())
        && table.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

fn encode(part: &str) -> String {
    let mut out = String::with_capacity(part.len());
    for c in part.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else {
            out.push_str(&format!("_{:x}_", c as u32));
        }
    }
    out
}

fn decode_part(enc: &str) -> Option<String> {
    let mut out = String::with_capacity(enc.len());
    let mut rest = enc;
    while let Some(c) = rest.chars().next() {
        if c == '_' {
            let (hex, tail) = rest[1..].split_once('_')?;
            if hex.is_empty() || !hex.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
                return None;
            }
            let decoded = char::from_u32(u32::from_str_radix(hex, 16).ok()?)?;
            // Alphanumerics are never escaped
            if decoded.is_ascii_alphanumeric() {
                return None;
            }
            out.push(decoded);
            rest = tail;
        } else if c.is_ascii_alphanumeric() {
            out.push(c);
            rest = &rest[1..];
        } else {
            return None;
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn corpus() -> Vec<(&'static str, &'static str)> {
        vec![
            ("dbo", "Customers"),
            ("dbo", "Orders"),
            ("dbo", "Order_Details"),
            ("a", "b_c"),
            ("a_b", "c"),
            ("a_", "_b"),
            ("a", "___b"),
            ("a", "_b"),
            ("a__", "b"),
            ("a", "__b"),
            ("_", "a"),
            ("a", "_"),
            ("sales", "Order Details"),
            ("sales", "Order_Details"),
            ("sales", "Order_20_Details"),
            ("sales reporting", "x"),
            ("sales", "reporting_x"),
            ("dbo", "Straße"),
            ("dbo", "Stra_df_e"),
            ("1", "2"),
            ("12", "3"),
            ("1", "2_3"),
            ("x", "y.z"),
            ("x.y", "z"),
            ("", "t"),
            ("t", ""),
        ]
    }

    #[test]
    fn test_plain_form() {
        assert_eq!(EntityId::new("dbo", "Customers").as_str(), "dbo_Customers");
        assert_eq!(EntityId::new("dbo", "Order_Details").as_str(), "dbo_Order_Details");
    }

    #[test]
    fn test_separator_in_schema_is_escaped() {
        assert_eq!(EntityId::new("a", "b_c").as_str(), "a_b_c");
        assert_eq!(EntityId::new("a_b", "c").as_str(), "_6_a_5f_b_c");
    }

    #[test]
    fn test_identifiers_are_pairwise_distinct() {
        let corpus = corpus();
        let ids: HashSet<EntityId> = corpus.iter().map(|(s, t)| EntityId::new(s, t)).collect();
        assert_eq!(ids.len(), corpus.len());
    }

    #[test]
    fn test_identifiers_use_safe_alphabet() {
        for (s, t) in corpus() {
            let id = EntityId::new(s, t);
            assert!(
                id.as_str().bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_'),
                "{id} is not diagram-safe"
            );
        }
    }

    #[test]
    fn test_decode_round_trips_corpus() {
        for (s, t) in corpus() {
            let id = EntityId::new(s, t);
            assert_eq!(
                EntityId::decode(id.as_str()),
                Some((s.to_string(), t.to_string())),
                "decode failed for {id}"
            );
        }
    }

    #[test]
    fn test_decode_rejects_non_canonical() {
        assert_eq!(EntityId::decode("nounderscore"), None);
        assert_eq!(EntityId::decode("_3_dbo_Orders"), None);
        assert_eq!(EntityId::decode("_x_a_b"), None);
        assert_eq!(EntityId::decode("_9_a_b"), None);
        assert_eq!(EntityId::decode("_3_a_41_x_b"), None);
    }
}
