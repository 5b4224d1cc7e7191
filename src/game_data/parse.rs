// JSON parsing that keeps numeric `id` fields as exact strings.
//
// Table ids in the data dump can exceed 2^53 and some exceed u64 too, so they are
// parsed with arbitrary-precision numbers and turned into strings in place.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};

/// Parse `text` and rewrite every integer-valued `id` member, at any depth, to a
/// string holding the literal digits.
pub fn parse_with_id_preservation(resource: &str, text: &str) -> Result<Value> {
    let mut value: Value = serde_json::from_str(text).map_err(|e| Error::parse(resource, e))?;
    stringify_ids(&mut value);
    Ok(value)
}

/// Same as [`parse_with_id_preservation`], then deserialize into a typed table.
pub fn parse_table<T: DeserializeOwned>(resource: &str, text: &str) -> Result<T> {
    let value = parse_with_id_preservation(resource, text)?;
    serde_json::from_value(value).map_err(|e| Error::parse(resource, e))
}

fn stringify_ids(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, member) in map.iter_mut() {
                if key == "id" {
                    if let Value::Number(n) = member {
                        let literal = n.to_string();
                        if is_integer_literal(&literal) {
                            *member = Value::String(literal);
                            continue;
                        }
                    }
                }
                stringify_ids(member);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(stringify_ids),
        _ => {}
    }
}

fn is_integer_literal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
