//! Canonical JSON encoding
//!
//! The submission tag is computed over a deterministic byte representation of
//! the applicant object: object keys in lexicographic order, compact
//! separators, no trailing whitespace. Client and server must produce these
//! bytes bit-for-bit from the same logical record or verification breaks, so
//! the ordering and separators here are a wire contract, not a style choice.

use crate::error::Result;
use serde_json::Value;

/// Encode a JSON value to its canonical byte representation.
pub fn canonical_bytes(value: &Value) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    write_value(value, &mut out)?;
    Ok(out)
}

fn write_value(value: &Value, out: &mut Vec<u8>) -> Result<()> {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push(b'{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                // serde_json handles escaping; keys are emitted exactly as a
                // JSON string literal
                out.extend_from_slice(serde_json::to_string(key)?.as_bytes());
                out.push(b':');
                write_value(&map[*key], out)?;
            }
            out.push(b'}');
        }
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_value(item, out)?;
            }
            out.push(b']');
        }
        // Null, booleans, numbers and strings already have a single compact
        // serialization
        other => out.extend_from_slice(serde_json::to_string(other)?.as_bytes()),
    }
    Ok(())
}
