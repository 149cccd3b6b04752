//! Canonical JSON serialization and the 32-bit content hash used for job
//! deduplication and result-cache keys.

use serde_json::Value;

const BASE36_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Renders `value` as JSON with object keys sorted lexicographically at
/// every level, so that two semantically-identical payloads that differ
/// only in key order serialize to identical bytes.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::to_string(key).unwrap());
                out.push(':');
                write_canonical(&map[*key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        other => out.push_str(&other.to_string()),
    }
}

/// A simple, fast, non-cryptographic 32-bit hash (FNV-1a) rendered base-36.
/// Deliberately not a cryptographic hash: job dedup only needs
/// collision-resistance against accidental duplicate payloads, not
/// adversarial ones.
pub fn hash32_base36(input: &str) -> String {
    const FNV_OFFSET: u32 = 0x811c9dc5;
    const FNV_PRIME: u32 = 0x0100_0193;

    let mut hash = FNV_OFFSET;
    for byte in input.as_bytes() {
        hash ^= *byte as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
    }

    to_base36(hash)
}

fn to_base36(mut n: u32) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36_ALPHABET[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap()
}

/// `hash32(type || canonical_json(payload))`, the job-hash/payload-hash
/// formula used for deduplication throughout the queue.
pub fn job_hash(job_type: &str, payload: &Value) -> String {
    let mut input = String::from(job_type);
    input.push_str(&canonical_json(payload));
    hash32_base36(&input)
}
