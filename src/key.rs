//! Key Composition
//!
//! Maps a logical key into the physical key presented to the backend by
//! prefixing it with the cache namespace.
//!
//! The delimiter is not escaped: a logical key that itself contains `:` can
//! collide with a key from another namespace whose prefix ends the same way
//! (`"a"` + `"b:c"` and `"a:b"` + `"c"` both give `"a:b:c"`). Callers that
//! need strict isolation should keep `:` out of their prefixes.

/// Namespace used when no configuration is supplied.
pub const DEFAULT_PREFIX: &str = "default";

/// Separator between namespace and logical key.
pub const KEY_DELIMITER: char = ':';

/// Returns `prefix + ":" + key`.
pub fn compose_key(prefix: &str, key: &str) -> String {
    let mut physical = String::with_capacity(prefix.len() + key.len() + 1);
    physical.push_str(prefix);
    physical.push(KEY_DELIMITER);
    physical.push_str(key);
    physical
}
