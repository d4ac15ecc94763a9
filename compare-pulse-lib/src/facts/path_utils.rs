//! Path utilities for safe filesystem operations.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Extension given to every file the store writes.
pub const ENTRY_EXTENSION: &str = "json";

/// Longest file name stem written as is. Longer stems are shortened and suffixed with a hash.
const MAX_STEM_LEN: usize = 200;

/// Length of the `~` separator plus a 64-bit hash in hex.
const HASH_SUFFIX_LEN: usize = 17;

/// Bytes that are escaped in file names: everything except ASCII letters, digits, `-` and `_`.
const KEY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_');

/// Encode an arbitrary store key as a single, flat file name.
///
/// ASCII letters, digits, `-` and `_` pass through unchanged. Every other byte is written as
/// `%XX`, so distinct keys always map to distinct file names and no key can escape the store
/// directory. Keys whose encoding is too long for common filesystems are cut short and suffixed
/// with `~` and a hash of the whole key. `~` is itself escaped, so shortened names never clash
/// with regular ones.
///
/// # Examples
///
/// ```ignore
/// // This is an internal utility function
/// assert_eq!(key_to_file_name("compare_cfg"), "compare_cfg.json");
/// assert_eq!(key_to_file_name("community:a/b|c"), "community%3Aa%2Fb%7Cc.json");
/// assert_eq!(key_to_file_name("../etc"), "%2E%2E%2Fetc.json");
/// ```
#[must_use]
pub fn key_to_file_name(key: &str) -> String {
    let mut stem = utf8_percent_encode(key, KEY_ENCODE_SET).to_string();

    if stem.len() > MAX_STEM_LEN {
        // The encoding is pure ASCII, so any byte offset is a char boundary
        stem.truncate(MAX_STEM_LEN - HASH_SUFFIX_LEN);
        stem = format!("{stem}~{:016x}", fnv1a(key.as_bytes()));
    }

    format!("{stem}.{ENTRY_EXTENSION}")
}

/// 64-bit FNV-1a, stable across platforms and releases.
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    bytes
        .iter()
        .fold(OFFSET_BASIS, |hash, &byte| (hash ^ u64::from(byte)).wrapping_mul(PRIME))
}
