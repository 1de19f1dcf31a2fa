//! Record identifiers.
//!
//! Identifiers are 12 bytes rendered as 24 lowercase hex characters: a
//! big-endian Unix timestamp in seconds followed by 8 random bytes.

use chrono::Utc;
use rand::RngCore;

/// Length of the hex form of an identifier.
pub const ID_LEN: usize = 24;

/// Generate a fresh identifier.
pub fn generate() -> String {
    let mut bytes = [0u8; 12];
    let secs = Utc::now().timestamp() as u32;
    bytes[..4].copy_from_slice(&secs.to_be_bytes());
    rand::thread_rng().fill_bytes(&mut bytes[4..]);
    hex::encode(bytes)
}

/// Check whether `raw` is a well-formed identifier (hex digits, any case).
pub fn is_valid(raw: &str) -> bool {
    raw.len() == ID_LEN && raw.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Validate and normalize an identifier to lowercase.
pub fn parse(raw: &str) -> Option<String> {
    is_valid(raw).then(|| raw.to_ascii_lowercase())
}
