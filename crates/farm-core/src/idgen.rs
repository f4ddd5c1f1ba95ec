//! Document id generation: SHA-256 digest rendered in base36.

use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use num_traits::Zero;
use sha2::{Digest, Sha256};

const BASE36_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Renders `data` as a big-endian base36 number of exactly `length` digits.
///
/// Short values are zero-padded; long values keep their least significant
/// digits.
pub fn encode_base36(data: &[u8], length: usize) -> String {
    let mut num = BigUint::from_bytes_be(data);
    let base = BigUint::from(36u32);

    let mut digits: Vec<char> = Vec::with_capacity(length);
    while !num.is_zero() && digits.len() < length {
        let rem = (&num % &base).to_u32_digits().first().copied().unwrap_or(0);
        num /= &base;
        digits.push(char::from(BASE36_ALPHABET[rem as usize]));
    }
    while digits.len() < length {
        digits.push('0');
    }

    digits.iter().rev().collect()
}

/// Bytes of digest needed to fill `length` base36 digits (~5.17 bits each).
fn digest_bytes_for(length: usize) -> usize {
    ((length * 517).div_ceil(800)).clamp(1, 32)
}

/// Builds an id like `egg-4k2q9z` from `prefix` and a digest of the inputs.
///
/// `seed` is any content that distinguishes the document (its JSON body
/// works well); `nonce` is bumped by callers on collision.
pub fn generate_document_id(
    prefix: &str,
    seed: &str,
    timestamp: DateTime<Utc>,
    nonce: u32,
    length: usize,
) -> String {
    let content = format!(
        "{}|{}|{}|{}",
        prefix,
        seed,
        timestamp.timestamp_nanos_opt().unwrap_or(0),
        nonce
    );
    let hash = Sha256::digest(content.as_bytes());
    let short = encode_base36(&hash[..digest_bytes_for(length)], length);
    format!("{prefix}-{short}")
}

/// Birthday-bound approximation: P ~ 1 - e^(-n^2 / 2N).
fn collision_probability(num_docs: usize, id_length: usize) -> f64 {
    let total = 36.0_f64.powi(id_length as i32);
    let exponent = -(num_docs as f64).powi(2) / (2.0 * total);
    1.0 - exponent.exp()
}

/// Shortest length in `min_length..=max_length` whose collision
/// probability for `num_docs` stays at or below `max_collision_prob`.
pub fn compute_adaptive_length(
    num_docs: usize,
    min_length: usize,
    max_length: usize,
    max_collision_prob: f64,
) -> usize {
    (min_length..=max_length)
        .find(|&len| collision_probability(num_docs, len) <= max_collision_prob)
        .unwrap_or(max_length)
}

pub mod adaptive_defaults {
    pub const MAX_COLLISION_PROB: f64 = 0.01;
    pub const MIN_LENGTH: usize = 4;
    pub const MAX_LENGTH: usize = 10;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_pads_and_truncates() {
        assert_eq!(encode_base36(&[], 4), "0000");
        assert_eq!(encode_base36(&[35], 3), "00z");
        assert_eq!(encode_base36(&[0xFF, 0xFF, 0xFF, 0xFF], 3).len(), 3);
    }

    #[test]
    fn encode_known_value() {
        // 36 * 36 = 1296 = 0x0510
        assert_eq!(encode_base36(&[0x05, 0x10], 4), "0100");
    }

    #[test]
    fn document_id_shape() {
        let id = generate_document_id("egg", "{}", Utc::now(), 0, 6);
        assert!(id.starts_with("egg-"));
        assert_eq!(id.len(), "egg-".len() + 6);
        assert!(id[4..].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn document_id_is_deterministic_and_nonce_sensitive() {
        let ts = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let a = generate_document_id("ord", "x", ts, 0, 8);
        let b = generate_document_id("ord", "x", ts, 0, 8);
        let c = generate_document_id("ord", "x", ts, 1, 8);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn adaptive_length_grows_with_collection() {
        use adaptive_defaults::*;
        let small = compute_adaptive_length(10, MIN_LENGTH, MAX_LENGTH, MAX_COLLISION_PROB);
        let large = compute_adaptive_length(1_000_000, MIN_LENGTH, MAX_LENGTH, MAX_COLLISION_PROB);
        assert_eq!(small, MIN_LENGTH);
        assert!(large > small);
        assert!(large <= MAX_LENGTH);
    }

    #[test]
    fn adaptive_length_capped_at_max() {
        assert_eq!(compute_adaptive_length(usize::MAX / 2, 4, 10, 0.0), 10);
    }
}
