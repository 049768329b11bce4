//! Issue ID generation: `<prefix>-<base32 of a random 40-bit value>`.
//!
//! The generator only consumes a random source and the caller-supplied
//! existing-id set, so it is trivially testable without a database.

use rand::RngCore;
use std::collections::HashSet;

/// Crockford base32 alphabet -- omits `I`, `L`, `O`, `U` to avoid visual
/// confusion with `1`, `1`, `0`, and profanity respectively.
const BASE32_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// 40 bits -> 8 base32 characters, each carrying exactly 5 bits.
const ID_BITS: u32 = 40;
const ID_CHARS: usize = 8;

fn encode_base32(mut value: u64) -> String {
    let mut chars = [b'0'; ID_CHARS];
    for slot in chars.iter_mut().rev() {
        let idx = (value & 0x1F) as usize;
        *slot = BASE32_ALPHABET[idx];
        value >>= 5;
    }
    String::from_utf8(chars.to_vec()).expect("base32 alphabet is ASCII")
}

/// Generates a new id for `prefix`, retrying until it doesn't collide with
/// `existing`. Panics if no free id is found within `max_attempts` -- at
/// 40 bits of entropy this should never happen for any real project.
pub fn generate_id(
    prefix: &str,
    existing: &HashSet<String>,
    rng: &mut impl RngCore,
    max_attempts: u32,
) -> String {
    for _ in 0..max_attempts {
        let mask = (1u64 << ID_BITS) - 1;
        let raw = rng.next_u64() & mask;
        let id = format!("{}-{}", prefix, encode_base32(raw));
        if !existing.contains(&id) {
            return id;
        }
    }
    panic!(
        "exhausted {} attempts generating a unique id for prefix {:?}",
        max_attempts, prefix
    );
}

/// Validates that a caller-supplied id string could plausibly be one of
/// ours: `<prefix>-<8 base32 chars>`. Used when accepting externally
/// authored ids (e.g. imported issues) rather than generating fresh ones.
pub fn looks_like_generated(id: &str, prefix: &str) -> bool {
    let Some(suffix) = id.strip_prefix(prefix).and_then(|s| s.strip_prefix('-')) else {
        return false;
    };
    suffix.len() == ID_CHARS && suffix.bytes().all(|b| BASE32_ALPHABET.contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn generated_id_has_expected_shape() {
        let mut rng = SmallRng::seed_from_u64(1);
        let existing = HashSet::new();
        let id = generate_id("lm", &existing, &mut rng, 10);
        assert!(id.starts_with("lm-"));
        assert_eq!(id.len(), "lm-".len() + ID_CHARS);
        assert!(looks_like_generated(&id, "lm"));
    }

    #[test]
    fn retries_on_collision() {
        let mut rng = SmallRng::seed_from_u64(42);
        let first = generate_id("lm", &HashSet::new(), &mut rng, 10);

        let mut existing = HashSet::new();
        existing.insert(first.clone());
        let mut rng2 = SmallRng::seed_from_u64(42);
        let second = generate_id("lm", &existing, &mut rng2, 10);
        assert_ne!(first, second);
    }

    #[test]
    #[should_panic(expected = "exhausted")]
    fn panics_when_every_attempt_collides() {
        let mut rng = SmallRng::seed_from_u64(7);
        let id = generate_id("lm", &HashSet::new(), &mut rng, 1);
        let mut existing = HashSet::new();
        existing.insert(id);
        let mut rng2 = SmallRng::seed_from_u64(7);
        generate_id("lm", &existing, &mut rng2, 1);
    }

    #[test]
    fn looks_like_generated_rejects_wrong_shape() {
        assert!(!looks_like_generated("lm-short", "lm"));
        assert!(!looks_like_generated("other-ABCDEFGH", "lm"));
        assert!(looks_like_generated("lm-ABCDEFGH", "lm"));
    }
}
