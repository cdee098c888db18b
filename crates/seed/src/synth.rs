//! Deterministic value synthesis.
//!
//! Every generated value is drawn from an RNG seeded with the SHA-256 of its
//! seed path, so a column's value depends only on where it sits in the plan,
//! never on what was generated before it.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use todoboard_core::VoteValue;

const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Barbara", "Claude", "Donald", "Edsger", "Frances", "Grace", "Hedy", "Ivan",
    "John", "Katherine", "Linus", "Margaret", "Niklaus", "Radia", "Sophie", "Tim", "Vint", "Yukihiro",
];

const LAST_NAMES: &[&str] = &[
    "Lovelace", "Turing", "Liskov", "Shannon", "Knuth", "Dijkstra", "Allen", "Hopper", "Lamarr",
    "Sutherland", "Backus", "Johnson", "Torvalds", "Hamilton", "Wirth", "Perlman", "Wilson",
    "Berners-Lee", "Cerf", "Matsumoto",
];

const DOMAINS: &[&str] = &["example.com", "example.org", "example.net"];

const VERBS: &[&str] = &[
    "Buy", "Call", "Clean", "Email", "Fix", "Plan", "Read", "Review", "Schedule", "Write",
];

const OBJECTS: &[&str] = &[
    "the groceries", "the dentist", "the garage", "the landlord", "the leaking tap", "the trip",
    "chapter three", "the pull request", "a team lunch", "the quarterly report",
];

const PASSWORD_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz23456789";

/// RNG for one seed path.
pub fn rng(seed: &str) -> StdRng {
    let mut key = [0u8; 32];
    key.copy_from_slice(&Sha256::digest(seed.as_bytes()));
    StdRng::from_seed(key)
}

fn pick<'a>(rng: &mut StdRng, items: &[&'a str]) -> &'a str {
    items[rng.random_range(0..items.len())]
}

pub fn full_name(seed: &str) -> String {
    let mut rng = rng(seed);
    format!("{} {}", pick(&mut rng, FIRST_NAMES), pick(&mut rng, LAST_NAMES))
}

/// Email address; `discriminator` keeps addresses unique per row.
pub fn email(seed: &str, discriminator: i32) -> String {
    let mut rng = rng(seed);
    let first = pick(&mut rng, FIRST_NAMES).to_lowercase();
    let last = pick(&mut rng, LAST_NAMES).to_lowercase().replace('-', "");
    let domain = pick(&mut rng, DOMAINS);
    format!("{first}.{last}{discriminator}@{domain}")
}

pub fn password(seed: &str) -> String {
    let mut rng = rng(seed);
    (0..16)
        .map(|_| PASSWORD_ALPHABET[rng.random_range(0..PASSWORD_ALPHABET.len())] as char)
        .collect()
}

pub fn todo_text(seed: &str) -> String {
    let mut rng = rng(seed);
    format!("{} {}", pick(&mut rng, VERBS), pick(&mut rng, OBJECTS))
}

pub fn boolean(seed: &str) -> bool {
    rng(seed).random_bool(0.5)
}

pub fn vote_value(seed: &str) -> VoteValue {
    let values = VoteValue::ALL;
    values[rng(seed).random_range(0..values.len())]
}

/// A whole-second instant in 2024.
pub fn timestamp(seed: &str) -> DateTime<Utc> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default();
    let offset = rng(seed).random_range(0..366 * 24 * 60 * 60);
    start + Duration::seconds(offset)
}

pub fn uuid(seed: &str) -> Uuid {
    let mut bytes = [0u8; 16];
    rng(seed).fill(&mut bytes);
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}

pub fn checksum(seed: &str) -> String {
    hex::encode(Sha256::digest(seed.as_bytes()))
}

/// Value in `min..=max`.
pub fn count(seed: &str, min: usize, max: usize) -> usize {
    rng(seed).random_range(min..=max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_value() {
        assert_eq!(full_name("s/0/user/0/name"), full_name("s/0/user/0/name"));
        assert_eq!(timestamp("a"), timestamp("a"));
        assert_eq!(uuid("a"), uuid("a"));
    }

    #[test]
    fn different_seeds_spread_out() {
        let names: std::collections::HashSet<_> =
            (0..50).map(|i| todo_text(&format!("s/{i}"))).collect();
        assert!(names.len() > 10);
    }

    #[test]
    fn emails_carry_the_discriminator() {
        let e = email("x", 42);
        assert!(e.contains("42@"), "{e}");
        assert!(!e.contains(' '));
    }

    #[test]
    fn password_has_fixed_length() {
        assert_eq!(password("p").len(), 16);
    }

    #[test]
    fn timestamps_fall_in_2024() {
        for i in 0..20 {
            let ts = timestamp(&i.to_string());
            assert_eq!(ts.format("%Y").to_string(), "2024");
        }
    }

    #[test]
    fn count_respects_bounds() {
        for i in 0..50 {
            let n = count(&i.to_string(), 2, 4);
            assert!((2..=4).contains(&n));
        }
        assert_eq!(count("fixed", 3, 3), 3);
    }
}
