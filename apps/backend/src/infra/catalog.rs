//! Card catalog abstraction.
//!
//! The catalog maps a card code to its named attribute values and its
//! ordered transformation list. The real catalog lives behind an external
//! import pipeline; when that is unavailable a deterministic generator
//! stands in. The engine never knows which one answered.

use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Attribute names every card carries.
pub const ATTRIBUTES: [&str; 5] = ["poder", "velocidad", "ki", "tecnica", "fuerza"];

#[derive(Debug, Clone, PartialEq)]
pub struct TransformationInfo {
    pub name: String,
    /// Raw power descriptor, e.g. "3 Billion"; scaled by `domain::power`.
    pub raw_power: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardInfo {
    pub code: String,
    pub name: String,
    /// Named numeric stats, already normalized into the bounded scale.
    pub attributes: HashMap<String, i32>,
    /// Raw power descriptor of the base form.
    pub base_power: String,
    pub transformations: Vec<TransformationInfo>,
}

pub trait CardCatalog: Send + Sync {
    /// May return None for inconsistent codes; callers treat that as
    /// value 0 / no transformations rather than failing the round.
    fn lookup(&self, code: &str) -> Option<CardInfo>;

    /// Every code the catalog can currently supply; the deck is built
    /// from this set.
    fn available_codes(&self) -> Vec<String>;
}

/// Deterministic fallback generator: one plausible card per deck code,
/// derived purely from the code so repeated lookups and restarts agree.
pub struct GeneratedCatalog {
    codes: Vec<String>,
}

impl GeneratedCatalog {
    pub fn new(codes: Vec<String>) -> Self {
        Self { codes }
    }

    fn seed_for(code: &str) -> u64 {
        // FNV-1a over the code bytes; stable across runs and platforms.
        let mut hash: u64 = 0xcbf29ce484222325;
        for byte in code.bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x100000001b3);
        }
        hash
    }
}

impl CardCatalog for GeneratedCatalog {
    fn lookup(&self, code: &str) -> Option<CardInfo> {
        if !self.codes.iter().any(|c| c == code) {
            return None;
        }
        let mut rng = ChaCha8Rng::seed_from_u64(Self::seed_for(code));

        let mut attributes = HashMap::new();
        for attr in ATTRIBUTES {
            attributes.insert(attr.to_string(), rng.random_range(1000..=9500));
        }

        let base_power = format!("{} Million", rng.random_range(1..=900));

        let transformation_count = rng.random_range(0..=3usize);
        let scale_words = ["Billion", "Trillion", "Quadrillion"];
        let transformations = (0..transformation_count)
            .map(|i| TransformationInfo {
                name: format!("Forma {}", i + 1),
                raw_power: format!("{} {}", rng.random_range(1..=900), scale_words[i]),
            })
            .collect();

        Some(CardInfo {
            code: code.to_string(),
            name: format!("Luchador {code}"),
            attributes,
            base_power,
            transformations,
        })
    }

    fn available_codes(&self) -> Vec<String> {
        self.codes.clone()
    }
}
