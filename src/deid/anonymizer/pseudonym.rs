//! Per-call stable pseudonyms

use super::ReplacementStrategy;
use crate::deid::models::{Entity, EntityType};
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};

const SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const SUFFIX_LEN: usize = 6;

/// Replaces an entity with `[TYPE_xxxxxx]`
///
/// The same (type, text) pair always receives the same pseudonym within one
/// strategy instance; a new instance is created for every anonymization
/// call, so nothing is shared across requests.
pub struct PseudonymStrategy {
    cache: HashMap<(EntityType, String), String>,
    issued: HashSet<String>,
    rng: rand::rngs::StdRng,
}

impl PseudonymStrategy {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            issued: HashSet::new(),
            rng: rand::rngs::StdRng::from_entropy(),
        }
    }

    /// Strategy with a fixed seed, for reproducible output
    pub fn with_seed(seed: u64) -> Self {
        Self {
            cache: HashMap::new(),
            issued: HashSet::new(),
            rng: rand::rngs::StdRng::seed_from_u64(seed),
        }
    }

    fn random_suffix(&mut self) -> String {
        (0..SUFFIX_LEN)
            .map(|_| SUFFIX_ALPHABET[self.rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
            .collect()
    }

    fn generate(&mut self, entity_type: &EntityType) -> String {
        loop {
            let pseudonym = format!("[{}_{}]", entity_type.label(), self.random_suffix());
            if self.issued.insert(pseudonym.clone()) {
                return pseudonym;
            }
        }
    }
}

impl ReplacementStrategy for PseudonymStrategy {
    fn replacement(&mut self, entity: &Entity) -> String {
        let key = (entity.entity_type.clone(), entity.text.clone());
        if let Some(existing) = self.cache.get(&key) {
            return existing.clone();
        }

        let pseudonym = self.generate(&entity.entity_type);
        self.cache.insert(key, pseudonym.clone());
        pseudonym
    }
}

impl Default for PseudonymStrategy {
    fn default() -> Self {
        Self::new()
    }
}
