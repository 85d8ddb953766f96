//! Deterministic random number generation
//!
//! A master ChaCha8 generator seeded from the scenario derives one named
//! stream per consumer (behavior, world generation, ...). Streams are
//! created lazily in a fixed derivation order, so a given seed always
//! produces the same sequence per stream regardless of tick interleaving.

use std::collections::HashMap;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub struct RngManager {
    master: ChaCha8Rng,
    streams: HashMap<String, ChaCha8Rng>,
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        Self {
            master: ChaCha8Rng::seed_from_u64(seed),
            streams: HashMap::new(),
        }
    }

    /// Gets or derives the named stream.
    pub fn stream(&mut self, name: &str) -> &mut ChaCha8Rng {
        let master = &mut self.master;
        self.streams.entry(name.to_string()).or_insert_with(|| {
            let mut seed_bytes = [0u8; 8];
            master.fill_bytes(&mut seed_bytes);
            ChaCha8Rng::seed_from_u64(u64::from_le_bytes(seed_bytes))
        })
    }
}
