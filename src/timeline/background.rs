use std::collections::BTreeSet;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Seeded background chooser that avoids repeats until the pool is exhausted.
///
/// Owned by a single program assembly; the usage set is never shared across jobs.
#[derive(Debug)]
pub struct BackgroundPicker {
    rng: StdRng,
    used: BTreeSet<String>,
}

impl BackgroundPicker {
    /// Create a picker seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            used: BTreeSet::new(),
        }
    }

    /// Pick uniformly among unused `candidates`, or among all of them once every one was used.
    ///
    /// Returns `None` for an empty pool.
    pub fn pick(&mut self, candidates: &[String]) -> Option<String> {
        let unused: Vec<&String> = candidates
            .iter()
            .filter(|c| !self.used.contains(c.as_str()))
            .collect();
        let chosen = if unused.is_empty() {
            candidates.choose(&mut self.rng)?.clone()
        } else {
            (*unused.choose(&mut self.rng)?).clone()
        };
        self.used.insert(chosen.clone());
        Some(chosen)
    }

    pub fn used(&self) -> impl Iterator<Item = &str> {
        self.used.iter().map(String::as_str)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/background.rs"]
mod tests;
