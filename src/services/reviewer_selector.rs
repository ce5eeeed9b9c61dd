use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::models::user::User;

/// Source of randomness for reviewer selection.
///
/// Production uses `ThreadRandom`; tests inject a seeded or canned source
/// to pin outcomes.
pub trait RandomSource: Send + Sync {
    /// Uniform index in `0..len`. Never called with `len == 0`.
    fn pick_index(&self, len: usize) -> usize;

    /// Uniform permutation of `0..len`.
    fn permutation(&self, len: usize) -> Vec<usize>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick_index(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }

    fn permutation(&self, len: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..len).collect();
        indices.shuffle(&mut rand::thread_rng());
        indices
    }
}

/// Deterministic source for reproducible runs.
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut guard = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut *guard)
    }
}

impl RandomSource for SeededRandom {
    fn pick_index(&self, len: usize) -> usize {
        self.with_rng(|rng| rng.gen_range(0..len))
    }

    fn permutation(&self, len: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..len).collect();
        self.with_rng(|rng| indices.shuffle(rng));
        indices
    }
}

/// Stateless reviewer picker over an already filtered candidate list.
#[derive(Clone)]
pub struct ReviewerSelector {
    random: Arc<dyn RandomSource>,
}

impl Default for ReviewerSelector {
    fn default() -> Self {
        Self::new(Arc::new(ThreadRandom))
    }
}

impl ReviewerSelector {
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self { random }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(Arc::new(SeededRandom::new(seed)))
    }

    /// Up to `max_count` distinct candidate ids, drawn without replacement.
    /// An empty candidate list yields an empty selection.
    pub fn select_reviewers(&self, candidates: &[User], max_count: usize) -> Vec<String> {
        if candidates.is_empty() || max_count == 0 {
            return Vec::new();
        }
        let count = max_count.min(candidates.len());
        self.random
            .permutation(candidates.len())
            .into_iter()
            .take(count)
            .map(|idx| candidates[idx].user_id.clone())
            .collect()
    }

    /// One uniformly chosen candidate id, or `None` when there is nobody to pick.
    pub fn select_random_reviewer(&self, candidates: &[User]) -> Option<String> {
        if candidates.is_empty() {
            return None;
        }
        let idx = self.random.pick_index(candidates.len());
        candidates.get(idx).map(|u| u.user_id.clone())
    }
}
