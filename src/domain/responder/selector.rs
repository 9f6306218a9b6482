//! Weighted random choice among canned replies.

use std::fmt;
use std::sync::{Arc, Mutex};

use rand::Rng;

use crate::domain::persona::ResponseCandidate;

/// Anything carrying a selection weight.
pub trait Weighted {
    fn weight(&self) -> f64;
}

impl Weighted for ResponseCandidate {
    fn weight(&self) -> f64 {
        self.probability
    }
}

/// Source of uniform draws in `[0, 1)`.
///
/// Swappable so tests can force which candidate is picked.
pub trait RandomSource: Send + Sync {
    fn next_unit(&self) -> f64;
}

/// Thread-local RNG from `rand`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_unit(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Always returns the same draw.
#[derive(Debug, Clone, Copy)]
pub struct FixedDraw(pub f64);

impl RandomSource for FixedDraw {
    fn next_unit(&self) -> f64 {
        self.0
    }
}

/// Replays a scripted list of draws, repeating the last one when exhausted.
#[derive(Debug, Default)]
pub struct ScriptedDraws {
    draws: Mutex<Vec<f64>>,
    last: Mutex<f64>,
}

impl ScriptedDraws {
    pub fn new(draws: impl IntoIterator<Item = f64>) -> Self {
        let mut draws: Vec<f64> = draws.into_iter().collect();
        draws.reverse();
        Self {
            draws: Mutex::new(draws),
            last: Mutex::new(0.0),
        }
    }
}

impl RandomSource for ScriptedDraws {
    fn next_unit(&self) -> f64 {
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        let mut draws = self.draws.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(next) = draws.pop() {
            *last = next;
        }
        *last
    }
}

/// Picks one candidate with probability proportional to its weight.
#[derive(Clone)]
pub struct WeightedSelector {
    source: Arc<dyn RandomSource>,
}

impl WeightedSelector {
    pub fn new(source: Arc<dyn RandomSource>) -> Self {
        Self { source }
    }

    /// Selector that always draws `unit` (in `[0, 1)`).
    pub fn fixed(unit: f64) -> Self {
        Self::new(Arc::new(FixedDraw(unit)))
    }

    /// Chooses a candidate, or `None` for an empty slice.
    ///
    /// Weights are summed, a draw in `[0, total)` is walked down the list, and
    /// the first candidate that brings the remainder to zero or below wins.
    /// When rounding leaves the remainder positive after the last candidate,
    /// the last candidate is returned.
    pub fn select<'a, T: Weighted>(&self, candidates: &'a [T]) -> Option<&'a T> {
        let last = candidates.last()?;

        let total: f64 = candidates.iter().map(Weighted::weight).sum();
        let mut remainder = self.source.next_unit() * total;

        for candidate in candidates {
            remainder -= candidate.weight();
            if remainder <= 0.0 {
                return Some(candidate);
            }
        }

        Some(last)
    }
}

impl Default for WeightedSelector {
    fn default() -> Self {
        Self::new(Arc::new(ThreadRandom))
    }
}

impl fmt::Debug for WeightedSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeightedSelector").finish_non_exhaustive()
    }
}
