//! Random word selection with a rolling no-repeat history.
//!
//! Words already in the history are skipped until every word of the list has
//! been drawn once; then the history is cleared and the whole list is eligible
//! again (including the word that was just drawn).

use rand::Rng;
use rand::rngs::ThreadRng;

/// Picks the next word to drill from a caller-supplied list.
///
/// The random source is a type parameter so tests can drive the draw
/// deterministically. History is owned by the caller and must not be shared
/// between two concurrently running sessions.
#[derive(Debug, Clone)]
pub struct WordPicker<R = ThreadRng> {
    rng: R,
}

impl Default for WordPicker<ThreadRng> {
    fn default() -> Self {
        Self::new(rand::thread_rng())
    }
}

impl<R: Rng> WordPicker<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Draw the next word.
    ///
    /// Returns `None` for an empty list, in which case `history` is left
    /// untouched. Otherwise the pick is appended to `history`.
    pub fn next(&mut self, words: &[String], history: &mut Vec<String>) -> Option<String> {
        let mut candidates: Vec<&String> = words.iter().filter(|w| !history.contains(w)).collect();

        if candidates.is_empty() {
            if words.is_empty() {
                return None;
            }
            history.clear();
            candidates = words.iter().collect();
        }

        let index = self.rng.gen_range(0..candidates.len());
        let picked = candidates[index].clone();
        history.push(picked.clone());
        Some(picked)
    }
}
