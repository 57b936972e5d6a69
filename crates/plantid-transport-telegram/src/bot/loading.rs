//! Loading indicator phrases.

use rand::seq::SliceRandom;

/// Status phrases shown while a request is being processed.
pub const LOADING_PHRASES: &[&str] = &[
    "🤔 Analyzing the plant...",
    "🔍 Studying the leaves and stem...",
    "⚡ Processing the image...",
    "🧠 Working out the species...",
    "📊 Checking the knowledge base...",
    "🔄 Analyzing characteristics...",
    "⏳ Just a moment...",
    "🌿 Recognizing the plant...",
];

/// Chooses which loading phrase to show
pub trait PhrasePicker: Send + Sync {
    /// Pick one phrase from a non-empty pool.
    fn pick(&self, pool: &[&'static str]) -> &'static str;
}

/// Uniformly random choice using the thread-local RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPicker;

impl PhrasePicker for RandomPicker {
    fn pick(&self, pool: &[&'static str]) -> &'static str {
        pool.choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or("⏳ Just a moment...")
    }
}

/// Always picks the phrase at a fixed index (wrapping)
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedPicker(pub usize);

impl PhrasePicker for FixedPicker {
    fn pick(&self, pool: &[&'static str]) -> &'static str {
        if pool.is_empty() {
            return "⏳ Just a moment...";
        }
        pool[self.0 % pool.len()]
    }
}
