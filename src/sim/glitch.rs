//! Deterministic corruption of displayed word text
//!
//! Backs the GLITCH and DYSLEXIA effects. Same `(text, seed)` always yields
//! the same output, so corrupted labels stay stable across re-renders
//! instead of flickering every frame. Display-only: callers never feed the
//! result back into correctness evaluation.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Corruption seed for a lane, stable per row/lane identity
pub fn lane_seed(row_id: u64, lane: usize) -> u64 {
    row_id.wrapping_add(lane as u64 * 10)
}

/// Leet-speak substitution table
fn substitute(c: char) -> Option<char> {
    Some(match c {
        'A' => '4',
        'B' => '8',
        'E' => '3',
        'G' => '6',
        'I' => '1',
        'O' => '0',
        'S' => '5',
        'T' => '7',
        'Z' => '2',
        _ => return None,
    })
}

/// Corrupt `text`: drop 1-2 characters from the middle, then leet-substitute
/// the survivors with 60% probability each.
///
/// Output length is always in `[1, text.len()]`. Labels of 3 characters or
/// fewer skip omission to stay recognizable.
pub fn corrupt(text: &str, seed: u64) -> String {
    let mut rng = Pcg32::seed_from_u64(seed);
    let mut chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    if len > 3 {
        let count = if rng.random_bool(0.5) { 2 } else { 1 };
        // Start past the first char and never consume the last one
        let start = rng.random_range(1..=len - 2);
        let count = count.min(len - start - 1);
        chars.drain(start..start + count);
    }

    for c in chars.iter_mut() {
        if let Some(sub) = substitute(*c) {
            if rng.random_bool(0.6) {
                *c = sub;
            }
        }
    }

    chars.into_iter().collect()
}

/// Swap one seeded pair of adjacent characters (the DYSLEXIA display
/// distortion). Length-preserving.
pub fn transpose(text: &str, seed: u64) -> String {
    let mut chars: Vec<char> = text.chars().collect();
    if chars.len() >= 2 {
        let mut rng = Pcg32::seed_from_u64(seed);
        let i = rng.random_range(0..chars.len() - 1);
        chars.swap(i, i + 1);
    }
    chars.into_iter().collect()
}
