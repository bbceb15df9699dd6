//! Filter engine: derives the visible subset from the full dataset and the control state.
//!
//! The browser runs the same rules from `assets/filter.js`; this module is the reference the
//! exporter and the tests use.

use crate::controls::{ControlState, ALL_GENRES};
use crate::dataset::BoundDataset;

/// Year taken from the last four characters of a release string.
///
/// Surrounding whitespace is ignored and an empty tail counts as 0, so `"Jan 1999"` gives
/// 1999 and `"N/A"` gives `None`.
pub fn release_year(released: &str) -> Option<f64> {
    let chars: Vec<char> = released.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    let tail = tail.trim();
    if tail.is_empty() {
        return Some(0.0);
    }
    tail.parse::<f64>().ok().filter(|y| y.is_finite())
}

fn genre_matches(genres: &str, wanted: &str) -> bool {
    wanted == ALL_GENRES || genres.split(',').any(|g| g.trim() == wanted)
}

/// Whether row `i` of `full` passes every control.
pub fn row_matches(full: &BoundDataset, i: usize, state: &ControlState) -> bool {
    let (Some(votes), Some(released), Some(genres)) =
        (full.imdbvotes[i], &full.released[i], &full.genre[i])
    else {
        return false;
    };

    // NaN reaches the page as null, which the page script skips.
    if !votes.is_finite() || votes <= state.reviews as f64 {
        return false;
    }
    let Some(year) = release_year(released) else {
        return false;
    };
    if year < state.min_year as f64 || year > state.max_year as f64 {
        return false;
    }
    genre_matches(genres, &state.genre)
}

/// Indices of the rows that pass, in dataset order.
pub fn matching_indices(full: &BoundDataset, state: &ControlState) -> Vec<usize> {
    (0..full.len())
        .filter(|&i| row_matches(full, i, state))
        .collect()
}

/// Rebuild the visible dataset from scratch.
pub fn filter_dataset(full: &BoundDataset, state: &ControlState) -> BoundDataset {
    full.select(&matching_indices(full, state))
}

/// Page-scoped filter state. Owns the snapshot of the full dataset taken on the first
/// recompute, so later recomputes never start from an already-filtered view.
#[derive(Debug, Default)]
pub struct FilterSession {
    full_data: Option<BoundDataset>,
}

impl FilterSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn full_data(&self) -> Option<&BoundDataset> {
        self.full_data.as_ref()
    }

    /// Recompute the visible dataset. `displayed` is only read on the first call.
    pub fn recompute(&mut self, displayed: &BoundDataset, state: &ControlState) -> BoundDataset {
        let full = self.full_data.get_or_insert_with(|| displayed.clone());
        filter_dataset(full, state)
    }
}
