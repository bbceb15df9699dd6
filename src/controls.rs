//! Interactive filter controls: declarations and the state they produce.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde::Serialize;

/// Sentinel genre that disables genre filtering.
pub const ALL_GENRES: &str = "All";

/// Options of the genre selector, in display order.
pub const GENRES: [&str; 23] = [
    ALL_GENRES,
    "Comedy",
    "Sci-Fi",
    "Action",
    "Drama",
    "War",
    "Crime",
    "Romance",
    "Thriller",
    "Music",
    "Adventure",
    "History",
    "Fantasy",
    "Documentary",
    "Horror",
    "Mystery",
    "Family",
    "Animation",
    "Biography",
    "Sport",
    "Western",
    "Short",
    "Musical",
];

/// Bounded integer slider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slider {
    pub title: &'static str,
    pub start: i64,
    pub end: i64,
    pub step: i64,
    pub value: i64,
}

impl Slider {
    pub fn new(title: &'static str, start: i64, end: i64, step: i64, value: i64) -> Self {
        Self {
            title,
            start,
            end,
            step,
            value: value.clamp(start, end),
        }
    }

    /// Set the value, clamped into `[start, end]`.
    pub fn set_value(&mut self, value: i64) {
        self.value = value.clamp(self.start, self.end);
    }
}

/// Single choice out of a fixed option list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Select {
    pub title: &'static str,
    pub options: Vec<&'static str>,
    pub value: String,
}

impl Select {
    pub fn set_value(&mut self, value: &str) -> Result<()> {
        if !self.options.iter().any(|o| *o == value) {
            return Err(eyre!(
                "Unknown {} '{}'. Expected one of: {}",
                self.title.to_lowercase(),
                value,
                self.options.join(", ")
            ));
        }
        self.value = value.to_string();
        Ok(())
    }
}

/// The four controls shown next to the chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlSet {
    pub reviews: Slider,
    pub min_year: Slider,
    pub max_year: Slider,
    pub genre: Select,
}

impl Default for ControlSet {
    fn default() -> Self {
        Self {
            reviews: Slider::new("Min # of reviews", 10, 200_000, 10, 10),
            min_year: Slider::new("Start Year", 1970, 2021, 1, 1970),
            max_year: Slider::new("End Year", 1970, 2021, 1, 2021),
            genre: Select {
                title: "Genre",
                options: GENRES.to_vec(),
                value: ALL_GENRES.to_string(),
            },
        }
    }
}

impl ControlSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current values, as consumed by the filter engine.
    pub fn state(&self) -> ControlState {
        ControlState {
            reviews: self.reviews.value,
            min_year: self.min_year.value,
            max_year: self.max_year.value,
            genre: self.genre.value.clone(),
        }
    }
}

/// Snapshot of control values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlState {
    pub reviews: i64,
    pub min_year: i64,
    pub max_year: i64,
    pub genre: String,
}

impl Default for ControlState {
    fn default() -> Self {
        ControlSet::default().state()
    }
}
