//! Column-oriented dataset bound to the chart.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record_store::Record;

/// Parallel columns, one entry per movie. Index `i` in every column describes the same record.
///
/// Serializes to `{ "x": [...], "y": [...], "color": [...], ... }`; absent fields are `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundDataset {
    /// IMDB rating.
    pub x: Vec<Option<f64>>,
    /// Rotten Tomatoes score.
    pub y: Vec<Option<f64>>,
    pub color: Vec<String>,
    pub title: Vec<Option<String>>,
    /// Release date text, expected to end with a 4-digit year.
    pub released: Vec<Option<String>>,
    pub imdbvotes: Vec<Option<f64>>,
    /// Comma-separated genre names.
    pub genre: Vec<Option<String>>,
}

/// Numeric field: JSON numbers, or numeric strings with thousands separators.
/// "inf" and "NaN" parse as floats but count as absent.
fn number_field(record: &Record, field: &str) -> Option<f64> {
    let value = match record.get(field)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|v| v.is_finite())
}

fn text_field(record: &Record, field: &str) -> Option<String> {
    match record.get(field)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl BoundDataset {
    /// Adapt raw records without filtering or validation. Input order is preserved.
    pub fn from_records(records: &[Record], color: &str) -> Self {
        let mut dataset = Self::with_capacity(records.len());
        for record in records {
            dataset.x.push(number_field(record, "imdbrating"));
            dataset.y.push(number_field(record, "numericrating"));
            dataset.color.push(color.to_string());
            dataset.title.push(text_field(record, "title"));
            dataset.released.push(text_field(record, "released"));
            dataset.imdbvotes.push(number_field(record, "imdbvotes"));
            dataset.genre.push(text_field(record, "genre"));
        }
        dataset
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            x: Vec::with_capacity(n),
            y: Vec::with_capacity(n),
            color: Vec::with_capacity(n),
            title: Vec::with_capacity(n),
            released: Vec::with_capacity(n),
            imdbvotes: Vec::with_capacity(n),
            genre: Vec::with_capacity(n),
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when every column has the same length.
    pub fn is_consistent(&self) -> bool {
        let n = self.x.len();
        [
            self.y.len(),
            self.color.len(),
            self.title.len(),
            self.released.len(),
            self.imdbvotes.len(),
            self.genre.len(),
        ]
        .iter()
        .all(|&len| len == n)
    }

    /// Build a new dataset from the rows at `indices`, in the given order.
    pub fn select(&self, indices: &[usize]) -> Self {
        let mut out = Self::with_capacity(indices.len());
        for &i in indices {
            out.x.push(self.x[i]);
            out.y.push(self.y[i]);
            out.color.push(self.color[i].clone());
            out.title.push(self.title[i].clone());
            out.released.push(self.released[i].clone());
            out.imdbvotes.push(self.imdbvotes[i]);
            out.genre.push(self.genre[i].clone());
        }
        out
    }

    /// Plottable (x, y) pairs; rows missing either rating, or holding a non-finite one, are skipped.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.x
            .iter()
            .zip(&self.y)
            .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect()
    }
}
