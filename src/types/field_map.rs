//! Declarative mapping from response column positions to named observation fields.
//!
//! The upstream service returns unlabelled positional records whose width has
//! changed over time, so the fetcher never relies on a fixed column count. It
//! only looks up the positions listed here and leaves out any that a response
//! does not reach.

use serde::Deserialize;
use std::fmt;

/// How a field is combined when observations are resampled into a coarser period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Accumulative quantities (sunshine duration, precipitation).
    /// A bucket without a single valid value stays missing instead of becoming zero.
    Sum,
    /// Intensive quantities (temperature, humidity, wind speed). Missing values are ignored.
    Mean,
    /// Categorical passthrough: the first non-missing value in the bucket.
    First,
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregation::Sum => write!(f, "sum"),
            Aggregation::Mean => write!(f, "mean"),
            Aggregation::First => write!(f, "first"),
        }
    }
}

/// One measured quantity: where it sits in a record and how it aggregates.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FieldSpec {
    pub position: usize,
    pub name: String,
    pub aggregation: Aggregation,
}

impl FieldSpec {
    pub fn new(position: usize, name: impl Into<String>, aggregation: Aggregation) -> Self {
        Self {
            position,
            name: name.into(),
            aggregation,
        }
    }
}

/// Position of the time token plus the measured fields to extract, in output order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FieldMap {
    #[serde(default)]
    pub time_position: usize,
    pub fields: Vec<FieldSpec>,
}

impl FieldMap {
    pub fn new(time_position: usize, fields: Vec<FieldSpec>) -> Self {
        Self {
            time_position,
            fields,
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
