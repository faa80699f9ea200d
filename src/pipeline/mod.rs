pub mod aggregate;
pub mod clean;
pub mod driver;
pub mod error;
pub mod report;

use std::fmt;

/// The natural key a report is grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grouping {
    Station,
    /// Stations are mapped to regions through a caller-supplied map.
    Region,
}

impl Grouping {
    pub fn key_column(&self) -> &'static str {
        match self {
            Grouping::Station => "station",
            Grouping::Region => "region",
        }
    }
}

impl fmt::Display for Grouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key_column())
    }
}
