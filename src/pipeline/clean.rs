//! Cleaning pass applied to the stacked observations before any resampling.

use crate::pipeline::Grouping;
use crate::types::field_map::FieldMap;
use polars::prelude::*;

/// Replaces every sentinel code in `name` with null. Existing nulls stay null.
pub(crate) fn replace_sentinels(name: &str, sentinels: &[f64]) -> Expr {
    let is_sentinel = sentinels
        .iter()
        .fold(lit(false), |acc, code| acc.or(col(name).eq(lit(*code))));
    when(is_sentinel)
        .then(lit(NULL).cast(DataType::Float64))
        .otherwise(col(name))
        .alias(name)
}

/// Drops rows without a calendar date, nulls out sentinels in every measured
/// field and sorts rows into (group key, station, time) order.
pub(crate) fn clean(
    frame: LazyFrame,
    field_map: &FieldMap,
    sentinels: &[f64],
    grouping: Grouping,
    hourly: bool,
) -> LazyFrame {
    let replacements: Vec<Expr> = field_map
        .names()
        .map(|name| replace_sentinels(name, sentinels))
        .collect();

    let mut order = vec![col(grouping.key_column())];
    if grouping == Grouping::Region {
        order.push(col("station"));
    }
    order.push(col("date"));
    if hourly {
        order.push(col("hour"));
    }

    frame
        .filter(col("date").is_not_null())
        .with_columns(replacements)
        .sort_by_exprs(order, SortMultipleOptions::default().with_maintain_order(true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::field_map::{Aggregation, FieldSpec};

    #[test]
    fn every_sentinel_becomes_null() -> Result<(), Box<dyn std::error::Error>> {
        let df = df!(
            "date" => [0i32, 1, 2, 3, 4, 5],
            "station" => ["108"; 6],
            "sunshine" => [Some(-9.0), Some(-99.0), Some(-99.9), Some(0.0), None, Some(-9.5)],
        )?
        .lazy()
        .with_column(col("date").cast(DataType::Date))
        .collect()?;

        let map = FieldMap::new(0, vec![FieldSpec::new(32, "sunshine", Aggregation::Sum)]);
        let cleaned = clean(df.lazy(), &map, &[-9.0, -99.0, -99.9], Grouping::Station, false)
            .collect()?;

        let values: Vec<Option<f64>> = cleaned.column("sunshine")?.f64()?.into_iter().collect();
        assert_eq!(values, vec![None, None, None, Some(0.0), None, Some(-9.5)]);
        Ok(())
    }

    #[test]
    fn rows_are_sorted_by_key_then_date() -> Result<(), Box<dyn std::error::Error>> {
        let df = df!(
            "date" => [2i32, 0, 1, 0],
            "station" => ["119", "119", "108", "108"],
            "sunshine" => [3.0, 1.0, 2.0, 0.5],
        )?
        .lazy()
        .with_column(col("date").cast(DataType::Date))
        .collect()?;

        let map = FieldMap::new(0, vec![FieldSpec::new(32, "sunshine", Aggregation::Sum)]);
        let cleaned = clean(df.lazy(), &map, &[-9.0], Grouping::Station, false).collect()?;

        let values: Vec<Option<f64>> = cleaned.column("sunshine")?.f64()?.into_iter().collect();
        assert_eq!(values, vec![Some(0.5), Some(2.0), Some(1.0), Some(3.0)]);
        Ok(())
    }
}
