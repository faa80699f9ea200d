//! Grouped temporal resampling and calendar reindexing.

use crate::pipeline::Grouping;
use crate::types::field_map::{Aggregation, FieldMap, FieldSpec};
use crate::types::period::{epoch_days, DateRange, Period};
use polars::prelude::*;

pub(crate) fn period_columns(period: Period) -> &'static [&'static str] {
    match period {
        Period::Month => &["year", "month"],
        Period::Day => &["date"],
    }
}

fn missing() -> Expr {
    lit(NULL).cast(DataType::Float64)
}

/// The per-bucket rule for one field over a single station's rows.
fn bucket_rule(field: &FieldSpec) -> Expr {
    let name = field.name.as_str();
    match field.aggregation {
        Aggregation::Sum => when(col(name).count().gt(lit(0)))
            .then(col(name).sum())
            .otherwise(missing()),
        Aggregation::Mean => col(name).mean(),
        Aggregation::First => col(name).drop_nulls().first(),
    }
    .alias(name)
}

/// How station buckets are combined into a region bucket: a station average for
/// numeric quantities, the first reported value for categorical ones.
fn region_rule(field: &FieldSpec) -> Expr {
    let name = field.name.as_str();
    match field.aggregation {
        Aggregation::Sum | Aggregation::Mean => col(name).mean(),
        Aggregation::First => col(name).drop_nulls().first(),
    }
    .alias(name)
}

fn keyed(key: &str, period: Period) -> Vec<Expr> {
    std::iter::once(key)
        .chain(period_columns(period).iter().copied())
        .map(col)
        .collect()
}

/// Resamples cleaned observations into `period` buckets per group key.
///
/// Station buckets are always computed first with each field's own rule, so a
/// region's monthly sunshine is the mean of its stations' monthly totals.
pub(crate) fn resample(
    frame: LazyFrame,
    field_map: &FieldMap,
    period: Period,
    grouping: Grouping,
) -> LazyFrame {
    let bucketed = match period {
        Period::Month => frame.with_columns([
            col("date").dt().year().cast(DataType::Int32).alias("year"),
            col("date").dt().month().cast(DataType::Int32).alias("month"),
        ]),
        Period::Day => frame,
    };

    let mut per_station_rules: Vec<Expr> = field_map.fields.iter().map(bucket_rule).collect();
    if grouping == Grouping::Region {
        per_station_rules.push(col("region").first());
    }
    let per_station = bucketed
        .group_by_stable(keyed("station", period))
        .agg(per_station_rules);

    match grouping {
        Grouping::Station => per_station,
        Grouping::Region => per_station
            .group_by_stable(keyed("region", period))
            .agg(field_map.fields.iter().map(region_rule).collect::<Vec<_>>()),
    }
}

/// The complete (key × period) calendar of the requested range.
fn calendar(key: &str, keys: &[String], range: &DateRange, period: Period) -> PolarsResult<DataFrame> {
    match period {
        Period::Month => {
            let months = range.months();
            let mut names = Vec::with_capacity(keys.len() * months.len());
            let mut years = Vec::with_capacity(names.capacity());
            let mut month_numbers = Vec::with_capacity(names.capacity());
            for k in keys {
                for m in &months {
                    names.push(k.as_str());
                    years.push(m.year());
                    month_numbers.push(m.month() as i32);
                }
            }
            DataFrame::new(vec![
                Series::new(key.into(), names).into(),
                Series::new("year".into(), years).into(),
                Series::new("month".into(), month_numbers).into(),
            ])
        }
        Period::Day => {
            let days: Vec<i32> = range.days().into_iter().map(epoch_days).collect();
            let mut names = Vec::with_capacity(keys.len() * days.len());
            let mut dates = Vec::with_capacity(names.capacity());
            for k in keys {
                for d in &days {
                    names.push(k.as_str());
                    dates.push(*d);
                }
            }
            DataFrame::new(vec![
                Series::new(key.into(), names).into(),
                Series::new("date".into(), dates).cast(&DataType::Date)?.into(),
            ])
        }
    }
}

/// Left-joins the aggregate onto the full calendar so every period of the range
/// appears for every key, then orders rows by key and period.
pub(crate) fn reindex(
    aggregated: LazyFrame,
    keys: &[String],
    range: &DateRange,
    period: Period,
    grouping: Grouping,
    field_map: &FieldMap,
) -> PolarsResult<LazyFrame> {
    let key = grouping.key_column();
    let on = keyed(key, period);

    let mut columns = on.clone();
    columns.extend(field_map.names().map(col));

    Ok(calendar(key, keys, range, period)?
        .lazy()
        .join(aggregated, on.clone(), on.clone(), JoinArgs::new(JoinType::Left))
        .select(columns)
        .sort_by_exprs(on, SortMultipleOptions::default()))
}
