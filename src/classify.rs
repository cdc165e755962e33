use serde::Serialize;

use crate::data::model::{Column, Table};
use crate::error::Result;

/// Minimum distinct/non-null ratio for a float column to count as continuous.
pub const CONTINUOUS_THRESHOLD: f64 = 0.01;

/// How a feature is plotted: scatter for continuous, bars for categorical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Continuous,
    Categorical,
}

/// Classify `column` of `table`. The column must exist.
pub fn classify(table: &Table, column: &str) -> Result<FeatureKind> {
    Ok(classify_column(table.column(column)?))
}

/// A column is continuous iff it is float-typed and its distinct non-null
/// values make up at least [`CONTINUOUS_THRESHOLD`] of its non-null values.
/// An all-null column is categorical.
pub fn classify_column(column: &Column) -> FeatureKind {
    if !column.dtype.is_float() {
        return FeatureKind::Categorical;
    }
    let non_null = column.non_null_count();
    if non_null == 0 {
        return FeatureKind::Categorical;
    }
    let ratio = column.distinct_non_null_count() as f64 / non_null as f64;
    if ratio < CONTINUOUS_THRESHOLD {
        FeatureKind::Categorical
    } else {
        FeatureKind::Continuous
    }
}
