//! Declared column contracts for the two source tables.
//!
//! Chart builders look columns up by name; validating the names and their
//! semantic types once at load time turns a misnamed column into a startup
//! error instead of a failed callback later on.

use crate::error::{DashboardError, Result};

use super::model::{ColumnType, Table};

/// Grouping key shared by both tables.
pub const LOCATION: &str = "location";
/// Time axis of the historical table.
pub const DATE: &str = "date";

/// What a required column must hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Semantic {
    /// Float or integer.
    Numeric,
    Text,
    Date,
}

impl Semantic {
    fn accepts(self, dtype: ColumnType) -> bool {
        match self {
            Semantic::Numeric => dtype.is_numeric(),
            Semantic::Text => dtype == ColumnType::Text,
            Semantic::Date => dtype == ColumnType::Date,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Semantic::Numeric => "numeric",
            Semantic::Text => "text",
            Semantic::Date => "date",
        }
    }
}

/// Mapping from required column name to semantic type.
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub required: Vec<(&'static str, Semantic)>,
    /// Columns that may not contain nulls.
    pub non_null: Vec<&'static str>,
}

impl TableSchema {
    /// Contract for the time-series table.
    pub fn historical() -> Self {
        TableSchema {
            required: vec![
                (LOCATION, Semantic::Text),
                (DATE, Semantic::Date),
                ("new_cases_smoothed", Semantic::Numeric),
                ("new_cases", Semantic::Numeric),
                ("total_cases", Semantic::Numeric),
                ("icu_patients_per_million", Semantic::Numeric),
                ("total_vaccinations_per_hundred", Semantic::Numeric),
                ("total_deaths_per_million", Semantic::Numeric),
            ],
            non_null: vec![DATE],
        }
    }

    /// Contract for the latest snapshot table.
    pub fn latest() -> Self {
        TableSchema {
            required: vec![(LOCATION, Semantic::Text)],
            non_null: Vec::new(),
        }
    }

    /// Check `table` against this schema, failing on the first violation.
    pub fn validate(&self, table: &Table) -> Result<()> {
        for &(name, semantic) in &self.required {
            let column = table.column(name)?;
            if !semantic.accepts(column.dtype) {
                return Err(DashboardError::ColumnTypeMismatch {
                    table: table.name.clone(),
                    column: name.to_string(),
                    expected: semantic.describe().to_string(),
                    found: column.dtype,
                });
            }
        }

        for &name in &self.non_null {
            let column = table.column(name)?;
            if let Some(row) = column.values.iter().position(|v| v.is_null()) {
                return Err(DashboardError::NullDate {
                    table: table.name.clone(),
                    column: name.to_string(),
                    row,
                });
            }
        }

        Ok(())
    }
}
