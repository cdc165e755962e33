use serde::{Deserialize, Serialize};

use crate::data::model::{CovidData, Table};
use crate::data::schema::LOCATION;

/// Default metric of the timeline comparator.
pub const DEFAULT_PLOT_FEATURE: &str = "new_cases_smoothed";
/// Default grouping column of the timeline comparator.
pub const DEFAULT_FILTER_FEATURE: &str = LOCATION;
/// Position of the default Y feature among the latest-table columns.
const DEFAULT_Y_INDEX: usize = 6;

// ---------------------------------------------------------------------------
// Selection state
// ---------------------------------------------------------------------------

/// Current dropdown values of one browser session. Owned by the client and
/// sent along with every update; a cleared dropdown is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    pub x_feature: Option<String>,
    pub y_feature: Option<String>,
    pub plot_feature: Option<String>,
    pub filter_feature: Option<String>,
    #[serde(default)]
    pub filter_values: Vec<String>,
}

impl SelectionState {
    /// Selection shown on a fresh page load, before any callback has run.
    pub fn initial(data: &CovidData) -> Self {
        let latest_columns: Vec<&str> = data.latest.column_names().collect();
        let x_feature = latest_columns.first().map(|s| s.to_string());
        let y_feature = latest_columns
            .get(DEFAULT_Y_INDEX)
            .or_else(|| latest_columns.last())
            .map(|s| s.to_string());

        SelectionState {
            x_feature,
            y_feature,
            plot_feature: default_if_present(&data.historical, DEFAULT_PLOT_FEATURE),
            filter_feature: default_if_present(&data.historical, DEFAULT_FILTER_FEATURE),
            filter_values: Vec::new(),
        }
    }
}

fn default_if_present(table: &Table, column: &str) -> Option<String> {
    table.has_column(column).then(|| column.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Column, ColumnType};

    fn table(name: &str, columns: &[&str]) -> Table {
        Table::from_columns(
            name,
            columns
                .iter()
                .map(|c| Column::new(*c, ColumnType::Float, Vec::new()))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn defaults_pick_first_and_seventh_latest_columns() {
        let data = CovidData {
            historical: table("historical", &["location", "date", "new_cases_smoothed"]),
            latest: table("latest", &["a", "b", "c", "d", "e", "f", "g", "h"]),
        };
        let state = SelectionState::initial(&data);
        assert_eq!(state.x_feature.as_deref(), Some("a"));
        assert_eq!(state.y_feature.as_deref(), Some("g"));
        assert_eq!(state.plot_feature.as_deref(), Some("new_cases_smoothed"));
        assert_eq!(state.filter_feature.as_deref(), Some("location"));
    }

    #[test]
    fn short_latest_table_falls_back_to_last_column() {
        let data = CovidData {
            historical: table("historical", &["date"]),
            latest: table("latest", &["location", "new_cases"]),
        };
        let state = SelectionState::initial(&data);
        assert_eq!(state.y_feature.as_deref(), Some("new_cases"));
        assert_eq!(state.plot_feature, None);
    }

    #[test]
    fn missing_filter_values_deserialize_as_empty() {
        let state: SelectionState = serde_json::from_str(r#"{"x_feature": "continent"}"#).unwrap();
        assert_eq!(state.x_feature.as_deref(), Some("continent"));
        assert!(state.filter_values.is_empty());
    }
}
