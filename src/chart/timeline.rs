use crate::color::generate_palette;
use crate::data::filter::{distinct_non_null, rows_matching, sort_by_date, take};
use crate::data::model::{CellValue, Column, ColumnType, Table};
use crate::data::schema::DATE;
use crate::error::{DashboardError, Result};

use super::{ChartLayout, ChartSpec, Marker, Trace, TraceMode};

/// Selectable group values of `filter_feature`: distinct, non-null, in
/// first-seen order.
pub fn filter_value_options(historical: &Table, filter_feature: &str) -> Result<Vec<String>> {
    let column = text_column(historical, filter_feature)?;
    Ok(distinct_non_null(column)
        .into_iter()
        .map(|v| v.to_string())
        .collect())
}

/// One marker trace of `plot_feature` per selected value of `filter_feature`.
///
/// Each trace holds the rows where `filter_feature == value`, ascending by
/// date, with its x series taken from those same rows. Every trace shares
/// an x-axis spanning all dates of the historical table, so a value with no
/// rows renders as an empty trace on the full range.
pub fn timeline_chart(
    historical: &Table,
    plot_feature: &str,
    filter_feature: &str,
    selected: &[String],
) -> Result<ChartSpec> {
    let plotted = historical.column(plot_feature)?;
    let dates = historical.column(DATE)?;
    text_column(historical, filter_feature)?;

    let colors = generate_palette(selected.len());
    let mut traces = Vec::with_capacity(selected.len());
    for (value, color) in selected.iter().zip(colors) {
        let mut rows = rows_matching(historical, filter_feature, &CellValue::Text(value.clone()))?;
        sort_by_date(historical, DATE, &mut rows)?;
        if rows.is_empty() {
            log::debug!("no historical rows where {filter_feature} == {value}");
        }

        let mut trace = Trace::scatter(
            value.clone(),
            TraceMode::Markers,
            take(dates, &rows),
            take(plotted, &rows),
        );
        trace.marker = Some(Marker { color });
        traces.push(trace);
    }

    let mut layout = ChartLayout::titled(format!(
        "Historical Timeline of {plot_feature} Over {filter_feature} for Selected Values"
    ))
    .with_axis_titles(DATE, plot_feature);
    layout.xaxis.range = date_range(dates);

    Ok(ChartSpec {
        data: traces,
        layout,
    })
}

fn text_column<'t>(table: &'t Table, name: &str) -> Result<&'t Column> {
    let column = table.column(name)?;
    if column.dtype != ColumnType::Text {
        return Err(DashboardError::ColumnTypeMismatch {
            table: table.name.clone(),
            column: name.to_string(),
            expected: ColumnType::Text.to_string(),
            found: column.dtype,
        });
    }
    Ok(column)
}

/// First and last date of the whole table.
fn date_range(dates: &Column) -> Option<[CellValue; 2]> {
    let mut iter = dates.values.iter().filter_map(CellValue::as_date);
    let first = iter.next()?;
    let (lo, hi) = iter.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
    Some([CellValue::Date(lo), CellValue::Date(hi)])
}
