use crate::color::{TOTAL_CASES_COLOR, TREND_COLORS};
use crate::data::filter::{sort_by_date, take};
use crate::data::model::Table;
use crate::data::schema::DATE;
use crate::error::Result;

use super::{ChartLayout, ChartSpec, LineStyle, Trace, TraceMode};

/// Rate and ratio metrics drawn against total cases, in legend order.
pub const TREND_METRICS: [&str; 4] = [
    "icu_patients_per_million",
    "new_cases",
    "total_vaccinations_per_hundred",
    "total_deaths_per_million",
];

pub const TOTAL_CASES: &str = "total_cases";

const LINE_WIDTH: f64 = 2.0;

/// The static overview chart: one line per trend metric plus total cases,
/// over every historical row in date order.
pub fn trend_chart(historical: &Table) -> Result<ChartSpec> {
    let mut rows: Vec<usize> = (0..historical.len()).collect();
    sort_by_date(historical, DATE, &mut rows)?;
    let dates = take(historical.column(DATE)?, &rows);

    let series = TREND_METRICS
        .iter()
        .zip(TREND_COLORS)
        .chain(std::iter::once((&TOTAL_CASES, TOTAL_CASES_COLOR)));

    let mut traces = Vec::with_capacity(TREND_METRICS.len() + 1);
    for (&metric, color) in series {
        let mut trace = Trace::scatter(
            metric,
            TraceMode::Lines,
            dates.clone(),
            take(historical.column(metric)?, &rows),
        );
        trace.line = Some(LineStyle {
            width: LINE_WIDTH,
            color: color.to_string(),
        });
        traces.push(trace);
    }

    Ok(ChartSpec {
        data: traces,
        layout: ChartLayout::titled("Line Graph Feature Comparison Relative to Data VS Total Cases")
            .with_axis_titles("Date", "Total_Cases"),
    })
}
