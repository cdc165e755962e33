use indexmap::IndexMap;

use crate::classify::{classify_column, FeatureKind};
use crate::data::model::{CellValue, Table};
use crate::data::schema::LOCATION;
use crate::error::Result;

use super::{ChartLayout, ChartSpec, Trace, TraceMode};

fn title(x_feature: &str, y_feature: &str) -> String {
    format!("Visualizing {y_feature} v. {x_feature} for Latest Data")
}

/// Compare two latest-snapshot columns across all locations.
///
/// A continuous X gives a scatter of one point per location; a categorical X
/// gives one bar per category. Choosing the same column twice yields a
/// placeholder chart.
pub fn xy_chart(latest: &Table, x_feature: &str, y_feature: &str) -> Result<ChartSpec> {
    if x_feature == y_feature {
        return Ok(ChartSpec::placeholder(
            title(x_feature, y_feature),
            format!("Pick a Y feature other than {x_feature} to compare"),
        ));
    }

    let xs = latest.column(x_feature)?;
    let ys = latest.column(y_feature)?;

    match classify_column(xs) {
        FeatureKind::Continuous => scatter(latest, x_feature, y_feature),
        FeatureKind::Categorical => {
            log::debug!("'{x_feature}' is categorical ({}), plotting bars", xs.dtype);
            let numeric = ys.dtype.is_numeric();
            let mut totals: IndexMap<&CellValue, f64> = IndexMap::new();
            for (key, value) in xs.values.iter().zip(&ys.values) {
                if key.is_null() {
                    continue;
                }
                let total = totals.entry(key).or_insert(0.0);
                if numeric {
                    *total += value.as_f64().unwrap_or(0.0);
                } else if !value.is_null() {
                    *total += 1.0;
                }
            }

            let y_title = if numeric {
                y_feature.to_string()
            } else {
                format!("count of {y_feature}")
            };
            let (categories, sums): (Vec<CellValue>, Vec<CellValue>) = totals
                .into_iter()
                .map(|(k, v)| (k.clone(), CellValue::Float(v)))
                .unzip();

            Ok(ChartSpec {
                data: vec![Trace::bar(format!("{y_feature} by {x_feature}"), categories, sums)],
                layout: ChartLayout::titled(title(x_feature, y_feature))
                    .with_axis_titles(x_feature, y_title),
            })
        }
    }
}

fn scatter(latest: &Table, x_feature: &str, y_feature: &str) -> Result<ChartSpec> {
    let xs = latest.column(x_feature)?;
    let ys = latest.column(y_feature)?;
    let locations = latest.column(LOCATION).ok();

    let mut x = Vec::new();
    let mut y = Vec::new();
    let mut labels = Vec::new();
    for row in 0..latest.len() {
        let (xv, yv) = (&xs.values[row], &ys.values[row]);
        if xv.is_null() || yv.is_null() {
            continue;
        }
        x.push(xv.clone());
        y.push(yv.clone());
        if let Some(loc) = locations {
            labels.push(loc.values[row].to_string());
        }
    }

    let mut trace = Trace::scatter(format!("{y_feature} over {x_feature}"), TraceMode::Markers, x, y);
    if locations.is_some() {
        trace.text = Some(labels);
    }

    Ok(ChartSpec {
        data: vec![trace],
        layout: ChartLayout::titled(title(x_feature, y_feature)).with_axis_titles(x_feature, y_feature),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::TraceKind;
    use crate::classify::classify;
    use crate::data::model::{Column, ColumnType};

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn latest() -> Table {
        Table::from_columns(
            "latest",
            vec![
                Column::new(
                    "location",
                    ColumnType::Text,
                    vec![text("France"), text("Germany"), text("Japan"), text("Chile")],
                ),
                Column::new(
                    "continent",
                    ColumnType::Text,
                    vec![text("Europe"), text("Europe"), text("Asia"), CellValue::Null],
                ),
                Column::new(
                    "gdp_per_capita",
                    ColumnType::Float,
                    vec![
                        CellValue::Float(38605.67),
                        CellValue::Float(45229.25),
                        CellValue::Float(39002.22),
                        CellValue::Null,
                    ],
                ),
                Column::new(
                    "new_cases",
                    ColumnType::Float,
                    vec![
                        CellValue::Float(100.0),
                        CellValue::Float(50.0),
                        CellValue::Float(7.0),
                        CellValue::Float(3.0),
                    ],
                ),
            ],
        )
        .unwrap()
    }

    #[test]
    fn continuous_x_gives_scatter_with_location_labels() {
        let table = latest();
        assert_eq!(classify(&table, "gdp_per_capita").unwrap(), FeatureKind::Continuous);

        let fig = xy_chart(&table, "gdp_per_capita", "new_cases").unwrap();
        assert_eq!(fig.data.len(), 1);
        let trace = &fig.data[0];
        assert_eq!(trace.kind, TraceKind::Scatter);
        assert_eq!(trace.mode, Some(TraceMode::Markers));
        // Chile has no GDP and is skipped.
        assert_eq!(trace.len(), 3);
        assert_eq!(
            trace.text.as_deref(),
            Some(&["France".to_string(), "Germany".to_string(), "Japan".to_string()][..])
        );
        assert_eq!(
            fig.layout.title.text,
            "Visualizing new_cases v. gdp_per_capita for Latest Data"
        );
    }

    #[test]
    fn categorical_x_gives_bars_per_category() {
        let fig = xy_chart(&latest(), "continent", "new_cases").unwrap();
        let trace = &fig.data[0];
        assert_eq!(trace.kind, TraceKind::Bar);
        assert_eq!(trace.x, vec![text("Europe"), text("Asia")]);
        assert_eq!(trace.y, vec![CellValue::Float(150.0), CellValue::Float(7.0)]);
    }

    #[test]
    fn text_y_counts_rows() {
        let fig = xy_chart(&latest(), "continent", "location").unwrap();
        let trace = &fig.data[0];
        assert_eq!(trace.y, vec![CellValue::Float(2.0), CellValue::Float(1.0)]);
        let y_title = fig.layout.yaxis.title.as_ref().unwrap();
        assert_eq!(y_title.text, "count of location");
    }

    #[test]
    fn same_feature_twice_is_a_placeholder() {
        let fig = xy_chart(&latest(), "new_cases", "new_cases").unwrap();
        assert!(fig.is_placeholder());
    }

    #[test]
    fn unknown_feature_is_an_error() {
        assert!(xy_chart(&latest(), "continent", "median_age").is_err());
    }

    #[test]
    fn recomputation_is_deterministic() {
        let table = latest();
        let a = xy_chart(&table, "continent", "new_cases").unwrap();
        let b = xy_chart(&table, "continent", "new_cases").unwrap();
        assert_eq!(a, b);
    }
}
