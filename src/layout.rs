use indexmap::IndexMap;
use serde::Serialize;

use crate::chart::ChartSpec;
use crate::data::model::{ColumnType, CovidData, Table};
use crate::reactive::{Prop, PropValue};
use crate::state::SelectionState;

/// Stylesheets the page links, in order.
pub const STYLESHEETS: [&str; 2] = ["https://codepen.io/chriddyp/pen/bWLwgP.css", "/assets/style.css"];

// ---------------------------------------------------------------------------
// Widgets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropdownOption {
    pub label: String,
    pub value: String,
}

impl DropdownOption {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        DropdownOption {
            label: value.clone(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DropdownValue {
    Single(Option<String>),
    Multi(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dropdown {
    pub id: &'static str,
    /// Property a change of this dropdown reports.
    pub prop: Prop,
    pub options: Vec<DropdownOption>,
    pub multi: bool,
    pub placeholder: &'static str,
    pub value: DropdownValue,
}

impl Dropdown {
    fn single(prop: Prop, placeholder: &'static str, options: Vec<DropdownOption>, value: Option<String>) -> Self {
        Dropdown {
            id: prop.component(),
            prop,
            options,
            multi: false,
            placeholder,
            value: DropdownValue::Single(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Graph {
    pub id: &'static str,
    pub figure: ChartSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<&'static str>,
    pub dropdowns: Vec<Dropdown>,
    pub graph: Graph,
}

/// Everything the page needs for its first render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageLayout {
    pub stylesheets: Vec<&'static str>,
    pub panels: Vec<Panel>,
    pub state: SelectionState,
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

fn options_where(table: &Table, keep: impl Fn(ColumnType) -> bool) -> Vec<DropdownOption> {
    table
        .columns()
        .iter()
        .filter(|c| keep(c.dtype))
        .map(|c| DropdownOption::new(c.name.clone()))
        .collect()
}

fn take_figure(outputs: &mut IndexMap<Prop, PropValue>, prop: Prop) -> ChartSpec {
    match outputs.shift_remove(&prop) {
        Some(PropValue::Figure(figure)) => figure,
        _ => ChartSpec::placeholder("", "No data"),
    }
}

/// Target Variable Visualization: two column pickers over the latest table.
fn xy_panel(data: &CovidData, state: &SelectionState, outputs: &mut IndexMap<Prop, PropValue>) -> Panel {
    let columns = options_where(&data.latest, |_| true);
    Panel {
        heading: Some("Target Variable Visualization"),
        dropdowns: vec![
            Dropdown::single(Prop::XFeature, "Feature to Plot Over", columns.clone(), state.x_feature.clone()),
            Dropdown::single(Prop::YFeature, "Feature to Plot", columns, state.y_feature.clone()),
        ],
        graph: Graph {
            id: Prop::XyFigure.component(),
            figure: take_figure(outputs, Prop::XyFigure),
        },
    }
}

/// Timeline comparator: metric, grouping column and the dependent value picker.
fn timeline_panel(
    data: &CovidData,
    state: &SelectionState,
    outputs: &mut IndexMap<Prop, PropValue>,
) -> Panel {
    let value_options = match outputs.shift_remove(&Prop::FilterValueOptions) {
        Some(PropValue::Options(options)) => options,
        _ => Vec::new(),
    };

    Panel {
        heading: Some("Compare Trends of a Target for a Value"),
        dropdowns: vec![
            Dropdown::single(
                Prop::PlotFeature,
                "Historical Feature to Visualize",
                options_where(&data.historical, ColumnType::is_numeric),
                state.plot_feature.clone(),
            ),
            Dropdown::single(
                Prop::FilterFeature,
                "Feature to Filter",
                options_where(&data.historical, |t| t == ColumnType::Text),
                state.filter_feature.clone(),
            ),
            Dropdown {
                id: Prop::FilterValues.component(),
                prop: Prop::FilterValues,
                options: value_options,
                multi: true,
                placeholder: "Value(s) to Filter By",
                value: DropdownValue::Multi(state.filter_values.clone()),
            },
        ],
        graph: Graph {
            id: Prop::TimelineFigure.component(),
            figure: take_figure(outputs, Prop::TimelineFigure),
        },
    }
}

/// Assemble the page from the first-render outputs and the static trend chart.
pub fn compose(
    data: &CovidData,
    state: SelectionState,
    mut outputs: IndexMap<Prop, PropValue>,
    trend: ChartSpec,
) -> PageLayout {
    let panels = vec![
        xy_panel(data, &state, &mut outputs),
        timeline_panel(data, &state, &mut outputs),
        Panel {
            heading: None,
            dropdowns: Vec::new(),
            graph: Graph {
                id: "line-graph-comparison",
                figure: trend,
            },
        },
    ];

    PageLayout {
        stylesheets: STYLESHEETS.to_vec(),
        panels,
        state,
    }
}
