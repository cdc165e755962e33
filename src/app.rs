use crate::chart::{filter_value_options, timeline_chart, trend_chart, xy_chart, ChartSpec};
use crate::data::model::CovidData;
use crate::error::Result;
use crate::layout::{compose, DropdownOption, PageLayout};
use crate::reactive::{Callback, CallbackGraph, Prop, PropValue, Update};
use crate::state::SelectionState;

// ---------------------------------------------------------------------------
// Callbacks
// ---------------------------------------------------------------------------

/// Latest-data comparison of the two chosen features.
fn update_xy_plot(data: &CovidData, state: &SelectionState) -> Result<Vec<PropValue>> {
    let figure = match (state.x_feature.as_deref(), state.y_feature.as_deref()) {
        (Some(x), Some(y)) => xy_chart(&data.latest, x, y)?,
        _ => ChartSpec::placeholder(
            "Target Variable Visualization",
            "Select two features to compare",
        ),
    };
    Ok(vec![PropValue::Figure(figure)])
}

/// Recompute the selectable group values and reset the selection to the first.
fn update_filter_val_options(data: &CovidData, state: &SelectionState) -> Result<Vec<PropValue>> {
    let values = match state.filter_feature.as_deref() {
        Some(feature) => filter_value_options(&data.historical, feature)?,
        None => Vec::new(),
    };
    let selection = values.first().cloned().into_iter().collect();
    let options = values.into_iter().map(DropdownOption::new).collect();
    Ok(vec![PropValue::Options(options), PropValue::Values(selection)])
}

fn update_timeline_comparator(data: &CovidData, state: &SelectionState) -> Result<Vec<PropValue>> {
    let figure = match (state.plot_feature.as_deref(), state.filter_feature.as_deref()) {
        (Some(plot), Some(filter)) => {
            timeline_chart(&data.historical, plot, filter, &state.filter_values)?
        }
        _ => ChartSpec::placeholder(
            "Historical Timeline",
            "Select a feature to plot and a feature to filter by",
        ),
    };
    Ok(vec![PropValue::Figure(figure)])
}

fn callbacks() -> Vec<Callback> {
    vec![
        Callback::new(
            "update_xy_plot",
            vec![Prop::XFeature, Prop::YFeature],
            vec![Prop::XyFigure],
            update_xy_plot,
        ),
        Callback::new(
            "update_filter_val_options",
            vec![Prop::FilterFeature],
            vec![Prop::FilterValueOptions, Prop::FilterValues],
            update_filter_val_options,
        ),
        Callback::new(
            "update_timeline_comparator",
            vec![Prop::PlotFeature, Prop::FilterFeature, Prop::FilterValues],
            vec![Prop::TimelineFigure],
            update_timeline_comparator,
        ),
    ]
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// The loaded tables plus the callbacks wired over them. Immutable once
/// built; one instance is shared by every request.
#[derive(Debug)]
pub struct Dashboard {
    data: CovidData,
    graph: CallbackGraph,
}

impl Dashboard {
    pub fn new(data: CovidData) -> Result<Self> {
        Ok(Dashboard {
            data,
            graph: CallbackGraph::new(callbacks())?,
        })
    }

    pub fn data(&self) -> &CovidData {
        &self.data
    }

    pub fn graph(&self) -> &CallbackGraph {
        &self.graph
    }

    /// Build the page from scratch: default selection, every callback
    /// fired once, and the static trend chart.
    pub fn layout(&self) -> Result<PageLayout> {
        let initial = SelectionState::initial(&self.data);
        let Update { state, outputs } = self.graph.initial(&self.data, initial)?;
        let trend = trend_chart(&self.data.historical)?;
        Ok(compose(&self.data, state, outputs, trend))
    }

    /// React to the client's changed properties.
    pub fn update(&self, changed: &[Prop], state: SelectionState) -> Result<Update> {
        self.graph.dispatch(&self.data, state, changed)
    }
}
