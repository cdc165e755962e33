//! Explicit reactive dependency graph.
//!
//! Each [`Callback`] names the properties it reads and the properties it
//! writes. The graph is ordered topologically once at registration; a
//! dispatch walks that order, running every callback that has a changed
//! input and marking its outputs as changed for the callbacks downstream.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::chart::ChartSpec;
use crate::data::model::CovidData;
use crate::error::{DashboardError, Result};
use crate::layout::DropdownOption;
use crate::state::SelectionState;

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

/// A `<component>.<property>` the client and the callbacks exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Prop {
    #[serde(rename = "x_feature_dd.value")]
    XFeature,
    #[serde(rename = "y_feature_dd.value")]
    YFeature,
    #[serde(rename = "feature_dd.value")]
    PlotFeature,
    #[serde(rename = "filter_feat_dd.value")]
    FilterFeature,
    #[serde(rename = "filter_val_dd.options")]
    FilterValueOptions,
    #[serde(rename = "filter_val_dd.value")]
    FilterValues,
    #[serde(rename = "xy_fig.figure")]
    XyFigure,
    #[serde(rename = "timeline_fig.figure")]
    TimelineFigure,
}

impl Prop {
    pub const ALL: [Prop; 8] = [
        Prop::XFeature,
        Prop::YFeature,
        Prop::PlotFeature,
        Prop::FilterFeature,
        Prop::FilterValueOptions,
        Prop::FilterValues,
        Prop::XyFigure,
        Prop::TimelineFigure,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Prop::XFeature => "x_feature_dd.value",
            Prop::YFeature => "y_feature_dd.value",
            Prop::PlotFeature => "feature_dd.value",
            Prop::FilterFeature => "filter_feat_dd.value",
            Prop::FilterValueOptions => "filter_val_dd.options",
            Prop::FilterValues => "filter_val_dd.value",
            Prop::XyFigure => "xy_fig.figure",
            Prop::TimelineFigure => "timeline_fig.figure",
        }
    }

    /// The component half of the id.
    pub fn component(self) -> &'static str {
        let id = self.id();
        id.split_once('.').map(|(c, _)| c).unwrap_or(id)
    }
}

impl FromStr for Prop {
    type Err = DashboardError;

    fn from_str(id: &str) -> Result<Self> {
        Prop::ALL
            .into_iter()
            .find(|p| p.id() == id)
            .ok_or_else(|| DashboardError::UnknownProperty(id.to_string()))
    }
}

impl fmt::Display for Prop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// A value a callback writes into a property.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropValue {
    Figure(ChartSpec),
    Options(Vec<DropdownOption>),
    Value(Option<String>),
    Values(Vec<String>),
}

impl PropValue {
    fn kind(&self) -> &'static str {
        match self {
            PropValue::Figure(_) => "figure",
            PropValue::Options(_) => "options",
            PropValue::Value(_) => "single value",
            PropValue::Values(_) => "multi value",
        }
    }
}

/// Store a selection-valued output back into the session's state.
/// Figures and option lists are not part of the selection and pass through.
fn write_back(state: &mut SelectionState, prop: Prop, value: &PropValue) -> Result<()> {
    let mismatch = || DashboardError::PropValueMismatch {
        prop: prop.to_string(),
        kind: value.kind(),
    };
    match (prop, value) {
        (Prop::XFeature, PropValue::Value(v)) => state.x_feature = v.clone(),
        (Prop::YFeature, PropValue::Value(v)) => state.y_feature = v.clone(),
        (Prop::PlotFeature, PropValue::Value(v)) => state.plot_feature = v.clone(),
        (Prop::FilterFeature, PropValue::Value(v)) => state.filter_feature = v.clone(),
        (Prop::FilterValues, PropValue::Values(v)) => state.filter_values = v.clone(),
        (Prop::XyFigure | Prop::TimelineFigure, PropValue::Figure(_)) => {}
        (Prop::FilterValueOptions, PropValue::Options(_)) => {}
        _ => return Err(mismatch()),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Callbacks
// ---------------------------------------------------------------------------

/// A pure recompute function of the loaded tables and the current selection.
pub type CallbackFn = fn(&CovidData, &SelectionState) -> Result<Vec<PropValue>>;

pub struct Callback {
    pub name: &'static str,
    pub inputs: Vec<Prop>,
    pub outputs: Vec<Prop>,
    func: CallbackFn,
}

impl Callback {
    pub fn new(name: &'static str, inputs: Vec<Prop>, outputs: Vec<Prop>, func: CallbackFn) -> Self {
        Callback {
            name,
            inputs,
            outputs,
            func,
        }
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .finish()
    }
}

/// Result of a dispatch: the updated selection and every property written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Update {
    pub state: SelectionState,
    pub outputs: IndexMap<Prop, PropValue>,
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct CallbackGraph {
    /// Topologically ordered.
    callbacks: Vec<Callback>,
}

impl CallbackGraph {
    /// Register callbacks. Rejects a property written by two callbacks and
    /// dependency cycles.
    pub fn new(callbacks: Vec<Callback>) -> Result<Self> {
        let mut producer: HashMap<Prop, usize> = HashMap::new();
        for (i, cb) in callbacks.iter().enumerate() {
            for &out in &cb.outputs {
                if producer.insert(out, i).is_some() {
                    return Err(DashboardError::DuplicateOutput(out.to_string()));
                }
            }
        }

        // Edge i -> j when callback j reads something callback i writes.
        let mut downstream: Vec<Vec<usize>> = vec![Vec::new(); callbacks.len()];
        let mut indegree = vec![0usize; callbacks.len()];
        for (j, cb) in callbacks.iter().enumerate() {
            let upstream: HashSet<usize> = cb
                .inputs
                .iter()
                .filter_map(|p| producer.get(p).copied())
                .collect();
            for i in upstream {
                downstream[i].push(j);
                indegree[j] += 1;
            }
        }

        let mut ready: VecDeque<usize> = (0..callbacks.len()).filter(|&i| indegree[i] == 0).collect();
        let mut order = Vec::with_capacity(callbacks.len());
        while let Some(i) = ready.pop_front() {
            order.push(i);
            for &j in &downstream[i] {
                indegree[j] -= 1;
                if indegree[j] == 0 {
                    ready.push_back(j);
                }
            }
        }

        if order.len() < callbacks.len() {
            let stuck = indegree
                .iter()
                .enumerate()
                .filter(|(_, d)| **d > 0)
                .map(|(i, _)| callbacks[i].name.to_string())
                .collect();
            return Err(DashboardError::CallbackCycle(stuck));
        }

        let mut slots: Vec<Option<Callback>> = callbacks.into_iter().map(Some).collect();
        let callbacks = order.into_iter().filter_map(|i| slots[i].take()).collect();
        Ok(CallbackGraph { callbacks })
    }

    /// Callbacks in evaluation order.
    pub fn callbacks(&self) -> &[Callback] {
        &self.callbacks
    }

    /// Run every callback affected by `changed`, in dependency order.
    pub fn dispatch(
        &self,
        data: &CovidData,
        mut state: SelectionState,
        changed: &[Prop],
    ) -> Result<Update> {
        let mut dirty: HashSet<Prop> = changed.iter().copied().collect();
        let mut outputs = IndexMap::new();

        for cb in &self.callbacks {
            if !cb.inputs.iter().any(|p| dirty.contains(p)) {
                continue;
            }
            log::debug!("running callback '{}'", cb.name);
            let values = (cb.func)(data, &state)?;
            if values.len() != cb.outputs.len() {
                return Err(DashboardError::OutputArity {
                    callback: cb.name.to_string(),
                    expected: cb.outputs.len(),
                    found: values.len(),
                });
            }
            for (&prop, value) in cb.outputs.iter().zip(values) {
                write_back(&mut state, prop, &value)?;
                dirty.insert(prop);
                outputs.insert(prop, value);
            }
        }

        Ok(Update { state, outputs })
    }

    /// First render: every input counts as changed, so every callback fires.
    pub fn initial(&self, data: &CovidData, state: SelectionState) -> Result<Update> {
        let all_inputs: Vec<Prop> = self
            .callbacks
            .iter()
            .flat_map(|cb| cb.inputs.iter().copied())
            .collect();
        self.dispatch(data, state, &all_inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Table;

    fn empty_data() -> CovidData {
        CovidData {
            historical: Table::from_columns("historical", vec![]).unwrap(),
            latest: Table::from_columns("latest", vec![]).unwrap(),
        }
    }

    fn pick_first_value(_: &CovidData, s: &SelectionState) -> Result<Vec<PropValue>> {
        let first = s.filter_feature.clone().into_iter().collect();
        Ok(vec![PropValue::Values(first)])
    }

    fn echo_values(_: &CovidData, s: &SelectionState) -> Result<Vec<PropValue>> {
        Ok(vec![PropValue::Value(s.filter_values.first().cloned())])
    }

    fn nothing(_: &CovidData, _: &SelectionState) -> Result<Vec<PropValue>> {
        Ok(Vec::new())
    }

    #[test]
    fn prop_ids_round_trip_through_serde() {
        let json = serde_json::to_string(&Prop::FilterValueOptions).unwrap();
        assert_eq!(json, r#""filter_val_dd.options""#);
        let prop: Prop = serde_json::from_str(r#""feature_dd.value""#).unwrap();
        assert_eq!(prop, Prop::PlotFeature);
        assert_eq!(Prop::XyFigure.component(), "xy_fig");
    }

    #[test]
    fn prop_ids_parse_back_and_unknown_ids_fail() {
        for prop in Prop::ALL {
            assert_eq!(prop.id().parse::<Prop>().unwrap(), prop);
        }
        assert!(matches!(
            "nope.value".parse::<Prop>(),
            Err(DashboardError::UnknownProperty(id)) if id == "nope.value"
        ));
    }

    #[test]
    fn registration_orders_upstream_first() {
        // Registered downstream-first on purpose.
        let graph = CallbackGraph::new(vec![
            Callback::new("echo", vec![Prop::FilterValues], vec![Prop::PlotFeature], echo_values),
            Callback::new("pick", vec![Prop::FilterFeature], vec![Prop::FilterValues], pick_first_value),
        ])
        .unwrap();
        let names: Vec<&str> = graph.callbacks().iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["pick", "echo"]);
    }

    #[test]
    fn duplicate_outputs_are_rejected() {
        let err = CallbackGraph::new(vec![
            Callback::new("a", vec![Prop::XFeature], vec![Prop::FilterValues], pick_first_value),
            Callback::new("b", vec![Prop::YFeature], vec![Prop::FilterValues], pick_first_value),
        ])
        .unwrap_err();
        assert!(matches!(err, DashboardError::DuplicateOutput(_)));
    }

    #[test]
    fn cycles_are_rejected() {
        let err = CallbackGraph::new(vec![
            Callback::new("a", vec![Prop::FilterFeature], vec![Prop::FilterValues], pick_first_value),
            Callback::new("b", vec![Prop::FilterValues], vec![Prop::FilterFeature], echo_values),
        ])
        .unwrap_err();
        assert!(matches!(err, DashboardError::CallbackCycle(ref names) if names.len() == 2));
    }

    #[test]
    fn dispatch_propagates_downstream_and_writes_back() {
        let graph = CallbackGraph::new(vec![
            Callback::new("pick", vec![Prop::FilterFeature], vec![Prop::FilterValues], pick_first_value),
            Callback::new("echo", vec![Prop::FilterValues], vec![Prop::PlotFeature], echo_values),
        ])
        .unwrap();
        let state = SelectionState {
            filter_feature: Some("continent".into()),
            ..Default::default()
        };

        let update = graph.dispatch(&empty_data(), state, &[Prop::FilterFeature]).unwrap();
        assert_eq!(update.state.filter_values, vec!["continent".to_string()]);
        assert_eq!(update.state.plot_feature.as_deref(), Some("continent"));
        let written: Vec<Prop> = update.outputs.keys().copied().collect();
        assert_eq!(written, vec![Prop::FilterValues, Prop::PlotFeature]);
    }

    #[test]
    fn unrelated_changes_run_nothing() {
        let graph = CallbackGraph::new(vec![Callback::new(
            "pick",
            vec![Prop::FilterFeature],
            vec![Prop::FilterValues],
            pick_first_value,
        )])
        .unwrap();
        let update = graph
            .dispatch(&empty_data(), SelectionState::default(), &[Prop::XFeature])
            .unwrap();
        assert!(update.outputs.is_empty());
    }

    #[test]
    fn wrong_output_count_is_an_error() {
        let graph = CallbackGraph::new(vec![Callback::new(
            "nothing",
            vec![Prop::XFeature],
            vec![Prop::XyFigure],
            nothing,
        )])
        .unwrap();
        let err = graph.initial(&empty_data(), SelectionState::default()).unwrap_err();
        assert!(matches!(err, DashboardError::OutputArity { expected: 1, found: 0, .. }));
    }

    #[test]
    fn mismatched_value_kind_is_an_error() {
        let graph = CallbackGraph::new(vec![Callback::new(
            "echo",
            vec![Prop::XFeature],
            vec![Prop::FilterValues],
            echo_values,
        )])
        .unwrap();
        let err = graph
            .dispatch(&empty_data(), SelectionState::default(), &[Prop::XFeature])
            .unwrap_err();
        assert!(matches!(err, DashboardError::PropValueMismatch { .. }));
    }
}
