mod common;

use covid_dash::chart::{ChartSpec, TraceKind, TraceMode};
use covid_dash::data::model::CellValue;
use covid_dash::layout::{DropdownOption, DropdownValue};
use covid_dash::reactive::{Prop, PropValue};
use covid_dash::state::SelectionState;

fn figure(value: &PropValue) -> &ChartSpec {
    match value {
        PropValue::Figure(fig) => fig,
        other => panic!("expected a figure, got {other:?}"),
    }
}

fn labels(options: &[DropdownOption]) -> Vec<&str> {
    options.iter().map(|o| o.value.as_str()).collect()
}

#[test]
fn first_render_fires_every_callback() {
    let dashboard = common::dashboard();
    let layout = dashboard.layout().unwrap();

    assert_eq!(layout.panels.len(), 3);
    assert_eq!(layout.stylesheets[1], "/assets/style.css");

    // Defaults: first and seventh latest columns, then the options callback
    // resets the value selection to the first location.
    assert_eq!(layout.state.x_feature.as_deref(), Some("iso_code"));
    assert_eq!(layout.state.y_feature.as_deref(), Some("new_cases_smoothed"));
    assert_eq!(layout.state.filter_values, vec!["France".to_string()]);

    let timeline = &layout.panels[1];
    let value_dd = &timeline.dropdowns[2];
    assert!(value_dd.multi);
    assert_eq!(labels(&value_dd.options), vec!["France", "Germany", "Japan", "World"]);
    assert_eq!(value_dd.value, DropdownValue::Multi(vec!["France".to_string()]));

    // Only numeric columns can be plotted, only text columns filtered on.
    let plot_dd = &timeline.dropdowns[0];
    assert!(labels(&plot_dd.options).contains(&"new_cases_smoothed"));
    assert!(!labels(&plot_dd.options).contains(&"location"));
    assert_eq!(
        labels(&timeline.dropdowns[1].options),
        vec!["iso_code", "continent", "location"]
    );

    assert_eq!(timeline.graph.figure.data.len(), 1);
    assert_eq!(layout.panels[2].graph.id, "line-graph-comparison");
    assert_eq!(layout.panels[2].graph.figure.data.len(), 5);
}

#[test]
fn changing_filter_feature_resets_values_to_first_group() {
    let dashboard = common::dashboard();
    let state = SelectionState {
        plot_feature: Some("new_cases_smoothed".into()),
        filter_feature: Some("continent".into()),
        filter_values: vec!["France".into(), "Germany".into()],
        ..Default::default()
    };

    let update = dashboard.update(&[Prop::FilterFeature], state).unwrap();
    let written: Vec<Prop> = update.outputs.keys().copied().collect();
    assert_eq!(
        written,
        vec![Prop::FilterValueOptions, Prop::FilterValues, Prop::TimelineFigure]
    );

    match &update.outputs[&Prop::FilterValueOptions] {
        PropValue::Options(options) => assert_eq!(labels(options), vec!["Europe", "Asia"]),
        other => panic!("expected options, got {other:?}"),
    }
    assert_eq!(update.state.filter_values, vec!["Europe".to_string()]);

    let timeline = figure(&update.outputs[&Prop::TimelineFigure]);
    assert_eq!(timeline.data.len(), 1);
    let europe = &timeline.data[0];
    assert_eq!(europe.name, "Europe");
    assert_eq!(europe.mode, Some(TraceMode::Markers));
    assert_eq!(europe.len(), 4);
    // Sorted by date: both 2021-01-01 rows come first, France before Germany.
    assert_eq!(europe.y[0], CellValue::Null);
    assert_eq!(europe.y[2], CellValue::Float(105.5));
}

#[test]
fn changing_values_only_redraws_the_timeline() {
    let dashboard = common::dashboard();
    let state = SelectionState {
        plot_feature: Some("new_cases".into()),
        filter_feature: Some("location".into()),
        filter_values: vec!["Narnia".into(), "Japan".into()],
        ..Default::default()
    };

    let update = dashboard.update(&[Prop::FilterValues], state).unwrap();
    assert_eq!(update.outputs.len(), 1);
    let timeline = figure(&update.outputs[&Prop::TimelineFigure]);
    assert_eq!(timeline.data.len(), 2);
    assert!(timeline.data[0].is_empty());
    assert_eq!(timeline.data[1].y, vec![CellValue::Integer(10)]);
    // The shared axis still spans every historical date.
    let range = timeline.layout.xaxis.range.as_ref().unwrap();
    assert_eq!(range[0].to_string(), "2021-01-01");
    assert_eq!(range[1].to_string(), "2021-01-03");
}

#[test]
fn same_x_and_y_renders_a_placeholder() {
    let dashboard = common::dashboard();
    let state = SelectionState {
        x_feature: Some("new_cases".into()),
        y_feature: Some("new_cases".into()),
        ..Default::default()
    };
    let update = dashboard.update(&[Prop::YFeature], state).unwrap();
    let keys: Vec<Prop> = update.outputs.keys().copied().collect();
    assert_eq!(keys, vec![Prop::XyFigure]);
    assert!(figure(&update.outputs[&Prop::XyFigure]).is_placeholder());
}

#[test]
fn categorical_x_groups_bars_and_continuous_x_scatters() {
    let dashboard = common::dashboard();
    let bars = dashboard
        .update(
            &[Prop::XFeature],
            SelectionState {
                x_feature: Some("continent".into()),
                y_feature: Some("new_cases".into()),
                ..Default::default()
            },
        )
        .unwrap();
    let bar = &figure(&bars.outputs[&Prop::XyFigure]).data[0];
    assert_eq!(bar.kind, TraceKind::Bar);
    assert_eq!(bar.x.len(), 2);
    approx::assert_relative_eq!(bar.y[0].as_f64().unwrap(), 200.0);

    let points = dashboard
        .update(
            &[Prop::XFeature],
            SelectionState {
                x_feature: Some("gdp_per_capita".into()),
                y_feature: Some("new_cases".into()),
                ..Default::default()
            },
        )
        .unwrap();
    let scatter = &figure(&points.outputs[&Prop::XyFigure]).data[0];
    assert_eq!(scatter.kind, TraceKind::Scatter);
    assert_eq!(scatter.len(), 3);
}

#[test]
fn cleared_dropdowns_give_placeholders() {
    let dashboard = common::dashboard();
    let update = dashboard
        .update(
            &[Prop::XFeature, Prop::PlotFeature],
            SelectionState::default(),
        )
        .unwrap();
    assert!(figure(&update.outputs[&Prop::XyFigure]).is_placeholder());
    assert!(figure(&update.outputs[&Prop::TimelineFigure]).is_placeholder());
}

#[test]
fn dispatch_is_deterministic() {
    let dashboard = common::dashboard();
    let state = dashboard.layout().unwrap().state;
    let all = [Prop::XFeature, Prop::PlotFeature, Prop::FilterValues];
    let a = dashboard.update(&all, state.clone()).unwrap();
    let b = dashboard.update(&all, state).unwrap();
    assert_eq!(a, b);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}
