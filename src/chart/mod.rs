//! Rendering-independent chart descriptions and the builders that produce them.
//!
//! A [`ChartSpec`] serialises to the `{ "data": [...], "layout": {...} }`
//! shape a plotly.js front-end consumes directly.

pub mod timeline;
pub mod trend;
pub mod xy;

use serde::Serialize;

use crate::color::BACKGROUND;
use crate::data::model::CellValue;

pub use timeline::{filter_value_options, timeline_chart};
pub use trend::trend_chart;
pub use xy::xy_chart;

// ---------------------------------------------------------------------------
// Traces
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    Scatter,
    Bar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceMode {
    Markers,
    Lines,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub width: f64,
    pub color: String,
}

/// One named series of a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: TraceKind,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<TraceMode>,
    pub x: Vec<CellValue>,
    pub y: Vec<CellValue>,
    /// Hover labels, one per point.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<LineStyle>,
}

impl Trace {
    pub fn scatter(name: impl Into<String>, mode: TraceMode, x: Vec<CellValue>, y: Vec<CellValue>) -> Self {
        Trace {
            kind: TraceKind::Scatter,
            name: name.into(),
            mode: Some(mode),
            x,
            y,
            text: None,
            marker: None,
            line: None,
        }
    }

    pub fn bar(name: impl Into<String>, x: Vec<CellValue>, y: Vec<CellValue>) -> Self {
        Trace {
            kind: TraceKind::Bar,
            name: name.into(),
            mode: None,
            x,
            y,
            text: None,
            marker: None,
            line: None,
        }
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
}

impl Title {
    fn new(text: impl Into<String>) -> Self {
        Title { text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[CellValue; 2]>,
}

/// Free-floating text, used for placeholder charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub text: String,
    pub showarrow: bool,
    pub xref: &'static str,
    pub yref: &'static str,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartLayout {
    pub title: Title,
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub plot_bgcolor: &'static str,
    pub paper_bgcolor: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl ChartLayout {
    /// The dashboard's standard layout: plotly.js default styling on a grey
    /// background.
    pub fn titled(title: impl Into<String>) -> Self {
        ChartLayout {
            title: Title::new(title),
            xaxis: Axis::default(),
            yaxis: Axis::default(),
            plot_bgcolor: BACKGROUND,
            paper_bgcolor: BACKGROUND,
            annotations: Vec::new(),
        }
    }

    pub fn with_axis_titles(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.xaxis.title = Some(Title::new(x));
        self.yaxis.title = Some(Title::new(y));
        self
    }
}

// ---------------------------------------------------------------------------
// ChartSpec
// ---------------------------------------------------------------------------

/// Traces plus layout, independent of any rendering technology.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub data: Vec<Trace>,
    pub layout: ChartLayout,
}

impl ChartSpec {
    /// A chart with no traces and a centred message.
    pub fn placeholder(title: impl Into<String>, message: impl Into<String>) -> Self {
        let mut layout = ChartLayout::titled(title);
        layout.annotations.push(Annotation {
            text: message.into(),
            showarrow: false,
            xref: "paper",
            yref: "paper",
            x: 0.5,
            y: 0.5,
        });
        ChartSpec {
            data: Vec::new(),
            layout,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.data.is_empty() && !self.layout.annotations.is_empty()
    }
}
