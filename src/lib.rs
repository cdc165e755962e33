//! COVID-19 statistics dashboard.
//!
//! Two tables are loaded once at startup (a per-location time series and a
//! latest snapshot), then served as three chart panels whose figures are
//! recomputed from dropdown selections by pure callbacks.

pub mod app;
pub mod chart;
pub mod classify;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod layout;
pub mod reactive;
pub mod server;
pub mod state;

pub use app::Dashboard;
pub use error::DashboardError;
