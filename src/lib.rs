//! `dairy-twin` library crate.
//!
//! Digital twin of two dairy lines: ayran acidification (pH) and sary
//! irimshik drying (moisture). The binary (`twin`) is a thin wrapper around
//! this library so that:
//!
//! - the fit/predict/inverse core is testable without spawning processes
//! - the CLI and the TUI share one pipeline (`app::pipeline`)

pub mod app;
pub mod bundle;
pub mod cli;
pub mod data;
pub mod domain;
pub mod energy;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod quality;
pub mod report;
pub mod scada;
pub mod surface;
pub mod tui;
