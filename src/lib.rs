//! `gld-dash` library crate.
//!
//! The binary is a thin wrapper around this library so the fetch, cache and
//! metric logic can be tested without a terminal or a network.

pub mod app;
pub mod cache;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod metrics;
pub mod plot;
pub mod present;
pub mod report;
pub mod tui;
