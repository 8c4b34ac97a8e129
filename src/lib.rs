pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod navigator;
pub mod persist;
pub mod session;
pub mod state;
pub mod timer;
pub mod transport;
pub mod tui;
pub mod ui;
