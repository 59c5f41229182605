//! Core library surface for the Contact Book TUI application.
//!
//! The `bin` target wires these pieces together; integration tests drive the
//! controller directly without a terminal.
pub mod config;
pub mod db;
pub mod logging;
pub mod models;
pub mod ui;

pub use config::AppConfig;
pub use db::{open_database, open_in_memory};
pub use models::{Contact, ContactDraft};
pub use ui::{run_app, Action, App, Controller, Outcome, Warning};
