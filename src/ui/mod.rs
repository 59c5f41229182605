//! Ratatui front-end plus the controller it drives.

mod app;
mod controller;
mod forms;
mod helpers;
mod terminal;

pub use app::{App, Focus};
pub use controller::{Action, Controller, Outcome, Verb, Warning};
pub use forms::{ContactForm, FormField};
pub use terminal::run_app;
