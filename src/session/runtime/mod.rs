//! One run: resolve credentials, authenticate, list, report.
mod startup;

pub use startup::{run, RunExit};
