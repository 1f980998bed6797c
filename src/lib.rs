//! Library crate root: credential resolution, session bootstrap and list operations.

#[path = "lib/mod.rs"]
pub mod lib_mod;
pub use lib_mod as lib;
pub mod api;
pub mod cli;
pub mod session;
