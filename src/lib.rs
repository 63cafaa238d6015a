//! `epl-pipeline` library crate.
//!
//! The binary (`epl`) is a thin wrapper around this library so that:
//!
//! - the fetch/validate/load logic is testable without spawning processes
//! - the HTTP and warehouse seams can be swapped in tests

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod report;
pub mod validate;
pub mod warehouse;
