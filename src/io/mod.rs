//! Payload normalization.
//!
//! - API payload -> row records (`mapper`)

pub mod mapper;

pub use mapper::*;
