//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the competition season (`Season`)
//! - the three datasets and where they come from / go to (`Dataset`)
//! - normalized row records (`StandingRecord`, `ScorerRecord`, `AssistRecord`)

pub mod types;

pub use types::*;
