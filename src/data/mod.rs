//! Upstream data access.
//!
//! - season resolution from the calendar (`season`)
//! - HTTP and sleeping seams (`transport`)
//! - the retrying API client (`api`)

pub mod api;
pub mod season;
pub mod transport;

pub use api::*;
pub use season::*;
pub use transport::*;
