//! Route handlers for the REST API
//!
//! - [`export`] - Repository export
//! - [`system`] - Health, OpenAPI

mod export;
mod system;

pub use export::*;
pub use system::*;
