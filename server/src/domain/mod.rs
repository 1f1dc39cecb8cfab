//! Domain logic for race events
//!
//! - `filters` - query-string search filter compiler
//! - `slug` - event slug generation

pub mod filters;
pub mod slug;

pub use filters::{FilterExpression, compile};
