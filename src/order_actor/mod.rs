//! Order lifecycle: status transitions, address rules and stock bookkeeping.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
