//! Book-specific domain logic: catalog validation, stock reservation and reviews.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
