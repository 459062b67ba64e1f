//! Account-specific domain logic: validation, unique indexes and credentials.

pub mod credentials;
pub mod entity;
pub mod error;

pub use credentials::*;
pub use error::*;
