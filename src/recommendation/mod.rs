//! Advisory book recommendations: cart-based, personalized, also-bought and
//! trending lists.

pub mod config;
pub mod engine;

pub use config::*;
pub use engine::*;
