//! Typed clients over the resource actors.
//!
//! The plain clients wrap one store each; `OrderClient`, `PaymentClient` and
//! `RecommendationClient` and `StatsClient` coordinate several.

#[macro_use]
mod macros;

pub mod book_client;
pub mod order_client;
pub mod payment_client;
pub mod recommendation_client;
pub mod stats_client;
pub mod user_client;

pub use book_client::*;
pub use order_client::*;
pub use payment_client::*;
pub use recommendation_client::*;
pub use stats_client::*;
pub use user_client::*;
