//! Core of an online bookstore: the order lifecycle and stock reservation
//! engine, the payment ledger and the recommendation engine, each collection
//! held by its own resource actor.

pub mod actor_framework;
pub mod app_system;
pub mod book_actor;
pub mod clients;
pub mod config;
pub mod domain;
pub mod error;
pub mod order_actor;
pub mod payment_actor;
pub mod recommendation;
pub mod user_actor;

#[cfg(test)]
mod mock_framework;
