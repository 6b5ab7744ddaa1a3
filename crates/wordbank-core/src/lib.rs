//! wordbank-core — Vocabulary model, repository, filtering and practice.
//!
//! This crate defines the entry data model, the storage and oracle traits,
//! and the logic that the rest of wordbank builds on.

pub mod error;
pub mod filter;
pub mod markup;
pub mod model;
pub mod repository;
pub mod scenarios;
pub mod session;
pub mod statistics;
pub mod traits;

#[cfg(test)]
pub(crate) mod testutil;
