//! Test helpers for furrow-seeding tests.
//!
//! Factories and seeders shared by the scenario tests, plus a store that fails on demand.

#[path = "helpers/entities.rs"]
pub mod entities;

#[path = "helpers/stores.rs"]
pub mod stores;
