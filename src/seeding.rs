//! Factories, seeders, stores and the seed runner.
//!
//! # Examples
//!
//! ```rust
//! use furrow::seeding::{MemoryStore, SeedingSource};
//! let source = SeedingSource::new(MemoryStore::new());
//! ```

pub use furrow_seeding::*;
