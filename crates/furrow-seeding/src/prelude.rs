//! Convenience re-exports for common usage.
//!
//! ```ignore
//! use furrow_seeding::prelude::*;
//! ```

// Error types
pub use crate::error::{ErrorKind, SeedingError, SeedingResult};

// Entity model
pub use crate::entity::{Attribute, Draft, Entity, EntitySchema, Overrides, Thenable};

// Factories and seeders
pub use crate::factory::{Factory, FactoryBuilder, FactoryDefinition, FactoryOptions};
pub use crate::seeder::{Seeder, SeederBuilder, SeederDefinition, SeederOptions};

// Resolution
pub use crate::resolve::{Attach, Binding, is_promise_like, resolve_factory};

// Stores and sources
pub use crate::source::{SeedingSource, SourceBuilder};
pub use crate::store::{MemoryStore, SaveOptions, Store};

// Running
pub use crate::runner::{SeedReport, SeedRunner, SeederRegistry, run_seeder};

// Re-exported so definitions can use `#[async_trait]` without a direct dependency.
pub use async_trait::async_trait;
