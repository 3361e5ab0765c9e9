//! Entity factories and seeders for populating stores with test data.
//!
//! - **Factories** build entities from a schema, hooks and per-call overrides. Attributes
//!   may be plain values, pending values awaited at resolution time, or nested factories
//!   expanded into related entities.
//! - **Seeders** group factories and other seeders into a repeatable run.
//! - **Sources** hold the store every factory and seeder of a run writes through, and
//!   initialize it lazily on first write.
//!
//! # Quick Start
//!
//! ```
//! use furrow_seeding::prelude::*;
//!
//! struct UserFactory;
//!
//! impl FactoryDefinition for UserFactory {
//!     fn options(&self) -> FactoryOptions {
//!         FactoryOptions::new().entity(EntitySchema::new("User").defaults(|user| {
//!             user.set("name", "Ada").set("active", true);
//!         }))
//!     }
//! }
//!
//! # futures::executor::block_on(async {
//! let source = SeedingSource::new(MemoryStore::new());
//! let users = Factory::new(UserFactory, &source);
//!
//! let user = users.make(Overrides::new().set("name", "Grace")).await?;
//! assert_eq!(user.get("name"), Some(&"Grace".into()));
//! assert!(user.id().is_none());
//!
//! let saved = users.create(Overrides::new(), &SaveOptions::default()).await?;
//! assert!(saved.id().is_some());
//! assert_eq!(source.count("User").await?, 1);
//! # Ok::<(), SeedingError>(())
//! # }).unwrap();
//! ```
//!
//! # Sharing a source
//!
//! Every factory and seeder takes the [`SeedingSource`] it writes through when it is
//! built. Factories and seeders reached through bindings are attached to the source of
//! whoever resolves them, so one run never writes to two stores.
//!
//! # Configuration
//!
//! [`furrow_conf::SeedingConfig`] describes the store and the seeders to run. Pass it to
//! [`SourceBuilder::config`] and [`SeedRunner::with_config`].

#![warn(missing_docs)]

pub mod entity;
pub mod error;
pub mod factory;
pub mod prelude;
pub mod resolve;
pub mod runner;
pub mod seeder;
pub mod source;
pub mod store;

pub use entity::{Attribute, Draft, Entity, EntitySchema, Overrides, PendingFn, Thenable};
pub use error::{ErrorKind, SeedingError, SeedingResult};
pub use factory::{Factory, FactoryBuilder, FactoryDefinition, FactoryOptions};
pub use resolve::{
	Attach, Binding, Bindings, is_promise_like, repoint, resolve_factory, resolve_seeders,
};
pub use runner::{SeedReport, SeedRunner, SeederRegistry, run_seeder};
pub use seeder::{Seeder, SeederBuilder, SeederDefinition, SeederOptions};
pub use source::{SeedingSource, SourceBuilder};
pub use store::{MemoryConnector, MemoryStore, SaveOptions, Store, StoreConnector};
