//! # Furrow
//!
//! Entity factories and seeders for populating stores with test data.
//!
//! Furrow is split into two crates, both re-exported here:
//!
//! - [`conf`] loads seeding configuration from TOML or JSON files
//! - [`seeding`] builds entities through factories, groups factories into seeders, and
//!   writes everything through one shared store handle per run
//!
//! ## Feature Flags
//!
//! - `seeding` - factories, seeders and the seed runner
//! - `full` (default) - all features enabled
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use furrow::prelude::*;
//!
//! struct UserFactory;
//!
//! impl FactoryDefinition for UserFactory {
//!     fn options(&self) -> FactoryOptions {
//!         FactoryOptions::new().entity(EntitySchema::new("User").defaults(|user| {
//!             user.set("name", "Ada");
//!         }))
//!     }
//! }
//!
//! # async fn seed() -> SeedingResult<()> {
//! let source = SeedingSource::new(MemoryStore::new());
//! Factory::new(UserFactory, &source)
//!     .create_many(10, Overrides::new(), &SaveOptions::default())
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod conf;
#[cfg(feature = "seeding")]
pub mod seeding;

/// Commonly used items from every enabled crate.
pub mod prelude {
	pub use furrow_conf::{SeedingCommandConfig, SeedingConfig, StoreOptions};

	#[cfg(feature = "seeding")]
	pub use furrow_seeding::prelude::*;
}
