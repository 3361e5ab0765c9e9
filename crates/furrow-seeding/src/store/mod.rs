//! Store abstraction.
//!
//! Factories never talk to a database directly. Writes go through the [`Store`] held by
//! the run's [`SeedingSource`](crate::source::SeedingSource).

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use furrow_conf::StoreOptions;

use crate::entity::Entity;
use crate::error::SeedingResult;

pub use memory::{MemoryConnector, MemoryStore};

/// Options for a single save.
#[derive(Debug, Clone)]
pub struct SaveOptions {
	/// Return the stored representation (with generated fields) instead of the input.
	pub reload: bool,
}

impl SaveOptions {
	/// Creates default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the reload flag.
	pub fn with_reload(mut self, reload: bool) -> Self {
		self.reload = reload;
		self
	}
}

impl Default for SaveOptions {
	fn default() -> Self {
		Self { reload: true }
	}
}

/// Backing store for persisted entities.
///
/// Implementations are used by one caller at a time; furrow awaits every call before
/// issuing the next one and adds no locking of its own.
#[async_trait]
pub trait Store: Send + Sync {
	/// Returns true once [`Store::initialize`] has completed.
	fn is_initialized(&self) -> bool;

	/// Opens the store. Calling it on an initialized store must be harmless.
	async fn initialize(&self) -> SeedingResult<()>;

	/// Persists an entity and returns its post-write representation.
	async fn save(&self, entity: Entity, options: &SaveOptions) -> SeedingResult<Entity>;

	/// Every stored entity with the given name, in insertion order.
	async fn find_all(&self, entity: &str) -> SeedingResult<Vec<Entity>>;

	/// Number of stored entities with the given name.
	async fn count(&self, entity: &str) -> SeedingResult<usize>;
}

/// Builds a store from configured [`StoreOptions`].
#[async_trait]
pub trait StoreConnector: Send + Sync {
	/// Connects to the store described by `options`.
	///
	/// # Errors
	///
	/// Returns [`SeedingError::UnsupportedBackend`](crate::error::SeedingError::UnsupportedBackend)
	/// if this connector does not handle `options.backend`.
	async fn connect(&self, options: &StoreOptions) -> SeedingResult<Arc<dyn Store>>;
}
