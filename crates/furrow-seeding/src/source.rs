//! The shared store handle of a seeding run.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use furrow_conf::SeedingConfig;
use tracing::debug;

use crate::entity::Entity;
use crate::error::{SeedingError, SeedingResult};
use crate::store::{SaveOptions, Store, StoreConnector};

struct SourceInner {
	store: Arc<dyn Store>,
	config: SeedingConfig,
}

/// Handle to the store every factory and seeder of a run writes through.
///
/// Cloning is cheap and yields a handle to the same store. Build one source per run and
/// pass it to every factory and seeder.
///
/// Initialization is lazy: the first write calls [`Store::initialize`] unless the store
/// already reports itself initialized. The check is not guarded by a lock, so independent
/// tasks writing through one source at the same time may both initialize. A source is
/// meant to be driven by a single writer.
#[derive(Clone)]
pub struct SeedingSource {
	inner: Arc<SourceInner>,
}

impl SeedingSource {
	/// Creates a source owning `store`.
	pub fn new<S: Store + 'static>(store: S) -> Self {
		Self::from_store(Arc::new(store))
	}

	/// Creates a source around an existing store handle.
	pub fn from_store(store: Arc<dyn Store>) -> Self {
		SourceBuilder::assemble(store, SeedingConfig::default())
	}

	/// Starts building a source from configuration.
	pub fn builder() -> SourceBuilder {
		SourceBuilder::default()
	}

	/// The store handle.
	pub fn store(&self) -> &Arc<dyn Store> {
		&self.inner.store
	}

	/// Configuration the source was built from.
	pub fn config(&self) -> &SeedingConfig {
		&self.inner.config
	}

	/// Project root, if configured.
	pub fn root(&self) -> Option<&Path> {
		self.inner.config.root.as_deref()
	}

	/// Returns true if both handles share the same store.
	pub fn same_as(&self, other: &SeedingSource) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}

	/// Initializes the store unless it already is.
	pub async fn ensure_initialized(&self) -> SeedingResult<()> {
		if !self.inner.store.is_initialized() {
			debug!("initializing store");
			self.inner.store.initialize().await?;
		}
		Ok(())
	}

	/// Persists an entity, initializing the store first if needed.
	pub async fn save(&self, entity: Entity, options: &SaveOptions) -> SeedingResult<Entity> {
		self.ensure_initialized().await?;
		self.inner.store.save(entity, options).await
	}

	/// Loads every stored entity with the given name.
	pub async fn find_all(&self, entity: &str) -> SeedingResult<Vec<Entity>> {
		self.ensure_initialized().await?;
		self.inner.store.find_all(entity).await
	}

	/// Counts stored entities with the given name.
	pub async fn count(&self, entity: &str) -> SeedingResult<usize> {
		self.ensure_initialized().await?;
		self.inner.store.count(entity).await
	}
}

impl fmt::Debug for SeedingSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SeedingSource")
			.field("initialized", &self.inner.store.is_initialized())
			.field("root", &self.inner.config.root)
			.finish()
	}
}

/// Builder for [`SeedingSource`].
///
/// A store handle given through [`SourceBuilder::store`] takes precedence over the
/// configuration's store options.
#[derive(Default)]
pub struct SourceBuilder {
	store: Option<Arc<dyn Store>>,
	config: Option<SeedingConfig>,
}

impl SourceBuilder {
	/// Uses an existing store handle.
	pub fn store(mut self, store: Arc<dyn Store>) -> Self {
		self.store = Some(store);
		self
	}

	/// Uses the given configuration. Relative paths are resolved against its root.
	pub fn config(mut self, config: SeedingConfig) -> Self {
		self.config = Some(config.resolve_paths());
		self
	}

	/// Builds the source from an explicit store handle.
	///
	/// # Errors
	///
	/// Returns [`SeedingError::MissingStore`] when no handle was given.
	pub fn build(self) -> SeedingResult<SeedingSource> {
		let config = self.config.unwrap_or_default();
		let store = self.store.ok_or(SeedingError::MissingStore)?;
		Ok(Self::assemble(store, config))
	}

	/// Builds the source, connecting through `connector` when no handle was given.
	///
	/// # Errors
	///
	/// Returns [`SeedingError::MissingStore`] when there is neither a handle nor store
	/// options, and whatever the connector returns when connecting fails.
	pub async fn connect(self, connector: &dyn StoreConnector) -> SeedingResult<SeedingSource> {
		let config = self.config.unwrap_or_default();
		let store = match self.store {
			Some(store) => store,
			None => {
				let options = config
					.store_options
					.as_ref()
					.ok_or(SeedingError::MissingStore)?;
				debug!(backend = %options.backend, "connecting store");
				connector.connect(options).await?
			}
		};
		Ok(Self::assemble(store, config))
	}

	fn assemble(store: Arc<dyn Store>, config: SeedingConfig) -> SeedingSource {
		SeedingSource {
			inner: Arc::new(SourceInner { store, config }),
		}
	}
}
