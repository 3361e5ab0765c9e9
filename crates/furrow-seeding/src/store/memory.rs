//! In-memory store.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use furrow_conf::StoreOptions;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;

use super::{SaveOptions, Store, StoreConnector};
use crate::entity::Entity;
use crate::error::{SeedingError, SeedingResult};

/// Backend name accepted by [`MemoryConnector`].
pub const MEMORY_BACKEND: &str = "memory";

#[derive(Debug, Default)]
struct Table {
	last_id: i64,
	rows: Vec<Entity>,
}

/// Store keeping entities in process memory.
///
/// Entities without an `id` get the next auto-increment value for their entity name.
/// Saving an entity whose `id` already exists replaces the stored row.
#[derive(Debug, Default)]
pub struct MemoryStore {
	initialized: AtomicBool,
	initialize_calls: AtomicUsize,
	tables: RwLock<HashMap<String, Table>>,
}

impl MemoryStore {
	/// Creates an empty, uninitialized store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of times [`Store::initialize`] was called.
	pub fn initialize_calls(&self) -> usize {
		self.initialize_calls.load(Ordering::SeqCst)
	}

	/// Stored entities with the given name, in insertion order.
	pub fn records(&self, entity: &str) -> Vec<Entity> {
		self.tables
			.read()
			.get(entity)
			.map(|table| table.rows.clone())
			.unwrap_or_default()
	}

	/// Names of entities with at least one stored row.
	pub fn entity_names(&self) -> Vec<String> {
		let mut names: Vec<String> = self
			.tables
			.read()
			.iter()
			.filter(|(_, table)| !table.rows.is_empty())
			.map(|(name, _)| name.clone())
			.collect();
		names.sort();
		names
	}

	/// Removes every stored row and resets id sequences.
	pub fn clear(&self) {
		self.tables.write().clear();
	}

	fn ensure_open(&self) -> SeedingResult<()> {
		if self.is_initialized() {
			Ok(())
		} else {
			Err(SeedingError::Persistence(
				"memory store is not initialized".to_string(),
			))
		}
	}
}

#[async_trait]
impl Store for MemoryStore {
	fn is_initialized(&self) -> bool {
		self.initialized.load(Ordering::SeqCst)
	}

	async fn initialize(&self) -> SeedingResult<()> {
		self.initialize_calls.fetch_add(1, Ordering::SeqCst);
		self.initialized.store(true, Ordering::SeqCst);
		Ok(())
	}

	async fn save(&self, entity: Entity, options: &SaveOptions) -> SeedingResult<Entity> {
		self.ensure_open()?;

		let mut tables = self.tables.write();
		let table = tables.entry(entity.name().to_string()).or_default();

		let mut stored = entity.clone();
		match stored.id().and_then(Value::as_i64) {
			Some(id) => table.last_id = table.last_id.max(id),
			None if stored.id().is_none() => {
				table.last_id = table.last_id.checked_add(1).ok_or_else(|| {
					SeedingError::Persistence(format!("id sequence exhausted for {}", entity.name()))
				})?;
				stored.set("id", table.last_id);
			}
			None => {}
		}

		match table.rows.iter_mut().find(|row| row.id() == stored.id()) {
			Some(row) => *row = stored.clone(),
			None => table.rows.push(stored.clone()),
		}

		debug!(entity = stored.name(), id = ?stored.id(), "saved entity");

		if options.reload { Ok(stored) } else { Ok(entity) }
	}

	async fn find_all(&self, entity: &str) -> SeedingResult<Vec<Entity>> {
		self.ensure_open()?;
		Ok(self.records(entity))
	}

	async fn count(&self, entity: &str) -> SeedingResult<usize> {
		self.ensure_open()?;
		Ok(self
			.tables
			.read()
			.get(entity)
			.map(|table| table.rows.len())
			.unwrap_or(0))
	}
}

/// Connector for the `memory` backend.
///
/// By default every connection gets a fresh store. [`MemoryConnector::with_store`] hands
/// out a shared one instead, which lets callers inspect what a run wrote.
#[derive(Debug, Default, Clone)]
pub struct MemoryConnector {
	store: Option<Arc<MemoryStore>>,
}

impl MemoryConnector {
	/// Creates a connector producing fresh stores.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a connector that always returns `store`.
	pub fn with_store(store: Arc<MemoryStore>) -> Self {
		Self { store: Some(store) }
	}
}

#[async_trait]
impl StoreConnector for MemoryConnector {
	async fn connect(&self, options: &StoreOptions) -> SeedingResult<Arc<dyn Store>> {
		if options.backend != MEMORY_BACKEND {
			return Err(SeedingError::UnsupportedBackend(options.backend.clone()));
		}
		let store: Arc<dyn Store> = self.store.clone().unwrap_or_default();
		Ok(store)
	}
}
