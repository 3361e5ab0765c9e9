//! Stores for failure scenarios.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use furrow_seeding::prelude::*;

/// Delegates to a [`MemoryStore`] but refuses every save after the first `limit`.
pub struct FlakyStore {
	inner: Arc<MemoryStore>,
	limit: usize,
	saves: AtomicUsize,
}

impl FlakyStore {
	/// Accepts `limit` saves, then fails.
	pub fn new(inner: Arc<MemoryStore>, limit: usize) -> Self {
		Self {
			inner,
			limit,
			saves: AtomicUsize::new(0),
		}
	}
}

#[async_trait]
impl Store for FlakyStore {
	fn is_initialized(&self) -> bool {
		self.inner.is_initialized()
	}

	async fn initialize(&self) -> SeedingResult<()> {
		self.inner.initialize().await
	}

	async fn save(&self, entity: Entity, options: &SaveOptions) -> SeedingResult<Entity> {
		if self.saves.fetch_add(1, Ordering::SeqCst) >= self.limit {
			return Err(SeedingError::Persistence(format!(
				"refusing to save {}",
				entity.name()
			)));
		}
		self.inner.save(entity, options).await
	}

	async fn find_all(&self, entity: &str) -> SeedingResult<Vec<Entity>> {
		self.inner.find_all(entity).await
	}

	async fn count(&self, entity: &str) -> SeedingResult<usize> {
		self.inner.count(entity).await
	}
}
