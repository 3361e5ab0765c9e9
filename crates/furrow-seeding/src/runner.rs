//! Named seeder registry and the seed command.
//!
//! ```ignore
//! let mut registry = SeederRegistry::new();
//! registry.register(
//!     "UserSeeder",
//!     Binding::constructor(|s: &SeedingSource| Seeder::new(UserSeeder, s)),
//! );
//!
//! let report = SeedRunner::new(source, registry)
//!     .with_config(config.seeding.clone())
//!     .run(&[])
//!     .await?;
//! println!("ran {:?} in {:?}", report.seeders, report.elapsed);
//! ```

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use furrow_conf::SeedingCommandConfig;
use indexmap::IndexMap;
use tracing::{debug, info};

use crate::error::{SeedingError, SeedingResult};
use crate::resolve::Binding;
use crate::seeder::{Seeder, SeederDefinition};
use crate::source::SeedingSource;

/// Seeders addressable by name, in registration order.
#[derive(Debug, Clone, Default)]
pub struct SeederRegistry {
	seeders: IndexMap<String, Binding<Seeder>>,
}

impl SeederRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a seeder under `name`, replacing any previous one.
	pub fn register(&mut self, name: impl Into<String>, binding: Binding<Seeder>) -> &mut Self {
		self.seeders.insert(name.into(), binding);
		self
	}

	/// Gets the binding registered under `name`.
	pub fn get(&self, name: &str) -> Option<&Binding<Seeder>> {
		self.seeders.get(name)
	}

	/// Checks if `name` is registered.
	pub fn contains(&self, name: &str) -> bool {
		self.seeders.contains_key(name)
	}

	/// Registered names, in registration order.
	pub fn names(&self) -> Vec<String> {
		self.seeders.keys().cloned().collect()
	}

	/// Returns the number of registered seeders.
	pub fn len(&self) -> usize {
		self.seeders.len()
	}

	/// Returns true if nothing is registered.
	pub fn is_empty(&self) -> bool {
		self.seeders.is_empty()
	}
}

/// Outcome of a [`SeedRunner::run`].
#[derive(Debug, Clone)]
pub struct SeedReport {
	/// Names of the seeders run, in order.
	pub seeders: Vec<String>,

	/// When the run started.
	pub started_at: DateTime<Utc>,

	/// Wall time of the whole run.
	pub elapsed: Duration,
}

/// Runs named seeders against one source.
#[derive(Debug)]
pub struct SeedRunner {
	source: SeedingSource,
	registry: SeederRegistry,
	config: SeedingCommandConfig,
}

impl SeedRunner {
	/// Creates a runner with an empty command configuration.
	pub fn new(source: SeedingSource, registry: SeederRegistry) -> Self {
		Self {
			source,
			registry,
			config: SeedingCommandConfig::default(),
		}
	}

	/// Sets the command configuration used when no names are given.
	pub fn with_config(mut self, config: SeedingCommandConfig) -> Self {
		self.config = config;
		self
	}

	/// The registry.
	pub fn registry(&self) -> &SeederRegistry {
		&self.registry
	}

	/// Names [`run`](Self::run) would execute for `names`.
	///
	/// Explicit names win. Without any, the configured default seeder is used, then the
	/// configured seeder list, then every registered seeder.
	pub fn selection(&self, names: &[&str]) -> Vec<String> {
		if !names.is_empty() {
			names.iter().map(|name| name.to_string()).collect()
		} else if let Some(default) = &self.config.default_seeder {
			vec![default.clone()]
		} else if !self.config.seeders.is_empty() {
			self.config.seeders.clone()
		} else {
			self.registry.names()
		}
	}

	/// Runs the selected seeders one after another.
	///
	/// Every name is checked before anything runs, so an unknown name leaves the store
	/// untouched.
	///
	/// # Errors
	///
	/// Returns [`SeedingError::SeederNotFound`] for an unregistered name, or the first
	/// error a seeder returns. Seeders that completed before a failure are not undone.
	pub async fn run(&self, names: &[&str]) -> SeedingResult<SeedReport> {
		let selection = self.selection(names);
		let mut seeders = Vec::with_capacity(selection.len());
		for name in &selection {
			let binding = self
				.registry
				.get(name)
				.ok_or_else(|| SeedingError::SeederNotFound(name.clone()))?;
			seeders.push(binding.materialize(&self.source));
		}

		let started_at = Utc::now();
		let clock = Instant::now();
		debug!(count = seeders.len(), "seeding");

		for (name, seeder) in selection.iter().zip(&seeders) {
			info!(seeder = %name, "seeding");
			seeder.run().await?;
		}

		let elapsed = clock.elapsed();
		info!(seeders = selection.len(), ?elapsed, "seeding finished");
		Ok(SeedReport {
			seeders: selection,
			started_at,
			elapsed,
		})
	}
}

/// Runs one seeder definition against `source`.
pub async fn run_seeder<D: SeederDefinition>(
	definition: D,
	source: &SeedingSource,
) -> SeedingResult<()> {
	Seeder::new(definition, source).run().await
}
