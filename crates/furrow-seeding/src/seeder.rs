//! Seeders compose factories and other seeders into one run.
//!
//! A seeder is a binding facade: it hands out factories by key, runs its child seeders in
//! order, and leaves everything else to [`SeederDefinition::run`].
//!
//! ```ignore
//! struct UserSeeder;
//!
//! #[async_trait]
//! impl SeederDefinition for UserSeeder {
//!     fn options(&self) -> SeederOptions {
//!         SeederOptions::new()
//!             .factory("user", Binding::constructor(|s: &SeedingSource| Factory::new(UserFactory, s)))
//!             .seeder(Binding::constructor(|s: &SeedingSource| Seeder::new(PetSeeder, s)))
//!     }
//!
//!     async fn run(&self, seeder: &Seeder) -> SeedingResult<()> {
//!         seeder
//!             .factory("user")?
//!             .create_many(10, Overrides::new(), &SaveOptions::default())
//!             .await?;
//!         seeder.call().await
//!     }
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::SeedingResult;
use crate::factory::Factory;
use crate::resolve::{Attach, Binding, Bindings, resolve_factory, resolve_seeders};
use crate::source::SeedingSource;

/// Statically declared seeder configuration.
#[derive(Debug, Clone, Default)]
pub struct SeederOptions {
	/// Factories reachable through [`Seeder::factory`].
	pub factories: Bindings<Factory>,

	/// Child seeders run by [`Seeder::call`], in order.
	pub seeders: Vec<Binding<Seeder>>,
}

impl SeederOptions {
	/// Creates empty options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Binds a factory under `key`.
	pub fn factory(mut self, key: impl Into<String>, binding: Binding<Factory>) -> Self {
		self.factories.insert(key.into(), binding);
		self
	}

	/// Appends a child seeder.
	pub fn seeder(mut self, binding: Binding<Seeder>) -> Self {
		self.seeders.push(binding);
		self
	}
}

/// Defines what a [`Seeder`] does when run.
#[async_trait]
pub trait SeederDefinition: Send + Sync + 'static {
	/// Name used in logs and reports.
	fn name(&self) -> &'static str {
		std::any::type_name::<Self>()
	}

	/// Static configuration. Overrides given to [`SeederBuilder`] take precedence.
	fn options(&self) -> SeederOptions {
		SeederOptions::default()
	}

	/// Seeds data using `seeder.factory(..)` and `seeder.call()`.
	async fn run(&self, seeder: &Seeder) -> SeedingResult<()>;
}

/// A runnable seeder bound to a [`SeedingSource`].
#[derive(Clone)]
pub struct Seeder {
	definition: Arc<dyn SeederDefinition>,
	options: SeederOptions,
	factories: Bindings<Factory>,
	seeders: Option<Vec<Binding<Seeder>>>,
	source: SeedingSource,
}

impl Seeder {
	/// Creates a seeder with no overrides.
	pub fn new<D: SeederDefinition>(definition: D, source: &SeedingSource) -> Self {
		Self::builder(definition).build(source)
	}

	/// Starts building a seeder with overrides.
	pub fn builder<D: SeederDefinition>(definition: D) -> SeederBuilder {
		SeederBuilder {
			definition: Arc::new(definition),
			factories: Bindings::new(),
			seeders: None,
		}
	}

	/// Name of the definition.
	pub fn name(&self) -> &'static str {
		self.definition.name()
	}

	/// Source this seeder and its factories write through.
	pub fn source(&self) -> &SeedingSource {
		&self.source
	}

	/// Returns the factory bound under `key`, overrides first.
	///
	/// # Errors
	///
	/// Returns [`SeedingError::FactoryNotFound`](crate::error::SeedingError::FactoryNotFound)
	/// if `key` is bound nowhere.
	pub fn factory(&self, key: &str) -> SeedingResult<Factory> {
		resolve_factory(&self.source, key, &self.options.factories, &self.factories)
	}

	/// Child seeders in run order, attached to this seeder's source.
	pub fn children(&self) -> Vec<Seeder> {
		resolve_seeders(&self.source, &self.options.seeders, self.seeders.as_deref())
	}

	/// Runs every child seeder, one after another.
	///
	/// Each child finishes before the next starts; the first failure stops the chain.
	pub async fn call(&self) -> SeedingResult<()> {
		for child in self.children() {
			debug!(parent = self.name(), child = child.name(), "calling seeder");
			child.run().await?;
		}
		Ok(())
	}

	/// Runs the definition.
	pub async fn run(&self) -> SeedingResult<()> {
		info!(seeder = self.name(), "running seeder");
		self.definition.run(self).await
	}
}

impl Attach for Seeder {
	fn source(&self) -> &SeedingSource {
		&self.source
	}

	fn attach(mut self, source: &SeedingSource) -> Self {
		self.source = source.clone();
		self
	}
}

impl fmt::Debug for Seeder {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Seeder")
			.field("definition", &self.name())
			.field("factories", &self.factories.keys().collect::<Vec<_>>())
			.finish_non_exhaustive()
	}
}

/// Builder for a [`Seeder`] with overrides.
pub struct SeederBuilder {
	definition: Arc<dyn SeederDefinition>,
	factories: Bindings<Factory>,
	seeders: Option<Vec<Binding<Seeder>>>,
}

impl SeederBuilder {
	/// Overrides the factory bound under `key`.
	pub fn factory(mut self, key: impl Into<String>, binding: Binding<Factory>) -> Self {
		self.factories.insert(key.into(), binding);
		self
	}

	/// Replaces the child seeder list.
	pub fn seeders(mut self, seeders: Vec<Binding<Seeder>>) -> Self {
		self.seeders = Some(seeders);
		self
	}

	/// Finishes the seeder, writing through `source`.
	pub fn build(self, source: &SeedingSource) -> Seeder {
		Seeder {
			options: self.definition.options(),
			definition: self.definition,
			factories: self.factories,
			seeders: self.seeders,
			source: source.clone(),
		}
	}
}
