//! User-facing factory hooks.

use async_trait::async_trait;

use super::Factory;
use crate::entity::{Draft, EntitySchema};
use crate::error::{SeedingError, SeedingResult};
use crate::resolve::{Binding, Bindings};

/// Statically declared factory configuration.
#[derive(Debug, Clone, Default)]
pub struct FactoryOptions {
	/// Entity schema instances are built from.
	pub entity: Option<EntitySchema>,

	/// Factories reachable through [`Factory::sub_factory`].
	pub sub_factories: Bindings<Factory>,
}

impl FactoryOptions {
	/// Creates empty options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the entity schema.
	pub fn entity(mut self, schema: EntitySchema) -> Self {
		self.entity = Some(schema);
		self
	}

	/// Binds a sub-factory under `key`.
	pub fn sub_factory(mut self, key: impl Into<String>, binding: Binding<Factory>) -> Self {
		self.sub_factories.insert(key.into(), binding);
		self
	}
}

/// Defines how a [`Factory`] builds one entity type.
///
/// Every hook has a default, so the smallest definition only declares options:
///
/// ```
/// use furrow_seeding::{EntitySchema, FactoryDefinition, FactoryOptions};
///
/// struct UserFactory;
///
/// impl FactoryDefinition for UserFactory {
///     fn options(&self) -> FactoryOptions {
///         FactoryOptions::new().entity(EntitySchema::new("User").defaults(|user| {
///             user.set("name", "Ada");
///         }))
///     }
/// }
/// ```
///
/// Definitions are shared by every clone of a factory, so state kept inside one (a
/// sequence counter, a seeded RNG) carries over between materializations.
#[async_trait]
pub trait FactoryDefinition: Send + Sync + 'static {
	/// Name used in logs and errors.
	fn name(&self) -> &'static str {
		std::any::type_name::<Self>()
	}

	/// Static configuration. Instance-level overrides given to
	/// [`FactoryBuilder`](super::FactoryBuilder) take precedence.
	fn options(&self) -> FactoryOptions {
		FactoryOptions::default()
	}

	/// Produces the base instance.
	///
	/// `entity` is a fresh instance of the resolved schema, or `None` when no schema is
	/// configured. The default returns it unchanged and fails without one.
	async fn entity(&self, _factory: &Factory, entity: Option<Draft>) -> SeedingResult<Draft> {
		entity.ok_or_else(|| SeedingError::NoEntity(self.name().to_string()))
	}

	/// Runs once per materialization, after mapping and overrides.
	async fn finalize(&self, _factory: &Factory, _entity: &mut Draft) -> SeedingResult<()> {
		Ok(())
	}
}
