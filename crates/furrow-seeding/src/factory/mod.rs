//! Entity factories.
//!
//! A [`Factory`] turns a [`FactoryDefinition`] into entities. Each materialization runs
//! the same pipeline:
//!
//! 1. resolve the entity schema (instance override, then static option)
//! 2. build the base instance through [`FactoryDefinition::entity`]
//! 3. apply the mapping hook, if one is registered
//! 4. apply caller overrides
//! 5. call [`FactoryDefinition::finalize`]
//! 6. resolve deferred attributes: await pending values and expand nested factories,
//!    creating them when the parent is being created and making them otherwise
//!
//! [`Factory::create`] then saves the result through the [`SeedingSource`].

mod definition;

pub use definition::{FactoryDefinition, FactoryOptions};

use std::fmt;
use std::sync::Arc;

use futures::future::{self, BoxFuture};
use tracing::debug;

use crate::entity::{Attribute, Draft, Entity, EntitySchema, Overrides};
use crate::error::{SeedingError, SeedingResult};
use crate::resolve::{Attach, Binding, repoint, resolve_factory};
use crate::source::SeedingSource;
use crate::store::SaveOptions;

type MapFn =
	Arc<dyn for<'d> Fn(&'d mut Draft) -> BoxFuture<'d, SeedingResult<()>> + Send + Sync>;

/// Materializes and persists entities of one type.
///
/// Cloning a factory is cheap; clones share the definition and the mapping hook.
#[derive(Clone)]
pub struct Factory {
	definition: Arc<dyn FactoryDefinition>,
	options: FactoryOptions,
	overrides: FactoryOptions,
	source: SeedingSource,
	map: Option<MapFn>,
}

impl Factory {
	/// Creates a factory with no instance-level overrides.
	pub fn new<D: FactoryDefinition>(definition: D, source: &SeedingSource) -> Self {
		Self::builder(definition).build(source)
	}

	/// Starts building a factory with instance-level overrides.
	pub fn builder<D: FactoryDefinition>(definition: D) -> FactoryBuilder {
		FactoryBuilder {
			definition: Arc::new(definition),
			overrides: FactoryOptions::default(),
		}
	}

	/// Name of the definition.
	pub fn name(&self) -> &'static str {
		self.definition.name()
	}

	/// Source this factory writes through.
	pub fn source(&self) -> &SeedingSource {
		&self.source
	}

	/// Entity schema in effect: the instance override, else the static option.
	pub fn entity_schema(&self) -> Option<&EntitySchema> {
		self.overrides
			.entity
			.as_ref()
			.or(self.options.entity.as_ref())
	}

	/// Registers a transform applied to every instance before overrides.
	///
	/// Replaces any previously registered transform.
	pub fn map<F>(self, map: F) -> Self
	where
		F: Fn(&mut Draft) + Send + Sync + 'static,
	{
		self.map_async(move |draft| {
			map(draft);
			Box::pin(future::ready(Ok::<(), SeedingError>(())))
		})
	}

	/// Registers an asynchronous transform applied to every instance before overrides.
	///
	/// The returned future is awaited in place of a [`map`](Self::map) hook; an error
	/// aborts the materialization. Replaces any previously registered transform.
	///
	/// ```ignore
	/// let users = Factory::new(UserFactory, &source).map_async(|user| {
	///     Box::pin(async move {
	///         user.set("avatar", lookup_avatar().await?);
	///         Ok(())
	///     })
	/// });
	/// ```
	pub fn map_async<F>(mut self, map: F) -> Self
	where
		F: for<'d> Fn(&'d mut Draft) -> BoxFuture<'d, SeedingResult<()>> + Send + Sync + 'static,
	{
		self.map = Some(Arc::new(map));
		self
	}

	/// Returns the sub-factory bound under `key`.
	///
	/// # Errors
	///
	/// Returns [`SeedingError::FactoryNotFound`] if neither the instance overrides nor the
	/// static options bind `key`.
	pub fn sub_factory(&self, key: &str) -> SeedingResult<Factory> {
		resolve_factory(
			&self.source,
			key,
			&self.options.sub_factories,
			&self.overrides.sub_factories,
		)
	}

	/// Builds an entity without persisting it.
	pub async fn make(&self, overrides: Overrides) -> SeedingResult<Entity> {
		self.materialize(&overrides, false).await
	}

	/// Builds `amount` entities without persisting them, one after another.
	pub async fn make_many(&self, amount: usize, overrides: Overrides) -> SeedingResult<Vec<Entity>> {
		let mut entities = Vec::with_capacity(amount);
		for _ in 0..amount {
			entities.push(self.materialize(&overrides, false).await?);
		}
		Ok(entities)
	}

	/// Builds an entity and saves it, returning the stored representation.
	pub async fn create(&self, overrides: Overrides, options: &SaveOptions) -> SeedingResult<Entity> {
		let entity = self.materialize(&overrides, true).await?;
		self.source.save(entity, options).await
	}

	/// Builds and saves `amount` entities, one after another.
	///
	/// Stops at the first failure. Entities saved before it stay saved.
	pub async fn create_many(
		&self,
		amount: usize,
		overrides: Overrides,
		options: &SaveOptions,
	) -> SeedingResult<Vec<Entity>> {
		let mut entities = Vec::with_capacity(amount);
		for _ in 0..amount {
			let entity = self.materialize(&overrides, true).await?;
			entities.push(self.source.save(entity, options).await?);
		}
		Ok(entities)
	}

	fn materialize<'a>(
		&'a self,
		overrides: &'a Overrides,
		persist: bool,
	) -> BoxFuture<'a, SeedingResult<Entity>> {
		Box::pin(async move {
			let base = self.entity_schema().map(EntitySchema::instantiate);
			let mut draft = self.definition.entity(self, base).await?;

			if let Some(map) = &self.map {
				map(&mut draft).await?;
			}
			draft.apply(overrides);
			self.definition.finalize(self, &mut draft).await?;

			debug!(
				factory = self.name(),
				entity = draft.name(),
				persist,
				"resolving entity"
			);
			self.resolve(draft, persist).await
		})
	}

	async fn resolve(&self, mut draft: Draft, persist: bool) -> SeedingResult<Entity> {
		for key in draft.deferred().to_vec() {
			let resolved = match draft.get(&key) {
				Some(Attribute::Pending(thenable)) => thenable.then().await,
				Some(Attribute::Factory(nested)) => {
					let nested = repoint(nested.clone(), &self.source);
					if persist {
						nested
							.create(Overrides::new(), &SaveOptions::default())
							.await
							.map(Entity::into_value)
					} else {
						nested.make(Overrides::new()).await.map(Entity::into_value)
					}
				}
				Some(Attribute::Value(_)) | None => continue,
			};

			let value = resolved.map_err(|source| SeedingError::Resolution {
				entity: draft.name().to_string(),
				field: key.clone(),
				source: Box::new(source),
			})?;
			draft.set(key, value);
		}

		draft.into_entity()
	}
}

impl Attach for Factory {
	fn source(&self) -> &SeedingSource {
		&self.source
	}

	fn attach(mut self, source: &SeedingSource) -> Self {
		self.source = source.clone();
		self
	}
}

impl fmt::Debug for Factory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Factory")
			.field("definition", &self.name())
			.field("entity", &self.entity_schema().map(EntitySchema::name))
			.finish_non_exhaustive()
	}
}

/// Builder for a [`Factory`] with instance-level overrides.
pub struct FactoryBuilder {
	definition: Arc<dyn FactoryDefinition>,
	overrides: FactoryOptions,
}

impl FactoryBuilder {
	/// Overrides the entity schema.
	pub fn entity(mut self, schema: EntitySchema) -> Self {
		self.overrides.entity = Some(schema);
		self
	}

	/// Overrides the sub-factory bound under `key`.
	pub fn sub_factory(mut self, key: impl Into<String>, binding: Binding<Factory>) -> Self {
		self.overrides.sub_factories.insert(key.into(), binding);
		self
	}

	/// Finishes the factory, writing through `source`.
	pub fn build(self, source: &SeedingSource) -> Factory {
		Factory {
			options: self.definition.options(),
			definition: self.definition,
			overrides: self.overrides,
			source: source.clone(),
			map: None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::ErrorKind;
	use crate::store::{MemoryStore, Store};
	use async_trait::async_trait;
	use rstest::{fixture, rstest};
	use serde_json::json;
	use std::sync::atomic::{AtomicUsize, Ordering};

	struct UserFactory;

	impl FactoryDefinition for UserFactory {
		fn options(&self) -> FactoryOptions {
			FactoryOptions::new().entity(EntitySchema::new("User").defaults(|user| {
				user.set("name", "Ada").set("role", "member");
			}))
		}
	}

	struct PetFactory;

	#[async_trait]
	impl FactoryDefinition for PetFactory {
		fn options(&self) -> FactoryOptions {
			FactoryOptions::new()
				.entity(
					EntitySchema::new("Pet")
						.defaults(|pet| {
							pet.set("name", "Rex");
						})
						.deferred(["owner"]),
				)
				.sub_factory(
					"owner",
					Binding::constructor(|source: &SeedingSource| Factory::new(UserFactory, source)),
				)
		}

		async fn entity(&self, factory: &Factory, entity: Option<Draft>) -> SeedingResult<Draft> {
			let mut pet = entity.ok_or_else(|| SeedingError::NoEntity(self.name().to_string()))?;
			pet.set("owner", factory.sub_factory("owner")?);
			Ok(pet)
		}
	}

	#[derive(Default)]
	struct TracingFactory {
		calls: Arc<parking_lot::Mutex<Vec<&'static str>>>,
		sequence: AtomicUsize,
	}

	#[async_trait]
	impl FactoryDefinition for TracingFactory {
		fn options(&self) -> FactoryOptions {
			FactoryOptions::new().entity(EntitySchema::new("Step"))
		}

		async fn entity(&self, _factory: &Factory, entity: Option<Draft>) -> SeedingResult<Draft> {
			self.calls.lock().push("entity");
			let mut draft = entity.ok_or_else(|| SeedingError::NoEntity(self.name().to_string()))?;
			draft.set("seq", self.sequence.fetch_add(1, Ordering::SeqCst) as u64);
			Ok(draft)
		}

		async fn finalize(&self, _factory: &Factory, entity: &mut Draft) -> SeedingResult<()> {
			self.calls.lock().push("finalize");
			let stage = entity.value("stage").cloned().unwrap_or(json!(null));
			entity.set("finalized_stage", stage);
			Ok(())
		}
	}

	struct Bare;

	impl FactoryDefinition for Bare {}

	#[fixture]
	fn store() -> Arc<MemoryStore> {
		Arc::new(MemoryStore::new())
	}

	#[rstest]
	#[tokio::test]
	async fn test_make_applies_defaults_and_overrides(store: Arc<MemoryStore>) {
		let source = SeedingSource::from_store(store.clone());
		let factory = Factory::new(UserFactory, &source);

		let user = factory
			.make(Overrides::new().set("name", "Grace"))
			.await
			.unwrap();

		assert_eq!(user.name(), "User");
		assert_eq!(user.get("name"), Some(&json!("Grace")));
		assert_eq!(user.get("role"), Some(&json!("member")));
		assert!(user.id().is_none());
		assert!(!store.is_initialized());
	}

	#[rstest]
	#[tokio::test]
	async fn test_pipeline_order(store: Arc<MemoryStore>) {
		let source = SeedingSource::from_store(store);
		let definition = TracingFactory::default();
		let calls = definition.calls.clone();
		let factory = Factory::new(definition, &source).map(|draft| {
			draft.set("stage", "mapped");
		});

		let entity = factory
			.make(Overrides::new().set("stage", "overridden"))
			.await
			.unwrap();

		assert_eq!(entity.get("finalized_stage"), Some(&json!("overridden")));
		assert_eq!(*calls.lock(), vec!["entity", "finalize"]);
	}

	#[rstest]
	#[tokio::test]
	async fn test_map_replaces_previous_hook(store: Arc<MemoryStore>) {
		let source = SeedingSource::from_store(store);
		let factory = Factory::new(UserFactory, &source)
			.map(|draft| {
				draft.set("first", true);
			})
			.map(|draft| {
				draft.set("second", true);
			});

		let first = factory.make(Overrides::new()).await.unwrap();
		let second = factory.make(Overrides::new()).await.unwrap();

		for user in [first, second] {
			assert!(user.get("first").is_none());
			assert_eq!(user.get("second"), Some(&json!(true)));
		}
	}

	#[rstest]
	#[tokio::test]
	async fn test_make_many_is_sequential(store: Arc<MemoryStore>) {
		let source = SeedingSource::from_store(store);
		let factory = Factory::new(TracingFactory::default(), &source);

		let steps = factory.make_many(4, Overrides::new()).await.unwrap();

		let seqs: Vec<_> = steps.iter().map(|step| step.get("seq").cloned()).collect();
		assert_eq!(seqs, vec![Some(json!(0)), Some(json!(1)), Some(json!(2)), Some(json!(3))]);
	}

	#[rstest]
	#[tokio::test]
	async fn test_create_cascades_to_nested(store: Arc<MemoryStore>) {
		let source = SeedingSource::from_store(store.clone());
		let factory = Factory::new(PetFactory, &source);

		let pet = factory
			.create(Overrides::new(), &SaveOptions::default())
			.await
			.unwrap();

		assert_eq!(pet.id(), Some(&json!(1)));
		assert_eq!(pet.get("owner").and_then(|owner| owner.get("id")), Some(&json!(1)));
		assert_eq!(store.records("User").len(), 1);
		assert_eq!(store.records("Pet").len(), 1);
	}

	#[rstest]
	#[tokio::test]
	async fn test_make_cascades_make(store: Arc<MemoryStore>) {
		let source = SeedingSource::from_store(store.clone());
		let factory = Factory::new(PetFactory, &source);

		let pet = factory.make(Overrides::new()).await.unwrap();

		assert_eq!(pet.get("owner").and_then(|owner| owner.get("name")), Some(&json!("Ada")));
		assert!(pet.get("owner").and_then(|owner| owner.get("id")).is_none());
		assert_eq!(store.initialize_calls(), 0);
	}

	#[rstest]
	#[tokio::test]
	async fn test_pending_override_is_awaited(store: Arc<MemoryStore>) {
		let source = SeedingSource::from_store(store);
		let schema = EntitySchema::new("User").deferred(["avatar"]);
		let factory = Factory::builder(UserFactory).entity(schema).build(&source);

		let user = factory
			.make(Overrides::new().set(
				"avatar",
				Attribute::pending(|| async { Ok(json!("https://example.com/a.png")) }),
			))
			.await
			.unwrap();

		assert_eq!(user.get("avatar"), Some(&json!("https://example.com/a.png")));
	}

	#[rstest]
	#[tokio::test]
	async fn test_rejected_pending_aborts_entity(store: Arc<MemoryStore>) {
		let source = SeedingSource::from_store(store.clone());
		let schema = EntitySchema::new("User").deferred(["avatar"]);
		let factory = Factory::builder(UserFactory).entity(schema).build(&source);

		let result = factory
			.create(
				Overrides::new().set(
					"avatar",
					Attribute::pending(|| async { Err(SeedingError::Rejected("cdn down".into())) }),
				),
				&SaveOptions::default(),
			)
			.await;

		let error = result.unwrap_err();
		assert_eq!(error.kind(), ErrorKind::Resolution);
		assert!(matches!(error, SeedingError::Resolution { ref field, .. } if field == "avatar"));
		assert!(store.records("User").is_empty());
	}

	#[rstest]
	#[tokio::test]
	async fn test_pending_on_undeclared_key_fails(store: Arc<MemoryStore>) {
		let source = SeedingSource::from_store(store);
		let factory = Factory::new(UserFactory, &source);

		let result = factory
			.make(Overrides::new().set("avatar", Attribute::pending(|| async { Ok(json!("x")) })))
			.await;

		assert!(matches!(
			result,
			Err(SeedingError::UndeclaredDeferred { field, .. }) if field == "avatar"
		));
	}

	#[rstest]
	#[tokio::test]
	async fn test_missing_entity(store: Arc<MemoryStore>) {
		let source = SeedingSource::from_store(store.clone());
		let factory = Factory::new(Bare, &source);

		let result = factory.create(Overrides::new(), &SaveOptions::default()).await;

		let error = result.unwrap_err();
		assert!(matches!(error, SeedingError::NoEntity(_)));
		assert_eq!(error.kind(), ErrorKind::Configuration);
		assert_eq!(store.initialize_calls(), 0);
	}

	#[rstest]
	#[tokio::test]
	async fn test_instance_schema_overrides_option(store: Arc<MemoryStore>) {
		let source = SeedingSource::from_store(store.clone());
		let factory = Factory::builder(UserFactory)
			.entity(EntitySchema::new("User2"))
			.build(&source);

		factory
			.create_many(3, Overrides::new(), &SaveOptions::default())
			.await
			.unwrap();

		assert_eq!(store.records("User2").len(), 3);
		assert!(store.records("User").is_empty());
	}

	#[rstest]
	fn test_sub_factory_override_wins(store: Arc<MemoryStore>) {
		let source = SeedingSource::from_store(store);
		let factory = Factory::builder(PetFactory)
			.sub_factory(
				"owner",
				Binding::instance(
					Factory::builder(UserFactory)
						.entity(EntitySchema::new("Owner"))
						.build(&source),
				),
			)
			.build(&source);

		let owner = factory.sub_factory("owner").unwrap();
		assert_eq!(owner.entity_schema().map(EntitySchema::name), Some("Owner"));
	}

	#[rstest]
	fn test_sub_factory_missing_key(store: Arc<MemoryStore>) {
		let source = SeedingSource::from_store(store.clone());
		let factory = Factory::new(UserFactory, &source);

		let result = factory.sub_factory("missing-key");

		assert!(matches!(result, Err(SeedingError::FactoryNotFound(_))));
		assert_eq!(store.initialize_calls(), 0);
	}

	#[rstest]
	#[tokio::test]
	async fn test_async_map_runs_before_overrides(store: Arc<MemoryStore>) {
		let source = SeedingSource::from_store(store);
		let factory = Factory::new(UserFactory, &source).map_async(|draft| {
			Box::pin(async move {
				tokio::task::yield_now().await;
				draft.set("nickname", "ada").set("role", "mapped");
				Ok(())
			})
		});

		let user = factory
			.make(Overrides::new().set("role", "admin"))
			.await
			.unwrap();

		assert_eq!(user.get("nickname"), Some(&json!("ada")));
		assert_eq!(user.get("role"), Some(&json!("admin")));
	}

	#[rstest]
	#[tokio::test]
	async fn test_async_map_error_aborts_create(store: Arc<MemoryStore>) {
		let source = SeedingSource::from_store(store.clone());
		let factory = Factory::new(UserFactory, &source).map_async(|_draft| {
			Box::pin(async { Err(SeedingError::Rejected("lookup failed".into())) })
		});

		let result = factory.create(Overrides::new(), &SaveOptions::default()).await;

		assert!(matches!(result, Err(SeedingError::Rejected(msg)) if msg == "lookup failed"));
		assert!(store.records("User").is_empty());
		assert_eq!(store.initialize_calls(), 0);
	}

	#[rstest]
	#[tokio::test]
	async fn test_nested_factory_writes_through_parent_source(store: Arc<MemoryStore>) {
		let source = SeedingSource::from_store(store.clone());
		let other = Arc::new(MemoryStore::new());
		let elsewhere = SeedingSource::from_store(other.clone());
		let factory = Factory::new(PetFactory, &source).map(move |pet| {
			pet.set("owner", Factory::new(UserFactory, &elsewhere));
		});

		factory
			.create(Overrides::new(), &SaveOptions::default())
			.await
			.unwrap();

		assert_eq!(store.records("User").len(), 1);
		assert_eq!(other.initialize_calls(), 0);
		assert!(other.records("User").is_empty());
	}

	#[rstest]
	#[tokio::test]
	async fn test_pending_json_failure_is_resolution(store: Arc<MemoryStore>) {
		let source = SeedingSource::from_store(store);
		let schema = EntitySchema::new("User").deferred(["profile"]);
		let factory = Factory::builder(UserFactory).entity(schema).build(&source);
		let profile = Attribute::pending(|| async {
			let parsed = serde_json::from_str::<serde_json::Value>("{not json")?;
			Ok::<_, SeedingError>(parsed)
		});

		let error = factory
			.make(Overrides::new().set("profile", profile))
			.await
			.unwrap_err();

		assert_eq!(error.kind(), ErrorKind::Resolution);
		assert!(matches!(error.root_cause(), SeedingError::JsonError(_)));
	}
}
