//! Entity model.
//!
//! - [`EntitySchema`] describes an entity type: its name, the defaults a fresh instance
//!   starts with, and which attribute keys are deferred.
//! - [`Draft`] is an instance under materialization. Its attributes may still hold
//!   pending values or nested factories.
//! - [`Entity`] is the resolved, plain record handed back to callers.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{SeedingError, SeedingResult};
use crate::factory::Factory;

/// A value that can be awaited for its result.
///
/// This is the capability checked by [`crate::resolve::is_promise_like`]. Calling
/// `then` more than once must be allowed; each call yields a fresh future.
pub trait Thenable: Send + Sync {
	/// Starts (or joins) the computation and returns a future for its value.
	fn then(&self) -> BoxFuture<'static, SeedingResult<Value>>;
}

/// [`Thenable`] backed by a closure producing a future.
pub struct PendingFn<F>(F);

impl<F, Fut> Thenable for PendingFn<F>
where
	F: Fn() -> Fut + Send + Sync,
	Fut: Future<Output = SeedingResult<Value>> + Send + 'static,
{
	fn then(&self) -> BoxFuture<'static, SeedingResult<Value>> {
		(self.0)().boxed()
	}
}

/// One attribute of a [`Draft`].
#[derive(Clone)]
pub enum Attribute {
	/// Plain value.
	Value(Value),
	/// Value that must be awaited during resolution.
	Pending(Arc<dyn Thenable>),
	/// Nested entity produced by another factory during resolution.
	Factory(Factory),
}

impl Attribute {
	/// Wraps a closure returning a future as a pending attribute.
	///
	/// # Example
	///
	/// ```ignore
	/// let avatar = Attribute::pending(|| async { Ok(json!("https://example.com/a.png")) });
	/// ```
	pub fn pending<F, Fut>(produce: F) -> Self
	where
		F: Fn() -> Fut + Send + Sync + 'static,
		Fut: Future<Output = SeedingResult<Value>> + Send + 'static,
	{
		Self::Pending(Arc::new(PendingFn(produce)))
	}

	/// Returns the plain value, if resolved.
	pub fn as_value(&self) -> Option<&Value> {
		match self {
			Self::Value(value) => Some(value),
			_ => None,
		}
	}

	/// Returns the thenable capability, if this attribute has one.
	pub fn as_thenable(&self) -> Option<&dyn Thenable> {
		match self {
			Self::Pending(thenable) => Some(thenable.as_ref()),
			_ => None,
		}
	}

	/// Returns the nested factory, if any.
	pub fn as_factory(&self) -> Option<&Factory> {
		match self {
			Self::Factory(factory) => Some(factory),
			_ => None,
		}
	}
}

impl fmt::Debug for Attribute {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
			Self::Pending(_) => f.write_str("Pending"),
			Self::Factory(factory) => f.debug_tuple("Factory").field(factory).finish(),
		}
	}
}

macro_rules! attribute_from_value {
	($($ty:ty),* $(,)?) => {
		$(
			impl From<$ty> for Attribute {
				fn from(value: $ty) -> Self {
					Self::Value(Value::from(value))
				}
			}
		)*
	};
}

attribute_from_value!(Value, &str, String, bool, i32, i64, u32, u64, f64);

impl From<Factory> for Attribute {
	fn from(factory: Factory) -> Self {
		Self::Factory(factory)
	}
}

/// Caller supplied attribute overrides, applied as a shallow key overwrite.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
	attributes: IndexMap<String, Attribute>,
}

impl Overrides {
	/// Creates an empty set of overrides.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds an override and returns self.
	pub fn set(mut self, key: impl Into<String>, value: impl Into<Attribute>) -> Self {
		self.insert(key, value);
		self
	}

	/// Adds an override in place.
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Attribute>) {
		self.attributes.insert(key.into(), value.into());
	}

	/// Builds overrides from a JSON object.
	pub fn from_map(map: Map<String, Value>) -> Self {
		map.into_iter().collect()
	}

	/// Returns the override for `key`.
	pub fn get(&self, key: &str) -> Option<&Attribute> {
		self.attributes.get(key)
	}

	/// Number of overridden keys.
	pub fn len(&self) -> usize {
		self.attributes.len()
	}

	/// Returns true if nothing is overridden.
	pub fn is_empty(&self) -> bool {
		self.attributes.is_empty()
	}

	/// Iterates over the overrides in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&String, &Attribute)> {
		self.attributes.iter()
	}
}

impl<K, V> FromIterator<(K, V)> for Overrides
where
	K: Into<String>,
	V: Into<Attribute>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self {
			attributes: iter
				.into_iter()
				.map(|(key, value)| (key.into(), value.into()))
				.collect(),
		}
	}
}

/// An entity instance under materialization.
#[derive(Debug, Clone)]
pub struct Draft {
	name: String,
	attributes: IndexMap<String, Attribute>,
	deferred: Vec<String>,
}

impl Draft {
	/// Creates an empty draft for the named entity.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			attributes: IndexMap::new(),
			deferred: Vec::new(),
		}
	}

	/// Declares the keys eligible for resolution.
	pub fn with_deferred<I, S>(mut self, keys: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.deferred = keys.into_iter().map(Into::into).collect();
		self
	}

	/// Entity name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Keys eligible for resolution, in declaration order.
	pub fn deferred(&self) -> &[String] {
		&self.deferred
	}

	/// Sets an attribute, replacing any previous value.
	pub fn set(&mut self, key: impl Into<String>, value: impl Into<Attribute>) -> &mut Self {
		self.attributes.insert(key.into(), value.into());
		self
	}

	/// Returns an attribute.
	pub fn get(&self, key: &str) -> Option<&Attribute> {
		self.attributes.get(key)
	}

	/// Returns an attribute mutably.
	pub fn get_mut(&mut self, key: &str) -> Option<&mut Attribute> {
		self.attributes.get_mut(key)
	}

	/// Returns a resolved attribute value.
	pub fn value(&self, key: &str) -> Option<&Value> {
		self.get(key).and_then(Attribute::as_value)
	}

	/// Removes an attribute, keeping the order of the rest.
	pub fn remove(&mut self, key: &str) -> Option<Attribute> {
		self.attributes.shift_remove(key)
	}

	/// Returns true if the attribute is present.
	pub fn contains(&self, key: &str) -> bool {
		self.attributes.contains_key(key)
	}

	/// Attribute keys in insertion order.
	pub fn keys(&self) -> impl Iterator<Item = &String> {
		self.attributes.keys()
	}

	/// Number of attributes.
	pub fn len(&self) -> usize {
		self.attributes.len()
	}

	/// Returns true if there are no attributes.
	pub fn is_empty(&self) -> bool {
		self.attributes.is_empty()
	}

	/// Overwrites every overridden key. No merging, no coercion.
	pub fn apply(&mut self, overrides: &Overrides) {
		for (key, value) in overrides.iter() {
			self.attributes.insert(key.clone(), value.clone());
		}
	}

	/// Converts a fully resolved draft into an [`Entity`].
	pub fn into_entity(self) -> SeedingResult<Entity> {
		let mut fields = Map::with_capacity(self.attributes.len());
		for (key, attribute) in self.attributes {
			match attribute {
				Attribute::Value(value) => {
					fields.insert(key, value);
				}
				Attribute::Pending(_) | Attribute::Factory(_) => {
					return Err(SeedingError::UndeclaredDeferred {
						entity: self.name,
						field: key,
					});
				}
			}
		}
		Ok(Entity {
			name: self.name,
			fields,
		})
	}
}

type Defaults = Arc<dyn Fn(&mut Draft) + Send + Sync>;

/// Describes an entity type.
///
/// # Example
///
/// ```
/// use furrow_seeding::EntitySchema;
///
/// let pet = EntitySchema::new("Pet")
///     .defaults(|draft| {
///         draft.set("name", "Fluffy");
///     })
///     .deferred(["owner"]);
///
/// let draft = pet.instantiate();
/// assert_eq!(draft.name(), "Pet");
/// assert_eq!(draft.deferred(), ["owner".to_string()]);
/// ```
#[derive(Clone)]
pub struct EntitySchema {
	name: String,
	defaults: Option<Defaults>,
	deferred: Vec<String>,
}

impl EntitySchema {
	/// Creates a schema with no defaults and no deferred keys.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			defaults: None,
			deferred: Vec::new(),
		}
	}

	/// Sets the function that fills a fresh instance.
	pub fn defaults<F>(mut self, defaults: F) -> Self
	where
		F: Fn(&mut Draft) + Send + Sync + 'static,
	{
		self.defaults = Some(Arc::new(defaults));
		self
	}

	/// Declares the keys eligible for resolution.
	pub fn deferred<I, S>(mut self, keys: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.deferred = keys.into_iter().map(Into::into).collect();
		self
	}

	/// Entity name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Declared deferred keys.
	pub fn deferred_keys(&self) -> &[String] {
		&self.deferred
	}

	/// Builds a fresh draft.
	pub fn instantiate(&self) -> Draft {
		let mut draft = Draft::new(self.name.clone()).with_deferred(self.deferred.iter().cloned());
		if let Some(defaults) = &self.defaults {
			defaults(&mut draft);
		}
		draft
	}
}

impl fmt::Debug for EntitySchema {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EntitySchema")
			.field("name", &self.name)
			.field("deferred", &self.deferred)
			.finish_non_exhaustive()
	}
}

/// A resolved entity record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
	name: String,
	fields: Map<String, Value>,
}

impl Entity {
	/// Creates an entity with no fields.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			fields: Map::new(),
		}
	}

	/// Adds a field and returns self.
	pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.fields.insert(key.into(), value.into());
		self
	}

	/// Entity name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Returns a field.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.fields.get(key)
	}

	/// Sets a field.
	pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
		self.fields.insert(key.into(), value.into());
	}

	/// Store generated identifier, if assigned.
	pub fn id(&self) -> Option<&Value> {
		self.fields.get("id").filter(|id| !id.is_null())
	}

	/// All fields.
	pub fn fields(&self) -> &Map<String, Value> {
		&self.fields
	}

	/// Converts into a JSON object holding the fields.
	pub fn into_value(self) -> Value {
		Value::Object(self.fields)
	}
}
