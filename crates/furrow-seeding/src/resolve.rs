//! Binding resolution and promise-like detection.
//!
//! Factories and seeders refer to their collaborators through [`Binding`]s, either a
//! ready instance or a constructor. A key is looked up in the call-site overrides first,
//! then in the statically declared bindings. Whatever comes out is attached to the
//! active [`SeedingSource`].

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::warn;

use crate::entity::Attribute;
use crate::error::{SeedingError, SeedingResult};
use crate::factory::Factory;
use crate::seeder::Seeder;
use crate::source::SeedingSource;

/// Something that writes through a [`SeedingSource`].
pub trait Attach: Sized {
	/// The source currently attached.
	fn source(&self) -> &SeedingSource;

	/// Returns self writing through `source`.
	fn attach(self, source: &SeedingSource) -> Self;
}

type Constructor<T> = Arc<dyn Fn(&SeedingSource) -> T + Send + Sync>;

/// A collaborator given either as a ready instance or as a constructor.
pub enum Binding<T> {
	/// Reused instance.
	Instance(T),
	/// Built fresh on every resolution.
	Constructor(Constructor<T>),
}

impl<T> Binding<T> {
	/// Binds a ready instance.
	pub fn instance(value: T) -> Self {
		Self::Instance(value)
	}

	/// Binds a constructor.
	pub fn constructor<F>(build: F) -> Self
	where
		F: Fn(&SeedingSource) -> T + Send + Sync + 'static,
	{
		Self::Constructor(Arc::new(build))
	}
}

impl<T: Attach + Clone> Binding<T> {
	/// Produces a live value writing through `source`.
	pub fn materialize(&self, source: &SeedingSource) -> T {
		match self {
			Self::Instance(value) => repoint(value.clone(), source),
			Self::Constructor(build) => build(source),
		}
	}
}

impl<T: Clone> Clone for Binding<T> {
	fn clone(&self) -> Self {
		match self {
			Self::Instance(value) => Self::Instance(value.clone()),
			Self::Constructor(build) => Self::Constructor(build.clone()),
		}
	}
}

impl<T: fmt::Debug> fmt::Debug for Binding<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Instance(value) => f.debug_tuple("Instance").field(value).finish(),
			Self::Constructor(_) => f.write_str("Constructor"),
		}
	}
}

/// Attaches `value` to `source`, warning when it was built against another source.
pub fn repoint<T: Attach>(value: T, source: &SeedingSource) -> T {
	if !value.source().same_as(source) {
		warn!("instance carries a different seeding source; re-pointing it");
	}
	value.attach(source)
}

/// Named bindings, in declaration order.
pub type Bindings<T> = IndexMap<String, Binding<T>>;

/// Resolves `key` with call-site overrides winning over static bindings.
///
/// Returns `None` when neither map binds the key.
pub fn resolve_binding<T: Attach + Clone>(
	source: &SeedingSource,
	key: &str,
	statics: &Bindings<T>,
	overrides: &Bindings<T>,
) -> Option<T> {
	overrides
		.get(key)
		.or_else(|| statics.get(key))
		.map(|binding| binding.materialize(source))
}

/// Resolves a factory binding.
///
/// # Errors
///
/// Returns [`SeedingError::FactoryNotFound`] when the key is bound nowhere.
pub fn resolve_factory(
	source: &SeedingSource,
	key: &str,
	statics: &Bindings<Factory>,
	overrides: &Bindings<Factory>,
) -> SeedingResult<Factory> {
	resolve_binding(source, key, statics, overrides)
		.ok_or_else(|| SeedingError::FactoryNotFound(key.to_string()))
}

/// Resolves an ordered seeder list: the override list when present, else the static one.
pub fn resolve_seeders(
	source: &SeedingSource,
	statics: &[Binding<Seeder>],
	overrides: Option<&[Binding<Seeder>]>,
) -> Vec<Seeder> {
	overrides
		.unwrap_or(statics)
		.iter()
		.map(|binding| binding.materialize(source))
		.collect()
}

/// Returns true if the attribute can be awaited.
///
/// Plain JSON values never qualify, not even objects carrying a `"then"` key, and
/// neither do nested factories.
pub fn is_promise_like(attribute: &Attribute) -> bool {
	attribute.as_thenable().is_some()
}
