//! Error types for the seeding module.
//!
//! Every failure in a factory or seeder run surfaces as a [`SeedingError`]. Variants fall
//! into three kinds (see [`ErrorKind`]): configuration mistakes, store failures, and
//! failures while resolving deferred attributes.

use thiserror::Error;

/// Broad classification of a [`SeedingError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	/// Missing or invalid bindings and configuration. Never retried.
	Configuration,
	/// The store failed to initialize or write.
	Persistence,
	/// A deferred attribute could not be resolved.
	Resolution,
}

/// Errors that can occur during seeding operations.
#[derive(Debug, Error)]
pub enum SeedingError {
	/// No entity schema configured and the factory does not build entities itself.
	#[error("No entity configured for factory {0}; set an entity schema or override `entity`")]
	NoEntity(String),

	/// No factory bound under the requested key.
	#[error("Factory not found: {0}")]
	FactoryNotFound(String),

	/// No seeder registered under the requested name.
	#[error("Seeder not found: {0}")]
	SeederNotFound(String),

	/// Neither a store handle nor store options were supplied.
	#[error("No store configured for seeding source")]
	MissingStore,

	/// No connector accepts the configured store backend.
	#[error("Unsupported store backend: {0}")]
	UnsupportedBackend(String),

	/// Configuration could not be loaded.
	#[error("Configuration error: {0}")]
	Config(#[from] furrow_conf::ConfigError),

	/// Store initialization or write failed.
	#[error("Persistence error: {0}")]
	Persistence(String),

	/// A deferred attribute failed to resolve.
	#[error("Failed to resolve {entity}.{field}: {source}")]
	Resolution {
		/// Entity being materialized.
		entity: String,
		/// Attribute that failed.
		field: String,
		/// Underlying failure.
		#[source]
		source: Box<SeedingError>,
	},

	/// A pending value or nested factory sits on a key the schema does not declare as deferred.
	#[error("Attribute {entity}.{field} is not declared as deferred")]
	UndeclaredDeferred {
		/// Entity being materialized.
		entity: String,
		/// Offending attribute.
		field: String,
	},

	/// A pending value rejected.
	#[error("Pending value rejected: {0}")]
	Rejected(String),

	/// JSON conversion failed inside a pending value.
	///
	/// Lets pending closures use `?` on `serde_json` calls; the resolve pass then reports
	/// it wrapped in [`SeedingError::Resolution`].
	#[error("JSON error: {0}")]
	JsonError(#[from] serde_json::Error),
}

impl SeedingError {
	/// Returns the kind of this error.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::NoEntity(_)
			| Self::FactoryNotFound(_)
			| Self::SeederNotFound(_)
			| Self::MissingStore
			| Self::UnsupportedBackend(_)
			| Self::Config(_) => ErrorKind::Configuration,
			Self::Persistence(_) => ErrorKind::Persistence,
			Self::Resolution { .. }
			| Self::UndeclaredDeferred { .. }
			| Self::Rejected(_)
			| Self::JsonError(_) => ErrorKind::Resolution,
		}
	}

	/// Follows nested resolution failures down to the error that started them.
	pub fn root_cause(&self) -> &SeedingError {
		match self {
			Self::Resolution { source, .. } => source.root_cause(),
			other => other,
		}
	}
}

/// Result type alias for seeding operations.
pub type SeedingResult<T> = Result<T, SeedingError>;
