//! Seeding configuration record.
//!
//! A [`SeedingConfig`] is the already-resolved input a seeding run consumes. It says
//! where the project root is, how to reach the store, and which seeders to run.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigResult;

/// Options describing how to connect to a store.
///
/// Only `backend` is interpreted by furrow itself; the remaining keys are handed to
/// whichever connector accepts the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreOptions {
	/// Backend identifier (e.g. `"memory"`).
	pub backend: String,

	/// Backend specific settings.
	#[serde(flatten)]
	pub settings: Map<String, Value>,
}

impl StoreOptions {
	/// Creates options for the given backend with no extra settings.
	pub fn new(backend: impl Into<String>) -> Self {
		Self {
			backend: backend.into(),
			settings: Map::new(),
		}
	}

	/// Adds a backend specific setting.
	pub fn with_setting(mut self, key: impl Into<String>, value: Value) -> Self {
		self.settings.insert(key.into(), value);
		self
	}

	/// Returns a backend specific setting.
	pub fn setting(&self, key: &str) -> Option<&Value> {
		self.settings.get(key)
	}
}

/// Seeder selection for a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedingCommandConfig {
	/// Names of the seeders to run, in order.
	pub seeders: Vec<String>,

	/// Seeder run when no names are given explicitly.
	pub default_seeder: Option<String>,
}

/// Resolved configuration for a seeding run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedingConfig {
	/// Project root; relative paths below are resolved against it.
	pub root: Option<PathBuf>,

	/// Store connection options.
	#[serde(rename = "store")]
	pub store_options: Option<StoreOptions>,

	/// Path of the store configuration file.
	pub store_config_path: Option<PathBuf>,

	/// Path of the seeding configuration file.
	pub seeding_config_path: Option<PathBuf>,

	/// Seeder selection.
	pub seeding: SeedingCommandConfig,
}

impl SeedingConfig {
	/// Creates an empty configuration.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses a configuration from TOML text.
	///
	/// # Example
	///
	/// ```
	/// use furrow_conf::SeedingConfig;
	///
	/// let config = SeedingConfig::from_toml_str(
	///     r#"
	///     root = "/srv/app"
	///
	///     [store]
	///     backend = "memory"
	///     "#,
	/// )
	/// .unwrap();
	/// assert_eq!(config.store_options.unwrap().backend, "memory");
	/// ```
	pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
		Ok(toml::from_str(content)?)
	}

	/// Parses a configuration from JSON text.
	pub fn from_json_str(content: &str) -> ConfigResult<Self> {
		Ok(serde_json::from_str(content)?)
	}

	/// Loads a configuration from an explicit file path.
	///
	/// See [`crate::sources::load_file`] for the supported formats.
	pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
		crate::sources::load_file(path.as_ref())
	}

	/// Sets the project root.
	pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
		self.root = Some(root.into());
		self
	}

	/// Sets the store options.
	pub fn with_store_options(mut self, options: StoreOptions) -> Self {
		self.store_options = Some(options);
		self
	}

	/// Sets the seeders to run.
	pub fn with_seeders<I, S>(mut self, seeders: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.seeding.seeders = seeders.into_iter().map(Into::into).collect();
		self
	}

	/// Sets the default seeder.
	pub fn with_default_seeder(mut self, name: impl Into<String>) -> Self {
		self.seeding.default_seeder = Some(name.into());
		self
	}

	/// Joins relative config paths onto `root`.
	///
	/// Paths that are already absolute, and configurations without a root, are left
	/// untouched.
	pub fn resolve_paths(mut self) -> Self {
		let Some(root) = self.root.clone() else {
			return self;
		};
		for path in [&mut self.store_config_path, &mut self.seeding_config_path]
			.into_iter()
			.flatten()
		{
			if path.is_relative() {
				*path = root.join(&*path);
			}
		}
		self
	}
}
