//! Reading configuration files from explicit paths.
//!
//! No discovery happens here: callers pass the path they want loaded.

use std::path::Path;

use tracing::debug;

use crate::config::SeedingConfig;
use crate::error::{ConfigError, ConfigResult};

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
	/// TOML (`.toml`).
	Toml,
	/// JSON (`.json`).
	Json,
}

impl ConfigFormat {
	/// Detects the format from a file extension.
	pub fn from_path(path: &Path) -> ConfigResult<Self> {
		let extension = path
			.extension()
			.and_then(|ext| ext.to_str())
			.unwrap_or("");

		match extension.to_lowercase().as_str() {
			"toml" => Ok(Self::Toml),
			"json" => Ok(Self::Json),
			other => Err(ConfigError::UnsupportedExtension(other.to_string())),
		}
	}
}

/// Loads a [`SeedingConfig`] from `path`, choosing the parser from the extension.
pub fn load_file(path: &Path) -> ConfigResult<SeedingConfig> {
	let format = ConfigFormat::from_path(path)?;
	let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
		path: path.to_path_buf(),
		source,
	})?;

	debug!(path = %path.display(), ?format, "loading seeding configuration");

	let config = match format {
		ConfigFormat::Toml => SeedingConfig::from_toml_str(&content)?,
		ConfigFormat::Json => SeedingConfig::from_json_str(&content)?,
	};
	Ok(config)
}
