//! Configuration for furrow seeding runs.
//!
//! This crate turns an explicitly named TOML or JSON file (or plain text) into a
//! [`SeedingConfig`]. Locating the file is the caller's job; so is building a store
//! from the [`StoreOptions`] it carries.
//!
//! ```toml
//! root = "/srv/app"
//!
//! [store]
//! backend = "memory"
//!
//! [seeding]
//! seeders = ["users"]
//! default_seeder = "users"
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod sources;

pub use config::{SeedingCommandConfig, SeedingConfig, StoreOptions};
pub use error::{ConfigError, ConfigResult};
pub use sources::{ConfigFormat, load_file};
