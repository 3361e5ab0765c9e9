//! Configuration records and file loading.
//!
//! # Examples
//!
//! ```rust,no_run
//! use furrow::conf::SeedingConfig;
//!
//! let config = SeedingConfig::load("seeding.toml")?;
//! # Ok::<(), furrow::conf::ConfigError>(())
//! ```

pub use furrow_conf::*;
