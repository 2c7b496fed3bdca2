// src/config/mod.rs

//! Configuration loading.
//!
//! - [`model`] is the serde view of the TOML file.
//! - [`validate`] turns a `RawConfigFile` into a `ConfigFile`.
//! - [`duration`] parses `timeout` strings.

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use duration::parse_timeout;
pub use loader::{load_and_validate, load_from_path, load_from_str};
pub use model::{CommandConfig, ConfigFile, RawConfigFile};
