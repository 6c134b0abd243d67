//! Configuration: run settings, config file lookup, XML loading and validation.
//!
//! Precedence is defaults < config file < command-line flags.

pub mod paths;
pub mod types;
mod validate;
pub mod xml;

pub use paths::{CONFIG_ENV, default_config_path, path_has_symlink_ancestor};
pub use types::{Config, LogLevel};
pub use xml::{FileSettings, load_config, load_config_from_xml_path};
