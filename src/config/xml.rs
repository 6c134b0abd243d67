//! XML configuration support.
//!
//! ```xml
//! <config>
//!   <max_tasks>8</max_tasks>
//!   <log_level>normal</log_level>
//!   <log_file>/var/log/ext_sorter.log</log_file>
//!   <dry_run>false</dry_run>
//! </config>
//! ```
//!
//! Every element is optional. Unknown elements are rejected so typos surface
//! instead of being silently ignored.

use anyhow::{Context, Result, bail};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::paths::default_config_path;
use super::types::{Config, LogLevel};

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Default, Deserialize)]
#[serde(rename = "config", deny_unknown_fields)]
struct XmlConfig {
    #[serde(default, deserialize_with = "de_trimmed_opt")]
    max_tasks: Option<String>,
    #[serde(default, deserialize_with = "de_trimmed_opt")]
    log_level: Option<String>,
    #[serde(default, deserialize_with = "de_trimmed_opt")]
    log_file: Option<String>,
    #[serde(default, deserialize_with = "de_trimmed_opt")]
    dry_run: Option<String>,
}

/// Values found in a config file; `None` means "not set there".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSettings {
    pub max_tasks: Option<usize>,
    pub log_level: Option<LogLevel>,
    pub log_file: Option<PathBuf>,
    pub dry_run: Option<bool>,
}

impl FileSettings {
    /// Overlay the values that were set onto `cfg`.
    pub fn apply_to(&self, cfg: &mut Config) {
        if let Some(n) = self.max_tasks {
            cfg.max_tasks = n;
        }
        if let Some(level) = self.log_level {
            cfg.log_level = level;
        }
        if let Some(p) = &self.log_file {
            cfg.log_file = Some(p.clone());
        }
        if let Some(d) = self.dry_run {
            cfg.dry_run = d;
        }
    }
}

// Trim surrounding whitespace; empty elements count as unset.
fn de_trimmed_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

fn to_settings(parsed: XmlConfig) -> Result<FileSettings> {
    let max_tasks = match parsed.max_tasks {
        Some(s) => {
            let n: usize = s
                .parse()
                .with_context(|| format!("max_tasks must be a positive integer, got '{s}'"))?;
            if n == 0 {
                bail!("max_tasks must be at least 1");
            }
            Some(n)
        }
        None => None,
    };
    let log_level = match parsed.log_level {
        Some(s) => Some(s.parse::<LogLevel>().map_err(anyhow::Error::msg)?),
        None => None,
    };
    let dry_run = match parsed.dry_run.as_deref() {
        Some("true" | "1" | "yes") => Some(true),
        Some("false" | "0" | "no") => Some(false),
        Some(other) => bail!("dry_run must be true or false, got '{other}'"),
        None => None,
    };
    Ok(FileSettings {
        max_tasks,
        log_level,
        log_file: parsed.log_file.map(PathBuf::from),
        dry_run,
    })
}

/// Load settings from a specific XML file.
pub fn load_config_from_xml_path(path: &Path) -> Result<FileSettings> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig = from_xml_str(&contents)
        .with_context(|| format!("parse config xml '{}'", path.display()))?;
    to_settings(parsed).with_context(|| format!("invalid config xml '{}'", path.display()))
}

/// Load the config file in use, if there is one.
/// A missing file is not an error; a malformed one is.
pub fn load_config() -> Result<Option<(PathBuf, FileSettings)>> {
    let Some(path) = default_config_path() else {
        return Ok(None);
    };
    if !path.exists() {
        debug!(path = %path.display(), "No config file; using defaults");
        return Ok(None);
    }
    let settings = load_config_from_xml_path(&path)?;
    Ok(Some((path, settings)))
}
