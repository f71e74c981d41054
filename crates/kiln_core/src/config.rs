//! Plain `key = value` configuration files.
//!
//! The format is line oriented:
//!
//! ```text
//! # comment
//! ; also a comment
//! [render]            <- section headers are accepted and ignored
//! image_width = 800
//! look_from = 0, 3, 4
//! ```
//!
//! Parsing only checks the shape of each line. Lines that are not a
//! `key = value` pair are logged and skipped, so one stray line never costs the
//! rest of the file. Interpreting the values is left to the caller, which
//! decides what to do about values that do not parse (see
//! [`ConfigFile::get_or`]).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use kiln_math::Vec3;
use thiserror::Error;

/// Errors that can occur while reading a config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unable to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    line: usize,
}

/// The raw contents of a config file: keys mapped to unparsed values.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    entries: HashMap<String, Entry>,
}

impl ConfigFile {
    /// Parse config text.
    ///
    /// When a key appears more than once the last value wins. Malformed lines
    /// are skipped with a warning naming their line number.
    pub fn parse(content: &str) -> Self {
        let mut entries = HashMap::new();

        for (index, raw) in content.lines().enumerate() {
            let line_num = index + 1;
            let line = raw.trim();

            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if line.starts_with('[') && line.ends_with(']') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                log::warn!("Skipping config line {}: expected `key = value`, found `{}`", line_num, line);
                continue;
            };

            let key = key.trim();
            if key.is_empty() {
                log::warn!("Skipping config line {}: missing key before `=`", line_num);
                continue;
            }

            let entry = Entry {
                value: unquote(value.trim()).to_string(),
                line: line_num,
            };
            if let Some(previous) = entries.insert(key.to_string(), entry) {
                log::debug!(
                    "Config key `{}` at line {} overrides line {}",
                    key,
                    line_num,
                    previous.line
                );
            }
        }

        Self { entries }
    }

    /// Read and parse a config file from disk.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::parse(&content);
        log::debug!("Read {} keys from {}", config.len(), path.display());
        Ok(config)
    }

    /// Get the raw value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|e| e.value.as_str())
    }

    /// Get a typed value, or `default` if the key is missing or malformed.
    ///
    /// Malformed values are logged as warnings rather than reported as errors.
    pub fn get_or<T: ConfigValue>(&self, key: &str, default: T) -> T {
        self.get_with(key, default, T::parse_value)
    }

    /// Like [`ConfigFile::get_or`] with a caller-supplied value parser.
    pub fn get_with<T>(&self, key: &str, default: T, parse: impl FnOnce(&str) -> Option<T>) -> T {
        let Some(entry) = self.entries.get(key) else {
            return default;
        };

        match parse(&entry.value) {
            Some(value) => value,
            None => {
                log::warn!(
                    "Ignoring malformed value `{}` for `{}` (line {}), using default",
                    entry.value,
                    key,
                    entry.line
                );
                default
            }
        }
    }

    /// Iterate over all keys, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Get the number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the config has no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Types that can be read from a config value.
pub trait ConfigValue: Sized {
    fn parse_value(raw: &str) -> Option<Self>;
}

macro_rules! impl_config_value_from_str {
    ($($t:ty),*) => {
        $(
            impl ConfigValue for $t {
                fn parse_value(raw: &str) -> Option<Self> {
                    raw.trim().parse().ok()
                }
            }
        )*
    };
}

impl_config_value_from_str!(u32, u64, usize, i32, f64, String);

impl ConfigValue for bool {
    fn parse_value(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

/// Three numbers separated by commas and/or whitespace, optionally in parentheses.
impl ConfigValue for Vec3 {
    fn parse_value(raw: &str) -> Option<Self> {
        let inner = raw
            .trim()
            .trim_start_matches('(')
            .trim_end_matches(')');

        let mut parts = inner
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<f64>());

        let x = parts.next()?.ok()?;
        let y = parts.next()?.ok()?;
        let z = parts.next()?.ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Vec3::new(x, y, z))
    }
}
