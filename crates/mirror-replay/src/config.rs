//! Replay configuration loaded from environment variables.
//!
//! Every setting has a default so the replay can run with zero
//! configuration against an in-memory store.

use std::path::PathBuf;

/// Where mirrored buffers are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// In process memory, lost on exit.
    Memory,
    /// SQLite database at the given path, or in the platform data
    /// directory when `None`.
    Sqlite(Option<PathBuf>),
}

/// Replay configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayConfig {
    /// Name of the remote the messages come from.
    /// Env: `REMOTE_NAME`
    /// Default: `remote`
    pub remote_name: String,

    /// Store receiving the mirrored buffers.
    /// Env: `DB_PATH` (a path, or `default` for the platform data directory)
    /// Default: in memory.
    pub store: StoreBackend,

    /// Log every received message.
    /// Env: `DEBUG_RAW` (true/false)
    /// Default: `false`
    pub debug_raw: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            remote_name: "remote".to_string(),
            store: StoreBackend::Memory,
            debug_raw: false,
        }
    }
}

impl ReplayConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(name) = lookup("REMOTE_NAME") {
            if is_valid_remote_name(&name) {
                config.remote_name = name;
            } else {
                tracing::warn!(value = %name, "Invalid REMOTE_NAME, using default");
            }
        }

        if let Some(path) = lookup("DB_PATH") {
            let path = path.trim();
            config.store = match path {
                "" => StoreBackend::Memory,
                "default" => StoreBackend::Sqlite(None),
                path => StoreBackend::Sqlite(Some(PathBuf::from(path))),
            };
        }

        if let Some(val) = lookup("DEBUG_RAW") {
            match parse_flag(&val) {
                Some(flag) => config.debug_raw = flag,
                None => tracing::warn!(value = %val, "Invalid DEBUG_RAW, using default"),
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}

/// A remote name becomes part of buffer names: no dots, no blanks.
fn is_valid_remote_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('.') && !name.chars().any(char::is_whitespace)
}

fn parse_flag(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> ReplayConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ReplayConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = config_from(&[]);
        assert_eq!(config, ReplayConfig::default());
        assert_eq!(config.remote_name, "remote");
        assert_eq!(config.store, StoreBackend::Memory);
        assert!(!config.debug_raw);
    }

    #[test]
    fn test_full_config() {
        let config = config_from(&[
            ("REMOTE_NAME", "home"),
            ("DB_PATH", "/tmp/mirror.db"),
            ("DEBUG_RAW", "true"),
        ]);
        assert_eq!(config.remote_name, "home");
        assert_eq!(
            config.store,
            StoreBackend::Sqlite(Some(PathBuf::from("/tmp/mirror.db")))
        );
        assert!(config.debug_raw);
    }

    #[test]
    fn test_default_db_path() {
        let config = config_from(&[("DB_PATH", "default")]);
        assert_eq!(config.store, StoreBackend::Sqlite(None));
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = config_from(&[
            ("REMOTE_NAME", "my.remote"),
            ("DEBUG_RAW", "maybe"),
            ("DB_PATH", "  "),
        ]);
        assert_eq!(config, ReplayConfig::default());
    }
}
