//! Process configuration read from environment variables.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `BIND_ADDR` | `0.0.0.0:8080` | HTTP listen address |
//! | `USE_PERSISTENT_STORES` | `false` | Postgres instead of the in-memory store |
//! | `DATABASE_URL` | unset | Postgres connection string, required when persistent |
//! | `SEED_DEMO_DATA` | `true` | Insert the demo catalog into an empty store |

use tracing::warn;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: String,
    pub use_persistent_stores: bool,
    pub database_url: Option<String>,
    pub seed_demo_data: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            use_persistent_stores: false,
            database_url: None,
            seed_demo_data: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: lookup("BIND_ADDR")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.bind_addr),
            use_persistent_stores: flag(
                &lookup,
                "USE_PERSISTENT_STORES",
                defaults.use_persistent_stores,
            ),
            database_url: lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()),
            seed_demo_data: flag(&lookup, "SEED_DEMO_DATA", defaults.seed_demo_data),
        }
    }
}

fn flag(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> bool {
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().to_ascii_lowercase().parse::<bool>().unwrap_or_else(|_| {
            warn!(key, value = %raw, default, "invalid boolean in environment; using default");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(config(&[]), Config::default());
    }

    #[test]
    fn values_are_read() {
        let cfg = config(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("USE_PERSISTENT_STORES", "TRUE"),
            ("DATABASE_URL", "postgres://localhost/eshop"),
            ("SEED_DEMO_DATA", "false"),
        ]);

        assert_eq!(cfg.bind_addr, "127.0.0.1:9000");
        assert!(cfg.use_persistent_stores);
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/eshop"));
        assert!(!cfg.seed_demo_data);
    }

    #[test]
    fn invalid_booleans_fall_back_to_defaults() {
        let cfg = config(&[("USE_PERSISTENT_STORES", "yes please"), ("SEED_DEMO_DATA", "0")]);
        assert!(!cfg.use_persistent_stores);
        assert!(cfg.seed_demo_data);
    }

    #[test]
    fn blank_values_are_ignored() {
        let cfg = config(&[("BIND_ADDR", "  "), ("DATABASE_URL", "")]);
        assert_eq!(cfg.bind_addr, DEFAULT_BIND_ADDR);
        assert!(cfg.database_url.is_none());
    }
}
