//! Runtime configuration loaded from environment variables.

use std::path::PathBuf;

use crate::models::Actor;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Database file (from OKR_TRACKER_DB). `None` uses the platform data directory.
    pub database_path: Option<PathBuf>,
    /// HTTP port (from OKR_TRACKER_PORT)
    pub port: u16,
    /// Identity stamped on writes when a request names no actor
    /// (from OKR_TRACKER_FALLBACK_ACTOR)
    pub fallback_actor: Actor,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let database_path = lookup("OKR_TRACKER_DB")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let port = match lookup("OKR_TRACKER_PORT") {
            Some(raw) => raw.trim().parse::<u16>().unwrap_or_else(|_| {
                tracing::warn!("Ignoring invalid OKR_TRACKER_PORT {:?}", raw);
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        let fallback_actor = lookup("OKR_TRACKER_FALLBACK_ACTOR")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(Actor::new)
            .unwrap_or_default();

        Self {
            database_path,
            port,
            fallback_actor,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            port: DEFAULT_PORT,
            fallback_actor: Actor::system(),
        }
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
    fn empty_environment_uses_defaults() {
        assert_eq!(config(&[]), Config::default());
    }

    #[test]
    fn reads_all_variables() {
        let config = config(&[
            ("OKR_TRACKER_DB", "/var/lib/okr/okr.db"),
            ("OKR_TRACKER_PORT", "8080"),
            ("OKR_TRACKER_FALLBACK_ACTOR", "importer"),
        ]);
        assert_eq!(config.database_path, Some(PathBuf::from("/var/lib/okr/okr.db")));
        assert_eq!(config.port, 8080);
        assert_eq!(config.fallback_actor, Actor::new("importer"));
    }

    #[test]
    fn invalid_port_falls_back_to_default() {
        assert_eq!(config(&[("OKR_TRACKER_PORT", "eighty")]).port, DEFAULT_PORT);
    }

    #[test]
    fn blank_values_are_ignored() {
        let config = config(&[("OKR_TRACKER_DB", " "), ("OKR_TRACKER_FALLBACK_ACTOR", "")]);
        assert_eq!(config.database_path, None);
        assert_eq!(config.fallback_actor, Actor::system());
    }
}
