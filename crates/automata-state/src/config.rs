//! Connection configuration for the result store.

/// Default on-disk location used when no URL is configured.
pub const DEFAULT_DB_URL: &str = "surrealkv://.automata/eval_db";

/// Credentials for a remote SurrealDB instance
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Database username
    pub username: String,
    /// Database password
    pub password: String,
    /// Whether this is a root user (true) or database user (false)
    pub is_root: bool,
}

/// Configuration for connecting the result store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Engine URL (`mem://`, `surrealkv://path`, `ws://host:port`, `wss://...`)
    pub url: String,
    /// Namespace (default: "automata")
    pub namespace: String,
    /// Database name (default: "eval")
    pub database: String,
    /// Sign-in credentials, for remote engines only
    pub credentials: Option<Credentials>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DB_URL)
    }
}

impl StoreConfig {
    /// Create a configuration for the given engine URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            namespace: "automata".to_string(),
            database: "eval".to_string(),
            credentials: None,
        }
    }

    /// In-memory engine; nothing outlives the handle.
    pub fn in_memory() -> Self {
        Self::new("mem://")
    }

    /// Set custom namespace
    pub fn with_namespace(mut self, ns: impl Into<String>) -> Self {
        self.namespace = ns.into();
        self
    }

    /// Set custom database
    pub fn with_database(mut self, db: impl Into<String>) -> Self {
        self.database = db.into();
        self
    }

    /// Sign in with the given credentials after connecting
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
        is_root: bool,
    ) -> Self {
        self.credentials = Some(Credentials {
            username: username.into(),
            password: password.into(),
            is_root,
        });
        self
    }

    /// Local directory backing a `surrealkv://` URL, if any.
    pub fn local_path(&self) -> Option<&str> {
        self.url.strip_prefix("surrealkv://")
    }

    /// Create from environment variables
    ///
    /// Reads:
    /// - AUTOMATA_EVAL_DB_URL (optional, default: `surrealkv://.automata/eval_db`)
    /// - AUTOMATA_EVAL_DB_NAMESPACE (optional, default: "automata")
    /// - AUTOMATA_EVAL_DB_DATABASE (optional, default: "eval")
    /// - AUTOMATA_EVAL_DB_USERNAME / AUTOMATA_EVAL_DB_PASSWORD (optional, both or neither)
    /// - AUTOMATA_EVAL_DB_ROOT (optional, default: "false")
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let url = lookup("AUTOMATA_EVAL_DB_URL").unwrap_or_else(|| DEFAULT_DB_URL.to_string());
        let mut config = Self::new(url);

        if let Some(ns) = lookup("AUTOMATA_EVAL_DB_NAMESPACE") {
            config = config.with_namespace(ns);
        }
        if let Some(db) = lookup("AUTOMATA_EVAL_DB_DATABASE") {
            config = config.with_database(db);
        }
        if let (Some(username), Some(password)) = (
            lookup("AUTOMATA_EVAL_DB_USERNAME"),
            lookup("AUTOMATA_EVAL_DB_PASSWORD"),
        ) {
            let is_root = lookup("AUTOMATA_EVAL_DB_ROOT")
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(false);
            config = config.with_credentials(username, password, is_root);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = StoreConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.url, DEFAULT_DB_URL);
        assert_eq!(config.namespace, "automata");
        assert_eq!(config.database, "eval");
        assert!(config.credentials.is_none());
        assert_eq!(config.local_path(), Some(".automata/eval_db"));
    }

    #[test]
    fn test_env_overrides() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            ("AUTOMATA_EVAL_DB_URL", "ws://localhost:8000"),
            ("AUTOMATA_EVAL_DB_NAMESPACE", "ci"),
            ("AUTOMATA_EVAL_DB_USERNAME", "root"),
            ("AUTOMATA_EVAL_DB_PASSWORD", "secret"),
            ("AUTOMATA_EVAL_DB_ROOT", "TRUE"),
        ]));
        assert_eq!(config.url, "ws://localhost:8000");
        assert_eq!(config.namespace, "ci");
        assert_eq!(config.database, "eval");
        assert!(config.local_path().is_none());
        let creds = config.credentials.expect("credentials");
        assert_eq!(creds.username, "root");
        assert!(creds.is_root);
    }

    #[test]
    fn test_username_without_password_is_ignored() {
        let config =
            StoreConfig::from_lookup(lookup_from(&[("AUTOMATA_EVAL_DB_USERNAME", "alice")]));
        assert!(config.credentials.is_none());
    }
}
