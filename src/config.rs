use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{DocQueryError, Result};

/// Connection configuration for the engine's HTTP API
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Node addresses, e.g. `127.0.0.1:9200` or `https://search.internal:9200`
    pub hosts: Vec<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub request_timeout_ms: u64,
    pub connect_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            hosts: vec!["127.0.0.1:9200".to_string()],
            username: None,
            password: None,
            request_timeout_ms: 30_000,
            connect_timeout_ms: 5_000,
        }
    }
}

impl ClientConfig {
    /// Create a configuration for the given hosts
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hosts: hosts.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Set basic authentication credentials
    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = timeout_ms;
        self
    }

    /// Set the connect timeout
    pub fn with_connect_timeout(mut self, timeout_ms: u64) -> Self {
        self.connect_timeout_ms = timeout_ms;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Credentials are only used when both parts are present and non-empty
    pub fn basic_auth(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        }
    }

    /// Check the configuration before building a transport
    pub fn validate(&self) -> Result<()> {
        if self.hosts.is_empty() {
            return Err(DocQueryError::Config("hosts cannot be empty".to_string()));
        }
        if self.hosts.iter().any(|h| h.trim().is_empty()) {
            return Err(DocQueryError::Config("host entries cannot be blank".to_string()));
        }
        if self.request_timeout_ms == 0 {
            return Err(DocQueryError::Config(
                "request timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Base URLs for every host; hosts without a scheme default to `http://`
    pub fn base_urls(&self) -> Vec<String> {
        self.hosts
            .iter()
            .map(|h| {
                let h = h.trim().trim_end_matches('/');
                if h.starts_with("http://") || h.starts_with("https://") {
                    h.to_string()
                } else {
                    format!("http://{}", h)
                }
            })
            .collect()
    }
}

/// Index-level settings applied when a table is created
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableSettings {
    pub number_of_shards: u32,
    pub number_of_replicas: u32,
    /// Keep the original JSON body in `_source`
    pub source_enabled: bool,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            number_of_shards: 3,
            number_of_replicas: 2,
            source_enabled: true,
        }
    }
}

impl TableSettings {
    pub fn with_shards(mut self, shards: u32) -> Self {
        self.number_of_shards = shards;
        self
    }

    pub fn with_replicas(mut self, replicas: u32) -> Self {
        self.number_of_replicas = replicas;
        self
    }

    pub fn with_source(mut self, enabled: bool) -> Self {
        self.source_enabled = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs() {
        let config = ClientConfig::default();
        assert_eq!(config.request_timeout_ms, 30_000);
        assert!(config.basic_auth().is_none());

        let settings = TableSettings::default();
        assert_eq!(settings.number_of_shards, 3);
        assert_eq!(settings.number_of_replicas, 2);
        assert!(settings.source_enabled);
    }

    #[test]
    fn test_empty_hosts_rejected() {
        let config = ClientConfig::new(Vec::<String>::new());
        assert!(matches!(config.validate(), Err(DocQueryError::Config(_))));

        let config = ClientConfig::new(["  "]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_basic_auth_requires_both_parts() {
        let config = ClientConfig::new(["localhost:9200"]).with_basic_auth("elastic", "");
        assert!(config.basic_auth().is_none());

        let config = ClientConfig::new(["localhost:9200"]).with_basic_auth("elastic", "secret");
        assert_eq!(config.basic_auth(), Some(("elastic", "secret")));
    }

    #[test]
    fn test_base_urls() {
        let config = ClientConfig::new(["127.0.0.1:9201", "https://es.example.com:9200/"])
            .with_timeout(1_000)
            .with_connect_timeout(200);
        assert_eq!(
            config.base_urls(),
            vec!["http://127.0.0.1:9201", "https://es.example.com:9200"]
        );
        assert_eq!(config.request_timeout(), Duration::from_millis(1_000));
        assert_eq!(config.connect_timeout(), Duration::from_millis(200));
    }
}
