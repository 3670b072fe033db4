//! Gateway configuration.

/// Tunables for the protocol gateway.
///
/// | Field | Default | Meaning |
/// |-------|---------|---------|
/// | `realm` | `"atompub"` | Realm name sent in `WWW-Authenticate` challenges |
/// | `enable_logging` | `true` | Emit a tracing span per dispatched request |
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub realm: String,
    pub enable_logging: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            realm: "atompub".to_string(),
            enable_logging: true,
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }

    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_realm() {
        let config = ServerConfig::default();
        assert_eq!(config.realm, "atompub");
        assert!(config.enable_logging);
    }
}
