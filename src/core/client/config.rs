//! Proxy configuration.
//!
//! A proxy instance carries only configuration, never per-request state, so
//! one configured instance may serve many concurrent callers. Configuration
//! is read-mostly: every call takes a snapshot, and changes go through an
//! exclusive lock that also notifies registered change listeners.

use std::sync::{Mutex, RwLock};

use url::Url;

use crate::core::error::{AtomPubError, Result};

/// Basic-authentication credentials for the remote proxy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Static proxy settings: where the gateway lives and which category this
/// proxy targets.
///
/// # Examples
///
/// ```
/// use atompub_http_rs::core::client::ProxyConfig;
///
/// let config = ProxyConfig::new("http://shop.example.com/gateway", "offer")
///     .unwrap()
///     .with_cookie("session=abc123");
/// assert_eq!(config.category, "offer");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Absolute gateway base, without the category marker.
    pub base: String,
    /// Category term this proxy addresses.
    pub category: String,
    pub credentials: Option<Credentials>,
    /// Cookie header values, sent verbatim on every request.
    pub cookies: Vec<String>,
}

impl ProxyConfig {
    /// Build a config, validating the base address up front so that later
    /// calls cannot fail on a malformed base.
    pub fn new(base: impl Into<String>, category: impl Into<String>) -> Result<Self> {
        let base = base.into();
        Url::parse(&base)
            .map_err(|e| AtomPubError::Internal(format!("invalid proxy base {base}: {e}")))?;
        Ok(ProxyConfig {
            base: base.trim_end_matches('/').to_string(),
            category: category.into(),
            credentials: None,
            cookies: Vec::new(),
        })
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::new(username, password));
        self
    }

    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookies.push(cookie.into());
        self
    }
}

/// Callback invoked after every configuration change.
pub type ConfigListener = Box<dyn Fn(&ProxyConfig) + Send + Sync>;

/// Concurrently shareable configuration cell.
///
/// Reads clone a snapshot under the read lock; [`SharedProxyConfig::update`]
/// takes the write lock, applies the change, and notifies listeners while
/// still holding the listener lock so notifications observe changes in
/// order.
pub struct SharedProxyConfig {
    state: RwLock<ProxyConfig>,
    listeners: Mutex<Vec<ConfigListener>>,
}

impl SharedProxyConfig {
    pub fn new(config: ProxyConfig) -> Self {
        SharedProxyConfig {
            state: RwLock::new(config),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Current configuration snapshot.
    pub fn snapshot(&self) -> ProxyConfig {
        match self.state.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Apply a change and notify every registered listener with the new
    /// state.
    pub fn update(&self, change: impl FnOnce(&mut ProxyConfig)) {
        let updated = {
            let mut guard = match self.state.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            change(&mut guard);
            guard.clone()
        };
        let listeners = match self.listeners.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        for listener in listeners.iter() {
            listener(&updated);
        }
    }

    pub fn add_listener(&self, listener: ConfigListener) {
        let mut listeners = match self.listeners.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        listeners.push(listener);
    }
}

impl std::fmt::Debug for SharedProxyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedProxyConfig")
            .field("state", &self.snapshot())
            .finish()
    }
}
