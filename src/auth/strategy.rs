//! Authentication strategies
//!
//! A strategy turns the `authProviderArgs` of a direct configuration into
//! driver-compatible [`Credentials`]. Strategies are looked up by identifier
//! in an [`AuthRegistry`]; unknown identifiers are rejected.

use crate::{Error, Result};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Identifier of the built-in username/password strategy
pub const PLAIN_TEXT_AUTH_PROVIDER: &str = "PlainTextAuthProvider";

/// Fully-qualified alias of [`PLAIN_TEXT_AUTH_PROVIDER`]
pub const PLAIN_TEXT_AUTH_PROVIDER_QUALIFIED: &str = "cassandra.auth.PlainTextAuthProvider";

/// Credentials understood by the driver
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// SASL PLAIN username and password
    PlainText {
        /// Username
        username: String,
        /// Password
        password: String,
    },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::PlainText { username, .. } => f
                .debug_struct("PlainText")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// Produces credentials from strategy-specific arguments
pub trait AuthStrategy: Send + Sync {
    /// Build credentials from the configured arguments
    fn produce(&self, args: &Map<String, Value>) -> Result<Credentials>;
}

/// Username/password authentication
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextAuth;

impl AuthStrategy for PlainTextAuth {
    fn produce(&self, args: &Map<String, Value>) -> Result<Credentials> {
        Ok(Credentials::PlainText {
            username: string_arg(args, "username")?,
            password: string_arg(args, "password")?,
        })
    }
}

fn string_arg(args: &Map<String, Value>, name: &str) -> Result<String> {
    match args.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(Error::AuthStrategyResolutionFailed {
            strategy: PLAIN_TEXT_AUTH_PROVIDER.into(),
            reason: format!("argument '{}' must be a string, got {}", name, other),
        }),
        None => Err(Error::AuthStrategyResolutionFailed {
            strategy: PLAIN_TEXT_AUTH_PROVIDER.into(),
            reason: format!("missing argument '{}'", name),
        }),
    }
}

/// Registry mapping strategy identifiers to strategies
#[derive(Clone)]
pub struct AuthRegistry {
    strategies: HashMap<String, Arc<dyn AuthStrategy>>,
}

impl AuthRegistry {
    /// Create a registry with no strategies
    pub fn empty() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// Register a strategy under an identifier, replacing any previous one
    pub fn register(&mut self, name: impl Into<String>, strategy: Arc<dyn AuthStrategy>) {
        self.strategies.insert(name.into(), strategy);
    }

    /// Builder-style [`register`](Self::register)
    pub fn with(mut self, name: impl Into<String>, strategy: Arc<dyn AuthStrategy>) -> Self {
        self.register(name, strategy);
        self
    }

    /// Look up a strategy by identifier
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn AuthStrategy>> {
        self.strategies
            .get(name)
            .cloned()
            .ok_or_else(|| Error::AuthStrategyResolutionFailed {
                strategy: name.to_string(),
                reason: "unknown strategy".into(),
            })
    }

    /// Resolve `name` and produce credentials from `args`
    ///
    /// Failures of the strategy itself are reported under `name`.
    pub fn credentials(&self, name: &str, args: &Map<String, Value>) -> Result<Credentials> {
        self.resolve(name)?.produce(args).map_err(|e| match e {
            Error::AuthStrategyResolutionFailed { reason, .. } => {
                Error::AuthStrategyResolutionFailed {
                    strategy: name.to_string(),
                    reason,
                }
            }
            other => other,
        })
    }

    /// Registered identifiers, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.strategies.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for AuthRegistry {
    fn default() -> Self {
        let plain: Arc<dyn AuthStrategy> = Arc::new(PlainTextAuth);
        Self::empty()
            .with(PLAIN_TEXT_AUTH_PROVIDER, plain.clone())
            .with(PLAIN_TEXT_AUTH_PROVIDER_QUALIFIED, plain)
    }
}

impl fmt::Debug for AuthRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthRegistry")
            .field("strategies", &self.names())
            .finish()
    }
}
