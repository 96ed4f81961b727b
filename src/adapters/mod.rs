//! Platform adapters
//!
//! One adapter per connected health platform. Each adapter authenticates with
//! an opaque access credential, performs a single outbound request, and maps
//! the provider's payload to a normalized [`HealthReading`]. Adapters hold no
//! shared state; the HTTP client and base URL are injected at construction so
//! concurrent users can never cross-contaminate credentials.

mod apple_health;
mod fitbit;
mod google_fit;

pub use apple_health::AppleHealthAdapter;
pub use fitbit::FitbitAdapter;
pub use google_fit::GoogleFitAdapter;

use crate::error::SyncError;
use crate::types::{HealthReading, Platform, TimeRange};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::sync::Arc;

/// Opaque access token for a platform. Never printed, never logged.
#[derive(Clone, Debug)]
pub struct AccessCredential(SecretString);

impl AccessCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Expose the raw token for an outbound Authorization header
    pub(crate) fn token(&self) -> &str {
        self.0.expose_secret()
    }
}

/// Capability interface for fetching one normalized reading per platform.
///
/// `NoData` is not an error: an authenticated platform with no samples in
/// range returns [`HealthReading::empty`].
#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    /// The platform this adapter serves
    fn platform(&self) -> Platform;

    /// Fetch one reading for the given range, or fail cleanly
    async fn fetch_reading(
        &self,
        credential: &AccessCredential,
        range: &TimeRange,
    ) -> Result<HealthReading, SyncError>;
}

/// Lookup from platform to adapter, replacing scattered conditionals.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<Platform, Arc<dyn PlatformAdapter>>,
}

impl AdapterRegistry {
    /// An empty registry; register adapters explicitly
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the three production adapters against their default
    /// API hosts, sharing one HTTP client.
    pub fn with_defaults(client: reqwest::Client) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(AppleHealthAdapter::new(
            apple_health::DEFAULT_BASE_URL,
            client.clone(),
        )));
        registry.register(Arc::new(GoogleFitAdapter::new(
            google_fit::DEFAULT_BASE_URL,
            client.clone(),
        )));
        registry.register(Arc::new(FitbitAdapter::new(
            fitbit::DEFAULT_BASE_URL,
            client,
        )));
        registry
    }

    pub fn register(&mut self, adapter: Arc<dyn PlatformAdapter>) {
        self.adapters.insert(adapter.platform(), adapter);
    }

    pub fn get(&self, platform: Platform) -> Option<Arc<dyn PlatformAdapter>> {
        self.adapters.get(&platform).cloned()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

/// Map a failed provider response to the error taxonomy, keeping a short
/// body snippet for the report.
pub(crate) async fn error_from_response(
    platform: Platform,
    resp: reqwest::Response,
) -> SyncError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    let body_snippet: String = body.chars().take(256).collect();
    SyncError::from_status(platform, status, body_snippet)
}

/// Map a transport-level failure (DNS, connect, timeout) to
/// `ProviderUnavailable`.
pub(crate) fn transport_error(platform: Platform, err: reqwest::Error) -> SyncError {
    SyncError::ProviderUnavailable {
        platform,
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_debug_redacts_token() {
        let credential = AccessCredential::new("super-secret-token");
        let debug = format!("{credential:?}");
        assert!(!debug.contains("super-secret-token"));
    }

    #[test]
    fn test_registry_with_defaults_covers_all_platforms() {
        let registry = AdapterRegistry::with_defaults(reqwest::Client::new());
        assert_eq!(registry.len(), 3);
        for platform in [Platform::AppleHealth, Platform::GoogleFit, Platform::Fitbit] {
            let adapter = registry.get(platform).unwrap();
            assert_eq!(adapter.platform(), platform);
        }
    }
}
