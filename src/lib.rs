//! Typed adapter for the Cloudflare DNS zone management API.
//!
//! The crate turns the zone endpoints of the Cloudflare v4 API into three
//! operations on an explicitly constructed session: create a zone, list the
//! account's zones, delete a zone. Every call is a single remote round trip;
//! the provider owns all real state.
//!
//! Providers implement a small set of traits:
//!
//! - [`Provider`] lists and looks up zones.
//! - [`CreateZone`] onboards a new domain.
//! - [`DeleteZone`] removes a zone.
//!
//! Two implementations ship with the crate:
//!
//! - [`cloudflare::CloudflareProvider`] talks to the live API (feature
//!   `cloudflare`, enabled by default).
//! - [`memory::MemoryProvider`] keeps zones in process memory and follows the
//!   same failure rules, for deterministic tests.
//!
//! # Example
//!
//! ```no_run
//! use cfzones::cloudflare::CloudflareProvider;
//! use cfzones::{CreateZone, DeleteZone, Provider, Zone};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let session = CloudflareProvider::initialize("your_api_token").await?;
//!
//! let created = session.create_zone(&Zone::new("example.com")).await?;
//! println!("{} is {}", created.name(), created.status);
//!
//! let zones = session.list_zones().await?;
//! assert!(zones.contains("example.com"));
//!
//! session.delete_zone(&created).await?;
//! # Ok(())
//! # }
//! ```

use std::error::Error as StdErr;
use std::future::Future;
use std::net::IpAddr;
use std::time::Duration;

use thiserror::Error;

#[cfg(feature = "cloudflare")]
pub mod cloudflare;
pub mod memory;
pub mod types;
mod zone;

pub use zone::{DomainResource, Zone, ZoneStatus, Zones};

/// HTTP client settings shared by every provider that talks to a remote API.
///
/// # Example
///
/// ```
/// use cfzones::HttpClientConfig;
/// use std::time::Duration;
///
/// let config = HttpClientConfig::new()
///     .local_address("192.168.1.100".parse().unwrap())
///     .timeout(Duration::from_secs(10));
/// assert_eq!(config.timeout, Some(Duration::from_secs(10)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpClientConfig {
    /// Source address outgoing connections bind to.
    pub local_address: Option<IpAddr>,
    /// Network interface outgoing connections bind to (Unix-like systems only).
    pub interface: Option<String>,
    /// Total request timeout. Providers fall back to 30 seconds when unset.
    pub timeout: Option<Duration>,
}

impl HttpClientConfig {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds outgoing connections to the given source address.
    pub fn local_address(mut self, addr: IpAddr) -> Self {
        self.local_address = Some(addr);
        self
    }

    /// Binds outgoing connections to the given network interface.
    pub fn interface(mut self, interface: impl Into<String>) -> Self {
        self.interface = Some(interface.into());
        self
    }

    /// Sets the total request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Errors that may occur when initializing a session.
#[derive(Debug, Error)]
pub enum InitializeError<T> {
    /// The provider rejected the credentials.
    #[error("the provider rejected the API token")]
    Unauthorized,

    /// The token is known to the provider but cannot be used.
    #[error("the API token is {0}, not active")]
    InactiveToken(String),

    /// Provider-specific failure.
    #[error(transparent)]
    Custom(T),
}

/// Errors that may occur when listing or looking up zones.
#[derive(Debug, Error)]
pub enum RetrieveZoneError<T> {
    /// The session is not allowed to read zones.
    #[error("unauthorized")]
    Unauthorized,

    /// No zone matches the requested name or id.
    #[error("zone not found")]
    NotFound,

    /// Provider-specific failure.
    #[error(transparent)]
    Custom(T),
}

/// Errors that may occur when creating a zone.
#[derive(Debug, Error)]
pub enum CreateZoneError<T> {
    /// The session is not allowed to create zones.
    #[error("unauthorized")]
    Unauthorized,

    /// The account already has a zone with this name.
    #[error("a zone with this name already exists")]
    AlreadyExists,

    /// The name is malformed, or the provider refuses to onboard it
    /// (for example because it is not a registered domain).
    #[error("invalid domain name")]
    InvalidDomainName,

    /// Provider-specific failure.
    #[error(transparent)]
    Custom(T),
}

/// Errors that may occur when deleting a zone.
#[derive(Debug, Error)]
pub enum DeleteZoneError<T> {
    /// The session is not allowed to delete zones.
    #[error("unauthorized")]
    Unauthorized,

    /// No zone matches the given name or id.
    #[error("zone not found")]
    NotFound,

    /// Provider-specific failure.
    #[error(transparent)]
    Custom(T),
}

/// A session against a zone provider.
pub trait Provider {
    /// Provider-specific error carried by [`RetrieveZoneError::Custom`].
    type CustomRetrieveError: StdErr + Send + Sync + 'static;

    /// Lists every zone owned by the account, in provider order.
    fn list_zones(
        &self,
    ) -> impl Future<Output = Result<Zones, RetrieveZoneError<Self::CustomRetrieveError>>> + Send;

    /// Looks up one zone by name or by provider id.
    fn get_zone(
        &self,
        name_or_id: &str,
    ) -> impl Future<Output = Result<Zone, RetrieveZoneError<Self::CustomRetrieveError>>> + Send;
}

/// A provider that can onboard new zones.
pub trait CreateZone: Provider {
    /// Provider-specific error carried by [`CreateZoneError::Custom`].
    type CustomCreateError: StdErr + Send + Sync + 'static;

    /// Creates a zone for `zone`'s domain name.
    ///
    /// Only the name is read from the argument. On success the returned zone
    /// carries the provider-assigned fields and a name equal to the
    /// normalised input.
    fn create_zone(
        &self,
        zone: &Zone,
    ) -> impl Future<Output = Result<Zone, CreateZoneError<Self::CustomCreateError>>> + Send;
}

/// A provider that can remove zones.
pub trait DeleteZone: Provider {
    /// Provider-specific error carried by [`DeleteZoneError::Custom`].
    type CustomDeleteError: StdErr + Send + Sync + 'static;

    /// Deletes the zone, addressed by its id when set, otherwise by its name.
    ///
    /// Returns the identity of the deleted zone.
    fn delete_zone(
        &self,
        zone: &Zone,
    ) -> impl Future<Output = Result<Zone, DeleteZoneError<Self::CustomDeleteError>>> + Send;
}
