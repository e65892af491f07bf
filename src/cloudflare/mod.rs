//! Cloudflare zone provider implementation.
//!
//! This provider uses the Cloudflare API with Bearer token authentication.
//!
//! # Authentication
//!
//! Requires a Cloudflare API token with `Zone:Edit` permission:
//! - Create one at: <https://dash.cloudflare.com/profile/api-tokens>
//!
//! [`CloudflareProvider::initialize`] verifies the token before handing out a
//! session, so a bad token fails early instead of on the first zone call.
//!
//! # Example
//!
//! ```no_run
//! use cfzones::cloudflare::{CloudflareProvider, Credentials};
//! use cfzones::Provider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let credentials = Credentials::from_env().ok_or("CF_TOKEN is not set")?;
//! let session = CloudflareProvider::from_credentials(&credentials).await?;
//!
//! for zone in session.list_zones().await? {
//!     println!("Zone: {} (ID: {}, {})", zone.name(), zone.id, zone.status);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # API Reference
//!
//! - [Zones API](https://developers.cloudflare.com/api/resources/zones/)

pub mod api;

use std::env;
use std::sync::Arc;

pub use api::{ApiError, Client, CloudflareError, TokenVerification};

use crate::types::DomainName;
use crate::{
    CreateZone, CreateZoneError, DeleteZone, DeleteZoneError, HttpClientConfig, InitializeError,
    Provider, RetrieveZoneError, Zone, Zones,
};

/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "CF_TOKEN";

/// Environment variable holding the account new zones are created under.
pub const ACCOUNT_ENV: &str = "CF_ACCOUNT_ID";

// Cloudflare error codes the provider classifies.
// 1000 = Invalid API token, 6003 = Invalid request headers,
// 6111 = Invalid Authorization header, 9106 = Missing X-Auth headers,
// 10000 = Authentication error
const AUTH_ERROR_CODES: &[i32] = &[1000, 6003, 6111, 9106, 10000];
// 1003 = Invalid or missing zone id, 7003 = Could not route, 9109 = Zone not found
const ZONE_NOT_FOUND_CODES: &[i32] = &[1003, 7003, 9109];
// 1061 = Zone already exists
const ZONE_EXISTS_CODES: &[i32] = &[1061];
// 1049 = Not a registered domain, 1097 = Zone is banned
const ZONE_REFUSED_CODES: &[i32] = &[1049, 1097];

fn is_code(err: &CloudflareError, codes: &[i32]) -> bool {
    err.code().is_some_and(|code| codes.contains(&code))
}

fn require_token(api_token: &str) -> Result<(), InitializeError<CloudflareError>> {
    if api_token.trim().is_empty() {
        return Err(InitializeError::Unauthorized);
    }
    Ok(())
}

/// Credentials read from the environment.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Cloudflare API token.
    pub api_token: String,
    /// Account new zones are attached to.
    pub account_id: Option<String>,
}

impl Credentials {
    /// Creates credentials from a token.
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            account_id: None,
        }
    }

    /// Reads [`TOKEN_ENV`] and, optionally, [`ACCOUNT_ENV`].
    ///
    /// Returns `None` when no token is set.
    pub fn from_env() -> Option<Self> {
        let api_token = env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty())?;
        let account_id = env::var(ACCOUNT_ENV).ok().filter(|a| !a.is_empty());
        Some(Self {
            api_token,
            account_id,
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_token", &"<redacted>")
            .field("account_id", &self.account_id)
            .finish()
    }
}

/// Cloudflare zone provider: an authenticated session.
///
/// Cloning is cheap and clones share one HTTP client.
#[derive(Clone)]
pub struct CloudflareProvider {
    api_client: Arc<Client>,
    account_id: Option<String>,
}

impl CloudflareProvider {
    /// Creates a session without contacting Cloudflare.
    ///
    /// # Arguments
    ///
    /// * `api_token` - Cloudflare API token (Bearer token)
    ///
    /// # Example
    ///
    /// ```no_run
    /// use cfzones::cloudflare::CloudflareProvider;
    ///
    /// let provider = CloudflareProvider::new("your_api_token").unwrap();
    /// ```
    pub fn new(api_token: &str) -> Result<Self, CloudflareError> {
        Ok(Self::from_client(Client::new(api_token)?))
    }

    /// Creates a session with custom HTTP client configuration.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use cfzones::cloudflare::CloudflareProvider;
    /// use cfzones::HttpClientConfig;
    ///
    /// // Bind to a specific source IP
    /// let config = HttpClientConfig::new()
    ///     .local_address("192.168.1.100".parse().unwrap());
    /// let provider = CloudflareProvider::with_config("your_api_token", config).unwrap();
    /// ```
    pub fn with_config(api_token: &str, config: HttpClientConfig) -> Result<Self, CloudflareError> {
        Ok(Self::from_client(Client::with_config(api_token, config)?))
    }

    /// Creates a session against a custom API base URL.
    ///
    /// This is primarily useful for testing with mock servers.
    pub fn with_base_url(api_token: &str, base_url: &str) -> Result<Self, CloudflareError> {
        Ok(Self::from_client(Client::with_base_url(
            api_token,
            base_url,
            HttpClientConfig::default(),
        )?))
    }

    fn from_client(client: Client) -> Self {
        Self {
            api_client: Arc::new(client),
            account_id: None,
        }
    }

    /// Attaches zones created through this session to the given account.
    pub fn with_account(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    /// Returns the account zones are created under, if set.
    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    /// Creates a session and verifies the token with Cloudflare.
    ///
    /// Fails with [`InitializeError::Unauthorized`] when the token is empty or
    /// Cloudflare rejects it, and [`InitializeError::InactiveToken`] when it is
    /// disabled or expired.
    pub async fn initialize(api_token: &str) -> Result<Self, InitializeError<CloudflareError>> {
        require_token(api_token)?;
        Self::new(api_token)
            .map_err(InitializeError::Custom)?
            .verified()
            .await
    }

    /// Verified session from environment credentials.
    pub async fn from_credentials(
        credentials: &Credentials,
    ) -> Result<Self, InitializeError<CloudflareError>> {
        Self::from_credentials_with_base_url(credentials, api::CLOUDFLARE_API_URL).await
    }

    /// Verified session from credentials, against a custom API base URL.
    ///
    /// This is primarily useful for testing with mock servers.
    pub async fn from_credentials_with_base_url(
        credentials: &Credentials,
        base_url: &str,
    ) -> Result<Self, InitializeError<CloudflareError>> {
        require_token(&credentials.api_token)?;
        let mut provider = Self::with_base_url(&credentials.api_token, base_url)
            .map_err(InitializeError::Custom)?;
        provider.account_id = credentials.account_id.clone();
        provider.verified().await
    }

    /// Verifies the token of an already built session and hands the session back.
    ///
    /// ```no_run
    /// use cfzones::cloudflare::CloudflareProvider;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    /// let session = CloudflareProvider::with_base_url("token", "http://127.0.0.1:8080")?
    ///     .verified()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn verified(self) -> Result<Self, InitializeError<CloudflareError>> {
        self.verify_token().await?;
        Ok(self)
    }

    /// Verifies this session's token with Cloudflare.
    pub async fn verify_token(&self) -> Result<TokenVerification, InitializeError<CloudflareError>> {
        let verification = self.api_client.verify_token().await.map_err(|err| {
            if is_code(&err, AUTH_ERROR_CODES) {
                InitializeError::Unauthorized
            } else {
                InitializeError::Custom(err)
            }
        })?;

        if !verification.is_active() {
            log::warn!("Cloudflare token {} is {}", verification.id, verification.status);
            return Err(InitializeError::InactiveToken(verification.status));
        }

        log::info!("Cloudflare token {} verified", verification.id);
        Ok(verification)
    }

    /// Resolves the id of the zone to delete: the given id, or a lookup by name.
    async fn resolve_zone(&self, zone: &Zone) -> Result<Zone, DeleteZoneError<CloudflareError>> {
        if zone.id().is_some() {
            return Ok(zone.clone());
        }

        // A name that cannot be a zone cannot match one either.
        let name = zone
            .resource
            .domain_name()
            .map_err(|_| DeleteZoneError::NotFound)?;

        let found = self
            .api_client
            .find_zone_by_name(name.as_str())
            .await
            .map_err(|err| {
                if is_code(&err, AUTH_ERROR_CODES) {
                    DeleteZoneError::Unauthorized
                } else {
                    DeleteZoneError::Custom(err)
                }
            })?;

        found.map(Zone::from).ok_or(DeleteZoneError::NotFound)
    }
}

impl Provider for CloudflareProvider {
    type CustomRetrieveError = CloudflareError;

    async fn list_zones(&self) -> Result<Zones, RetrieveZoneError<Self::CustomRetrieveError>> {
        let zones = self.api_client.list_zones().await.map_err(|err| {
            if is_code(&err, AUTH_ERROR_CODES) {
                RetrieveZoneError::Unauthorized
            } else {
                RetrieveZoneError::Custom(err)
            }
        })?;

        Ok(zones.into_iter().map(Zone::from).collect())
    }

    async fn get_zone(
        &self,
        name_or_id: &str,
    ) -> Result<Zone, RetrieveZoneError<Self::CustomRetrieveError>> {
        let map_err = |err: CloudflareError| {
            if is_code(&err, ZONE_NOT_FOUND_CODES) {
                RetrieveZoneError::NotFound
            } else if is_code(&err, AUTH_ERROR_CODES) {
                RetrieveZoneError::Unauthorized
            } else {
                RetrieveZoneError::Custom(err)
            }
        };

        // Zone ids are 32-char hex; anything else is a domain name.
        if name_or_id.len() == 32 && name_or_id.chars().all(|c| c.is_ascii_hexdigit()) {
            let zone = self.api_client.get_zone(name_or_id).await.map_err(map_err)?;
            return Ok(zone.into());
        }

        let name = DomainName::parse(name_or_id).map_err(|_| RetrieveZoneError::NotFound)?;
        self.api_client
            .find_zone_by_name(name.as_str())
            .await
            .map_err(map_err)?
            .map(Zone::from)
            .ok_or(RetrieveZoneError::NotFound)
    }
}

impl CreateZone for CloudflareProvider {
    type CustomCreateError = CloudflareError;

    async fn create_zone(
        &self,
        zone: &Zone,
    ) -> Result<Zone, CreateZoneError<Self::CustomCreateError>> {
        let name = zone.resource.domain_name().map_err(|err| {
            log::warn!("Refusing to create zone '{}': {}", zone.name(), err);
            CreateZoneError::InvalidDomainName
        })?;

        let request = api::CreateZoneRequest::new(name.as_str(), self.account_id.as_deref());
        let created = self
            .api_client
            .create_zone(&request)
            .await
            .map_err(|err| {
                if is_code(&err, ZONE_EXISTS_CODES) {
                    CreateZoneError::AlreadyExists
                } else if is_code(&err, ZONE_REFUSED_CODES) {
                    CreateZoneError::InvalidDomainName
                } else if is_code(&err, AUTH_ERROR_CODES) {
                    CreateZoneError::Unauthorized
                } else {
                    CreateZoneError::Custom(err)
                }
            })?;

        log::info!("Created zone {} ({})", created.name, created.id);
        Ok(created.into())
    }
}

impl DeleteZone for CloudflareProvider {
    type CustomDeleteError = CloudflareError;

    async fn delete_zone(
        &self,
        zone: &Zone,
    ) -> Result<Zone, DeleteZoneError<Self::CustomDeleteError>> {
        let target = self.resolve_zone(zone).await?;

        let deleted = self
            .api_client
            .delete_zone(&target.id)
            .await
            .map_err(|err| {
                if is_code(&err, ZONE_NOT_FOUND_CODES) {
                    DeleteZoneError::NotFound
                } else if is_code(&err, AUTH_ERROR_CODES) {
                    DeleteZoneError::Unauthorized
                } else {
                    DeleteZoneError::Custom(err)
                }
            })?;

        log::info!("Deleted zone {} ({})", target.name(), deleted.id);
        Ok(Zone {
            id: deleted.id,
            ..target
        })
    }
}
