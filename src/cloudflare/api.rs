//! Low-level Cloudflare zone API client.
//!
//! This module provides direct access to the zone and token endpoints of the
//! Cloudflare v4 API. Results come back in Cloudflare's own shapes; the
//! provider in the parent module maps them onto the crate's model.
//!
//! # API Reference
//!
//! - [Zones](https://developers.cloudflare.com/api/resources/zones/)
//! - [Verify Token](https://developers.cloudflare.com/api/resources/user/subresources/tokens/methods/verify/)

use reqwest::header::{HeaderMap, HeaderValue, InvalidHeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{HttpClientConfig, ZoneStatus};

/// The Cloudflare API base URL.
pub(crate) const CLOUDFLARE_API_URL: &str = "https://api.cloudflare.com/client/v4";

/// Largest page size the zones endpoint accepts.
const ZONES_PER_PAGE: u32 = 50;

/// Response bodies longer than this are cut before they reach the log.
const LOG_BODY_LIMIT: usize = 512;

/// Errors that may occur when interacting with the Cloudflare API.
#[derive(Debug, Error)]
pub enum CloudflareError {
    /// The API returned an error response.
    #[error("API error: {0}")]
    Api(ApiError),

    /// An HTTP request error occurred.
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Failed to serialize/deserialize.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The API token cannot be sent as a header value.
    #[error("API token is not a valid header value")]
    InvalidHeader(#[from] InvalidHeaderValue),
}

impl CloudflareError {
    /// Returns the Cloudflare error code, if the API reported one.
    pub fn code(&self) -> Option<i32> {
        match self {
            CloudflareError::Api(err) => Some(err.code),
            _ => None,
        }
    }
}

/// Cloudflare API error.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiError {
    /// Error code.
    pub code: i32,
    /// Error message.
    pub message: String,
}

impl ApiError {
    fn unknown(message: &str) -> Self {
        Self {
            code: 0,
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Cloudflare API response wrapper.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiError>,
    result: Option<T>,
    result_info: Option<ResultInfo>,
}

impl<T> ApiResponse<T> {
    /// Splits the envelope into its result or the first reported error.
    fn into_result(self) -> Result<(Option<T>, Option<ResultInfo>), CloudflareError> {
        if !self.success {
            let error = self
                .errors
                .into_iter()
                .next()
                .unwrap_or_else(|| ApiError::unknown("Unknown error"));
            log::warn!("Cloudflare API error {}", error);
            return Err(CloudflareError::Api(error));
        }
        Ok((self.result, self.result_info))
    }
}

/// Pagination info.
#[derive(Debug, Deserialize)]
struct ResultInfo {
    #[serde(default)]
    total_pages: u32,
}

// =============================================================================
// Zone Types
// =============================================================================

/// A Cloudflare zone.
#[derive(Debug, Clone, Deserialize)]
pub struct Zone {
    /// Zone ID (32-character hex string).
    pub id: String,
    /// Domain name.
    pub name: String,
    /// Zone status.
    #[serde(default)]
    pub status: ZoneStatus,
    /// Whether the zone is paused.
    #[serde(default)]
    pub paused: bool,
    /// Zone type (full, partial, secondary).
    #[serde(rename = "type")]
    pub zone_type: Option<String>,
    /// Cloudflare name servers assigned to the zone.
    #[serde(default)]
    pub name_servers: Vec<String>,
}

impl From<Zone> for crate::Zone {
    fn from(zone: Zone) -> Self {
        crate::Zone {
            resource: crate::DomainResource::new(zone.name),
            id: zone.id,
            status: zone.status,
            paused: zone.paused,
            name_servers: zone.name_servers,
        }
    }
}

/// Reference to the account a new zone belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct AccountRef {
    /// Account ID.
    pub id: String,
}

/// Request body for creating a zone.
#[derive(Debug, Clone, Serialize)]
pub struct CreateZoneRequest {
    /// Domain name.
    pub name: String,
    /// Owning account. Tokens scoped to a single account may omit it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountRef>,
    /// Whether Cloudflare should scan the domain's existing DNS records.
    pub jump_start: bool,
    /// Zone type. Always `full` here: Cloudflare is the authoritative DNS.
    #[serde(rename = "type")]
    pub zone_type: String,
}

impl CreateZoneRequest {
    /// Creates a request for a full zone with no DNS record scan.
    pub fn new(name: &str, account_id: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            account: account_id.map(|id| AccountRef { id: id.to_string() }),
            jump_start: false,
            zone_type: "full".to_string(),
        }
    }
}

/// Delete response.
#[derive(Debug, Deserialize)]
pub struct DeleteResponse {
    pub id: String,
}

/// Result of verifying an API token.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenVerification {
    /// Token ID.
    pub id: String,
    /// Token status: `active`, `disabled` or `expired`.
    pub status: String,
}

impl TokenVerification {
    /// Returns true if the token can be used.
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

// =============================================================================
// API Client
// =============================================================================

/// Cloudflare API client.
pub struct Client {
    http_client: reqwest::Client,
    base_url: String,
}

impl Client {
    /// Creates a new Cloudflare API client.
    ///
    /// # Arguments
    ///
    /// * `api_token` - Cloudflare API token (Bearer token)
    pub fn new(api_token: &str) -> Result<Self, CloudflareError> {
        Self::with_base_url(api_token, CLOUDFLARE_API_URL, HttpClientConfig::default())
    }

    /// Creates a new Cloudflare API client with custom HTTP configuration.
    ///
    /// # Arguments
    ///
    /// * `api_token` - Cloudflare API token (Bearer token)
    /// * `config` - HTTP client configuration for network binding
    pub fn with_config(api_token: &str, config: HttpClientConfig) -> Result<Self, CloudflareError> {
        Self::with_base_url(api_token, CLOUDFLARE_API_URL, config)
    }

    /// Creates a new Cloudflare API client with a custom base URL.
    ///
    /// This is primarily useful for testing with mock servers.
    ///
    /// # Arguments
    ///
    /// * `api_token` - Cloudflare API token (Bearer token)
    /// * `base_url` - Custom base URL for the API
    /// * `config` - HTTP client configuration for network binding
    pub fn with_base_url(
        api_token: &str,
        base_url: &str,
        config: HttpClientConfig,
    ) -> Result<Self, CloudflareError> {
        let mut builder = reqwest::Client::builder()
            .default_headers(Self::headers(api_token)?)
            .timeout(config.timeout.unwrap_or(std::time::Duration::from_secs(30)));

        if let Some(addr) = config.local_address {
            builder = builder.local_address(addr);
        }

        #[cfg(any(
            target_os = "android",
            target_os = "fuchsia",
            target_os = "linux",
            target_os = "macos",
            target_os = "ios",
            target_os = "tvos",
            target_os = "watchos",
            target_os = "illumos",
            target_os = "solaris",
        ))]
        if let Some(ref iface) = config.interface {
            builder = builder.interface(iface);
        }

        let http_client = builder.build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build headers sent with every request.
    fn headers(api_token: &str) -> Result<HeaderMap, InvalidHeaderValue> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_token))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Send a request and unwrap the Cloudflare envelope.
    async fn send<T: for<'de> Deserialize<'de>>(
        &self,
        request: reqwest::Request,
    ) -> Result<(Option<T>, Option<ResultInfo>), CloudflareError> {
        log::debug!("{} {}", request.method(), request.url());
        let response = self.http_client.execute(request).await?;
        let status = response.status();
        log::debug!("Response Status: {}", status);

        let text = response.text().await?;
        let api_response: ApiResponse<T> = serde_json::from_str(&text).map_err(|e| {
            log::error!(
                "Failed to parse Cloudflare response ({}): {}",
                status,
                truncate_for_log(&text)
            );
            CloudflareError::Serialization(e)
        })?;

        api_response.into_result()
    }

    /// Require a result in a successful envelope.
    fn require<T>(result: Option<T>) -> Result<T, CloudflareError> {
        result.ok_or_else(|| CloudflareError::Api(ApiError::unknown("No result in response")))
    }

    /// Make a GET request.
    async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, CloudflareError> {
        let url = format!("{}{}", self.base_url, path);
        let request = self.http_client.get(&url).build()?;

        let (result, _) = self.send(request).await?;
        Self::require(result)
    }

    /// Make a paginated GET request returning a list.
    ///
    /// `query` pairs are percent-encoded into the URL ahead of the page parameters.
    async fn get_list<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        per_page: u32,
    ) -> Result<Vec<T>, CloudflareError> {
        let url = format!("{}{}", self.base_url, path);
        let mut all_results = Vec::new();
        let mut page = 1u32;

        loop {
            let mut request = self.http_client.get(&url).build()?;
            {
                let mut pairs = request.url_mut().query_pairs_mut();
                for (key, value) in query {
                    pairs.append_pair(key, value);
                }
                pairs
                    .append_pair("page", &page.to_string())
                    .append_pair("per_page", &per_page.to_string());
            }

            let (result, info): (Option<Vec<T>>, _) = self.send(request).await?;

            let Some(results) = result else {
                break;
            };
            let count = results.len();
            all_results.extend(results);

            match info {
                Some(info) if page < info.total_pages && count > 0 => page += 1,
                _ => break,
            }
        }

        Ok(all_results)
    }

    /// Make a POST request.
    async fn post<Req: Serialize, Resp: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &Req,
    ) -> Result<Resp, CloudflareError> {
        let url = format!("{}{}", self.base_url, path);
        let request = self.http_client.post(&url).json(body).build()?;

        let (result, _) = self.send(request).await?;
        Self::require(result)
    }

    /// Make a DELETE request.
    async fn delete<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, CloudflareError> {
        let url = format!("{}{}", self.base_url, path);
        let request = self.http_client.delete(&url).build()?;

        let (result, _) = self.send(request).await?;
        Self::require(result)
    }

    // =========================================================================
    // Token APIs
    // =========================================================================

    /// Verifies the API token the client was built with.
    pub async fn verify_token(&self) -> Result<TokenVerification, CloudflareError> {
        self.get("/user/tokens/verify").await
    }

    // =========================================================================
    // Zone APIs
    // =========================================================================

    /// Lists all zones accessible by the API token.
    pub async fn list_zones(&self) -> Result<Vec<Zone>, CloudflareError> {
        self.get_list("/zones", &[], ZONES_PER_PAGE).await
    }

    /// Gets a zone by ID.
    pub async fn get_zone(&self, zone_id: &str) -> Result<Zone, CloudflareError> {
        self.get(&format!("/zones/{}", zone_id)).await
    }

    /// Finds a zone by name (domain). Returns `None` if the account has none.
    pub async fn find_zone_by_name(&self, name: &str) -> Result<Option<Zone>, CloudflareError> {
        let zones: Vec<Zone> = self
            .get_list("/zones", &[("name", name)], ZONES_PER_PAGE)
            .await?;
        Ok(zones.into_iter().find(|z| z.name.eq_ignore_ascii_case(name)))
    }

    /// Creates a zone.
    pub async fn create_zone(&self, request: &CreateZoneRequest) -> Result<Zone, CloudflareError> {
        self.post("/zones", request).await
    }

    /// Deletes a zone by ID.
    pub async fn delete_zone(&self, zone_id: &str) -> Result<DeleteResponse, CloudflareError> {
        self.delete(&format!("/zones/{}", zone_id)).await
    }
}

/// Truncate a response body for logging.
fn truncate_for_log(s: &str) -> String {
    if s.len() <= LOG_BODY_LIMIT {
        return s.to_string();
    }
    let mut end = LOG_BODY_LIMIT;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... [truncated, total {} bytes]", &s[..end], s.len())
}
