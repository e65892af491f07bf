//! In-memory zone provider.
//!
//! [`MemoryAccount`] stands in for a remote account: it owns the zone table,
//! the one API token it accepts, and the domains its registry refuses to
//! onboard. [`MemoryAccount::initialize`] hands out [`MemoryProvider`]
//! sessions that follow the same failure rules as the live provider, which
//! makes create/list/delete flows testable without network access.
//!
//! # Example
//!
//! ```
//! use cfzones::memory::MemoryAccount;
//! use cfzones::{CreateZone, CreateZoneError, Provider, Zone};
//!
//! # async fn example() {
//! let account = MemoryAccount::new("token").refuse_domain("unregistered.com");
//! let session = account.initialize("token").unwrap();
//!
//! session.create_zone(&Zone::new("example.com")).await.unwrap();
//! assert!(matches!(
//!     session.create_zone(&Zone::new("example.com")).await,
//!     Err(CreateZoneError::AlreadyExists)
//! ));
//! assert!(session.list_zones().await.unwrap().contains("example.com"));
//! # }
//! ```

use std::collections::HashSet;
use std::convert::Infallible;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::types::DomainName;
use crate::{
    CreateZone, CreateZoneError, DeleteZone, DeleteZoneError, InitializeError, Provider,
    RetrieveZoneError, Zone, ZoneStatus, Zones,
};

/// Name servers assigned to every in-memory zone.
const NAME_SERVERS: [&str; 2] = ["ada.ns.example.net", "bob.ns.example.net"];

#[derive(Debug)]
struct State {
    token: String,
    revoked: bool,
    zones: Vec<Zone>,
    refused: HashSet<String>,
    next_id: u128,
}

/// A fake provider account kept in process memory.
///
/// Cloning yields another handle to the same account.
#[derive(Debug, Clone)]
pub struct MemoryAccount {
    state: Arc<RwLock<State>>,
}

impl MemoryAccount {
    /// Creates an empty account that accepts `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            state: Arc::new(RwLock::new(State {
                token: token.into(),
                revoked: false,
                zones: Vec::new(),
                refused: HashSet::new(),
                next_id: 1,
            })),
        }
    }

    /// Makes zone creation for `domain` fail as if it were not a registered domain.
    ///
    /// Malformed names are already refused by validation and are not recorded.
    pub fn refuse_domain(self, domain: &str) -> Self {
        match DomainName::parse(domain) {
            Ok(name) => {
                write(&self.state).refused.insert(name.into_string());
            }
            Err(err) => log::warn!("Not refusing '{}': {}", domain, err),
        }
        self
    }

    /// Opens a session, failing if `token` is not the account's token.
    pub fn initialize(&self, token: &str) -> Result<MemoryProvider, InitializeError<Infallible>> {
        let state = read(&self.state);
        if state.revoked || token.is_empty() || token != state.token {
            return Err(InitializeError::Unauthorized);
        }

        log::info!("In-memory session initialized");
        Ok(MemoryProvider {
            state: self.state.clone(),
            token: token.to_string(),
        })
    }

    /// Revokes the token. Existing sessions fail with `Unauthorized` from now on.
    pub fn revoke(&self) {
        write(&self.state).revoked = true;
    }

    /// Returns the number of zones in the account.
    pub fn zone_count(&self) -> usize {
        read(&self.state).zones.len()
    }
}

/// An authenticated session against a [`MemoryAccount`].
#[derive(Debug, Clone)]
pub struct MemoryProvider {
    state: Arc<RwLock<State>>,
    token: String,
}

impl MemoryProvider {
    fn authorized(&self, state: &State) -> bool {
        !state.revoked && state.token == self.token
    }
}

// Every mutation is a single push, insert or remove, so a poisoned table is
// still consistent.
fn read(state: &RwLock<State>) -> RwLockReadGuard<'_, State> {
    state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write(state: &RwLock<State>) -> RwLockWriteGuard<'_, State> {
    state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn position(zones: &[Zone], zone: &Zone) -> Option<usize> {
    match zone.id() {
        Some(id) => zones.iter().position(|z| z.id == id),
        None => {
            let name = zone.resource.domain_name().ok()?;
            zones.iter().position(|z| z.name() == name.as_str())
        }
    }
}

impl Provider for MemoryProvider {
    type CustomRetrieveError = Infallible;

    async fn list_zones(&self) -> Result<Zones, RetrieveZoneError<Self::CustomRetrieveError>> {
        let state = read(&self.state);
        if !self.authorized(&state) {
            return Err(RetrieveZoneError::Unauthorized);
        }
        Ok(state.zones.iter().cloned().collect())
    }

    async fn get_zone(
        &self,
        name_or_id: &str,
    ) -> Result<Zone, RetrieveZoneError<Self::CustomRetrieveError>> {
        let state = read(&self.state);
        if !self.authorized(&state) {
            return Err(RetrieveZoneError::Unauthorized);
        }
        let name = DomainName::parse(name_or_id).ok();
        state
            .zones
            .iter()
            .find(|z| z.id == name_or_id || name.as_ref().is_some_and(|n| z.name() == n.as_str()))
            .cloned()
            .ok_or(RetrieveZoneError::NotFound)
    }
}

impl CreateZone for MemoryProvider {
    type CustomCreateError = Infallible;

    async fn create_zone(
        &self,
        zone: &Zone,
    ) -> Result<Zone, CreateZoneError<Self::CustomCreateError>> {
        let name = zone
            .resource
            .domain_name()
            .map_err(|_| CreateZoneError::InvalidDomainName)?;

        let mut state = write(&self.state);
        if !self.authorized(&state) {
            return Err(CreateZoneError::Unauthorized);
        }
        if state.refused.contains(name.as_str()) {
            return Err(CreateZoneError::InvalidDomainName);
        }
        if state.zones.iter().any(|z| z.name() == name.as_str()) {
            return Err(CreateZoneError::AlreadyExists);
        }

        let id = format!("{:032x}", state.next_id);
        state.next_id += 1;

        let created = Zone {
            id,
            status: ZoneStatus::Pending,
            name_servers: NAME_SERVERS.iter().map(|ns| ns.to_string()).collect(),
            ..Zone::new(name.into_string())
        };
        state.zones.push(created.clone());

        log::info!("Created in-memory zone {} ({})", created.name(), created.id);
        Ok(created)
    }
}

impl DeleteZone for MemoryProvider {
    type CustomDeleteError = Infallible;

    async fn delete_zone(
        &self,
        zone: &Zone,
    ) -> Result<Zone, DeleteZoneError<Self::CustomDeleteError>> {
        let mut state = write(&self.state);
        if !self.authorized(&state) {
            return Err(DeleteZoneError::Unauthorized);
        }

        let index = position(&state.zones, zone).ok_or(DeleteZoneError::NotFound)?;
        let deleted = state.zones.remove(index);

        log::info!("Deleted in-memory zone {} ({})", deleted.name(), deleted.id);
        Ok(deleted)
    }
}
