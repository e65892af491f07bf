//! Local representation of DNS zones.
//!
//! A [`Zone`] is a transient value: it is either the request shape handed to a
//! provider (only the name is meaningful) or a snapshot of what the provider
//! reported. Its existence is defined entirely by the remote account.

use std::collections::BTreeSet;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::types::{DomainName, DomainNameError};

/// The identifying part of a zone: its domain name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DomainResource {
    /// The DNS domain, e.g. `example.com`.
    pub name: String,
}

impl DomainResource {
    /// Creates a resource for the given domain.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Validates the name and returns its normalised form.
    pub fn domain_name(&self) -> Result<DomainName, DomainNameError> {
        DomainName::parse(&self.name)
    }
}

/// Lifecycle state reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ZoneStatus {
    /// Being set up by the provider.
    Initializing,
    /// Waiting for the registrar to delegate to the provider's name servers.
    Pending,
    /// Delegated and serving.
    Active,
    /// Delegation moved away from the provider.
    Moved,
    /// Deactivated by the provider or the account.
    Deactivated,
    /// Not reported, or a value this crate does not know.
    #[default]
    #[cfg_attr(feature = "serde", serde(other))]
    Unknown,
}

impl ZoneStatus {
    /// Returns the provider's spelling of the status.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Moved => "moved",
            Self::Deactivated => "deactivated",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ZoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A DNS zone: a domain resource plus the fields the provider assigns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Zone {
    /// The domain this zone serves.
    pub resource: DomainResource,
    /// Provider-assigned identifier. Empty until the provider reports one.
    pub id: String,
    /// Provider-reported status.
    pub status: ZoneStatus,
    /// Whether the provider has paused the zone.
    pub paused: bool,
    /// Name servers the registrar must delegate to.
    pub name_servers: Vec<String>,
}

impl Zone {
    /// Creates a request-shaped zone carrying only a name.
    ///
    /// # Example
    ///
    /// ```
    /// use cfzones::Zone;
    ///
    /// let zone = Zone::new("example.com");
    /// assert_eq!(zone.name(), "example.com");
    /// assert!(zone.id.is_empty());
    /// ```
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            resource: DomainResource::new(name),
            ..Self::default()
        }
    }

    /// Returns the zone's domain name.
    pub fn name(&self) -> &str {
        &self.resource.name
    }

    /// Returns the id if the provider has assigned one.
    pub fn id(&self) -> Option<&str> {
        if self.id.is_empty() {
            None
        } else {
            Some(&self.id)
        }
    }
}

impl From<DomainResource> for Zone {
    fn from(resource: DomainResource) -> Self {
        Self {
            resource,
            ..Self::default()
        }
    }
}

/// An ordered list of zones, in the order the provider returned them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Zones(Vec<Zone>);

impl Zones {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Zone names, in list order.
    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|z| z.name().to_string()).collect()
    }

    /// Zone names as a set, for comparisons that must not depend on order.
    ///
    /// # Example
    ///
    /// ```
    /// use cfzones::{Zone, Zones};
    ///
    /// let a: Zones = vec![Zone::new("b.com"), Zone::new("a.com")].into();
    /// let b: Zones = vec![Zone::new("a.com"), Zone::new("b.com")].into();
    /// assert_ne!(a.names(), b.names());
    /// assert_eq!(a.name_set(), b.name_set());
    /// ```
    pub fn name_set(&self) -> BTreeSet<String> {
        self.0.iter().map(|z| z.name().to_string()).collect()
    }

    /// Returns the zone with the given name, if listed.
    pub fn find(&self, name: &str) -> Option<&Zone> {
        self.0.iter().find(|z| z.name().eq_ignore_ascii_case(name))
    }

    /// Returns true if a zone with the given name is listed.
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Zone> {
        self.0.iter()
    }

    /// Consumes the list, returning the zones.
    pub fn into_vec(self) -> Vec<Zone> {
        self.0
    }
}

impl From<Vec<Zone>> for Zones {
    fn from(zones: Vec<Zone>) -> Self {
        Self(zones)
    }
}

impl FromIterator<Zone> for Zones {
    fn from_iter<I: IntoIterator<Item = Zone>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Zones {
    type Item = Zone;
    type IntoIter = std::vec::IntoIter<Zone>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Zones {
    type Item = &'a Zone;
    type IntoIter = std::slice::Iter<'a, Zone>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::ops::Index<usize> for Zones {
    type Output = Zone;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}
