//! RFC-compliant domain name validation.
//!
//! Zone names are checked locally before any request leaves the process, so a
//! malformed name never costs a round trip. The rules follow:
//! - RFC 1035: Domain Names - Implementation and Specification
//! - RFC 1123: Requirements for Internet Hosts (digits may lead a label)
//!
//! # Size Limits (from RFCs)
//!
//! | Field | Limit | Reference |
//! |-------|-------|-----------|
//! | Label | 1-63 octets | RFC 1035 §2.3.4 |
//! | Domain name | ≤255 octets on the wire | RFC 1035 §2.3.4 |
//! | Domain name | ≤253 characters dotted | derived from the wire limit |

use core::fmt;
use core::str::FromStr;

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum length of a single DNS label (RFC 1035 §2.3.4).
pub const MAX_LABEL_LEN: usize = 63;

/// Maximum length of a full domain name in wire format (RFC 1035 §2.3.4).
pub const MAX_DOMAIN_LEN: usize = 255;

/// Maximum length of a domain name in dotted notation, without the root dot.
///
/// Wire format spends one length octet per label plus the terminating zero,
/// which leaves 253 printable characters.
pub const MAX_DOTTED_LEN: usize = MAX_DOMAIN_LEN - 2;

/// Reasons a string is rejected as a zone name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainNameError {
    /// The name is empty (or only the root dot).
    #[error("domain name is empty")]
    Empty,

    /// The dotted name exceeds [`MAX_DOTTED_LEN`] characters.
    #[error("domain name is {0} characters long, the limit is {MAX_DOTTED_LEN}")]
    TooLong(usize),

    /// Two consecutive dots, or a leading dot.
    #[error("domain name contains an empty label")]
    EmptyLabel,

    /// A label exceeds [`MAX_LABEL_LEN`] octets.
    #[error("label '{0}' exceeds {MAX_LABEL_LEN} octets")]
    LabelTooLong(String),

    /// A label contains something other than letters, digits and hyphens.
    #[error("label '{0}' contains an invalid character")]
    InvalidCharacter(String),

    /// A label starts or ends with a hyphen.
    #[error("label '{0}' starts or ends with a hyphen")]
    HyphenAtEdge(String),

    /// A zone apex needs at least a second-level label.
    #[error("'{0}' is a top-level domain, not a zone")]
    SingleLabel(String),
}

/// A validated, normalised zone name.
///
/// Normalisation strips the trailing root dot and lowercases the name, so two
/// spellings of the same zone compare equal.
///
/// # Example
///
/// ```
/// use cfzones::types::DomainName;
///
/// let name: DomainName = "Example.COM.".parse().unwrap();
/// assert_eq!(name.as_str(), "example.com");
/// assert_eq!(name.labels().count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct DomainName(String);

impl DomainName {
    /// Validates and normalises a dotted domain name.
    pub fn parse(s: &str) -> Result<Self, DomainNameError> {
        let trimmed = s.strip_suffix('.').unwrap_or(s);
        if trimmed.is_empty() {
            return Err(DomainNameError::Empty);
        }
        if trimmed.len() > MAX_DOTTED_LEN {
            return Err(DomainNameError::TooLong(trimmed.len()));
        }

        let mut labels = 0usize;
        for label in trimmed.split('.') {
            validate_label(label)?;
            labels += 1;
        }

        if labels < 2 {
            return Err(DomainNameError::SingleLabel(trimmed.to_string()));
        }

        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    /// Returns the name in dotted notation.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterates over the labels, most specific first.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Returns the length the name occupies in wire format.
    pub fn wire_len(&self) -> usize {
        // One length octet per label, the label bytes, and the root zero.
        self.labels().map(|l| l.len() + 1).sum::<usize>() + 1
    }

    /// Consumes the name, returning the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

fn validate_label(label: &str) -> Result<(), DomainNameError> {
    if label.is_empty() {
        return Err(DomainNameError::EmptyLabel);
    }
    if label.len() > MAX_LABEL_LEN {
        return Err(DomainNameError::LabelTooLong(label.to_string()));
    }
    if !label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
        return Err(DomainNameError::InvalidCharacter(label.to_string()));
    }
    if label.starts_with('-') || label.ends_with('-') {
        return Err(DomainNameError::HyphenAtEdge(label.to_string()));
    }
    Ok(())
}

impl FromStr for DomainName {
    type Err = DomainNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DomainName {
    type Error = DomainNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DomainName> for String {
    fn from(name: DomainName) -> Self {
        name.0
    }
}

impl AsRef<str> for DomainName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
