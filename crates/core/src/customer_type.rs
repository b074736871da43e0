//! Customer-type classification from a lead's email domain.
//!
//! Leads whose contact address belongs to a solar lease / PPA provider or an
//! equipment vendor's dealer programme are `Lease` customers; everyone else
//! is treated as a system `Owner`.

use serde::{Deserialize, Serialize};

/// How the customer holds the solar system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerType {
    Owner,
    Lease,
}

impl CustomerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Lease => "lease",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "owner" => Some(Self::Owner),
            "lease" => Some(Self::Lease),
            _ => None,
        }
    }

    pub const ALL: &'static [&'static str] = &["owner", "lease"];
}

impl std::fmt::Display for CustomerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lease, PPA, and manufacturer dealer-programme domains.
pub const LEASE_DOMAINS: &[&str] = &[
    "enphase.com",
    "sunrun.com",
    "sunnova.com",
    "sunpower.com",
    "tesla.com",
    "vivintsolar.com",
    "freedomforever.com",
    "palmetto.com",
    "goodleap.com",
    "mosaic.com",
    "sunlightfinancial.com",
    "solarmax.com",
    "momentumsolar.com",
    "trinity-solar.com",
    "blueravensolar.com",
    "solaredge.com",
];

/// Consumer mailbox providers homeowners sign up with.
pub const OWNER_DOMAINS: &[&str] = &[
    "gmail.com",
    "googlemail.com",
    "yahoo.com",
    "ymail.com",
    "hotmail.com",
    "outlook.com",
    "live.com",
    "msn.com",
    "aol.com",
    "icloud.com",
    "me.com",
    "mac.com",
    "comcast.net",
    "att.net",
    "verizon.net",
    "sbcglobal.net",
    "cox.net",
    "charter.net",
    "protonmail.com",
    "proton.me",
];

/// Lower-cased domain part of an email address, after the last `@`.
pub fn email_domain(email: &str) -> Option<String> {
    let (_, domain) = email.trim().rsplit_once('@')?;
    let domain = domain.trim().trim_end_matches('.').to_ascii_lowercase();
    if domain.is_empty() {
        None
    } else {
        Some(domain)
    }
}

/// Whether `domain` is `listed` or a sub-domain of it.
fn matches_domain(domain: &str, listed: &str) -> bool {
    domain == listed
        || domain
            .strip_suffix(listed)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

fn in_list(domain: &str, list: &[&str]) -> bool {
    list.iter().any(|listed| matches_domain(domain, listed))
}

/// Classify a lead by email address.
///
/// Lease domains are checked first; unlisted domains default to `Owner`.
/// Returns `None` when the address has no domain part.
pub fn classify_email(email: &str) -> Option<CustomerType> {
    let domain = email_domain(email)?;
    if in_list(&domain, LEASE_DOMAINS) {
        Some(CustomerType::Lease)
    } else {
        Some(CustomerType::Owner)
    }
}

/// Whether the domain appears on either static list.
///
/// Used by the import report to flag rows that were classified by default.
pub fn is_known_domain(email: &str) -> bool {
    email_domain(email)
        .is_some_and(|d| in_list(&d, LEASE_DOMAINS) || in_list(&d, OWNER_DOMAINS))
}
