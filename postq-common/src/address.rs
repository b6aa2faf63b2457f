//! Domain extraction for envelope and recipient addresses.
//!
//! This runs on every message initialisation, so the pattern is compiled
//! once for the lifetime of the process and only ever read afterwards.

use std::sync::LazyLock;

use regex::Regex;

use crate::{Domain, error::AddressError};

/// `local-part@domain.tld`, with ASCII word characters only. The top level
/// label is two to four word characters.
#[allow(
    clippy::expect_used,
    reason = "the pattern is a compile-time constant"
)]
static ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9A-Za-z_.%+-]+@([0-9A-Za-z_.-]+\.[0-9A-Za-z_]{2,4})$")
        .expect("address pattern should compile")
});

/// Extract the domain part of `address`.
///
/// # Errors
///
/// Returns [`AddressError::InvalidAddress`] unless the address matches the
/// pattern exactly once.
///
/// # Examples
///
/// ```
/// use postq_common::address::domain_of;
///
/// assert_eq!(domain_of("user@example.com").unwrap().as_str(), "example.com");
/// assert!(domain_of("user@@example.com").is_err());
/// ```
pub fn domain_of(address: &str) -> Result<Domain, AddressError> {
    let mut matches = ADDRESS.captures_iter(address);

    match (matches.next(), matches.next()) {
        (Some(captures), None) => captures
            .get(1)
            .map(|domain| Domain::from(domain.as_str()))
            .ok_or_else(|| AddressError::InvalidAddress(address.to_string())),
        _ => Err(AddressError::InvalidAddress(address.to_string())),
    }
}
