use std::net::IpAddr;
use thiserror::Error;

pub const MAX_NAMESERVERS: usize = 3;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DnsValidationError {
    #[error("at most {MAX_NAMESERVERS} nameservers can be set, got {0}")]
    TooManyValues(usize),
    #[error("invalid nameserver address: {0}")]
    InvalidAddress(String),
}

pub fn validate_address(addr: &str) -> bool {
    addr.parse::<IpAddr>().is_ok()
}

/// Checks a requested nameserver list. An empty list is valid and means
/// "go back to the defaults". Duplicates are accepted as-is.
pub fn validate_nameservers(nameservers: &[String]) -> Result<(), DnsValidationError> {
    if nameservers.len() > MAX_NAMESERVERS {
        return Err(DnsValidationError::TooManyValues(nameservers.len()));
    }

    if let Some(invalid) = nameservers.iter().find(|addr| !validate_address(addr)) {
        return Err(DnsValidationError::InvalidAddress(invalid.clone()));
    }

    Ok(())
}
