pub mod nameservers;
pub mod validation;

pub use nameservers::{DnsGetter, NameServers, resolve};
pub use validation::{
    DnsValidationError, MAX_NAMESERVERS, validate_address, validate_nameservers,
};
