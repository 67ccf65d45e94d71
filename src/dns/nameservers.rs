//! Default nameserver policy.
//!
//! The effective nameserver list is either the user's custom list or a
//! default pair picked by the threat protection lite flag, with the matching
//! IPv6 pair appended when IPv6 is in use.

pub const DEFAULT_NAMESERVERS_V4: [&str; 2] = ["103.86.96.100", "103.86.99.100"];
pub const DEFAULT_NAMESERVERS_V6: [&str; 2] = ["2400:bb40:4444::100", "2400:bb40:8888::100"];
pub const TPL_NAMESERVERS_V4: [&str; 2] = ["103.86.96.96", "103.86.99.99"];
pub const TPL_NAMESERVERS_V6: [&str; 2] = ["2400:bb40:4444::103", "2400:bb40:8888::103"];

/// Source of the default nameservers.
pub trait DnsGetter: Send + Sync {
    fn get(&self, threat_protection_lite: bool, ipv6: bool) -> Vec<String>;
}

#[derive(Clone, Copy, Default, Debug)]
pub struct NameServers;

impl NameServers {
    pub fn new() -> Self {
        Self
    }
}

impl DnsGetter for NameServers {
    fn get(&self, threat_protection_lite: bool, ipv6: bool) -> Vec<String> {
        let (v4, v6) = if threat_protection_lite {
            (TPL_NAMESERVERS_V4, TPL_NAMESERVERS_V6)
        } else {
            (DEFAULT_NAMESERVERS_V4, DEFAULT_NAMESERVERS_V6)
        };

        let mut nameservers: Vec<String> = v4.iter().map(|s| s.to_string()).collect();
        if ipv6 {
            nameservers.extend(v6.iter().map(|s| s.to_string()));
        }
        nameservers
    }
}

/// Picks the nameservers to apply. A non-empty `custom` list wins and is
/// returned unchanged.
pub fn resolve(
    getter: &dyn DnsGetter,
    custom: &[String],
    threat_protection_lite: bool,
    ipv6: bool,
) -> Vec<String> {
    if !custom.is_empty() {
        return custom.to_vec();
    }
    getter.get(threat_protection_lite, ipv6)
}
