use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Ordered list of custom nameservers. Empty means "use the policy defaults".
pub type Dns = Vec<String>;

pub type PortSet = BTreeSet<u16>;

pub type Subnets = BTreeSet<IpNetwork>;

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub enum Protocol {
    Tcp,
    Udp,
    Both,
}

impl Protocol {
    fn covers_tcp(&self) -> bool {
        matches!(self, Protocol::Tcp | Protocol::Both)
    }

    fn covers_udp(&self) -> bool {
        matches!(self, Protocol::Udp | Protocol::Both)
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Default, Debug)]
#[serde(default)]
pub struct Ports {
    pub tcp: PortSet,
    pub udp: PortSet,
}

/// Port and subnet exceptions to the VPN restrictions.
///
/// The sets are never absent: an unset allowlist is an allowlist with every
/// set empty.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Default, Debug)]
#[serde(default)]
pub struct Allowlist {
    pub ports: Ports,
    pub subnets: Subnets,
}

impl Allowlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.tcp.is_empty() && self.ports.udp.is_empty() && self.subnets.is_empty()
    }

    pub fn update_port(&mut self, port: u16, protocol: Protocol, remove: bool) {
        if protocol.covers_tcp() {
            if remove {
                self.ports.tcp.remove(&port);
            } else {
                self.ports.tcp.insert(port);
            }
        }
        if protocol.covers_udp() {
            if remove {
                self.ports.udp.remove(&port);
            } else {
                self.ports.udp.insert(port);
            }
        }
    }

    pub fn update_port_range(&mut self, start: u16, end: u16, protocol: Protocol, remove: bool) {
        for port in start..=end {
            self.update_port(port, protocol, remove);
        }
    }

    pub fn update_subnet(&mut self, subnet: IpNetwork, remove: bool) {
        if remove {
            self.subnets.remove(&subnet);
        } else {
            self.subnets.insert(subnet);
        }
    }

    pub fn clear(&mut self) {
        self.ports.tcp.clear();
        self.ports.udp.clear();
        self.subnets.clear();
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Default, Debug)]
#[serde(default)]
pub struct AutoConnectData {
    pub dns: Dns,
    pub threat_protection_lite: bool,
}

impl AutoConnectData {
    pub fn has_custom_dns(&self) -> bool {
        !self.dns.is_empty()
    }
}

/// Durable daemon settings. Only ever mutated through
/// [`ConfigManager::save_with`](crate::config::ConfigManager::save_with).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
#[serde(default)]
pub struct Settings {
    pub auto_connect_data: AutoConnectData,
    pub ipv6: bool,
    pub kill_switch: bool,
    pub firewall: bool,
    pub routing: bool,
    pub lan_discovery: bool,
    pub mesh: bool,
    pub allowlist: Allowlist,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_connect_data: AutoConnectData::default(),
            ipv6: false,
            kill_switch: false,
            firewall: true,
            routing: true,
            lan_discovery: false,
            mesh: false,
            allowlist: Allowlist::default(),
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }
}
