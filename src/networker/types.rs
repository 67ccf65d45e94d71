use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use uuid::Uuid;

/// Address of the VPN server the tunnel terminates on.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub enum Endpoint {
    Ipv4(Ipv4Addr),
    /// Dual-stack server; carries every address it was announced with.
    Ipv6(Vec<IpAddr>),
}

impl Endpoint {
    pub fn supports_ipv6(&self) -> bool {
        match self {
            Endpoint::Ipv4(_) => false,
            Endpoint::Ipv6(addrs) => addrs.iter().any(IpAddr::is_ipv6),
        }
    }

    pub fn addresses(&self) -> Vec<IpAddr> {
        match self {
            Endpoint::Ipv4(addr) => vec![IpAddr::V4(*addr)],
            Endpoint::Ipv6(addrs) => addrs.clone(),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct ServerData {
    pub name: String,
    pub hostname: String,
    pub endpoint: Endpoint,
}

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, Debug)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Default, Debug)]
pub struct ConnectionStatus {
    pub state: ConnectionState,
    pub server_name: String,
    pub server_ip: Option<IpAddr>,
}

/// Meshnet peer as seen by the allowlist: its local network traffic is
/// let through only when it allows it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct MachinePeer {
    pub id: Uuid,
    pub hostname: String,
    pub address: IpAddr,
    pub do_i_allow_local_network: bool,
}

pub type MachinePeers = Vec<MachinePeer>;
