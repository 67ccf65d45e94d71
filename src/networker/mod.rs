//! Contract of the subsystem that applies network changes to the live system.
//!
//! The networker owns firewall, routing, tunnel and resolver mechanics. It
//! never persists anything: sequencing, persistence and recovery decisions
//! belong to the caller.

pub mod types;

pub use types::{
    ConnectionState, ConnectionStatus, Credentials, Endpoint, MachinePeer, MachinePeers,
    ServerData,
};

use crate::config::{Allowlist, Dns};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetworkerError {
    #[error("VPN is already active")]
    AlreadyActive,
    #[error("VPN is not active")]
    NotActive,
    #[error("Failed to apply network change: {0}")]
    Failed(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, NetworkerError>;

/// Every call is blocking. Mutating calls report success or failure
/// independently; a failed call is expected to leave the live system as it
/// was before the call.
pub trait Networker: Send + Sync {
    /// Brings up a VPN session. Returns [`NetworkerError::AlreadyActive`]
    /// when a session is already up.
    fn start(
        &self,
        credentials: &Credentials,
        server: &ServerData,
        allowlist: &Allowlist,
        nameservers: &Dns,
    ) -> Result<()>;
    fn stop(&self) -> Result<()>;

    /// Applies nameservers whether or not a session is active.
    fn set_dns(&self, nameservers: &[String]) -> Result<()>;
    /// Reverts to the networker's own default resolvers, which need not match
    /// the default nameserver policy.
    fn unset_dns(&self) -> Result<()>;

    fn set_allowlist(&self, allowlist: &Allowlist) -> Result<()>;
    /// Leaves an empty allowlist behind.
    fn unset_allowlist(&self) -> Result<()>;

    fn set_kill_switch(&self, allowlist: &Allowlist) -> Result<()>;
    fn unset_kill_switch(&self) -> Result<()>;

    fn enable_firewall(&self) -> Result<()>;
    fn disable_firewall(&self) -> Result<()>;

    // No error channel: routing failures are logged or fatal inside the networker.
    fn enable_routing(&self);
    fn disable_routing(&self);

    fn permit_ipv6(&self) -> Result<()>;
    fn deny_ipv6(&self) -> Result<()>;

    fn set_lan_discovery_and_reset_mesh(&self, enabled: bool, peers: MachinePeers);
    fn set_lan_discovery(&self, enabled: bool);

    fn is_vpn_active(&self) -> bool;
    fn is_network_set(&self) -> bool;
    fn connection_status(&self) -> Result<ConnectionStatus>;
    fn last_server_name(&self) -> String;
}
