//! Network-mutating commands.
//!
//! Every setting command follows the same protocol:
//!
//! 1. validate the request without touching anything,
//! 2. take the network lock and load the current settings,
//! 3. apply the change through the [`Networker`],
//! 4. commit the new settings through [`ConfigManager::save_with`],
//! 5. publish an event while still holding the lock.
//!
//! A failure in step 3 leaves the settings untouched and is reported as
//! [`SetErrorCode::Failure`]. A failure in step 4 happens after the system
//! has changed; it is reported as [`SetErrorCode::ConfigError`] and is not
//! rolled back.

mod response;
mod rpc_connect;
mod rpc_set_allowlist;
mod rpc_set_dns;
mod rpc_set_firewall;
mod rpc_set_ipv6;
mod rpc_set_kill_switch;
mod rpc_set_lan_discovery;
mod rpc_set_tpl;

pub use response::{
    ConnectRequest, ConnectResponse, ConnectStatus, Response, SetAllowlistRequest,
    SetAllowlistResponse, SetAllowlistStatus, SetDnsRequest, SetDnsResponse, SetDnsStatus,
    SetErrorCode, SetLanDiscoveryResponse, SetLanDiscoveryStatus, SetResponse, SetStatus,
    SetTplResponse, SetTplStatus, StatusResponse,
};

use crate::config::{ConfigError, ConfigManager, Settings, Transform};
use crate::dns::{DnsGetter, NameServers, resolve};
use crate::events::Events;
use crate::networker::{self, Endpoint, MachinePeers, Networker, NetworkerError};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use thiserror::Error;
use tracing::{debug, error, warn};

/// Faults that cannot be expressed as a [`Response`]. These escalate to the
/// transport.
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("missing dependency: {0}")]
    MissingDependency(&'static str),
    #[error("{0} lock poisoned")]
    Poisoned(&'static str),
    #[error("invariant violated: {0}")]
    Invariant(String),
}

pub type Result<T> = std::result::Result<T, RpcError>;

/// Proof that the caller holds the network lock.
pub(crate) struct NetworkGuard<'a>(#[allow(dead_code)] MutexGuard<'a, ()>);

/// Where the apply-then-commit protocol stopped.
#[derive(Error, Debug)]
pub(crate) enum ApplyError {
    /// Nothing changed on the system and nothing was saved.
    #[error("networker rejected the change: {0}")]
    Apply(#[source] NetworkerError),
    /// The system changed but the settings were not saved.
    #[error("change is applied but settings were not saved: {0}")]
    Commit(#[source] ConfigError),
}

impl ApplyError {
    pub(crate) fn code(&self) -> SetErrorCode {
        match self {
            ApplyError::Apply(_) => SetErrorCode::Failure,
            ApplyError::Commit(_) => SetErrorCode::ConfigError,
        }
    }
}

pub struct Rpc {
    cm: Arc<dyn ConfigManager>,
    netw: Arc<dyn Networker>,
    nameservers: Arc<dyn DnsGetter>,
    events: Arc<Events>,
    endpoint: RwLock<Option<Endpoint>>,
    mesh_peers: RwLock<MachinePeers>,
    network_lock: Mutex<()>,
}

#[derive(Default)]
pub struct RpcBuilder {
    cm: Option<Arc<dyn ConfigManager>>,
    netw: Option<Arc<dyn Networker>>,
    nameservers: Option<Arc<dyn DnsGetter>>,
    events: Option<Arc<Events>>,
    endpoint: Option<Endpoint>,
}

impl RpcBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config_manager(mut self, cm: Arc<dyn ConfigManager>) -> Self {
        self.cm = Some(cm);
        self
    }

    pub fn networker(mut self, netw: Arc<dyn Networker>) -> Self {
        self.netw = Some(netw);
        self
    }

    pub fn nameservers(mut self, nameservers: Arc<dyn DnsGetter>) -> Self {
        self.nameservers = Some(nameservers);
        self
    }

    pub fn events(mut self, events: Arc<Events>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Fails when the config manager or the networker was not provided.
    /// Nameservers and events fall back to the defaults.
    pub fn build(self) -> Result<Rpc> {
        let cm = self.cm.ok_or(RpcError::MissingDependency("config manager"))?;
        let netw = self.netw.ok_or(RpcError::MissingDependency("networker"))?;
        Ok(Rpc {
            cm,
            netw,
            nameservers: self
                .nameservers
                .unwrap_or_else(|| Arc::new(NameServers::new())),
            events: self.events.unwrap_or_default(),
            endpoint: RwLock::new(self.endpoint),
            mesh_peers: RwLock::new(MachinePeers::new()),
            network_lock: Mutex::new(()),
        })
    }
}

impl Rpc {
    pub fn builder() -> RpcBuilder {
        RpcBuilder::new()
    }

    pub fn events(&self) -> &Arc<Events> {
        &self.events
    }

    pub fn set_endpoint(&self, endpoint: Option<Endpoint>) -> Result<()> {
        *self.endpoint.write().map_err(|_| RpcError::Poisoned("endpoint"))? = endpoint;
        Ok(())
    }

    pub fn endpoint(&self) -> Result<Option<Endpoint>> {
        Ok(self
            .endpoint
            .read()
            .map_err(|_| RpcError::Poisoned("endpoint"))?
            .clone())
    }

    /// Peers reported by the meshnet registry; used when LAN discovery is
    /// toggled with meshnet on.
    pub fn set_mesh_peers(&self, peers: MachinePeers) -> Result<()> {
        *self
            .mesh_peers
            .write()
            .map_err(|_| RpcError::Poisoned("mesh peers"))? = peers;
        Ok(())
    }

    fn mesh_peers(&self) -> Result<MachinePeers> {
        Ok(self
            .mesh_peers
            .read()
            .map_err(|_| RpcError::Poisoned("mesh peers"))?
            .clone())
    }

    /// Serializes mutating access to the networker. Overlapping commands
    /// queue here.
    pub(crate) fn lock_network(&self) -> Result<NetworkGuard<'_>> {
        self.network_lock
            .lock()
            .map(NetworkGuard)
            .map_err(|_| {
                error!("network lock poisoned");
                RpcError::Poisoned("network")
            })
    }

    pub(crate) fn load_settings(
        &self,
        command: &'static str,
    ) -> std::result::Result<Settings, SetErrorCode> {
        self.cm.load().map_err(|e| {
            warn!(command, error = %e, "failed to load settings");
            SetErrorCode::ConfigError
        })
    }

    /// IPv6 default nameservers are offered only when IPv6 is on and the
    /// current server, if any, can carry IPv6.
    fn ipv6_nameservers_allowed(&self, ipv6: bool) -> Result<bool> {
        if !ipv6 {
            return Ok(false);
        }
        let allowed = self
            .endpoint()?
            .is_none_or(|endpoint| endpoint.supports_ipv6());
        if !allowed {
            debug!("IPv6 enabled but the current endpoint is IPv4 only");
        }
        Ok(allowed)
    }

    pub(crate) fn effective_nameservers(
        &self,
        custom: &[String],
        threat_protection_lite: bool,
        ipv6: bool,
    ) -> Result<Vec<String>> {
        let ipv6 = self.ipv6_nameservers_allowed(ipv6)?;
        let nameservers = resolve(self.nameservers.as_ref(), custom, threat_protection_lite, ipv6);
        if nameservers.is_empty() {
            error!("nameserver policy produced an empty list");
            return Err(RpcError::Invariant(
                "nameserver policy produced an empty list".to_string(),
            ));
        }
        Ok(nameservers)
    }

    pub(crate) fn dns_applies_live(&self) -> bool {
        self.netw.is_vpn_active() || self.netw.is_network_set()
    }

    /// Applies a change to the system and then commits the matching settings.
    ///
    /// The settings are only written after `apply` succeeded.
    pub(crate) fn apply_then_commit(
        &self,
        _guard: &NetworkGuard<'_>,
        command: &'static str,
        apply: impl FnOnce(&dyn Networker) -> networker::Result<()>,
        transform: Transform<'_>,
    ) -> std::result::Result<Settings, ApplyError> {
        let outcome = apply(self.netw.as_ref())
            .map_err(ApplyError::Apply)
            .and_then(|()| self.cm.save_with(transform).map_err(ApplyError::Commit));
        if let Err(e) = &outcome {
            warn!(command, error = %e, code = ?e.code(), "command did not complete");
        }
        outcome
    }
}
