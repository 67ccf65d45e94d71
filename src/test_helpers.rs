//! Test doubles for the daemon contracts.

use crate::config::{Allowlist, Dns, FilesystemConfigManager, MemoryFilesystem, Settings};
use crate::events::{Handler, Publisher, Subscriber};
use crate::networker::{
    ConnectionState, ConnectionStatus, Credentials, MachinePeers, Networker, NetworkerError,
    Result, ServerData,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

#[derive(Default, Debug)]
pub struct MockState {
    pub dns: Option<Vec<String>>,
    pub allowlist: Allowlist,
    pub kill_switch: bool,
    pub firewall: bool,
    pub routing: bool,
    pub ipv6_permitted: bool,
    pub lan_discovery: bool,
    pub mesh_peers: MachinePeers,
    pub vpn_active: bool,
    pub network_set: bool,
    pub last_server: String,
    pub calls: Vec<&'static str>,
    pub failing: HashSet<&'static str>,
}

/// Records every call; calls named in `failing` return an error and leave
/// the state alone.
#[derive(Default)]
pub struct MockNetworker {
    state: Mutex<MockState>,
}

impl MockNetworker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(calls: &[&'static str]) -> Self {
        let mock = Self::new();
        mock.state().failing.extend(calls.iter().copied());
        mock
    }

    pub fn connected() -> Self {
        let mock = Self::new();
        mock.state().vpn_active = true;
        mock
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    fn call(&self, name: &'static str, apply: impl FnOnce(&mut MockState)) -> Result<()> {
        let mut state = self.state();
        state.calls.push(name);
        if state.failing.contains(name) {
            return Err(NetworkerError::Failed(format!("failed to {name}")));
        }
        apply(&mut state);
        Ok(())
    }
}

impl Networker for MockNetworker {
    fn start(
        &self,
        _credentials: &Credentials,
        server: &ServerData,
        allowlist: &Allowlist,
        nameservers: &Dns,
    ) -> Result<()> {
        if self.state().vpn_active {
            return Err(NetworkerError::AlreadyActive);
        }
        self.call("start", |s| {
            s.vpn_active = true;
            s.network_set = true;
            s.last_server = server.name.clone();
            s.allowlist = allowlist.clone();
            s.dns = Some(nameservers.clone());
        })
    }

    fn stop(&self) -> Result<()> {
        self.call("stop", |s| {
            s.vpn_active = false;
            s.network_set = false;
        })
    }

    fn set_dns(&self, nameservers: &[String]) -> Result<()> {
        self.call("set_dns", |s| s.dns = Some(nameservers.to_vec()))
    }

    fn unset_dns(&self) -> Result<()> {
        self.call("unset_dns", |s| s.dns = None)
    }

    fn set_allowlist(&self, allowlist: &Allowlist) -> Result<()> {
        self.call("set_allowlist", |s| s.allowlist = allowlist.clone())
    }

    fn unset_allowlist(&self) -> Result<()> {
        self.call("unset_allowlist", |s| s.allowlist.clear())
    }

    fn set_kill_switch(&self, allowlist: &Allowlist) -> Result<()> {
        self.call("set_kill_switch", |s| {
            s.kill_switch = true;
            s.allowlist = allowlist.clone();
        })
    }

    fn unset_kill_switch(&self) -> Result<()> {
        self.call("unset_kill_switch", |s| s.kill_switch = false)
    }

    fn enable_firewall(&self) -> Result<()> {
        self.call("enable_firewall", |s| s.firewall = true)
    }

    fn disable_firewall(&self) -> Result<()> {
        self.call("disable_firewall", |s| s.firewall = false)
    }

    fn enable_routing(&self) {
        let _ = self.call("enable_routing", |s| s.routing = true);
    }

    fn disable_routing(&self) {
        let _ = self.call("disable_routing", |s| s.routing = false);
    }

    fn permit_ipv6(&self) -> Result<()> {
        self.call("permit_ipv6", |s| s.ipv6_permitted = true)
    }

    fn deny_ipv6(&self) -> Result<()> {
        self.call("deny_ipv6", |s| s.ipv6_permitted = false)
    }

    fn set_lan_discovery_and_reset_mesh(&self, enabled: bool, peers: MachinePeers) {
        let _ = self.call("set_lan_discovery_and_reset_mesh", |s| {
            s.lan_discovery = enabled;
            s.mesh_peers = peers;
        });
    }

    fn set_lan_discovery(&self, enabled: bool) {
        let _ = self.call("set_lan_discovery", |s| s.lan_discovery = enabled);
    }

    fn is_vpn_active(&self) -> bool {
        self.state().vpn_active
    }

    fn is_network_set(&self) -> bool {
        self.state().network_set
    }

    fn connection_status(&self) -> Result<ConnectionStatus> {
        let state = self.state();
        if state.failing.contains("connection_status") {
            return Err(NetworkerError::Failed("no status".to_string()));
        }
        Ok(ConnectionStatus {
            state: if state.vpn_active {
                ConnectionState::Connected
            } else {
                ConnectionState::Disconnected
            },
            server_name: state.last_server.clone(),
            server_ip: None,
        })
    }

    fn last_server_name(&self) -> String {
        self.state().last_server.clone()
    }
}

pub struct RecordingPublisher<T> {
    pub messages: Mutex<Vec<T>>,
}

impl<T> RecordingPublisher<T> {
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
        }
    }
}

impl<T: Clone> RecordingPublisher<T> {
    pub fn published(&self) -> Vec<T> {
        self.messages.lock().unwrap().clone()
    }
}

impl<T: Send> Publisher<T> for RecordingPublisher<T> {
    fn publish(&self, message: T) {
        self.messages.lock().unwrap().push(message);
    }
}

impl<T: Send> Subscriber<T> for RecordingPublisher<T> {
    fn subscribe(&self, _handler: Handler<T>) {}
}

pub fn memory_config() -> (Arc<MemoryFilesystem>, Arc<FilesystemConfigManager>) {
    let fs = Arc::new(MemoryFilesystem::new());
    let cm = Arc::new(FilesystemConfigManager::new(
        "/location/settings.jsonc",
        fs.clone(),
    ));
    (fs, cm)
}

pub fn seed(cm: &FilesystemConfigManager, settings: Settings) {
    use crate::config::ConfigManager;
    cm.save_with(Box::new(move |_: Settings| settings)).unwrap();
}

pub fn dns(addrs: &[&str]) -> Vec<String> {
    addrs.iter().map(|a| a.to_string()).collect()
}
