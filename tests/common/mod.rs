use std::sync::Mutex;
use vpnctl_net::config::{Allowlist, Dns};
use vpnctl_net::networker::{
    ConnectionStatus, Credentials, MachinePeers, Networker, NetworkerError, Result, ServerData,
};

/// Networker that only remembers the last nameservers it was given.
#[derive(Default)]
pub struct DnsRecorder {
    pub dns: Mutex<Option<Vec<String>>>,
    pub fail_set_dns: bool,
}

impl DnsRecorder {
    pub fn applied(&self) -> Option<Vec<String>> {
        self.dns.lock().unwrap().clone()
    }
}

impl Networker for DnsRecorder {
    fn start(&self, _: &Credentials, _: &ServerData, _: &Allowlist, _: &Dns) -> Result<()> {
        Ok(())
    }
    fn stop(&self) -> Result<()> {
        Ok(())
    }
    fn set_dns(&self, nameservers: &[String]) -> Result<()> {
        if self.fail_set_dns {
            return Err(NetworkerError::Failed("failed to set dns".to_string()));
        }
        *self.dns.lock().unwrap() = Some(nameservers.to_vec());
        Ok(())
    }
    fn unset_dns(&self) -> Result<()> {
        Ok(())
    }
    fn set_allowlist(&self, _: &Allowlist) -> Result<()> {
        Ok(())
    }
    fn unset_allowlist(&self) -> Result<()> {
        Ok(())
    }
    fn set_kill_switch(&self, _: &Allowlist) -> Result<()> {
        Ok(())
    }
    fn unset_kill_switch(&self) -> Result<()> {
        Ok(())
    }
    fn enable_firewall(&self) -> Result<()> {
        Ok(())
    }
    fn disable_firewall(&self) -> Result<()> {
        Ok(())
    }
    fn enable_routing(&self) {}
    fn disable_routing(&self) {}
    fn permit_ipv6(&self) -> Result<()> {
        Ok(())
    }
    fn deny_ipv6(&self) -> Result<()> {
        Ok(())
    }
    fn set_lan_discovery_and_reset_mesh(&self, _: bool, _: MachinePeers) {}
    fn set_lan_discovery(&self, _: bool) {}
    fn is_vpn_active(&self) -> bool {
        false
    }
    fn is_network_set(&self) -> bool {
        false
    }
    fn connection_status(&self) -> Result<ConnectionStatus> {
        Ok(ConnectionStatus::default())
    }
    fn last_server_name(&self) -> String {
        String::new()
    }
}

pub fn strings(addrs: &[&str]) -> Vec<String> {
    addrs.iter().map(|a| a.to_string()).collect()
}
