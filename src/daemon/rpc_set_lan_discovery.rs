use super::rpc_set_allowlist::apply_allowlist;
use super::{Response, Result, Rpc, SetErrorCode, SetLanDiscoveryResponse, SetLanDiscoveryStatus};
use crate::config::{Settings, Subnets};
use ipnetwork::IpNetwork;
use tracing::{debug, info};

fn is_lan_subnet(subnet: &IpNetwork) -> bool {
    match subnet {
        IpNetwork::V4(net) => net.ip().is_private() || net.ip().is_link_local(),
        IpNetwork::V6(net) => net.ip().is_unique_local() || net.ip().is_unicast_link_local(),
    }
}

/// Subnets that LAN discovery already lets through.
fn without_lan_subnets(subnets: &Subnets) -> Subnets {
    subnets.iter().filter(|s| !is_lan_subnet(s)).copied().collect()
}

impl Rpc {
    /// Toggles LAN discovery. Enabling it removes private subnets from the
    /// allowlist since they become reachable anyway, and with the kill switch
    /// on its exceptions shrink to match. With meshnet on, the mesh peer
    /// exceptions are rebuilt from the last known peers.
    pub fn set_lan_discovery(&self, enabled: bool) -> Result<SetLanDiscoveryResponse> {
        let guard = self.lock_network()?;
        let settings = match self.load_settings("set_lan_discovery") {
            Ok(settings) => settings,
            Err(code) => return Ok(code.into()),
        };

        if settings.lan_discovery == enabled {
            debug!(enabled, "LAN discovery already set");
            return Ok(SetErrorCode::AlreadySet.into());
        }

        let mut allowlist = settings.allowlist.clone();
        if enabled {
            allowlist.subnets = without_lan_subnets(&allowlist.subnets);
        }
        let allowlist_reset = allowlist != settings.allowlist;
        let peers = if settings.mesh {
            Some(self.mesh_peers()?)
        } else {
            None
        };

        let saved = allowlist.clone();
        let committed = self.apply_then_commit(
            &guard,
            "set_lan_discovery",
            |netw| {
                if allowlist_reset {
                    apply_allowlist(netw, &allowlist, &settings.allowlist, settings.kill_switch)?;
                }
                match peers {
                    Some(peers) => netw.set_lan_discovery_and_reset_mesh(enabled, peers),
                    None => netw.set_lan_discovery(enabled),
                }
                Ok(())
            },
            Box::new(move |mut s: Settings| {
                s.lan_discovery = enabled;
                s.allowlist = saved;
                s
            }),
        );

        match committed {
            Ok(_) => {
                info!(enabled, allowlist_reset, "LAN discovery configured");
                self.events.settings.lan_discovery.publish(enabled);
                Ok(Response::Status(if allowlist_reset {
                    SetLanDiscoveryStatus::LanDiscoveryConfiguredAllowlistReset
                } else {
                    SetLanDiscoveryStatus::LanDiscoveryConfigured
                }))
            }
            Err(e) => Ok(e.code().into()),
        }
    }
}
