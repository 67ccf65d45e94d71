use super::{Response, Result, Rpc, SetErrorCode, SetResponse, SetStatus};
use crate::config::Settings;
use crate::networker::Networker;
use tracing::{debug, info, warn};

fn set_ipv6_permission(netw: &dyn Networker, enabled: bool) -> crate::networker::Result<()> {
    if enabled {
        netw.permit_ipv6()
    } else {
        netw.deny_ipv6()
    }
}

impl Rpc {
    /// Permits or denies IPv6 traffic. With default nameservers in use and
    /// the network up, the nameservers are refreshed to add or drop the IPv6
    /// pair.
    pub fn set_ipv6(&self, enabled: bool) -> Result<SetResponse> {
        let guard = self.lock_network()?;
        let settings = match self.load_settings("set_ipv6") {
            Ok(settings) => settings,
            Err(code) => return Ok(code.into()),
        };

        if settings.ipv6 == enabled {
            debug!(enabled, "IPv6 already set");
            return Ok(SetErrorCode::AlreadySet.into());
        }

        let current = &settings.auto_connect_data;
        let refresh_dns = !current.has_custom_dns() && self.dns_applies_live();
        let nameservers =
            self.effective_nameservers(&[], current.threat_protection_lite, enabled)?;

        let committed = self.apply_then_commit(
            &guard,
            "set_ipv6",
            |netw| {
                set_ipv6_permission(netw, enabled)?;
                if !refresh_dns {
                    return Ok(());
                }
                if let Err(e) = netw.set_dns(&nameservers) {
                    // Put the firewall back so the failure leaves no trace.
                    if let Err(revert) = set_ipv6_permission(netw, !enabled) {
                        warn!(error = %revert, "failed to revert IPv6 permission");
                    }
                    return Err(e);
                }
                Ok(())
            },
            Box::new(move |mut s: Settings| {
                s.ipv6 = enabled;
                s
            }),
        );

        match committed {
            Ok(_) => {
                info!(enabled, dns_refreshed = refresh_dns, "IPv6 configured");
                self.events.settings.ipv6.publish(enabled);
                Ok(Response::Status(SetStatus::Configured))
            }
            Err(e) => Ok(e.code().into()),
        }
    }
}
