use super::{Response, Result, Rpc, SetErrorCode, SetTplResponse, SetTplStatus};
use crate::config::Settings;
use tracing::{debug, info};

impl Rpc {
    /// Turns threat protection lite on or off. Enabling it drops any custom
    /// nameservers. The new nameservers are pushed to the system only while
    /// the network is up; otherwise they are picked up on the next connect.
    pub fn set_threat_protection_lite(&self, enabled: bool) -> Result<SetTplResponse> {
        let guard = self.lock_network()?;
        let settings = match self.load_settings("set_threat_protection_lite") {
            Ok(settings) => settings,
            Err(code) => return Ok(code.into()),
        };

        let current = &settings.auto_connect_data;
        if current.threat_protection_lite == enabled {
            debug!(enabled, "threat protection lite already set");
            return Ok(SetErrorCode::AlreadySet.into());
        }

        let dns_reset = enabled && current.has_custom_dns();
        let custom = if enabled { Vec::new() } else { current.dns.clone() };
        let nameservers = self.effective_nameservers(&custom, enabled, settings.ipv6)?;
        let apply_live = self.dns_applies_live();

        let committed = self.apply_then_commit(
            &guard,
            "set_threat_protection_lite",
            |netw| {
                if apply_live {
                    netw.set_dns(&nameservers)
                } else {
                    Ok(())
                }
            },
            Box::new(move |mut s: Settings| {
                s.auto_connect_data.threat_protection_lite = enabled;
                s.auto_connect_data.dns = custom;
                s
            }),
        );

        match committed {
            Ok(_) => {
                info!(enabled, dns_reset, applied = apply_live, "threat protection lite configured");
                self.events.settings.threat_protection_lite.publish(enabled);
                Ok(Response::Status(if dns_reset {
                    SetTplStatus::TplConfiguredDnsReset
                } else {
                    SetTplStatus::TplConfigured
                }))
            }
            Err(e) => Ok(e.code().into()),
        }
    }
}
