use super::{Response, Result, Rpc, SetDnsRequest, SetDnsResponse, SetDnsStatus, SetErrorCode};
use crate::config::Settings;
use crate::dns::{DnsValidationError, validate_nameservers};
use crate::events::DataDns;
use tracing::{debug, info};

/// Outcome of resolving a DNS request against the current settings.
#[derive(Clone, PartialEq, Eq, Debug)]
pub(crate) struct DnsDecision {
    /// Applied to the system.
    pub nameservers: Vec<String>,
    /// Saved as the custom list; empty when the defaults are in use.
    pub persisted_dns: Vec<String>,
    pub threat_protection_lite: bool,
    pub tpl_reset: bool,
}

impl Rpc {
    pub(crate) fn decide_dns(&self, requested: Vec<String>, settings: &Settings) -> Result<DnsDecision> {
        let current = &settings.auto_connect_data;
        if requested.is_empty() {
            let nameservers = self.effective_nameservers(
                &[],
                current.threat_protection_lite,
                settings.ipv6,
            )?;
            return Ok(DnsDecision {
                nameservers,
                persisted_dns: Vec::new(),
                threat_protection_lite: current.threat_protection_lite,
                tpl_reset: false,
            });
        }

        // An explicit list overrides threat protection lite.
        Ok(DnsDecision {
            nameservers: requested.clone(),
            persisted_dns: requested,
            threat_protection_lite: false,
            tpl_reset: current.threat_protection_lite,
        })
    }

    /// Sets custom nameservers, or goes back to the defaults when the
    /// request is empty.
    pub fn set_dns(&self, request: SetDnsRequest) -> Result<SetDnsResponse> {
        let requested = request.dns;
        if let Err(e) = validate_nameservers(&requested) {
            debug!(error = %e, "rejecting DNS request");
            return Ok(Response::Status(match e {
                DnsValidationError::TooManyValues(_) => SetDnsStatus::TooManyValues,
                DnsValidationError::InvalidAddress(_) => SetDnsStatus::InvalidDnsAddress,
            }));
        }

        let guard = self.lock_network()?;
        let settings = match self.load_settings("set_dns") {
            Ok(settings) => settings,
            Err(code) => return Ok(code.into()),
        };

        if !requested.is_empty() && requested == settings.auto_connect_data.dns {
            debug!(nameservers = ?requested, "DNS already set");
            return Ok(SetErrorCode::AlreadySet.into());
        }

        let DnsDecision {
            nameservers,
            persisted_dns,
            threat_protection_lite,
            tpl_reset,
        } = self.decide_dns(requested, &settings)?;

        let committed = self.apply_then_commit(
            &guard,
            "set_dns",
            |netw| netw.set_dns(&nameservers),
            Box::new(move |mut s: Settings| {
                s.auto_connect_data.dns = persisted_dns;
                s.auto_connect_data.threat_protection_lite = threat_protection_lite;
                s
            }),
        );

        match committed {
            Ok(settings) => {
                info!(nameservers = ?nameservers, tpl_reset, "DNS configured");
                self.events.settings.dns.publish(DataDns {
                    nameservers,
                    settings,
                });
                Ok(Response::Status(if tpl_reset {
                    SetDnsStatus::DnsConfiguredTplReset
                } else {
                    SetDnsStatus::DnsConfigured
                }))
            }
            Err(e) => Ok(e.code().into()),
        }
    }
}
