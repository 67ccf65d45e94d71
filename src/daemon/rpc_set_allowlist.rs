use super::{
    Response, Result, Rpc, SetAllowlistRequest, SetAllowlistResponse, SetAllowlistStatus,
    SetErrorCode,
};
use crate::config::{Allowlist, Settings};
use crate::events::DataAllowlist;
use crate::networker::{self, Networker};
use tracing::{debug, info, warn};

/// Port 0 is never valid and subnets must not have host bits set.
fn is_valid_allowlist(allowlist: &Allowlist) -> bool {
    let ports_ok = !allowlist.ports.tcp.contains(&0) && !allowlist.ports.udp.contains(&0);
    let subnets_ok = allowlist
        .subnets
        .iter()
        .all(|subnet| subnet.network() == subnet.ip());
    ports_ok && subnets_ok
}

fn replace_allowlist(netw: &dyn Networker, allowlist: &Allowlist) -> networker::Result<()> {
    if allowlist.is_empty() {
        netw.unset_allowlist()
    } else {
        netw.set_allowlist(allowlist)
    }
}

/// Puts `allowlist` on the system and, with the kill switch on, makes the
/// kill switch exceptions follow it. If the kill switch rejects the new
/// exceptions, `previous` is put back so the system is left as it was.
pub(super) fn apply_allowlist(
    netw: &dyn Networker,
    allowlist: &Allowlist,
    previous: &Allowlist,
    kill_switch: bool,
) -> networker::Result<()> {
    replace_allowlist(netw, allowlist)?;
    if !kill_switch {
        return Ok(());
    }
    if let Err(e) = netw.set_kill_switch(allowlist) {
        if let Err(revert) = replace_allowlist(netw, previous) {
            warn!(error = %revert, "failed to restore previous allowlist");
        }
        return Err(e);
    }
    Ok(())
}

impl Rpc {
    /// Replaces the allowlist. An empty allowlist unsets it on the system.
    /// With the kill switch on, the kill switch exceptions follow the new
    /// allowlist.
    pub fn set_allowlist(&self, request: SetAllowlistRequest) -> Result<SetAllowlistResponse> {
        let allowlist = request.allowlist;
        if !is_valid_allowlist(&allowlist) {
            debug!(?allowlist, "rejecting allowlist");
            return Ok(Response::Status(SetAllowlistStatus::InvalidAllowlist));
        }

        let guard = self.lock_network()?;
        let settings = match self.load_settings("set_allowlist") {
            Ok(settings) => settings,
            Err(code) => return Ok(code.into()),
        };

        if settings.allowlist == allowlist {
            debug!("allowlist already set");
            return Ok(SetErrorCode::AlreadySet.into());
        }

        let kill_switch = settings.kill_switch;
        let saved = allowlist.clone();
        let committed = self.apply_then_commit(
            &guard,
            "set_allowlist",
            |netw| apply_allowlist(netw, &allowlist, &settings.allowlist, kill_switch),
            Box::new(move |mut s: Settings| {
                s.allowlist = saved;
                s
            }),
        );

        match committed {
            Ok(settings) => {
                info!(
                    tcp = settings.allowlist.ports.tcp.len(),
                    udp = settings.allowlist.ports.udp.len(),
                    subnets = settings.allowlist.subnets.len(),
                    "allowlist configured"
                );
                self.events.settings.allowlist.publish(DataAllowlist {
                    allowlist: settings.allowlist,
                });
                Ok(Response::Status(SetAllowlistStatus::AllowlistConfigured))
            }
            Err(e) => Ok(e.code().into()),
        }
    }

    pub fn unset_allowlist(&self) -> Result<SetAllowlistResponse> {
        self.set_allowlist(SetAllowlistRequest {
            allowlist: Allowlist::new(),
        })
    }
}
