use super::{Response, Result, Rpc, SetErrorCode, SetResponse, SetStatus};
use crate::config::Settings;
use tracing::{debug, info};

impl Rpc {
    pub fn set_kill_switch(&self, enabled: bool) -> Result<SetResponse> {
        let guard = self.lock_network()?;
        let settings = match self.load_settings("set_kill_switch") {
            Ok(settings) => settings,
            Err(code) => return Ok(code.into()),
        };

        if settings.kill_switch == enabled {
            debug!(enabled, "kill switch already set");
            return Ok(SetErrorCode::AlreadySet.into());
        }

        let committed = self.apply_then_commit(
            &guard,
            "set_kill_switch",
            |netw| {
                if enabled {
                    netw.set_kill_switch(&settings.allowlist)
                } else {
                    netw.unset_kill_switch()
                }
            },
            Box::new(move |mut s: Settings| {
                s.kill_switch = enabled;
                s
            }),
        );

        match committed {
            Ok(_) => {
                info!(enabled, "kill switch configured");
                self.events.settings.kill_switch.publish(enabled);
                Ok(Response::Status(SetStatus::Configured))
            }
            Err(e) => Ok(e.code().into()),
        }
    }
}
