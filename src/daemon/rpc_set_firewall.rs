use super::{Response, Result, Rpc, SetErrorCode, SetResponse, SetStatus};
use crate::config::Settings;
use tracing::{debug, info};

impl Rpc {
    pub fn set_firewall(&self, enabled: bool) -> Result<SetResponse> {
        let guard = self.lock_network()?;
        let settings = match self.load_settings("set_firewall") {
            Ok(settings) => settings,
            Err(code) => return Ok(code.into()),
        };

        if settings.firewall == enabled {
            debug!(enabled, "firewall already set");
            return Ok(SetErrorCode::AlreadySet.into());
        }

        let committed = self.apply_then_commit(
            &guard,
            "set_firewall",
            |netw| {
                if enabled {
                    netw.enable_firewall()
                } else {
                    netw.disable_firewall()
                }
            },
            Box::new(move |mut s: Settings| {
                s.firewall = enabled;
                s
            }),
        );

        match committed {
            Ok(_) => {
                info!(enabled, "firewall configured");
                self.events.settings.firewall.publish(enabled);
                Ok(Response::Status(SetStatus::Configured))
            }
            Err(e) => Ok(e.code().into()),
        }
    }

    /// Routing changes have no failure channel on the networker, so the only
    /// possible error is a settings one.
    pub fn set_routing(&self, enabled: bool) -> Result<SetResponse> {
        let guard = self.lock_network()?;
        let settings = match self.load_settings("set_routing") {
            Ok(settings) => settings,
            Err(code) => return Ok(code.into()),
        };

        if settings.routing == enabled {
            debug!(enabled, "routing already set");
            return Ok(SetErrorCode::AlreadySet.into());
        }

        let committed = self.apply_then_commit(
            &guard,
            "set_routing",
            |netw| {
                if enabled {
                    netw.enable_routing();
                } else {
                    netw.disable_routing();
                }
                Ok(())
            },
            Box::new(move |mut s: Settings| {
                s.routing = enabled;
                s
            }),
        );

        match committed {
            Ok(_) => {
                info!(enabled, "routing configured");
                self.events.settings.routing.publish(enabled);
                Ok(Response::Status(SetStatus::Configured))
            }
            Err(e) => Ok(e.code().into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigManager;
    use crate::events::{Events, SettingsEvents, Subject};
    use crate::test_helpers::{MockNetworker, memory_config};
    use std::sync::Arc;

    #[test]
    fn test_firewall_toggle() {
        let (_, cm) = memory_config();
        let netw = Arc::new(MockNetworker::new());
        let rpc = Rpc::builder()
            .config_manager(cm.clone())
            .networker(netw.clone())
            .build()
            .unwrap();

        // Firewall is on by default.
        assert_eq!(
            rpc.set_firewall(true).unwrap(),
            Response::ErrorCode(SetErrorCode::AlreadySet)
        );
        assert_eq!(
            rpc.set_firewall(false).unwrap(),
            Response::Status(SetStatus::Configured)
        );
        assert_eq!(netw.state().calls, vec!["disable_firewall"]);
        assert!(!cm.load().unwrap().firewall);
    }

    #[test]
    fn test_firewall_failure_keeps_settings() {
        let (_, cm) = memory_config();
        let rpc = Rpc::builder()
            .config_manager(cm.clone())
            .networker(Arc::new(MockNetworker::failing(&["disable_firewall"])))
            .build()
            .unwrap();

        assert_eq!(
            rpc.set_firewall(false).unwrap(),
            Response::ErrorCode(SetErrorCode::Failure)
        );
        assert!(cm.load().unwrap().firewall);
    }

    #[test]
    fn test_routing_toggle_publishes() {
        let (_, cm) = memory_config();
        let netw = Arc::new(MockNetworker::new());
        let routing: Arc<Subject<bool>> = Arc::new(Subject::new("routing"));
        let mut rx = routing.subscribe_channel();
        let events = Events {
            settings: SettingsEvents {
                routing: routing.clone(),
                ..SettingsEvents::new()
            },
            ..Events::new()
        };
        let rpc = Rpc::builder()
            .config_manager(cm.clone())
            .networker(netw.clone())
            .events(Arc::new(events))
            .build()
            .unwrap();

        assert_eq!(
            rpc.set_routing(false).unwrap(),
            Response::Status(SetStatus::Configured)
        );
        assert_eq!(netw.state().calls, vec!["disable_routing"]);
        assert!(!cm.load().unwrap().routing);
        assert!(!rx.try_recv().unwrap());
    }
}
