use super::{
    ConnectRequest, ConnectResponse, ConnectStatus, Response, Result, Rpc, SetErrorCode,
    StatusResponse,
};
use crate::events::DataConnect;
use crate::networker::NetworkerError;
use tracing::{debug, info, warn};

impl Rpc {
    /// Brings up a session with the saved allowlist and the nameservers the
    /// current settings call for. Nothing is saved.
    pub fn connect(&self, request: ConnectRequest) -> Result<ConnectResponse> {
        let _guard = self.lock_network()?;
        if self.netw.is_vpn_active() {
            debug!("already connected");
            return Ok(SetErrorCode::AlreadySet.into());
        }

        let settings = match self.load_settings("connect") {
            Ok(settings) => settings,
            Err(code) => return Ok(code.into()),
        };

        let ConnectRequest {
            credentials,
            server,
        } = request;
        // The endpoint has to be known before picking nameservers.
        let previous = self.endpoint()?;
        self.set_endpoint(Some(server.endpoint.clone()))?;

        let current = &settings.auto_connect_data;
        let nameservers = match self.effective_nameservers(
            &current.dns,
            current.threat_protection_lite,
            settings.ipv6,
        ) {
            Ok(nameservers) => nameservers,
            Err(e) => {
                self.set_endpoint(previous)?;
                return Err(e);
            }
        };

        match self
            .netw
            .start(&credentials, &server, &settings.allowlist, &nameservers)
        {
            Ok(()) => {
                info!(server = %server.name, nameservers = ?nameservers, "connected");
                self.events.service.connect.publish(DataConnect {
                    server_name: server.name,
                    nameservers,
                });
                Ok(Response::Status(ConnectStatus::Connected))
            }
            Err(e) => {
                warn!(server = %server.name, error = %e, "failed to connect");
                self.set_endpoint(previous)?;
                Ok(match e {
                    NetworkerError::AlreadyActive => SetErrorCode::AlreadySet,
                    _ => SetErrorCode::Failure,
                }
                .into())
            }
        }
    }

    /// Tears the session down and reverts the system network changes.
    pub fn disconnect(&self) -> Result<ConnectResponse> {
        let _guard = self.lock_network()?;
        if !self.netw.is_vpn_active() {
            debug!("not connected");
            return Ok(SetErrorCode::AlreadySet.into());
        }

        let server = self.netw.last_server_name();
        if let Err(e) = self.netw.stop() {
            warn!(server = %server, error = %e, "failed to disconnect");
            return Ok(SetErrorCode::Failure.into());
        }

        self.set_endpoint(None)?;
        info!(server = %server, "disconnected");
        self.events.service.disconnect.publish(server);
        Ok(Response::Status(ConnectStatus::Disconnected))
    }

    pub fn status(&self) -> Result<StatusResponse> {
        match self.netw.connection_status() {
            Ok(status) => Ok(Response::Status(status)),
            Err(e) => {
                warn!(error = %e, "failed to query connection status");
                Ok(SetErrorCode::Failure.into())
            }
        }
    }
}
