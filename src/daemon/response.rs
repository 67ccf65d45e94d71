use crate::config::{Allowlist, Dns};
use crate::networker::{ConnectionStatus, Credentials, ServerData};
use serde::{Deserialize, Serialize};

/// Error codes shared by every setting command.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SetErrorCode {
    /// The networker failed to apply the change. Settings are untouched.
    Failure,
    /// Settings could not be read or saved. When returned after the
    /// networker succeeded, the live system no longer matches the settings.
    ConfigError,
    /// The requested value is already in effect.
    AlreadySet,
}

/// Structured command outcome. Every validation, no-op, networker and
/// settings failure is reported here rather than as an `Err`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "snake_case")]
pub enum Response<S> {
    Status(S),
    ErrorCode(SetErrorCode),
}

impl<S> Response<S> {
    pub fn is_error_code(&self) -> bool {
        matches!(self, Response::ErrorCode(_))
    }
}

impl<S> From<SetErrorCode> for Response<S> {
    fn from(code: SetErrorCode) -> Self {
        Response::ErrorCode(code)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SetDnsStatus {
    DnsConfigured,
    /// Custom nameservers were set and threat protection lite was turned off.
    DnsConfiguredTplReset,
    InvalidDnsAddress,
    TooManyValues,
}

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SetTplStatus {
    TplConfigured,
    /// Threat protection lite was enabled and custom nameservers were dropped.
    TplConfiguredDnsReset,
}

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SetAllowlistStatus {
    AllowlistConfigured,
    InvalidAllowlist,
}

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SetLanDiscoveryStatus {
    LanDiscoveryConfigured,
    /// LAN discovery was enabled and private subnets were removed from the
    /// allowlist.
    LanDiscoveryConfiguredAllowlistReset,
}

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SetStatus {
    Configured,
}

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectStatus {
    Connected,
    Disconnected,
}

pub type SetDnsResponse = Response<SetDnsStatus>;
pub type SetTplResponse = Response<SetTplStatus>;
pub type SetAllowlistResponse = Response<SetAllowlistStatus>;
pub type SetLanDiscoveryResponse = Response<SetLanDiscoveryStatus>;
pub type SetResponse = Response<SetStatus>;
pub type ConnectResponse = Response<ConnectStatus>;
pub type StatusResponse = Response<ConnectionStatus>;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Default, Debug)]
#[serde(default)]
pub struct SetDnsRequest {
    pub dns: Dns,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Default, Debug)]
#[serde(default)]
pub struct SetAllowlistRequest {
    pub allowlist: Allowlist,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct ConnectRequest {
    pub credentials: Credentials,
    pub server: ServerData,
}
