//! Network state control plane of a VPN client daemon.
//!
//! [`daemon::Rpc`] turns setting requests into changes on the live system
//! through a [`networker::Networker`], keeps the saved
//! [`config::Settings`] in agreement with what was applied and announces
//! every committed change through [`events`].

pub mod config;
pub mod daemon;
pub mod dns;
pub mod events;
pub mod networker;

#[cfg(test)]
mod test_helpers;

pub use daemon::{Rpc, RpcBuilder, RpcError};
