//! Fire-and-forget notifications about committed settings changes.
//!
//! Subjects are backed by a `tokio::sync::broadcast` channel: publishing
//! never waits for observers, and every observer sees events in publish
//! order.

use crate::config::{Allowlist, Settings};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

const CHANNEL_CAPACITY: usize = 64;

pub type Handler<T> = Box<dyn FnMut(T) + Send + 'static>;

pub trait Publisher<T>: Send + Sync {
    fn publish(&self, message: T);
}

pub trait Subscriber<T>: Send + Sync {
    fn subscribe(&self, handler: Handler<T>);
}

pub trait PublishSubscriber<T>: Publisher<T> + Subscriber<T> {}

impl<T, S> PublishSubscriber<T> for S where S: Publisher<T> + Subscriber<T> {}

pub struct Subject<T> {
    name: &'static str,
    tx: broadcast::Sender<T>,
}

impl<T: Clone + Send + 'static> Subject<T> {
    pub fn new(name: &'static str) -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { name, tx }
    }

    /// Receiver for async observers.
    pub fn subscribe_channel(&self) -> broadcast::Receiver<T> {
        self.tx.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl<T: Clone + Send + 'static> Publisher<T> for Subject<T> {
    fn publish(&self, message: T) {
        if self.tx.send(message).is_err() {
            debug!(subject = self.name, "no subscribers for event");
        }
    }
}

impl<T: Clone + Send + 'static> Subscriber<T> for Subject<T> {
    /// Runs `handler` on a dedicated thread for every published event.
    fn subscribe(&self, mut handler: Handler<T>) {
        let mut rx = self.tx.subscribe();
        let name = self.name;
        let spawned = std::thread::Builder::new()
            .name(format!("events-{name}"))
            .spawn(move || {
                loop {
                    match rx.blocking_recv() {
                        Ok(message) => handler(message),
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(subject = name, skipped, "event subscriber lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            });
        if let Err(e) = spawned {
            error!(subject = name, error = %e, "failed to start event subscriber");
        }
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Debug)]
pub struct DataDns {
    /// Nameservers applied to the system.
    pub nameservers: Vec<String>,
    /// Settings as committed.
    pub settings: Settings,
}

#[derive(Clone, PartialEq, Eq, Serialize, Debug)]
pub struct DataAllowlist {
    pub allowlist: Allowlist,
}

#[derive(Clone, PartialEq, Eq, Serialize, Debug)]
pub struct DataConnect {
    pub server_name: String,
    pub nameservers: Vec<String>,
}

pub struct SettingsEvents {
    pub dns: Arc<dyn PublishSubscriber<DataDns>>,
    pub threat_protection_lite: Arc<dyn PublishSubscriber<bool>>,
    pub ipv6: Arc<dyn PublishSubscriber<bool>>,
    pub allowlist: Arc<dyn PublishSubscriber<DataAllowlist>>,
    pub kill_switch: Arc<dyn PublishSubscriber<bool>>,
    pub firewall: Arc<dyn PublishSubscriber<bool>>,
    pub routing: Arc<dyn PublishSubscriber<bool>>,
    pub lan_discovery: Arc<dyn PublishSubscriber<bool>>,
}

impl SettingsEvents {
    pub fn new() -> Self {
        Self {
            dns: Arc::new(Subject::new("dns")),
            threat_protection_lite: Arc::new(Subject::new("threat_protection_lite")),
            ipv6: Arc::new(Subject::new("ipv6")),
            allowlist: Arc::new(Subject::new("allowlist")),
            kill_switch: Arc::new(Subject::new("kill_switch")),
            firewall: Arc::new(Subject::new("firewall")),
            routing: Arc::new(Subject::new("routing")),
            lan_discovery: Arc::new(Subject::new("lan_discovery")),
        }
    }
}

impl Default for SettingsEvents {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ServiceEvents {
    pub connect: Arc<dyn PublishSubscriber<DataConnect>>,
    pub disconnect: Arc<dyn PublishSubscriber<String>>,
}

impl ServiceEvents {
    pub fn new() -> Self {
        Self {
            connect: Arc::new(Subject::new("connect")),
            disconnect: Arc::new(Subject::new("disconnect")),
        }
    }
}

impl Default for ServiceEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
pub struct Events {
    pub settings: SettingsEvents,
    pub service: ServiceEvents,
}

impl Events {
    pub fn new() -> Self {
        Self::default()
    }
}
