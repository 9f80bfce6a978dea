//! Listener configuration (`[listener]` in the config file).

use crate::error::{ListenerError, Result};
use scratch_sync_types::LISTENER_PORT;
use serde::Deserialize;
use std::net::SocketAddr;

/// Listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListenerConfig {
    /// Bind address (default: 0.0.0.0:8385).
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Run the listener in the background while pairing (default: true).
    #[serde(default = "default_enabled_during_pair")]
    pub enabled_during_pair: bool,
}

fn default_bind_address() -> String {
    format!("0.0.0.0:{}", LISTENER_PORT)
}

fn default_enabled_during_pair() -> bool {
    true
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            enabled_during_pair: default_enabled_during_pair(),
        }
    }
}

impl ListenerConfig {
    /// Same configuration on another port.
    pub fn with_port(mut self, port: u16) -> Result<Self> {
        let mut addr = self.socket_addr()?;
        addr.set_port(port);
        self.bind_address = addr.to_string();
        Ok(self)
    }

    /// The parsed bind address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let address = &self.bind_address;
        address
            .parse()
            .map_err(|e| ListenerError::Config(format!("bind_address {:?}: {}", address, e)))
    }
}
