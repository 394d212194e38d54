//! Remote endpoint addressing.

use std::net::{IpAddr, SocketAddr};

use tokio::net::lookup_host;

use crate::core::TransportError;

/// Where telemetry goes and where control messages arrive.
///
/// Immutable after construction; owned by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    remote_host: String,
    send_port: u16,
    receive_port: u16,
}

impl Endpoint {
    /// Describe an endpoint. Nothing is resolved yet.
    pub fn new(remote_host: impl Into<String>, send_port: u16, receive_port: u16) -> Self {
        Self {
            remote_host: remote_host.into(),
            send_port,
            receive_port,
        }
    }

    /// Host name or address literal of the headset host.
    pub fn remote_host(&self) -> &str {
        &self.remote_host
    }

    /// Remote port telemetry is sent to.
    pub fn send_port(&self) -> u16 {
        self.send_port
    }

    /// Local port control messages arrive on (0 = ephemeral).
    pub fn receive_port(&self) -> u16 {
        self.receive_port
    }

    /// Resolve the remote address, preferring the family of `local`.
    pub async fn resolve(&self, local: IpAddr) -> Result<SocketAddr, TransportError> {
        let unresolved = |reason: String| TransportError::UnresolvedAddress {
            host: self.remote_host.clone(),
            reason,
        };

        let candidates: Vec<SocketAddr> = lookup_host((self.remote_host.as_str(), self.send_port))
            .await
            .map_err(|e| unresolved(e.to_string()))?
            .collect();

        candidates
            .iter()
            .find(|addr| addr.is_ipv4() == local.is_ipv4())
            .or_else(|| candidates.first())
            .copied()
            .ok_or_else(|| unresolved("no addresses returned".to_string()))
    }
}
