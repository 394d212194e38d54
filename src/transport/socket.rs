//! Async UDP socket wrapper for the telemetry link.
//!
//! One socket is bound to the local receive port and shared by the sender
//! and receiver loops: telemetry leaves from the receive port so the host
//! can answer to the datagram's source address.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;

use crate::core::constants::DEFAULT_RECV_BUFFER_SIZE;

/// Shared UDP socket handle.
///
/// Cloning is cheap; all clones refer to the same OS socket, which closes
/// when the last clone is dropped.
#[derive(Debug, Clone)]
pub struct DatagramSocket {
    /// The underlying UDP socket.
    socket: Arc<UdpSocket>,
    /// Size of the buffer used by [`recv_buffer`](Self::recv_buffer).
    recv_buffer_size: usize,
}

impl DatagramSocket {
    /// Bind a socket to the given local address.
    pub async fn bind(addr: SocketAddr) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(Self::from_socket(socket))
    }

    /// Wrap an existing UDP socket.
    pub fn from_socket(socket: UdpSocket) -> Self {
        Self {
            socket: Arc::new(socket),
            recv_buffer_size: DEFAULT_RECV_BUFFER_SIZE,
        }
    }

    /// Set the receive buffer size. Longer datagrams are truncated.
    pub fn with_recv_buffer_size(mut self, size: usize) -> Self {
        self.recv_buffer_size = size.max(1);
        self
    }

    /// Allocate a receive buffer of the configured size.
    pub fn recv_buffer(&self) -> Vec<u8> {
        vec![0u8; self.recv_buffer_size]
    }

    /// Get the local address.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Send one datagram to `addr`.
    pub async fn send_to(&self, data: &[u8], addr: SocketAddr) -> io::Result<usize> {
        self.socket.send_to(data, addr).await
    }

    /// Receive one datagram into `buf`, returning its length and source.
    pub async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        self.socket.recv_from(buf).await
    }

    /// Get a reference to the underlying socket.
    pub fn inner(&self) -> &UdpSocket {
        &self.socket
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_socket_bind() {
        let socket = DatagramSocket::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let addr = socket.local_addr().unwrap();
        assert!(addr.port() != 0);
    }

    #[tokio::test]
    async fn test_clones_share_socket() {
        let server = DatagramSocket::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let server_addr = server.local_addr().unwrap();
        let client = DatagramSocket::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();

        client.send_to(b"LIGHT,1.0", server_addr).await.unwrap();

        let reader = server.clone();
        let mut buf = reader.recv_buffer();
        let (len, from) = reader.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..len], b"LIGHT,1.0");
        assert_eq!(from, client.local_addr().unwrap());
    }

    #[tokio::test]
    async fn test_recv_buffer_size() {
        let socket = DatagramSocket::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        assert_eq!(socket.recv_buffer().len(), DEFAULT_RECV_BUFFER_SIZE);

        let socket = socket.with_recv_buffer_size(64);
        assert_eq!(socket.recv_buffer().len(), 64);
        assert_eq!(socket.with_recv_buffer_size(0).recv_buffer().len(), 1);
    }
}
