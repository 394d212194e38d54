//! UDP transport.
//!
//! - [`Endpoint`]: remote host plus the send and receive ports
//! - [`DatagramSocket`]: shared tokio UDP socket
//! - [`DuplexTransport`]: sender loop draining a FIFO queue, receiver loop
//!   decoding datagrams into an [`InboundHandler`]
//!
//! ```text
//!   enqueue ──► [ FIFO ] ──► sender loop ──► remote:send_port
//!                                              (headset host)
//!   handler ◄── decode  ◄── receiver loop ◄── local:receive_port
//! ```

mod duplex;
mod endpoint;
mod socket;

pub use duplex::*;
pub use endpoint::*;
pub use socket::*;
