//! Full-duplex datagram transport.
//!
//! Owns one socket and two background tasks:
//!
//! - the **sender loop** drains a FIFO queue of [`OutboundFrame`]s and
//!   transmits each as one datagram to the remote endpoint;
//! - the **receiver loop** reads datagrams on the local receive port, decodes
//!   them and hands each [`InboundFrame`] to an [`InboundHandler`].
//!
//! Enqueueing never blocks. A read failure stops both loops; a send failure
//! drops that one frame and the loop carries on.

use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, trace, warn};

use crate::codec::{InboundFrame, OutboundFrame, decode_datagram};
use crate::core::TransportError;
use crate::core::constants::DEFAULT_RECV_BUFFER_SIZE;

use super::{DatagramSocket, Endpoint};

/// Receives every well-formed inbound frame.
///
/// Called on the receiver task, one frame at a time in arrival order.
/// `outbound` lets the handler queue replies.
pub trait InboundHandler: Send + Sync + 'static {
    /// Handle one decoded frame.
    fn on_frame(&self, frame: InboundFrame, outbound: &FrameSender);
}

impl<F> InboundHandler for F
where
    F: Fn(InboundFrame, &FrameSender) + Send + Sync + 'static,
{
    fn on_frame(&self, frame: InboundFrame, outbound: &FrameSender) {
        self(frame, outbound)
    }
}

/// Socket options for [`DuplexTransport::open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportOptions {
    /// Local address the receive port is bound on.
    pub bind_address: IpAddr,
    /// Maximum inbound datagram size; longer datagrams are truncated.
    pub recv_buffer_size: usize,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            recv_buffer_size: DEFAULT_RECV_BUFFER_SIZE,
        }
    }
}

/// Snapshot of transport counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportStats {
    /// Datagrams written to the socket.
    pub frames_sent: u64,
    /// Frames that failed to send and were dropped.
    pub send_errors: u64,
    /// Well-formed frames handed to the inbound handler.
    pub frames_received: u64,
    /// Datagrams discarded as malformed.
    pub malformed: u64,
}

/// Running flag, shutdown signal and counters shared by the handle and
/// both loops.
#[derive(Debug)]
struct Lifecycle {
    running: AtomicBool,
    shutdown: watch::Sender<bool>,
    frames_sent: AtomicU64,
    send_errors: AtomicU64,
    frames_received: AtomicU64,
    malformed: AtomicU64,
}

impl Lifecycle {
    fn new() -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            running: AtomicBool::new(true),
            shutdown,
            frames_sent: AtomicU64::new(0),
            send_errors: AtomicU64::new(0),
            frames_received: AtomicU64::new(0),
            malformed: AtomicU64::new(0),
        }
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Returns true if this call performed the transition.
    fn stop(&self) -> bool {
        let was_running = self.running.swap(false, Ordering::AcqRel);
        self.shutdown.send_replace(true);
        was_running
    }

    fn stats(&self) -> TransportStats {
        TransportStats {
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
            send_errors: self.send_errors.load(Ordering::Relaxed),
            frames_received: self.frames_received.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
        }
    }
}

/// Cloneable handle for queueing outbound frames.
#[derive(Debug, Clone)]
pub struct FrameSender {
    tx: mpsc::UnboundedSender<OutboundFrame>,
    lifecycle: Arc<Lifecycle>,
}

impl FrameSender {
    /// Queue a frame for transmission. Never blocks.
    ///
    /// Returns false (and drops the frame) once the transport has stopped.
    pub fn enqueue(&self, frame: OutboundFrame) -> bool {
        if !self.lifecycle.is_running() {
            trace!(kind = %frame.kind(), "transport stopped, dropping frame");
            return false;
        }
        self.tx.send(frame).is_ok()
    }

    /// Whether the owning transport is still running.
    pub fn is_running(&self) -> bool {
        self.lifecycle.is_running()
    }
}

/// A bound socket plus its sender and receiver loops.
///
/// Dropping the transport signals both loops to stop.
#[derive(Debug)]
pub struct DuplexTransport {
    endpoint: Endpoint,
    remote_addr: SocketAddr,
    local_addr: SocketAddr,
    sender: FrameSender,
    lifecycle: Arc<Lifecycle>,
    tasks: Vec<JoinHandle<()>>,
}

impl DuplexTransport {
    /// Resolve the remote address, bind the receive port and start both
    /// loops.
    ///
    /// Must be called within a tokio runtime.
    pub async fn open(
        endpoint: Endpoint,
        options: TransportOptions,
        handler: Arc<dyn InboundHandler>,
    ) -> Result<Self, TransportError> {
        let remote_addr = endpoint.resolve(options.bind_address).await?;

        let bind_addr = SocketAddr::new(options.bind_address, endpoint.receive_port());
        let socket = DatagramSocket::bind(bind_addr)
            .await
            .map_err(|source| TransportError::BindFailed {
                addr: bind_addr,
                source,
            })?
            .with_recv_buffer_size(options.recv_buffer_size);
        let local_addr = socket.local_addr().unwrap_or(bind_addr);

        let transport = Self::start(
            endpoint,
            remote_addr,
            local_addr,
            socket.clone(),
            socket,
            handler,
        );
        debug!(
            remote = %remote_addr,
            local = %local_addr,
            "transport open"
        );
        Ok(transport)
    }

    /// Spawn both loops. `source` feeds the receiver, `socket` the sender.
    fn start<R: DatagramSource>(
        endpoint: Endpoint,
        remote_addr: SocketAddr,
        local_addr: SocketAddr,
        socket: DatagramSocket,
        source: R,
        handler: Arc<dyn InboundHandler>,
    ) -> Self {
        let lifecycle = Arc::new(Lifecycle::new());
        let (tx, rx) = mpsc::unbounded_channel();
        let sender = FrameSender {
            tx,
            lifecycle: Arc::clone(&lifecycle),
        };

        let send_task = tokio::spawn(send_loop(
            socket,
            remote_addr,
            rx,
            Arc::clone(&lifecycle),
        ));
        let recv_task = tokio::spawn(receive_loop(
            source,
            handler,
            sender.clone(),
            Arc::clone(&lifecycle),
        ));

        Self {
            endpoint,
            remote_addr,
            local_addr,
            sender,
            lifecycle,
            tasks: vec![send_task, recv_task],
        }
    }

    /// Queue a frame for transmission. See [`FrameSender::enqueue`].
    pub fn enqueue(&self, frame: OutboundFrame) -> bool {
        self.sender.enqueue(frame)
    }

    /// A cloneable handle onto the outbound queue.
    pub fn sender(&self) -> FrameSender {
        self.sender.clone()
    }

    /// Signal both loops to stop. Idempotent; returns immediately.
    ///
    /// Frames still queued are discarded. The socket is released once both
    /// loops have exited; use [`shutdown`](Self::shutdown) to wait for that.
    pub fn close(&self) {
        if self.lifecycle.stop() {
            debug!(remote = %self.remote_addr, "transport closing");
        }
    }

    /// Close and wait for both loops to exit.
    pub async fn shutdown(mut self) {
        self.close();
        for task in std::mem::take(&mut self.tasks) {
            if let Err(e) = task.await {
                warn!(error = %e, "transport task ended abnormally");
            }
        }
    }

    /// True from a successful open until close or a receive failure.
    pub fn is_running(&self) -> bool {
        self.lifecycle.is_running()
    }

    /// The endpoint this transport was opened with.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Resolved remote address telemetry is sent to.
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    /// Bound local address (useful when the receive port was 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Current counters.
    pub fn stats(&self) -> TransportStats {
        self.lifecycle.stats()
    }
}

impl Drop for DuplexTransport {
    fn drop(&mut self) {
        self.lifecycle.stop();
    }
}

/// Datagrams feeding the receiver loop.
trait DatagramSource: Send + Sync + 'static {
    fn recv_buffer(&self) -> Vec<u8>;

    fn recv_datagram<'a>(
        &'a self,
        buf: &'a mut [u8],
    ) -> impl Future<Output = io::Result<(usize, SocketAddr)>> + Send + 'a;
}

impl DatagramSource for DatagramSocket {
    fn recv_buffer(&self) -> Vec<u8> {
        DatagramSocket::recv_buffer(self)
    }

    fn recv_datagram<'a>(
        &'a self,
        buf: &'a mut [u8],
    ) -> impl Future<Output = io::Result<(usize, SocketAddr)>> + Send + 'a {
        self.recv_from(buf)
    }
}

/// Resolves once a stop has been signalled (or the signal is gone).
async fn stopped(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

async fn send_loop(
    socket: DatagramSocket,
    remote: SocketAddr,
    mut rx: mpsc::UnboundedReceiver<OutboundFrame>,
    lifecycle: Arc<Lifecycle>,
) {
    let mut shutdown = lifecycle.shutdown.subscribe();
    loop {
        tokio::select! {
            biased;
            () = stopped(&mut shutdown) => break,
            frame = rx.recv() => {
                let Some(frame) = frame else { break };
                let line = frame.to_line();
                match socket.send_to(line.as_bytes(), remote).await {
                    Ok(_) => {
                        lifecycle.frames_sent.fetch_add(1, Ordering::Relaxed);
                        trace!(kind = %frame.kind(), "sent frame");
                    }
                    Err(e) => {
                        lifecycle.send_errors.fetch_add(1, Ordering::Relaxed);
                        warn!(kind = %frame.kind(), error = %e, "send failed, frame dropped");
                    }
                }
            }
        }
    }
    debug!("sender loop stopped");
}

async fn receive_loop<R: DatagramSource>(
    source: R,
    handler: Arc<dyn InboundHandler>,
    outbound: FrameSender,
    lifecycle: Arc<Lifecycle>,
) {
    let mut shutdown = lifecycle.shutdown.subscribe();
    let mut buf = source.recv_buffer();
    loop {
        tokio::select! {
            biased;
            () = stopped(&mut shutdown) => break,
            received = source.recv_datagram(&mut buf) => match received {
                Ok((len, from)) => match decode_datagram(&buf[..len]) {
                    Ok(frame) => {
                        lifecycle.frames_received.fetch_add(1, Ordering::Relaxed);
                        trace!(kind = %frame.kind(), %from, "received frame");
                        handler.on_frame(frame, &outbound);
                    }
                    Err(e) => {
                        lifecycle.malformed.fetch_add(1, Ordering::Relaxed);
                        warn!(%from, error = %e, "dropping malformed frame");
                    }
                },
                Err(e) => {
                    error!(
                        error = %TransportError::ReadFailure(e),
                        "receive failed, stopping transport"
                    );
                    lifecycle.stop();
                    break;
                }
            }
        }
    }
    debug!("receiver loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::MessageKind;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::net::UdpSocket;
    use tokio::time::timeout;

    fn loopback_options() -> TransportOptions {
        TransportOptions {
            bind_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            ..TransportOptions::default()
        }
    }

    async fn fake_host() -> (UdpSocket, u16) {
        let host = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = host.local_addr().unwrap().port();
        (host, port)
    }

    async fn recv_line(host: &UdpSocket) -> String {
        let mut buf = [0u8; 1024];
        let (len, _) = timeout(Duration::from_secs(2), host.recv_from(&mut buf))
            .await
            .expect("timed out waiting for datagram")
            .unwrap();
        String::from_utf8(buf[..len].to_vec()).unwrap()
    }

    fn ignore_inbound() -> Arc<dyn InboundHandler> {
        Arc::new(|_: InboundFrame, _: &FrameSender| {})
    }

    #[tokio::test]
    async fn test_enqueued_frame_reaches_host() {
        let (host, port) = fake_host().await;
        let transport = DuplexTransport::open(
            Endpoint::new("127.0.0.1", port, 0),
            loopback_options(),
            ignore_inbound(),
        )
        .await
        .unwrap();

        assert!(transport.is_running());
        assert!(transport.enqueue(OutboundFrame::with_timestamp(
            7,
            MessageKind::Light,
            vec!["120.5".into()],
        )));
        assert_eq!(recv_line(&host).await, "7,LIGHT,120.5");
        transport.shutdown().await;
    }

    #[tokio::test]
    async fn test_frames_arrive_in_enqueue_order() {
        let (host, port) = fake_host().await;
        let transport = DuplexTransport::open(
            Endpoint::new("127.0.0.1", port, 0),
            loopback_options(),
            ignore_inbound(),
        )
        .await
        .unwrap();

        for i in 0..20 {
            transport.enqueue(OutboundFrame::with_timestamp(
                i,
                MessageKind::Proximity,
                vec![format!("{i}.0")],
            ));
        }
        for i in 0..20 {
            assert_eq!(recv_line(&host).await, format!("{i},PROXIMITY,{i}.0"));
        }
        transport.shutdown().await;
    }

    #[tokio::test]
    async fn test_inbound_frames_reach_handler_and_malformed_are_dropped() {
        let (host, port) = fake_host().await;
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let transport = DuplexTransport::open(
            Endpoint::new("127.0.0.1", port, 0),
            loopback_options(),
            Arc::new(move |frame: InboundFrame, _: &FrameSender| {
                sink.lock().unwrap().push(frame.kind());
            }),
        )
        .await
        .unwrap();

        let target = transport.local_addr();
        host.send_to(b"NOT_A_KIND,1", target).await.unwrap();
        host.send_to(&[0xff, 0xfe], target).await.unwrap();
        host.send_to(b"HEARTBEAT", target).await.unwrap();
        host.send_to(b"WHOAREYOU", target).await.unwrap();

        timeout(Duration::from_secs(2), async {
            while seen.lock().unwrap().len() < 2 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![MessageKind::Heartbeat, MessageKind::WhoAreYou]
        );
        let stats = transport.stats();
        assert_eq!(stats.malformed, 2);
        assert_eq!(stats.frames_received, 2);
        assert!(transport.is_running());
        transport.shutdown().await;
    }

    #[tokio::test]
    async fn test_handler_can_reply() {
        let (host, port) = fake_host().await;
        let transport = DuplexTransport::open(
            Endpoint::new("127.0.0.1", port, 0),
            loopback_options(),
            Arc::new(|frame: InboundFrame, outbound: &FrameSender| {
                if frame.kind() == MessageKind::WhoAreYou {
                    outbound.enqueue(OutboundFrame::with_timestamp(
                        1,
                        MessageKind::LongPress,
                        vec!["0".into()],
                    ));
                }
            }),
        )
        .await
        .unwrap();

        host.send_to(b"WHOAREYOU", transport.local_addr())
            .await
            .unwrap();
        assert_eq!(recv_line(&host).await, "1,LONGPRESS,0");
        transport.shutdown().await;
    }

    #[tokio::test]
    async fn test_close_is_idempotent_and_drops_later_frames() {
        let (_host, port) = fake_host().await;
        let transport = DuplexTransport::open(
            Endpoint::new("127.0.0.1", port, 0),
            loopback_options(),
            ignore_inbound(),
        )
        .await
        .unwrap();
        let sender = transport.sender();

        transport.close();
        transport.close();
        assert!(!transport.is_running());
        assert!(!sender.is_running());
        assert!(!sender.enqueue(OutboundFrame::new(MessageKind::Light, vec!["1.0".into()])));
        transport.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_releases_receive_port() {
        let (_host, port) = fake_host().await;
        let transport = DuplexTransport::open(
            Endpoint::new("127.0.0.1", port, 0),
            loopback_options(),
            ignore_inbound(),
        )
        .await
        .unwrap();
        let local = transport.local_addr();
        transport.shutdown().await;

        let reopened = DuplexTransport::open(
            Endpoint::new("127.0.0.1", port, local.port()),
            loopback_options(),
            ignore_inbound(),
        )
        .await
        .unwrap();
        assert_eq!(reopened.local_addr(), local);
        reopened.shutdown().await;
    }

    #[tokio::test]
    async fn test_bind_conflict_reports_bind_failed() {
        let (_host, port) = fake_host().await;
        let taken = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let taken_port = taken.local_addr().unwrap().port();

        let err = DuplexTransport::open(
            Endpoint::new("127.0.0.1", port, taken_port),
            loopback_options(),
            ignore_inbound(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, TransportError::BindFailed { .. }));
    }

    #[tokio::test]
    async fn test_unresolvable_host() {
        let err = DuplexTransport::open(
            Endpoint::new("no such host", 5555, 0),
            loopback_options(),
            ignore_inbound(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, TransportError::UnresolvedAddress { .. }));
    }

    /// Replays scripted reads, then blocks forever.
    struct ScriptedSource {
        reads: Mutex<VecDeque<io::Result<Vec<u8>>>>,
    }

    impl DatagramSource for ScriptedSource {
        fn recv_buffer(&self) -> Vec<u8> {
            vec![0; 64]
        }

        fn recv_datagram<'a>(
            &'a self,
            buf: &'a mut [u8],
        ) -> impl Future<Output = io::Result<(usize, SocketAddr)>> + Send + 'a {
            let next = self.reads.lock().unwrap().pop_front();
            async move {
                match next {
                    Some(Ok(bytes)) => {
                        buf[..bytes.len()].copy_from_slice(&bytes);
                        Ok((bytes.len(), "127.0.0.1:9".parse().unwrap()))
                    }
                    Some(Err(e)) => Err(e),
                    None => std::future::pending().await,
                }
            }
        }
    }

    #[tokio::test]
    async fn test_read_failure_stops_both_loops() {
        let (host, port) = fake_host().await;
        let remote = host.local_addr().unwrap();
        let socket = DatagramSocket::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let local = socket.local_addr().unwrap();
        let source = ScriptedSource {
            reads: Mutex::new(VecDeque::from([
                Ok(b"HEARTBEAT".to_vec()),
                Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
                Ok(b"WHOAREYOU".to_vec()),
            ])),
        };
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let transport = DuplexTransport::start(
            Endpoint::new("127.0.0.1", port, 0),
            remote,
            local,
            socket,
            source,
            Arc::new(move |frame: InboundFrame, _: &FrameSender| {
                sink.lock().unwrap().push(frame.kind());
            }),
        );
        let sender = transport.sender();

        timeout(Duration::from_secs(2), async {
            while transport.is_running() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("transport still running after read failure");

        assert_eq!(*seen.lock().unwrap(), vec![MessageKind::Heartbeat]);
        assert_eq!(transport.stats().frames_received, 1);
        assert!(!sender.is_running());
        assert!(!sender.enqueue(OutboundFrame::new(MessageKind::Light, vec!["1.0".into()])));
        timeout(Duration::from_secs(2), transport.shutdown())
            .await
            .expect("sender loop did not stop");
    }
}
