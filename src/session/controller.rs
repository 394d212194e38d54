//! Session controller: the producer-facing API.
//!
//! Owns at most one [`DuplexTransport`], rate-limits the high-frequency
//! classes and dispatches inbound control frames. Every `send_*` call is
//! synchronous and silently does nothing while no transport is running.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use tracing::{debug, info, warn};

use crate::codec::{
    DeviceOrientation, Direction, InboundFrame, Message, MessageKind, Pose, Quat, Tap,
    TouchEvent, Vec3,
};
use crate::core::{DeviceInfoSource, HapticsHandler, SampleSource, XdtkError};
use crate::sensors::SensorKind;
use crate::transport::{DuplexTransport, Endpoint, FrameSender, InboundHandler, TransportStats};

use super::{LivenessTracker, RateLimitGate, SessionConfig};

/// Inbound side of a session, shared with the receiver task.
struct Dispatcher {
    liveness: LivenessTracker,
    touch_move_gate: RateLimitGate,
    device_info_gate: RateLimitGate,
    device: Arc<dyn DeviceInfoSource>,
    haptics: RwLock<Option<Arc<dyn HapticsHandler>>>,
}

impl Dispatcher {
    fn reply_device_info(&self, outbound: &FrameSender) {
        let sent = self.device_info_gate.try_send(|| {
            outbound.enqueue(Message::DeviceInfo(self.device.device_info()).to_frame())
        });
        if !sent {
            debug!("DEVICE_INFO inside rate-limit floor or transport stopped, dropped");
        }
    }

    fn play(&self, effect: crate::codec::HapticEffect) {
        let handler = self
            .haptics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match handler {
            Some(handler) => handler.on_haptic(effect),
            None => debug!(?effect, "no haptics handler, request dropped"),
        }
    }
}

impl InboundHandler for Dispatcher {
    fn on_frame(&self, frame: InboundFrame, outbound: &FrameSender) {
        match frame.kind() {
            MessageKind::Heartbeat => self.liveness.on_heartbeat(),
            MessageKind::WhoAreYou => self.reply_device_info(outbound),
            kind if kind.direction() == Direction::HostToDevice => {
                match Message::from_frame(&frame) {
                    Ok(Message::Haptics(effect)) => self.play(effect),
                    Ok(other) => debug!(kind = %other.kind(), "unhandled control message"),
                    Err(e) => warn!(error = %e, "dropping malformed control frame"),
                }
            }
            kind => debug!(%kind, "ignoring device-to-host frame received from host"),
        }
    }
}

/// Producer-facing session API.
///
/// Construct once, share behind an `Arc`, and call `send_*` from any thread.
pub struct SessionController {
    config: SessionConfig,
    dispatcher: Arc<Dispatcher>,
    transport: Mutex<Option<DuplexTransport>>,
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("config", &self.config)
            .field("running", &self.is_running())
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

impl SessionController {
    /// Create an idle controller. `device` answers `WHOAREYOU`.
    pub fn new(config: SessionConfig, device: Arc<dyn DeviceInfoSource>) -> Self {
        let dispatcher = Dispatcher {
            liveness: LivenessTracker::new(config.heartbeat_timeout),
            touch_move_gate: RateLimitGate::new(config.touch_move_interval),
            device_info_gate: RateLimitGate::new(config.device_info_interval),
            device,
            haptics: RwLock::new(None),
        };
        Self {
            config,
            dispatcher: Arc::new(dispatcher),
            transport: Mutex::new(None),
        }
    }

    /// Attach a haptics handler.
    pub fn with_haptics(self, handler: Arc<dyn HapticsHandler>) -> Self {
        self.set_haptics_handler(handler);
        self
    }

    /// Replace the haptics handler.
    pub fn set_haptics_handler(&self, handler: Arc<dyn HapticsHandler>) {
        *self
            .dispatcher
            .haptics
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(handler);
    }

    /// The session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The liveness tracker.
    pub fn liveness(&self) -> &LivenessTracker {
        &self.dispatcher.liveness
    }

    // ========================================================================
    // Connection
    // ========================================================================

    /// Open a transport to `remote_host`, replacing any previous one.
    ///
    /// The previous transport is shut down first so its receive port is
    /// free again.
    pub async fn open_connection(&self, remote_host: &str) -> Result<(), XdtkError> {
        self.config.validate()?;

        let previous = self.lock_transport().take();
        if let Some(previous) = previous {
            previous.shutdown().await;
        }
        self.reset_state();

        let endpoint = Endpoint::new(
            remote_host,
            self.config.send_port,
            self.config.receive_port,
        );
        let handler: Arc<dyn InboundHandler> = self.dispatcher.clone();
        let transport =
            DuplexTransport::open(endpoint, self.config.transport_options(), handler).await?;

        info!(
            remote = %transport.remote_addr(),
            local = %transport.local_addr(),
            "connection open"
        );

        let replaced = self.lock_transport().replace(transport);
        if let Some(replaced) = replaced {
            replaced.close();
        }
        Ok(())
    }

    /// Close the transport. Idempotent; returns immediately.
    ///
    /// The stopped transport stays in its slot until the next
    /// [`open_connection`](Self::open_connection) or
    /// [`shutdown`](Self::shutdown) joins its loops and frees the port.
    pub fn close_connection(&self) {
        if let Some(transport) = self.lock_transport().as_ref() {
            if transport.is_running() {
                transport.close();
                info!(remote = %transport.remote_addr(), "connection closed");
            }
        }
        self.dispatcher.liveness.disarm();
    }

    /// Close the transport and wait for its loops to exit.
    pub async fn shutdown(&self) {
        let transport = self.lock_transport().take();
        self.dispatcher.liveness.disarm();
        if let Some(transport) = transport {
            let remote = transport.remote_addr();
            let was_running = transport.is_running();
            transport.shutdown().await;
            if was_running {
                info!(%remote, "connection closed");
            }
        }
    }

    // ========================================================================
    // Status
    // ========================================================================

    /// Whether the host has sent a heartbeat within the liveness window.
    pub fn is_connected(&self) -> bool {
        self.dispatcher.liveness.is_connected()
    }

    /// Whether a transport is open and running.
    pub fn is_running(&self) -> bool {
        self.lock_transport()
            .as_ref()
            .is_some_and(DuplexTransport::is_running)
    }

    /// Bound local address of the running transport.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.lock_transport()
            .as_ref()
            .filter(|t| t.is_running())
            .map(DuplexTransport::local_addr)
    }

    /// Counters of the current transport, running or closed.
    pub fn stats(&self) -> Option<TransportStats> {
        self.lock_transport().as_ref().map(DuplexTransport::stats)
    }

    // ========================================================================
    // Outbound
    // ========================================================================

    /// Send any message, applying the TOUCH_MOVE and DEVICE_INFO floors.
    ///
    /// Returns whether the frame was queued. Never errors.
    pub fn send(&self, message: Message) -> bool {
        let guard = self.lock_transport();
        let Some(transport) = guard.as_ref().filter(|t| t.is_running()) else {
            return false;
        };

        let frame = message.to_frame();
        match message.kind() {
            MessageKind::TouchMove => self
                .dispatcher
                .touch_move_gate
                .try_send(|| transport.enqueue(frame)),
            MessageKind::DeviceInfo => self
                .dispatcher
                .device_info_gate
                .try_send(|| transport.enqueue(frame)),
            _ => transport.enqueue(frame),
        }
    }

    /// `TOUCH_DOWN`
    pub fn send_touch_down(&self, touch: TouchEvent) -> bool {
        self.send(Message::TouchDown(touch))
    }

    /// `TOUCH_UP`
    pub fn send_touch_up(&self, touch: TouchEvent) -> bool {
        self.send(Message::TouchUp(touch))
    }

    /// `TOUCH_MOVE`, rate limited.
    pub fn send_touch_move(&self, touch: TouchEvent) -> bool {
        self.send(Message::TouchMove(touch))
    }

    /// `TAP`
    pub fn send_tap(&self, tap: Tap) -> bool {
        self.send(Message::Tap(tap))
    }

    /// `TAPCONFIRMED`
    pub fn send_tap_confirmed(&self, tap: Tap) -> bool {
        self.send(Message::TapConfirmed(tap))
    }

    /// `DOUBLETAP`
    pub fn send_double_tap(&self, tap: Tap) -> bool {
        self.send(Message::DoubleTap(tap))
    }

    /// `LONGPRESS`
    pub fn send_long_press(&self, pointer_id: i32) -> bool {
        self.send(Message::LongPress { pointer_id })
    }

    /// `FLING`
    pub fn send_fling(&self, velocity_x: f32, velocity_y: f32) -> bool {
        self.send(Message::Fling {
            velocity_x,
            velocity_y,
        })
    }

    /// `PINCH_START`
    pub fn send_pinch_start(&self, span: f32) -> bool {
        self.send(Message::PinchStart { span })
    }

    /// `PINCH_MOVE`
    pub fn send_pinch_move(&self, span: f32) -> bool {
        self.send(Message::PinchMove { span })
    }

    /// `PINCH_END`
    pub fn send_pinch_end(&self, span: f32) -> bool {
        self.send(Message::PinchEnd { span })
    }

    /// `ACCELEROMETER`
    pub fn send_accelerometer(&self, v: Vec3) -> bool {
        self.send(Message::Accelerometer(v))
    }

    /// `GRAVITY`
    pub fn send_gravity(&self, v: Vec3) -> bool {
        self.send(Message::Gravity(v))
    }

    /// `GYROSCOPE`
    pub fn send_gyroscope(&self, v: Vec3) -> bool {
        self.send(Message::Gyroscope(v))
    }

    /// `LINEAR_ACCELERATION`
    pub fn send_linear_acceleration(&self, v: Vec3) -> bool {
        self.send(Message::LinearAcceleration(v))
    }

    /// `ROTATION_VECTOR`
    pub fn send_rotation_vector(&self, q: Quat) -> bool {
        self.send(Message::RotationVector(q))
    }

    /// `GAME_ROTATION_VECTOR`
    pub fn send_game_rotation_vector(&self, q: Quat) -> bool {
        self.send(Message::GameRotationVector(q))
    }

    /// `MAGNETIC_FIELD`
    pub fn send_magnetic_field(&self, v: Vec3) -> bool {
        self.send(Message::MagneticField(v))
    }

    /// `PROXIMITY`
    pub fn send_proximity(&self, value: f32) -> bool {
        self.send(Message::Proximity(value))
    }

    /// `AMBIENT_TEMPERATURE`
    pub fn send_ambient_temperature(&self, value: f32) -> bool {
        self.send(Message::AmbientTemperature(value))
    }

    /// `LIGHT`
    pub fn send_light(&self, value: f32) -> bool {
        self.send(Message::Light(value))
    }

    /// `DEVICE_ORIENTATION`; `None` sends the kind without a label.
    pub fn send_device_orientation(&self, orientation: Option<DeviceOrientation>) -> bool {
        self.send(Message::DeviceOrientation(orientation))
    }

    /// `ARPOSE`
    pub fn send_ar_pose(&self, pose: Pose) -> bool {
        self.send(Message::ArPose(pose))
    }

    /// `DEVICE_INFO` from the device source, rate limited.
    pub fn send_device_info(&self) -> bool {
        self.send(Message::DeviceInfo(self.dispatcher.device.device_info()))
    }

    /// `HEARTBEAT` from the device side. The host does not require these.
    pub fn send_heartbeat(&self) -> bool {
        self.send(Message::Heartbeat)
    }

    /// Send the latest value of every sensor with data, then the device
    /// orientation if known. Returns the number of frames queued.
    pub fn flush_sensors(&self, source: &dyn SampleSource) -> usize {
        if !self.is_running() {
            return 0;
        }

        let mut queued = 0;
        for sensor in SensorKind::FLUSH_ORDER {
            let message = source
                .latest(sensor)
                .and_then(|sample| sensor.to_message(&sample));
            if let Some(message) = message {
                queued += usize::from(self.send(message));
            }
        }
        if let Some(orientation) = source.device_orientation() {
            queued += usize::from(self.send_device_orientation(Some(orientation)));
        }
        queued
    }

    fn reset_state(&self) {
        self.dispatcher.liveness.disarm();
        self.dispatcher.touch_move_gate.reset();
        self.dispatcher.device_info_gate.reset();
    }

    fn lock_transport(&self) -> MutexGuard<'_, Option<DuplexTransport>> {
        self.transport.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        if let Some(transport) = self.lock_transport().take() {
            transport.close();
        }
    }
}
