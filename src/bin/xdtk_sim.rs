//! XDTK device simulator
//!
//! Streams synthetic sensor telemetry to a headset host, answers
//! `WHOAREYOU` and logs haptic requests. Useful for exercising a host
//! without a phone.
//!
//! # Usage
//!
//! ```bash
//! # Stream to a host on the LAN with default ports (5555 out, 5556 in)
//! xdtk-sim --host 192.168.1.20
//!
//! # Wearable cadence, custom config, stop after 30 s
//! xdtk-sim --host hmd.local --config xdtk.toml --tick-ms 80 --duration-secs 30
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use xdtk_link::prelude::*;

/// XDTK device simulator - synthetic telemetry for an XR headset host
#[derive(Parser, Debug)]
#[command(name = "xdtk-sim")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Headset host address
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Remote port telemetry is sent to
    #[arg(long)]
    send_port: Option<u16>,

    /// Local port control messages arrive on
    #[arg(long)]
    receive_port: Option<u16>,

    /// Sensor flush interval in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Stop after this many seconds (runs until Ctrl-C when absent)
    #[arg(long)]
    duration_secs: Option<u64>,

    /// Log level used when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Logs haptic requests instead of vibrating.
struct LogHaptics;

impl HapticsHandler for LogHaptics {
    fn on_haptic(&self, effect: HapticEffect) {
        info!(?effect, "haptic request");
    }
}

/// Gravity rotating about the device Y axis, one revolution every ~12 s.
fn feed_synthetic(samples: &LatestSamples, elapsed: Duration) {
    const G: f32 = 9.80665;
    const RATE: f32 = 0.5;

    let angle = elapsed.as_secs_f32() * RATE;
    let gravity = [G * angle.sin(), 0.0, G * angle.cos()];
    let half = angle / 2.0;

    samples.record(SensorKind::Accelerometer, SensorSample::new(gravity));
    samples.record(SensorKind::Gravity, SensorSample::new(gravity));
    samples.record(SensorKind::LinearAcceleration, SensorSample::new([0.0, 0.0, 0.0]));
    samples.record(SensorKind::Gyroscope, SensorSample::new([0.0, RATE, 0.0]));
    samples.record(
        SensorKind::GameRotationVector,
        SensorSample::new([0.0, half.sin(), 0.0, half.cos()]),
    );
    samples.record(SensorKind::Light, SensorSample::new([250.0]));
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    // Defaults < file < environment < command line
    let mut config = SessionConfig::load(args.config.as_deref())?;
    if let Some(port) = args.send_port {
        config.send_port = port;
    }
    if let Some(port) = args.receive_port {
        config.receive_port = port;
    }
    if let Some(ms) = args.tick_ms {
        config.tick_interval = Duration::from_millis(ms);
    }
    config.validate()?;

    info!(
        host = %args.host,
        send_port = config.send_port,
        receive_port = config.receive_port,
        tick = ?config.tick_interval,
        "xdtk-sim v{}",
        env!("CARGO_PKG_VERSION")
    );

    let device = Arc::new(DeviceProfile {
        manufacturer: "xdtk".into(),
        model: "Simulator".into(),
        width_px: 1080.0,
        height_px: 2400.0,
        xdpi: 420.0,
        ydpi: 420.0,
    });
    let tick = config.tick_interval;
    let session =
        Arc::new(SessionController::new(config, device).with_haptics(Arc::new(LogHaptics)));
    session.open_connection(&args.host).await?;

    let samples = Arc::new(LatestSamples::new());
    let started = Instant::now();
    let feeder = {
        let samples = Arc::clone(&samples);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            loop {
                interval.tick().await;
                feed_synthetic(&samples, started.elapsed());
            }
        })
    };
    let ticker = spawn_sensor_ticker(Arc::clone(&session), Arc::clone(&samples), tick);

    let deadline = async {
        match args.duration_secs {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending().await,
        }
    };
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(deadline, ctrl_c);

    let mut status = tokio::time::interval(Duration::from_secs(1));
    let mut last_state = None;
    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Shutdown signal received");
                break;
            }
            () = &mut deadline => {
                info!("Duration elapsed");
                break;
            }
            _ = status.tick() => {
                if !session.is_running() {
                    info!("Transport stopped");
                    break;
                }
                let state = session.liveness().state();
                if last_state != Some(state) {
                    info!(%state, "host liveness");
                    last_state = Some(state);
                }
                if let Some(stats) = session.stats() {
                    debug!(
                        sent = stats.frames_sent,
                        received = stats.frames_received,
                        malformed = stats.malformed,
                        orientation = ?samples.device_orientation(),
                        "link stats"
                    );
                }
            }
        }
    }

    ticker.abort();
    feeder.abort();
    session.shutdown().await;
    info!("Simulator stopped");
    Ok(())
}
