//! End-to-end tests against a fake headset host on the loopback interface.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::time::{sleep, timeout};

use xdtk_link::codec::{decode_stamped, encode};
use xdtk_link::prelude::*;

fn device() -> Arc<DeviceProfile> {
    Arc::new(DeviceProfile {
        manufacturer: "samsung".into(),
        model: "Galaxy Watch6".into(),
        width_px: 432.0,
        height_px: 432.0,
        xdpi: 327.0,
        ydpi: 327.0,
    })
}

/// Fake host bound to an ephemeral port, and a session streaming to it.
async fn connect(config: SessionConfigBuilder) -> (UdpSocket, SessionController) {
    let host = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let config = config
        .send_port(host.local_addr().unwrap().port())
        .receive_port(0)
        .bind_address("127.0.0.1".parse().unwrap())
        .build();
    let session = SessionController::new(config, device());
    session.open_connection("127.0.0.1").await.unwrap();
    (host, session)
}

async fn recv_line(host: &UdpSocket) -> String {
    let mut buf = [0u8; 1024];
    let (len, _) = timeout(Duration::from_secs(2), host.recv_from(&mut buf))
        .await
        .expect("no datagram within 2s")
        .unwrap();
    String::from_utf8(buf[..len].to_vec()).unwrap()
}

async fn recv_body(host: &UdpSocket) -> String {
    let line = recv_line(host).await;
    let (_, rest) = line.split_once(',').unwrap();
    rest.to_string()
}

async fn silent_for(host: &UdpSocket, window: Duration) -> bool {
    let mut buf = [0u8; 1024];
    timeout(window, host.recv_from(&mut buf)).await.is_err()
}

fn session_addr(session: &SessionController) -> SocketAddr {
    session.local_addr().unwrap()
}

#[tokio::test]
async fn test_accelerometer_on_default_ports() {
    let host = UdpSocket::bind("127.0.0.1:5555").await.unwrap();
    let session = SessionController::new(
        SessionConfig::builder()
            .bind_address("127.0.0.1".parse().unwrap())
            .build(),
        device(),
    );
    session.open_connection("127.0.0.1").await.unwrap();
    assert_eq!(session_addr(&session).port(), 5556);

    assert!(session.send_accelerometer(Vec3::new(1.0, 2.0, 3.0)));

    let line = recv_line(&host).await;
    let (timestamp, frame) = decode_stamped(&line).unwrap();
    assert!(timestamp > 0);
    assert_eq!(encode(frame.kind(), frame.fields()), "ACCELEROMETER,1.0,2.0,3.0");
    session.shutdown().await;
}

#[tokio::test]
async fn test_frames_sent_in_order() {
    let (host, session) = connect(SessionConfig::builder()).await;

    for i in 0..50 {
        assert!(session.send_pinch_move(i as f32));
    }
    for i in 0..50 {
        assert_eq!(recv_body(&host).await, format!("PINCH_MOVE,{:?}", i as f32));
    }
    session.shutdown().await;
}

#[tokio::test]
async fn test_heartbeat_sets_connected_until_window_expires() {
    let (host, session) = connect(
        SessionConfig::builder().heartbeat_timeout(Duration::from_millis(300)),
    )
    .await;

    host.send_to(b"HEARTBEAT", session_addr(&session))
        .await
        .unwrap();
    timeout(Duration::from_secs(2), async {
        while !session.is_connected() {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();

    sleep(Duration::from_millis(400)).await;
    assert!(!session.is_connected());
    assert!(session.is_running());
    session.shutdown().await;
}

#[tokio::test]
async fn test_no_heartbeat_never_connected() {
    let (_host, session) = connect(SessionConfig::builder()).await;
    for _ in 0..15 {
        assert!(!session.is_connected());
        sleep(Duration::from_millis(100)).await;
    }
    assert!(!session.is_connected());
    session.shutdown().await;
}

#[tokio::test]
async fn test_who_are_you_yields_one_device_info() {
    let (host, session) = connect(SessionConfig::builder()).await;

    host.send_to(b"WHOAREYOU", session_addr(&session))
        .await
        .unwrap();
    let body = recv_body(&host).await;
    let fields: Vec<&str> = body.split(',').collect();
    assert_eq!(
        fields[..4],
        ["DEVICE_INFO", "Samsung Galaxy Watch6", "432.0", "432.0"]
    );
    for inches in &fields[4..] {
        let inches: f32 = inches.parse().unwrap();
        assert!((inches - 432.0 / 327.0).abs() < 1e-6);
    }
    assert_eq!(fields.len(), 6);
    assert!(silent_for(&host, Duration::from_millis(150)).await);
    session.shutdown().await;
}

#[tokio::test]
async fn test_touch_move_rate_limit() {
    let (host, session) = connect(
        SessionConfig::builder().touch_move_interval(Duration::from_millis(200)),
    )
    .await;
    let mut touch = Touch::new(0, 100.0, 100.0, 1);

    // Burst inside one floor window
    let mut accepted = 0;
    for step in 0..10 {
        touch.update(100.0 + step as f32, 100.0, 0.5, 0.1);
        accepted += usize::from(session.send_touch_move(touch.event()));
    }
    assert_eq!(accepted, 1);
    assert!(recv_body(&host).await.starts_with("TOUCH_MOVE,0,100.0,100.0,"));
    assert!(silent_for(&host, Duration::from_millis(100)).await);

    // Spaced beyond the floor
    for _ in 0..3 {
        sleep(Duration::from_millis(220)).await;
        assert!(session.send_touch_move(touch.event()));
        assert!(recv_body(&host).await.starts_with("TOUCH_MOVE,0,109.0,"));
    }
    session.shutdown().await;
}

#[tokio::test]
async fn test_malformed_inbound_is_dropped() {
    let (host, session) = connect(SessionConfig::builder()).await;
    let target = session_addr(&session);

    host.send_to(b"", target).await.unwrap();
    host.send_to(b"GARBAGE,,,", target).await.unwrap();
    host.send_to(b"HAPTICS_ONESHOT", target).await.unwrap();
    host.send_to(b"WHOAREYOU", target).await.unwrap();

    assert!(recv_body(&host).await.starts_with("DEVICE_INFO,"));
    assert!(session.is_running());
    let stats = session.stats().unwrap();
    assert_eq!(stats.malformed, 2);
    session.shutdown().await;
}

#[tokio::test]
async fn test_close_while_idle() {
    let (host, session) = connect(SessionConfig::builder()).await;
    sleep(Duration::from_millis(20)).await;

    session.close_connection();
    assert!(!session.is_running());
    assert!(!session.is_connected());
    assert!(!session.send_light(1.0));
    assert!(silent_for(&host, Duration::from_millis(100)).await);

    session.close_connection();
    session.shutdown().await;
}
