use naobridge_config::RobotConfig;
use naobridge_core::{WireFormat, READY_NOTICE};
use naobridge_robot::{RobotClient, SimulatedRobot};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

async fn accept_greeted(listener: &TcpListener) -> TcpStream {
    let (mut relay, _) = listener.accept().await.unwrap();
    let mut greeting = vec![0u8; READY_NOTICE.len()];
    relay.read_exact(&mut greeting).await.unwrap();
    assert_eq!(greeting, READY_NOTICE.as_bytes());
    relay
}

#[tokio::test]
async fn test_simulated_robot_acknowledges_each_command() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let config = RobotConfig {
        server_addr: listener.local_addr().unwrap().to_string(),
        reconnect_interval_ms: 20,
        ..RobotConfig::default()
    };
    let client = RobotClient::from_config(&config, Arc::new(SimulatedRobot::new(&config.audio_dir)));
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let handle = tokio::spawn(async move { client.run(token).await });

    let mut relay = accept_greeted(&listener).await;
    for (frame, ack) in [
        ("playaudio:turn-1-control-group.wav", "ok:playaudio"),
        ("gesture:nod,hands_together", "ok:gesture"),
        ("say:Well done", "ok:say"),
    ] {
        relay.write_all(frame.as_bytes()).await.unwrap();
        let mut buf = [0u8; 256];
        let n = tokio::time::timeout(Duration::from_secs(2), relay.read(&mut buf))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(&buf[..n], ack.as_bytes());
    }

    cancel.cancel();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_json_wire_format_from_config() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let config = RobotConfig {
        server_addr: listener.local_addr().unwrap().to_string(),
        wire_format: WireFormat::Json,
        ..RobotConfig::default()
    };
    let client = RobotClient::from_config(&config, Arc::new(SimulatedRobot::new("/tmp")));
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let handle = tokio::spawn(async move { client.run(token).await });

    let mut relay = accept_greeted(&listener).await;
    relay
        .write_all(br#"{"action":"gesture","text":"wave","turn":"init"}"#)
        .await
        .unwrap();
    let mut buf = [0u8; 256];
    let n = relay.read(&mut buf).await.unwrap();
    let ack: serde_json::Value = serde_json::from_slice(&buf[..n]).unwrap();
    assert_eq!(ack["status"], "ok");
    assert_eq!(ack["turn"], "init");

    cancel.cancel();
    handle.await.unwrap();
}
