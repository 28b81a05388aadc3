//! In-memory gateway server for driving the client in tests.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures_util::Sink;
use navicord_common::{AssetError, GatewayError};
use navicord_config::schema::{BackoffConfig, GatewayConfig};
use serde_json::{json, Value};
use tokio::sync::{broadcast, mpsc};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

use crate::assets::AssetUploader;
use crate::gateway::{
    Connector, FrameSink, FrameStream, GatewayClient, GatewayEvent, GatewayFrame,
};

pub(crate) const TEST_TOKEN: &str = "test-token";
pub(crate) const TEST_APPLICATION_ID: &str = "1234567890";

pub(crate) fn test_config() -> GatewayConfig {
    GatewayConfig {
        token: TEST_TOKEN.into(),
        application_id: TEST_APPLICATION_ID.into(),
        ..GatewayConfig::default()
    }
}

/// Connector whose sockets are [`FakeServer`]s handed to the test.
pub(crate) struct FakeConnector {
    servers: mpsc::UnboundedSender<FakeServer>,
    failing_opens: AtomicUsize,
    opens: AtomicUsize,
}

impl FakeConnector {
    pub(crate) fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<FakeServer>) {
        let (servers, rx) = mpsc::unbounded_channel();
        let connector = Arc::new(Self {
            servers,
            failing_opens: AtomicUsize::new(0),
            opens: AtomicUsize::new(0),
        });
        (connector, rx)
    }

    /// Make the next `count` opens fail at the transport level.
    pub(crate) fn fail_next_opens(&self, count: usize) {
        self.failing_opens.store(count, Ordering::SeqCst);
    }

    pub(crate) fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for FakeConnector {
    async fn discover(&self) -> Result<String, GatewayError> {
        Ok("wss://gateway.test/?encoding=json&v=10".into())
    }

    async fn open(&self, _url: &str) -> Result<(FrameSink, FrameStream), GatewayError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failing_opens.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_opens.store(remaining - 1, Ordering::SeqCst);
            return Err(GatewayError::Transport("connection refused".into()));
        }

        let (client_tx, from_client) = mpsc::unbounded_channel::<Message>();
        let (to_client, client_rx) = mpsc::unbounded_channel::<Result<Message, WsError>>();

        let sink = FakeSink { tx: client_tx };
        let stream = futures_util::stream::unfold(client_rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        });

        self.servers
            .send(FakeServer {
                to_client,
                from_client,
            })
            .map_err(|_| GatewayError::Transport("test dropped the server receiver".into()))?;
        Ok((Box::pin(sink), Box::pin(stream)))
    }
}

/// Client write half. Once the server stops reading, every write fails,
/// the Close sent during teardown included.
struct FakeSink {
    tx: mpsc::UnboundedSender<Message>,
}

impl FakeSink {
    fn check_open(&self) -> Result<(), WsError> {
        if self.tx.is_closed() {
            Err(WsError::ConnectionClosed)
        } else {
            Ok(())
        }
    }
}

impl Sink<Message> for FakeSink {
    type Error = WsError;

    fn poll_ready(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), WsError>> {
        Poll::Ready(self.check_open())
    }

    fn start_send(self: Pin<&mut Self>, message: Message) -> Result<(), WsError> {
        self.tx.send(message).map_err(|_| WsError::ConnectionClosed)
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), WsError>> {
        Poll::Ready(self.check_open())
    }

    fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), WsError>> {
        Poll::Ready(Ok(()))
    }
}

/// Server side of one fake socket.
pub(crate) struct FakeServer {
    to_client: mpsc::UnboundedSender<Result<Message, WsError>>,
    from_client: mpsc::UnboundedReceiver<Message>,
}

impl FakeServer {
    pub(crate) fn send(&self, frame: Value) {
        let _ = self.to_client.send(Ok(Message::Text(frame.to_string().into())));
    }

    pub(crate) fn hello(&self, interval_ms: u64) {
        self.send(json!({"op": 10, "d": {"heartbeat_interval": interval_ms}}));
    }

    pub(crate) fn ready(&self, sequence: u64) {
        self.send(json!({
            "op": 0,
            "t": "READY",
            "s": sequence,
            "d": {"session_id": "fake", "user": {"username": "listener"}}
        }));
    }

    pub(crate) fn ack(&self) {
        self.send(json!({"op": 11}));
    }

    /// Inject a transport error into the client's read half.
    pub(crate) fn fail(&self) {
        let _ = self.to_client.send(Err(WsError::ConnectionClosed));
    }

    /// Stop reading while keeping the connection up. Later client writes fail.
    pub(crate) fn stop_reading(&mut self) {
        self.from_client.close();
    }

    /// Next text frame from the client, skipping close frames. `None` once
    /// the client dropped its write half.
    pub(crate) async fn next_frame(&mut self) -> Option<GatewayFrame> {
        while let Some(message) = self.from_client.recv().await {
            if let Message::Text(text) = message {
                return Some(GatewayFrame::parse(&text).expect("client sent malformed JSON"));
            }
        }
        None
    }

    /// Next frame with opcode `op`, skipping others.
    pub(crate) async fn next_op(&mut self, op: u8) -> Option<GatewayFrame> {
        while let Some(frame) = self.next_frame().await {
            if frame.op == op {
                return Some(frame);
            }
        }
        None
    }

    /// Frames already sent by the client, without waiting for more.
    pub(crate) fn drain(&mut self) -> Vec<GatewayFrame> {
        let mut frames = Vec::new();
        while let Ok(message) = self.from_client.try_recv() {
            if let Message::Text(text) = message {
                frames.push(GatewayFrame::parse(&text).expect("client sent malformed JSON"));
            }
        }
        frames
    }

    /// Answer Hello and Ready so the client reaches Ready.
    pub(crate) async fn handshake(&mut self, interval_ms: u64) {
        self.hello(interval_ms);
        let identify = self.next_op(2).await.expect("identify");
        assert_eq!(identify.d["token"], TEST_TOKEN);
        self.ready(1);
    }
}

pub(crate) fn started_client(
    config: GatewayConfig,
    backoff: BackoffConfig,
) -> (
    GatewayClient,
    Arc<FakeConnector>,
    mpsc::UnboundedReceiver<FakeServer>,
    broadcast::Receiver<GatewayEvent>,
) {
    let (connector, servers) = FakeConnector::new();
    let client = GatewayClient::with_connector(config, backoff, connector.clone());
    let events = client.subscribe();
    client.start();
    (client, connector, servers, events)
}

/// Wait for the first event matching `pred`.
pub(crate) async fn wait_for<F>(events: &mut broadcast::Receiver<GatewayEvent>, mut pred: F) -> GatewayEvent
where
    F: FnMut(&GatewayEvent) -> bool,
{
    loop {
        match events.recv().await {
            Ok(event) if pred(&event) => return event,
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(_)) => {}
            Err(broadcast::error::RecvError::Closed) => panic!("event channel closed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Asset uploads
// ---------------------------------------------------------------------------

/// Uploader that answers from a fixed table and records every call.
#[derive(Default)]
pub(crate) struct FakeUploader {
    responses: Mutex<HashMap<String, Result<String, u16>>>,
    calls: Mutex<Vec<String>>,
}

impl FakeUploader {
    /// Upload of `url` succeeds with `path`.
    pub(crate) fn accept(&self, url: &str, path: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Ok(path.to_string()));
    }

    /// Upload of `url` is rejected with HTTP `status`. Unlisted URLs are
    /// rejected with 404.
    pub(crate) fn reject(&self, url: &str, status: u16) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Err(status));
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssetUploader for FakeUploader {
    async fn upload(&self, url: &str) -> Result<String, AssetError> {
        self.calls.lock().unwrap().push(url.to_string());
        match self.responses.lock().unwrap().get(url).cloned() {
            Some(Ok(path)) => Ok(path),
            Some(Err(status)) => Err(AssetError::Api {
                status,
                body: "rejected".into(),
            }),
            None => Err(AssetError::Api {
                status: 404,
                body: "unknown url".into(),
            }),
        }
    }
}
