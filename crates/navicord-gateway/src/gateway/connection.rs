//! Background connection driver with backoff-governed reconnects.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use navicord_common::GatewayError;
use navicord_config::schema::BackoffConfig;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use super::backoff::Backoff;
use super::handler::{handle_frame, Flow};
use super::protocol::GatewayFrame;
use super::session::Session;
use super::shared::Shared;
use super::state::ConnectionState;
use super::transport::{Connector, FrameSink, FrameStream};
use super::types::GatewayEvent;

/// How a single session ended.
enum SessionEnd {
    Shutdown,
    Ended { reached_ready: bool },
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Run sessions back to back until shutdown is requested.
pub(crate) async fn run_driver(
    shared: Arc<Shared>,
    connector: Arc<dyn Connector>,
    backoff_config: BackoffConfig,
) {
    let mut backoff = Backoff::new(&backoff_config);
    let mut attempt: u32 = 0;

    loop {
        attempt = attempt.saturating_add(1);
        let delay = backoff.current();
        shared.emit(GatewayEvent::Reconnecting { attempt, delay });
        info!(attempt, delay_secs = delay.as_secs_f64(), "Waiting before gateway connect");

        tokio::select! {
            _ = shared.shutdown.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }

        match run_session(&shared, connector.as_ref(), &mut backoff).await {
            SessionEnd::Shutdown => break,
            SessionEnd::Ended { reached_ready } => {
                if !reached_ready {
                    let next = backoff.record_failure();
                    debug!(next_delay_secs = next.as_secs_f64(), "Attempt failed before Ready");
                }
            }
        }
    }

    shared.transition(ConnectionState::Disconnected);
    info!("Gateway driver stopped");
    shared.emit(GatewayEvent::Stopped);
}

async fn open_socket(connector: &dyn Connector) -> Result<(FrameSink, FrameStream), GatewayError> {
    let url = connector.discover().await?;
    info!(url = %url.split('?').next().unwrap_or(""), "Connecting to gateway");
    connector.open(&url).await
}

/// One connection attempt: open, handshake, serve until the socket dies.
async fn run_session(
    shared: &Arc<Shared>,
    connector: &dyn Connector,
    backoff: &mut Backoff,
) -> SessionEnd {
    let session = Arc::new(Session::new(shared.next_session_id()));
    shared.transition(ConnectionState::Connecting);

    let opened = tokio::select! {
        _ = shared.shutdown.cancelled() => {
            shared.transition(ConnectionState::Disconnected);
            return SessionEnd::Shutdown;
        }
        opened = open_socket(connector) => opened,
    };
    let (sink, mut stream) = match opened {
        Ok(pair) => pair,
        Err(e) => {
            warn!(session = session.id, error = %e, "Failed to open gateway connection");
            shared.transition(ConnectionState::Disconnected);
            shared.emit(GatewayEvent::Disconnected {
                session: session.id,
                reason: e.to_string(),
            });
            return SessionEnd::Ended {
                reached_ready: false,
            };
        }
    };

    shared.install(Arc::clone(&session), sink).await;
    shared.transition(ConnectionState::AwaitingHello);

    let handshake_window = Duration::from_secs(shared.config.handshake_timeout_secs);
    let deadline = Instant::now() + handshake_window;
    let mut heartbeat: Option<JoinHandle<()>> = None;
    let mut reached_ready = false;

    let outcome: Result<(), GatewayError> = loop {
        tokio::select! {
            biased;
            _ = shared.shutdown.cancelled() => break Ok(()),
            _ = session.failed() => {
                break Err(GatewayError::Transport("session flagged as failed".into()));
            }
            _ = tokio::time::sleep_until(deadline), if !reached_ready => {
                let waiting_for = if shared.state() == ConnectionState::AwaitingHello {
                    "Hello"
                } else {
                    "Ready"
                };
                break Err(GatewayError::HandshakeTimeout(waiting_for));
            }
            message = stream.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    let frame = match GatewayFrame::parse(&text) {
                        Ok(frame) => frame,
                        Err(e) => {
                            warn!(session = session.id, error = %e, "Unparseable gateway message");
                            continue;
                        }
                    };
                    match handle_frame(shared, &session, frame, &mut heartbeat).await {
                        Flow::Continue => {}
                        Flow::Ready => {
                            reached_ready = true;
                            backoff.reset();
                            shared.emit(GatewayEvent::Ready { session: session.id });
                        }
                        Flow::EndSession(e) => break Err(e),
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    let reason = frame
                        .map(|f| format!("code {}: {}", u16::from(f.code), f.reason.as_str()))
                        .unwrap_or_else(|| "no close frame".into());
                    break Err(GatewayError::Closed(reason));
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => break Err(GatewayError::Transport(e.to_string())),
                None => break Err(GatewayError::Closed("stream ended".into())),
            },
        }
    };

    if let Some(task) = heartbeat.take() {
        task.abort();
    }
    shared.teardown(session.id).await;

    match outcome {
        Ok(()) => {
            info!(session = session.id, "Gateway session closed for shutdown");
            shared.emit(GatewayEvent::Disconnected {
                session: session.id,
                reason: "shutdown".into(),
            });
            SessionEnd::Shutdown
        }
        Err(e) => {
            warn!(
                session = session.id,
                heartbeat = ?session.heartbeat_interval(),
                error = %e,
                "Gateway session ended"
            );
            shared.emit(GatewayEvent::Disconnected {
                session: session.id,
                reason: e.to_string(),
            });
            SessionEnd::Ended { reached_ready }
        }
    }
}
