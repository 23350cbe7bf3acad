//! Transports that feed frames into the control channel.
//!
//! Every source runs as one task that reports [`ChannelEvent`]s in arrival
//! order and drains encoded control messages from the outbound queue.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info};

use crate::channel::{ChannelEvent, ConnectionError, FrameFormat};

pub trait FrameSource: Send + 'static {
    fn format(&self) -> FrameFormat;

    fn spawn(
        self: Box<Self>,
        events: UnboundedSender<ChannelEvent>,
        outbound: UnboundedReceiver<String>,
    ) -> JoinHandle<()>;
}

/// Push transport: a persistent WebSocket. There is no reconnect.
#[derive(Debug, Clone)]
pub struct WebSocketSource {
    endpoint: String,
}

impl WebSocketSource {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

impl FrameSource for WebSocketSource {
    fn format(&self) -> FrameFormat {
        FrameFormat::Snapshot
    }

    fn spawn(
        self: Box<Self>,
        events: UnboundedSender<ChannelEvent>,
        outbound: UnboundedReceiver<String>,
    ) -> JoinHandle<()> {
        tokio::spawn(run_websocket(self.endpoint, events, outbound))
    }
}

async fn run_websocket(
    endpoint: String,
    events: UnboundedSender<ChannelEvent>,
    mut outbound: UnboundedReceiver<String>,
) {
    info!(target: "swarm_view::source", %endpoint, "Connecting to simulation");
    let stream = match connect_async(endpoint.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(err) => {
            let _ = events.send(ChannelEvent::Error(ConnectionError::Connect {
                endpoint,
                reason: err.to_string(),
            }));
            let _ = events.send(ChannelEvent::Closed);
            return;
        }
    };
    if events.send(ChannelEvent::Opened).is_err() {
        return;
    }

    let (mut ws_tx, mut ws_rx) = stream.split();
    loop {
        tokio::select! {
            incoming = ws_rx.next() => {
                let event = match incoming {
                    Some(Ok(Message::Text(text))) => ChannelEvent::Frame(text),
                    Some(Ok(Message::Binary(bytes))) => ChannelEvent::BinaryFrame(bytes),
                    Some(Ok(Message::Close(frame))) => {
                        debug!(target: "swarm_view::source", ?frame, "websocket.close_frame");
                        let _ = events.send(ChannelEvent::Closed);
                        break;
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(err)) => {
                        let _ = events.send(ChannelEvent::Error(ConnectionError::Transport(
                            err.to_string(),
                        )));
                        let _ = events.send(ChannelEvent::Closed);
                        break;
                    }
                    None => {
                        let _ = events.send(ChannelEvent::Closed);
                        break;
                    }
                };
                if events.send(event).is_err() {
                    break;
                }
            }
            command = outbound.recv() => match command {
                Some(text) => {
                    if let Err(err) = ws_tx.send(Message::Text(text)).await {
                        let _ = events.send(ChannelEvent::Error(ConnectionError::Transport(
                            err.to_string(),
                        )));
                    }
                }
                None => {
                    let _ = ws_tx.close().await;
                    let _ = events.send(ChannelEvent::Closed);
                    break;
                }
            }
        }
    }
    debug!(target: "swarm_view::source", "websocket.task_finished");
}

/// Legacy pull transport: periodic GET of a rectangle list.
///
/// One request is in flight at a time; ticks that elapse during a slow
/// response are skipped. Control messages have no route back through this
/// transport and are dropped.
#[derive(Debug, Clone)]
pub struct PollingSource {
    url: String,
    interval: Duration,
}

impl PollingSource {
    pub fn new(url: impl Into<String>, interval: Duration) -> Self {
        Self {
            url: url.into(),
            interval: interval.max(Duration::from_millis(1)),
        }
    }
}

impl FrameSource for PollingSource {
    fn format(&self) -> FrameFormat {
        FrameFormat::LegacyRects
    }

    fn spawn(
        self: Box<Self>,
        events: UnboundedSender<ChannelEvent>,
        outbound: UnboundedReceiver<String>,
    ) -> JoinHandle<()> {
        tokio::spawn(run_polling(self.url, self.interval, events, outbound))
    }
}

async fn run_polling(
    url: String,
    interval: Duration,
    events: UnboundedSender<ChannelEvent>,
    mut outbound: UnboundedReceiver<String>,
) {
    info!(target: "swarm_view::source", %url, ?interval, "Polling simulation");
    let client = reqwest::Client::new();
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut opened = false;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let delivered = match fetch_frame(&client, &url).await {
                    Ok(body) => {
                        if !opened {
                            opened = true;
                            let _ = events.send(ChannelEvent::Opened);
                        }
                        events.send(ChannelEvent::Frame(body))
                    }
                    Err(err) => events.send(ChannelEvent::Error(err)),
                };
                if delivered.is_err() {
                    break;
                }
            }
            command = outbound.recv() => match command {
                Some(text) => {
                    debug!(
                        target: "swarm_view::source",
                        bytes = text.len(),
                        "command.dropped=polling_transport"
                    );
                }
                None => {
                    let _ = events.send(ChannelEvent::Closed);
                    break;
                }
            }
        }
    }
}

async fn fetch_frame(client: &reqwest::Client, url: &str) -> Result<String, ConnectionError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|err| ConnectionError::Transport(err.to_string()))?;
    if !response.status().is_success() {
        return Err(ConnectionError::Transport(format!(
            "HTTP {} from {}",
            response.status(),
            url
        )));
    }
    response
        .text()
        .await
        .map_err(|err| ConnectionError::Transport(err.to_string()))
}
