#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use swarm_view::ChannelEvent;
use tokio::net::TcpListener;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

pub const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

pub const ONE_ENTITY: &str = r#"{"Entities":[{"X":10,"Y":10,"Width":5,"TeamID":0,"Active":true,"Invulnerable":false}],"TeamCount":2}"#;

pub const TWO_TEAM_ZERO: &str = r#"{"Entities":[{"X":10,"Y":10,"Width":5,"TeamID":0,"Active":true},{"X":40,"Y":20,"Width":3,"TeamID":0,"Active":true}],"Foods":null,"TeamCount":1}"#;

pub async fn next_event(events: &mut UnboundedReceiver<ChannelEvent>) -> ChannelEvent {
    tokio::time::timeout(EVENT_TIMEOUT, events.recv())
        .await
        .expect("timed out waiting for channel event")
        .expect("frame source hung up without closing")
}

pub fn text(frame: &str) -> Message {
    Message::Text(frame.to_owned().into())
}

pub fn binary(bytes: &[u8]) -> Message {
    Message::Binary(bytes.to_vec().into())
}

async fn serve(app: Router) -> anyhow::Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(addr)
}

#[derive(Clone)]
struct WsScript {
    frames: Arc<Vec<Message>>,
    expected: usize,
    received: UnboundedSender<String>,
}

/// WebSocket simulation stub served at `/ws`.
///
/// Waits for the first client message, answers with `frames`, then keeps
/// reading until `expected` messages have arrived and closes the socket.
/// Every text message received is forwarded on the returned receiver.
pub async fn spawn_ws_stub(
    frames: Vec<Message>,
    expected: usize,
) -> anyhow::Result<(String, UnboundedReceiver<String>)> {
    let (received_tx, received_rx) = unbounded_channel();
    let script = WsScript {
        frames: Arc::new(frames),
        expected,
        received: received_tx,
    };
    let app = Router::new()
        .route("/ws", get(ws_handler))
        .with_state(script);
    let addr = serve(app).await?;
    Ok((format!("ws://{addr}/ws"), received_rx))
}

async fn ws_handler(ws: WebSocketUpgrade, State(script): State<WsScript>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| run_script(socket, script))
}

async fn run_script(mut socket: WebSocket, script: WsScript) {
    let mut count = 0;
    while count < script.expected {
        match socket.recv().await {
            Some(Ok(Message::Text(text))) => {
                count += 1;
                let _ = script.received.send(text.as_str().to_owned());
                if count == 1 {
                    for frame in script.frames.iter() {
                        if socket.send(frame.clone()).await.is_err() {
                            return;
                        }
                    }
                }
            }
            Some(Ok(_)) => continue,
            _ => return,
        }
    }
    let _ = socket.send(Message::Close(None)).await;
    while let Some(Ok(_)) = socket.recv().await {}
}

/// `/simulate` endpoint answering every GET with the same JSON body.
pub async fn spawn_http_stub(body: &'static str) -> anyhow::Result<String> {
    let app = Router::new().route("/simulate", get(move || async move { body }));
    let addr = serve(app).await?;
    Ok(format!("http://{addr}/simulate"))
}

/// Request accounting for [`spawn_slow_http_stub`].
#[derive(Debug, Default)]
pub struct RequestLog {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    served: AtomicUsize,
}

impl RequestLog {
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn served(&self) -> usize {
        self.served.load(Ordering::SeqCst)
    }
}

/// `/simulate` endpoint that holds every response for `delay`.
pub async fn spawn_slow_http_stub(
    body: &'static str,
    delay: Duration,
) -> anyhow::Result<(String, Arc<RequestLog>)> {
    let log = Arc::new(RequestLog::default());
    let handler_log = Arc::clone(&log);
    let app = Router::new().route(
        "/simulate",
        get(move || {
            let log = Arc::clone(&handler_log);
            async move {
                let now = log.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                log.max_in_flight.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(delay).await;
                log.in_flight.fetch_sub(1, Ordering::SeqCst);
                log.served.fetch_add(1, Ordering::SeqCst);
                body
            }
        }),
    );
    let addr = serve(app).await?;
    Ok((format!("http://{addr}/simulate"), log))
}

/// An address nothing is listening on.
pub async fn unused_addr() -> anyhow::Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(addr)
}
