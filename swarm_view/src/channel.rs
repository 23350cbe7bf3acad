//! Control channel state machine.
//!
//! `Connecting -> Open -> Closed`. Errors are reported without changing
//! state; `Closed` is terminal. Transports feed [`ChannelEvent`]s in and
//! drain encoded control messages out through a [`ControlSink`].

use swarm_proto::{
    decode_legacy_rects_json, decode_snapshot_bytes, decode_snapshot_json, encode_control_json,
};
use swarm_proto::{ControlMessage, DecodeError, Snapshot};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Connecting,
    Open,
    Closed,
}

impl ChannelState {
    pub fn label(self) -> &'static str {
        match self {
            ChannelState::Connecting => "connecting",
            ChannelState::Open => "open",
            ChannelState::Closed => "closed",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("failed to connect to {endpoint}: {reason}")]
    Connect { endpoint: String, reason: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("outbound queue is gone")]
    SinkClosed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Opened,
    Frame(String),
    BinaryFrame(Vec<u8>),
    Error(ConnectionError),
    Closed,
}

/// Payload layout of inbound frames for a given transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameFormat {
    #[default]
    Snapshot,
    LegacyRects,
}

impl FrameFormat {
    pub fn decode(self, payload: &str) -> Result<Snapshot, DecodeError> {
        match self {
            FrameFormat::Snapshot => decode_snapshot_json(payload),
            FrameFormat::LegacyRects => {
                decode_legacy_rects_json(payload).map(|rects| Snapshot::from_legacy(&rects))
            }
        }
    }

    pub fn decode_bytes(self, payload: &[u8]) -> Result<Snapshot, DecodeError> {
        match self {
            FrameFormat::Snapshot => decode_snapshot_bytes(payload),
            FrameFormat::LegacyRects => {
                let text = std::str::from_utf8(payload).map_err(|_| DecodeError::NotText)?;
                self.decode(text)
            }
        }
    }
}

/// Outbound half of a transport. Delivery is fire-and-forget.
pub trait ControlSink {
    fn transmit(&mut self, text: String) -> Result<(), ConnectionError>;
}

impl ControlSink for UnboundedSender<String> {
    fn transmit(&mut self, text: String) -> Result<(), ConnectionError> {
        self.send(text).map_err(|_| ConnectionError::SinkClosed)
    }
}

impl ControlSink for Vec<String> {
    fn transmit(&mut self, text: String) -> Result<(), ConnectionError> {
        self.push(text);
        Ok(())
    }
}

#[derive(Debug)]
pub struct ControlChannel<S> {
    state: ChannelState,
    format: FrameFormat,
    sink: S,
}

impl<S: ControlSink> ControlChannel<S> {
    pub fn new(sink: S, format: FrameFormat) -> Self {
        Self {
            state: ChannelState::Connecting,
            format,
            sink,
        }
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Returns `true` when the channel transitioned to `Open`.
    pub fn on_open(&mut self) -> bool {
        match self.state {
            ChannelState::Connecting => {
                self.state = ChannelState::Open;
                info!(target: "swarm_view::channel", "channel.state=open");
                true
            }
            ChannelState::Open => false,
            ChannelState::Closed => {
                warn!(target: "swarm_view::channel", "channel.open_ignored=closed");
                false
            }
        }
    }

    /// Decode one inbound frame. Malformed frames are logged and dropped.
    pub fn receive(&mut self, payload: &str) -> Result<Option<Snapshot>, DecodeError> {
        self.accept(payload.len(), |format| format.decode(payload))
    }

    /// Same as [`ControlChannel::receive`] for binary frames; non-UTF-8
    /// payloads fail with [`DecodeError::NotText`].
    pub fn receive_bytes(&mut self, payload: &[u8]) -> Result<Option<Snapshot>, DecodeError> {
        self.accept(payload.len(), |format| format.decode_bytes(payload))
    }

    fn accept(
        &mut self,
        bytes: usize,
        decode: impl FnOnce(FrameFormat) -> Result<Snapshot, DecodeError>,
    ) -> Result<Option<Snapshot>, DecodeError> {
        if self.state == ChannelState::Closed {
            debug!(target: "swarm_view::channel", "frame.dropped=closed");
            return Ok(None);
        }
        match decode(self.format) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(err) => {
                warn!(
                    target: "swarm_view::channel",
                    error = %err,
                    bytes,
                    "frame.dropped=decode_error"
                );
                Err(err)
            }
        }
    }

    pub fn on_error(&mut self, err: &ConnectionError) {
        warn!(
            target: "swarm_view::channel",
            state = self.state.label(),
            error = %err,
            "channel.error"
        );
    }

    pub fn on_close(&mut self) {
        if self.state != ChannelState::Closed {
            self.state = ChannelState::Closed;
            info!(target: "swarm_view::channel", "channel.state=closed");
        }
    }

    /// Encode and transmit a control message. Returns `false` when the message
    /// was not handed to the transport.
    pub fn send(&mut self, message: &ControlMessage) -> bool {
        if self.state != ChannelState::Open {
            debug!(
                target: "swarm_view::channel",
                kind = message.kind(),
                state = self.state.label(),
                "command.dropped=not_open"
            );
            return false;
        }
        let text = match encode_control_json(message) {
            Ok(text) => text,
            Err(err) => {
                warn!(
                    target: "swarm_view::channel",
                    kind = message.kind(),
                    error = %err,
                    "command.encode_failed"
                );
                return false;
            }
        };
        match self.sink.transmit(text) {
            Ok(()) => {
                info!(target: "swarm_view::channel", ?message, "command.sent");
                true
            }
            Err(err) => {
                warn!(
                    target: "swarm_view::channel",
                    kind = message.kind(),
                    error = %err,
                    "command.dropped=sink_error"
                );
                false
            }
        }
    }
}
