use swarm_proto::{ControlMessage, DecodeError, Settings, SettingsError, Snapshot};
use tracing::{info, warn};

use crate::channel::{ChannelEvent, ChannelState, ControlChannel, ControlSink};
use crate::classify::classify;
use crate::render::{OverlayStats, SceneRenderer};
use crate::surface::Surface;
use crate::viewport::Viewport;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub rendered: u64,
    pub dropped_decode: u64,
    pub rejected_protocol: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Opened,
    Rendered,
    Dropped,
    Rejected,
    Errored,
    Closed,
    Ignored,
}

/// Everything the viewer owns, driven from a single event loop.
///
/// Channel events, pointer clicks, host resizes and settings submissions all
/// enter through `&mut self`, so a render pass always completes before the
/// next event is looked at.
pub struct ClientContext<S, T> {
    channel: ControlChannel<S>,
    viewport: Viewport,
    renderer: SceneRenderer,
    surface: T,
    stats: FrameStats,
    overlay: Option<OverlayStats>,
    last_error: Option<String>,
}

impl<S: ControlSink, T: Surface> ClientContext<S, T> {
    pub fn new(channel: ControlChannel<S>, viewport: Viewport, surface: T) -> Self {
        Self {
            channel,
            viewport,
            renderer: SceneRenderer::new(),
            surface,
            stats: FrameStats::default(),
            overlay: None,
            last_error: None,
        }
    }

    pub fn handle(&mut self, event: ChannelEvent) -> Dispatch {
        match event {
            ChannelEvent::Opened => {
                if self.channel.on_open() {
                    let resize = self.viewport.resize_message();
                    self.channel.send(&resize);
                    Dispatch::Opened
                } else {
                    Dispatch::Ignored
                }
            }
            ChannelEvent::Frame(payload) => {
                let received = self.channel.receive(&payload);
                self.handle_frame(received)
            }
            ChannelEvent::BinaryFrame(payload) => {
                let received = self.channel.receive_bytes(&payload);
                self.handle_frame(received)
            }
            ChannelEvent::Error(err) => {
                self.channel.on_error(&err);
                self.last_error = Some(err.to_string());
                Dispatch::Errored
            }
            ChannelEvent::Closed => {
                self.channel.on_close();
                Dispatch::Closed
            }
        }
    }

    fn handle_frame(&mut self, received: Result<Option<Snapshot>, DecodeError>) -> Dispatch {
        let snapshot = match received {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return Dispatch::Ignored,
            Err(_) => {
                self.stats.dropped_decode += 1;
                return Dispatch::Dropped;
            }
        };
        let classified = match classify(&snapshot) {
            Ok(classified) => classified,
            Err(violation) => {
                warn!(
                    target: "swarm_view::client",
                    error = %violation,
                    "frame.rejected=protocol_violation"
                );
                self.stats.rejected_protocol += 1;
                return Dispatch::Rejected;
            }
        };
        let overlay = self.renderer.render(&mut self.surface, &classified);
        self.overlay = Some(overlay);
        self.stats.rendered += 1;
        Dispatch::Rendered
    }

    /// Send a click at a host pixel position.
    pub fn click(&mut self, pixel_col: f64, pixel_row: f64) -> bool {
        let (x, y) = self.viewport.to_surface(pixel_col, pixel_row);
        info!(target: "swarm_view::client", x, y, "Canvas clicked");
        self.channel.send(&ControlMessage::Click { x, y })
    }

    /// Refit the surface to a host area in pixels and announce the new size.
    pub fn resize(&mut self, pixel_cols: u32, pixel_rows: u32) -> bool {
        let message = self.viewport.fit(&mut self.surface, pixel_cols, pixel_rows);
        self.channel.send(&message)
    }

    pub fn submit_settings(&mut self, settings: &Settings) -> Result<bool, SettingsError> {
        settings.validate()?;
        Ok(self
            .channel
            .send(&ControlMessage::Settings(settings.clone())))
    }

    pub fn state(&self) -> ChannelState {
        self.channel.state()
    }

    pub fn channel(&self) -> &ControlChannel<S> {
        &self.channel
    }

    pub fn surface(&self) -> &T {
        &self.surface
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn overlay(&self) -> Option<&OverlayStats> {
        self.overlay.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
