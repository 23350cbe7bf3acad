//! Snapshot interpretation, rendering and control plumbing for the swarm viewer.

pub mod channel;
pub mod classify;
pub mod client;
pub mod color;
pub mod config;
pub mod render;
pub mod source;
pub mod surface;
pub mod viewport;

pub use channel::{
    ChannelEvent, ChannelState, ConnectionError, ControlChannel, ControlSink, FrameFormat,
};
pub use classify::{classify, ClassifiedSnapshot, ProtocolViolation, TeamEntity};
pub use client::{ClientContext, Dispatch, FrameStats};
pub use color::{color_for, hsl_to_rgb, team_hue, ColorState, Rgb};
pub use config::{load_viewer_config, TransportKind, ViewerConfig, ViewerConfigError};
pub use render::{OverlayStats, SceneRenderer, TeamStat};
pub use source::{FrameSource, PollingSource, WebSocketSource};
pub use surface::{DrawCommand, PixelSurface, RecordingSurface, Surface, TextLabel};
pub use viewport::Viewport;
