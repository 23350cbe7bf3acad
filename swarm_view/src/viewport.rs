use swarm_proto::ControlMessage;

use crate::surface::Surface;

/// Tracks the drawing surface dimensions against the host display.
///
/// The host reports its size in pixels; the surface is sized in surface units
/// (`pixels * scale`), which is what the simulation lays entities out in.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    width: u32,
    height: u32,
    scale: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32, scale: f64) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        };
        Self {
            width,
            height,
            scale,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn resize_message(&self) -> ControlMessage {
        ControlMessage::Resize {
            width: self.width,
            height: self.height,
        }
    }

    /// Resize the surface to cover a host area of `pixel_cols` x `pixel_rows`,
    /// clear it, and return the resize message announcing the new size.
    pub fn fit<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        pixel_cols: u32,
        pixel_rows: u32,
    ) -> ControlMessage {
        self.width = (f64::from(pixel_cols) * self.scale).round() as u32;
        self.height = (f64::from(pixel_rows) * self.scale).round() as u32;
        surface.resize(self.width, self.height);
        surface.clear();
        tracing::debug!(
            target: "swarm_view::viewport",
            width = self.width,
            height = self.height,
            "viewport.resized"
        );
        self.resize_message()
    }

    /// Map a host pixel position to surface coordinates.
    pub fn to_surface(&self, pixel_col: f64, pixel_row: f64) -> (f64, f64) {
        (pixel_col * self.scale, pixel_row * self.scale)
    }
}
