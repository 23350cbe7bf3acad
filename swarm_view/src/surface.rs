//! Drawing surfaces the scene renderer paints onto.
//!
//! All coordinates are surface units, i.e. the coordinate space the
//! simulation positions entities in.

use crate::color::Rgb;

pub trait Surface {
    /// Current width and height in surface units.
    fn size(&self) -> (u32, u32);
    fn resize(&mut self, width: u32, height: u32);
    fn clear(&mut self);
    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Rgb);
    /// Diamond with vertices at `(x, y ± half_diagonal)` and `(x ± half_diagonal, y)`.
    fn fill_diamond(&mut self, x: f64, y: f64, half_diagonal: f64, color: Rgb);
    fn fill_text(&mut self, text: &str, x: f64, y: f64, color: Rgb);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Circle {
        x: f64,
        y: f64,
        radius: f64,
        color: Rgb,
    },
    Diamond {
        x: f64,
        y: f64,
        half_diagonal: f64,
        color: Rgb,
    },
    Text {
        text: String,
        x: f64,
        y: f64,
        color: Rgb,
    },
}

/// Surface that keeps the ordered draw commands issued since the last clear.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Rgb) {
        self.commands.push(DrawCommand::Circle {
            x,
            y,
            radius,
            color,
        });
    }

    fn fill_diamond(&mut self, x: f64, y: f64, half_diagonal: f64, color: Rgb) {
        self.commands.push(DrawCommand::Diamond {
            x,
            y,
            half_diagonal,
            color,
        });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, color: Rgb) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
            color,
        });
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub color: Rgb,
}

/// Raster surface. One pixel covers `scale` surface units on each axis.
///
/// Text is not rasterized; labels are kept with their surface position so a
/// presenter can place them on top of the pixels.
#[derive(Debug, Clone)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    scale: f64,
    cols: usize,
    rows: usize,
    background: Rgb,
    pixels: Vec<Rgb>,
    labels: Vec<TextLabel>,
}

impl PixelSurface {
    pub fn new(width: u32, height: u32, scale: f64, background: Rgb) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        };
        let mut surface = Self {
            width: 0,
            height: 0,
            scale,
            cols: 0,
            rows: 0,
            background,
            pixels: Vec::new(),
            labels: Vec::new(),
        };
        surface.resize(width, height);
        surface
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Pixel grid dimensions as `(cols, rows)`.
    pub fn pixel_dims(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    pub fn pixel(&self, col: usize, row: usize) -> Option<Rgb> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.pixels.get(row * self.cols + col).copied()
    }

    pub fn labels(&self) -> &[TextLabel] {
        &self.labels
    }

    pub fn background(&self) -> Rgb {
        self.background
    }

    fn pixel_center(&self, index: usize) -> f64 {
        (index as f64 + 0.5) * self.scale
    }

    fn pixel_span(&self, low: f64, high: f64, limit: usize) -> std::ops::Range<usize> {
        let start = (low / self.scale).floor().max(0.0) as usize;
        let end = ((high / self.scale).ceil().max(0.0) as usize).min(limit);
        start.min(end)..end
    }

    fn set(&mut self, col: usize, row: usize, color: Rgb) {
        if col < self.cols && row < self.rows {
            self.pixels[row * self.cols + col] = color;
        }
    }

    /// Paint every pixel whose center satisfies `inside`, and always the pixel
    /// holding the shape's center so sub-pixel shapes stay visible.
    fn fill_shape(
        &mut self,
        x: f64,
        y: f64,
        extent: f64,
        color: Rgb,
        inside: impl Fn(f64, f64) -> bool,
    ) {
        if !(x.is_finite() && y.is_finite() && extent.is_finite()) || extent < 0.0 {
            return;
        }
        let cols = self.pixel_span(x - extent, x + extent, self.cols);
        let rows = self.pixel_span(y - extent, y + extent, self.rows);
        for row in rows {
            let dy = self.pixel_center(row) - y;
            for col in cols.clone() {
                let dx = self.pixel_center(col) - x;
                if inside(dx, dy) {
                    self.set(col, row, color);
                }
            }
        }
        if x >= 0.0 && y >= 0.0 {
            self.set(
                (x / self.scale) as usize,
                (y / self.scale) as usize,
                color,
            );
        }
    }
}

impl Surface for PixelSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.cols = (f64::from(width) / self.scale).ceil() as usize;
        self.rows = (f64::from(height) / self.scale).ceil() as usize;
        self.pixels = vec![self.background; self.cols * self.rows];
        self.labels.clear();
    }

    fn clear(&mut self) {
        self.pixels.fill(self.background);
        self.labels.clear();
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Rgb) {
        let r2 = radius * radius;
        self.fill_shape(x, y, radius, color, |dx, dy| dx * dx + dy * dy <= r2);
    }

    fn fill_diamond(&mut self, x: f64, y: f64, half_diagonal: f64, color: Rgb) {
        self.fill_shape(x, y, half_diagonal, color, |dx, dy| {
            dx.abs() + dy.abs() <= half_diagonal
        });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, color: Rgb) {
        self.labels.push(TextLabel {
            text: text.to_string(),
            x,
            y,
            color,
        });
    }
}
