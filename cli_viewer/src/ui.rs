use std::collections::VecDeque;

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Margin};
use ratatui::prelude::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget, Wrap};
use ratatui::Frame;

use swarm_proto::Settings;
use swarm_view::{ChannelState, ClientContext, ControlSink, PixelSurface, Rgb, TextLabel};

const SETTINGS_FIELDS: [&str; 7] = [
    "TeamCount",
    "Population",
    "FoodCount",
    "MinSize",
    "StartMaxSize",
    "MaxSize",
    "BaseSpeed",
];

/// Terminal-side editor for the settings message.
#[derive(Debug, Clone)]
pub struct SettingsForm {
    pub settings: Settings,
    pub selected: usize,
}

impl SettingsForm {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            selected: 0,
        }
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % SETTINGS_FIELDS.len();
    }

    pub fn select_previous(&mut self) {
        self.selected = (self.selected + SETTINGS_FIELDS.len() - 1) % SETTINGS_FIELDS.len();
    }

    pub fn adjust(&mut self, steps: i32) {
        let s = &mut self.settings;
        match self.selected {
            0 => s.team_count = step_count(s.team_count, steps, 1),
            1 => s.population = step_count(s.population, steps, 5),
            2 => s.food_count = step_count(s.food_count, steps, 10),
            3 => s.min_size = step_real(s.min_size, steps, 1.0),
            4 => s.start_max_size = step_real(s.start_max_size, steps, 1.0),
            5 => s.max_size = step_real(s.max_size, steps, 1.0),
            _ => s.base_speed = step_real(s.base_speed, steps, 1.0),
        }
    }

    fn values(&self) -> [String; 7] {
        let s = &self.settings;
        [
            s.team_count.to_string(),
            s.population.to_string(),
            s.food_count.to_string(),
            format!("{:.1}", s.min_size),
            format!("{:.1}", s.start_max_size),
            format!("{:.1}", s.max_size),
            format!("{:.1}", s.base_speed),
        ]
    }
}

fn step_count(value: u32, steps: i32, step: u32) -> u32 {
    let delta = step.saturating_mul(steps.unsigned_abs());
    if steps >= 0 {
        value.saturating_add(delta)
    } else {
        value.saturating_sub(delta)
    }
}

fn step_real(value: f64, steps: i32, step: f64) -> f64 {
    (value + f64::from(steps) * step).max(0.0)
}

pub struct UiState {
    pub logs: VecDeque<String>,
    pub max_logs: usize,
    pub form: SettingsForm,
    pub endpoint: String,
}

impl UiState {
    pub fn new(endpoint: String, settings: Settings) -> Self {
        Self {
            logs: VecDeque::new(),
            max_logs: 8,
            form: SettingsForm::new(settings),
            endpoint,
        }
    }

    pub fn push_log<S: Into<String>>(&mut self, line: S) {
        let mut text: String = line.into();
        while text.ends_with('\n') || text.ends_with('\r') {
            text.pop();
        }
        if text.is_empty() {
            return;
        }
        self.logs.push_front(text);
        while self.logs.len() > self.max_logs {
            self.logs.pop_back();
        }
    }
}

pub struct UiLayout {
    pub header: Rect,
    pub canvas: Rect,
    pub stats: Rect,
    pub settings: Rect,
    pub logs: Rect,
}

pub fn layout(area: Rect) -> UiLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(7),
        ])
        .split(area);
    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(32)])
        .split(rows[1]);
    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(4), Constraint::Length(11)])
        .split(middle[1]);
    UiLayout {
        header: rows[0],
        canvas: middle[0],
        stats: side[0],
        settings: side[1],
        logs: rows[2],
    }
}

/// Cells available for the scene inside the canvas border.
pub fn canvas_inner(area: Rect) -> Rect {
    layout(area).canvas.inner(&Margin {
        vertical: 1,
        horizontal: 1,
    })
}

/// Each terminal cell shows two vertically stacked pixels.
pub fn canvas_pixels(inner: Rect) -> (u32, u32) {
    (u32::from(inner.width), u32::from(inner.height) * 2)
}

/// Pixel position at the center of the upper half of a terminal cell, if the
/// cell lies on the canvas.
pub fn cell_to_pixel(inner: Rect, column: u16, row: u16) -> Option<(f64, f64)> {
    if column < inner.x || row < inner.y || column >= inner.right() || row >= inner.bottom() {
        return None;
    }
    let col = f64::from(column - inner.x) + 0.5;
    let pixel_row = f64::from(row - inner.y) * 2.0 + 0.5;
    Some((col, pixel_row))
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

/// Half-block presentation of a pixel surface with its text labels on top.
struct SurfaceView<'a> {
    surface: &'a PixelSurface,
}

impl Widget for SurfaceView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let background = self.surface.background();
        for dy in 0..area.height {
            for dx in 0..area.width {
                let col = usize::from(dx);
                let top = self
                    .surface
                    .pixel(col, usize::from(dy) * 2)
                    .unwrap_or(background);
                let bottom = self
                    .surface
                    .pixel(col, usize::from(dy) * 2 + 1)
                    .unwrap_or(background);
                buf.get_mut(area.x + dx, area.y + dy)
                    .set_symbol("▀")
                    .set_fg(to_color(top))
                    .set_bg(to_color(bottom));
            }
        }

        let labels = self.surface.labels();
        let cells = label_cells(labels, self.surface.scale());
        for (label, (col, row)) in labels.iter().zip(cells) {
            if col >= area.width || row >= area.height {
                continue;
            }
            let x = area.x + col;
            let y = area.y + row;
            let width = usize::from(area.right() - x);
            buf.set_stringn(
                x,
                y,
                &label.text,
                width,
                Style::default()
                    .fg(to_color(label.color))
                    .bg(to_color(background))
                    .add_modifier(Modifier::BOLD),
            );
        }
    }
}

/// Cell position of each label. Labels keep their order and never share a
/// row with the label before them, even when the scale squeezes their
/// surface spacing below one cell.
fn label_cells(labels: &[TextLabel], scale: f64) -> Vec<(u16, u16)> {
    let mut previous_row: Option<u16> = None;
    labels
        .iter()
        .map(|label| {
            let col = (label.x / scale).max(0.0) as u16;
            let mut row = (label.y / scale / 2.0).max(0.0) as u16;
            if let Some(previous) = previous_row {
                row = row.max(previous.saturating_add(1));
            }
            previous_row = Some(row);
            (col, row)
        })
        .collect()
}

pub fn draw_ui<S: ControlSink>(
    frame: &mut Frame,
    ctx: &ClientContext<S, PixelSurface>,
    state: &UiState,
) {
    let areas = layout(frame.size());

    draw_header(frame, areas.header, ctx, state);
    draw_canvas(frame, areas.canvas, ctx);
    draw_stats(frame, areas.stats, ctx);
    draw_settings(frame, areas.settings, state);
    draw_logs(frame, areas.logs, state);
}

fn draw_header<S: ControlSink>(
    frame: &mut Frame,
    area: Rect,
    ctx: &ClientContext<S, PixelSurface>,
    state: &UiState,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Swarm Viewer");
    let status = match ctx.state() {
        ChannelState::Connecting => Span::styled("connecting", Style::default().fg(Color::Yellow)),
        ChannelState::Open => Span::styled("open", Style::default().fg(Color::Green)),
        ChannelState::Closed => Span::styled(
            "disconnected",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
    };
    let mut spans = vec![status, Span::raw(format!(" {}", state.endpoint))];
    if let Some(err) = ctx.last_error() {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(err.to_string(), Style::default().fg(Color::Red)));
    }
    spans.push(Span::raw(" | click: send click | q: exit"));
    let text = Paragraph::new(Line::from(spans)).wrap(Wrap { trim: true });
    frame.render_widget(block, area);
    frame.render_widget(
        text,
        area.inner(&Margin {
            vertical: 1,
            horizontal: 1,
        }),
    );
}

fn draw_canvas<S: ControlSink>(
    frame: &mut Frame,
    area: Rect,
    ctx: &ClientContext<S, PixelSurface>,
) {
    let (width, height) = ctx.viewport().dimensions();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Simulation {}x{}", width, height));
    frame.render_widget(block, area);
    frame.render_widget(
        SurfaceView {
            surface: ctx.surface(),
        },
        area.inner(&Margin {
            vertical: 1,
            horizontal: 1,
        }),
    );
}

fn draw_stats<S: ControlSink>(frame: &mut Frame, area: Rect, ctx: &ClientContext<S, PixelSurface>) {
    let mut rows = Vec::new();
    if let Some(overlay) = ctx.overlay() {
        rows.push(Row::new(vec![
            Cell::from(""),
            Cell::from("Active"),
            Cell::from(overlay.active_total.to_string()),
        ]));
        for stat in &overlay.teams {
            rows.push(Row::new(vec![
                Cell::from(Span::styled("██", Style::default().fg(to_color(stat.color)))),
                Cell::from(format!("Team {}", stat.team)),
                Cell::from(stat.count.to_string()),
            ]));
        }
    } else {
        rows.push(Row::new(vec![
            Cell::from(""),
            Cell::from("waiting for frames"),
            Cell::from(""),
        ]));
    }

    let frames = ctx.stats();
    rows.push(Row::new(vec![Cell::from(""), Cell::from(""), Cell::from("")]));
    for (label, value) in [
        ("Rendered", frames.rendered),
        ("Dropped", frames.dropped_decode),
        ("Rejected", frames.rejected_protocol),
    ] {
        rows.push(
            Row::new(vec![
                Cell::from(""),
                Cell::from(label),
                Cell::from(value.to_string()),
            ])
            .style(Style::default().fg(Color::DarkGray)),
        );
    }

    let table = Table::new(
        rows,
        [
            Constraint::Length(2),
            Constraint::Min(10),
            Constraint::Length(8),
        ],
    )
    .block(Block::default().borders(Borders::ALL).title("Teams"));
    frame.render_widget(table, area);
}

fn draw_settings(frame: &mut Frame, area: Rect, state: &UiState) {
    let values = state.form.values();
    let mut lines: Vec<Line> = SETTINGS_FIELDS
        .iter()
        .zip(values.iter())
        .enumerate()
        .map(|(index, (name, value))| {
            let style = if index == state.form.selected {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!("{:<13}", name), style),
                Span::styled(format!("{:>8}", value), style),
            ])
        })
        .collect();
    lines.push(Line::from(Span::styled(
        "tab/+/- edit, enter send",
        Style::default().fg(Color::DarkGray),
    )));
    let block = Block::default().borders(Borders::ALL).title("Settings");
    let paragraph = Paragraph::new(lines);
    frame.render_widget(block, area);
    frame.render_widget(
        paragraph,
        area.inner(&Margin {
            vertical: 1,
            horizontal: 1,
        }),
    );
}

fn draw_logs(frame: &mut Frame, area: Rect, state: &UiState) {
    let block = Block::default().borders(Borders::ALL).title("Logs");
    let lines: Vec<Line> = state
        .logs
        .iter()
        .map(|entry| Line::from(Span::raw(entry)))
        .collect();
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(block, area);
    frame.render_widget(
        paragraph,
        area.inner(&Margin {
            vertical: 1,
            horizontal: 1,
        }),
    );
}
