use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use color_eyre::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, MouseButton, MouseEventKind,
};
use crossterm::execute;
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::*;
use swarm_view::{
    ChannelEvent, ClientContext, ControlChannel, FrameFormat, PixelSurface, Rgb, ViewerConfig,
    Viewport,
};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{info, trace, warn};

use crate::ui::{canvas_inner, canvas_pixels, cell_to_pixel, draw_ui, UiState};

const BACKGROUND: Rgb = Rgb::new(0x10, 0x12, 0x16);
const DRAW_INTERVAL: Duration = Duration::from_millis(33);

type Context = ClientContext<UnboundedSender<String>, PixelSurface>;

pub struct ViewerApp {
    terminal: Terminal<CrosstermBackend<std::io::Stdout>>,
    ui_state: UiState,
    ctx: Context,
    events: UnboundedReceiver<ChannelEvent>,
    log_receiver: Receiver<String>,
}

impl ViewerApp {
    pub fn new(
        config: &ViewerConfig,
        format: FrameFormat,
        events: UnboundedReceiver<ChannelEvent>,
        outbound: UnboundedSender<String>,
        log_receiver: Receiver<String>,
    ) -> Result<Self> {
        let stdout = std::io::stdout();
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        crossterm::terminal::enable_raw_mode()?;
        execute!(std::io::stdout(), EnableMouseCapture)?;
        terminal.clear()?;
        terminal.hide_cursor()?;

        let channel = ControlChannel::new(outbound, format);
        let viewport = Viewport::new(0, 0, config.world_scale);
        let surface = PixelSurface::new(0, 0, config.world_scale, BACKGROUND);
        let mut ctx = ClientContext::new(channel, viewport, surface);
        let (cols, rows) = canvas_pixels(canvas_inner(terminal.size()?));
        ctx.resize(cols, rows);

        let endpoint = match format {
            FrameFormat::Snapshot => config.endpoint.clone(),
            FrameFormat::LegacyRects => config.poll_url.clone(),
        };
        Ok(Self {
            terminal,
            ui_state: UiState::new(endpoint, config.settings.clone()),
            ctx,
            events,
            log_receiver,
        })
    }

    pub fn run(mut self) -> Result<()> {
        let mut last_draw = Instant::now() - DRAW_INTERVAL;

        loop {
            while let Ok(event) = self.events.try_recv() {
                let dispatch = self.ctx.handle(event);
                trace!(?dispatch, "channel.event");
            }

            while let Ok(line) = self.log_receiver.try_recv() {
                self.ui_state.push_log(line);
            }

            if last_draw.elapsed() >= DRAW_INTERVAL {
                self.terminal
                    .draw(|frame| draw_ui(frame, &self.ctx, &self.ui_state))?;
                last_draw = Instant::now();
            }

            if event::poll(Duration::from_millis(10))? {
                match event::read()? {
                    Event::Key(key) => match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => break,
                        KeyCode::Tab | KeyCode::Down => self.ui_state.form.select_next(),
                        KeyCode::BackTab | KeyCode::Up => self.ui_state.form.select_previous(),
                        KeyCode::Char('=') | KeyCode::Char('+') | KeyCode::Right => {
                            self.ui_state.form.adjust(1)
                        }
                        KeyCode::Char('-') | KeyCode::Char('_') | KeyCode::Left => {
                            self.ui_state.form.adjust(-1)
                        }
                        KeyCode::Enter | KeyCode::Char('s') => self.submit_settings(),
                        _ => {}
                    },
                    Event::Mouse(mouse) => {
                        if mouse.kind == MouseEventKind::Down(MouseButton::Left) {
                            self.click(mouse.column, mouse.row)?;
                        }
                    }
                    Event::Resize(cols, rows) => {
                        self.fit(Rect::new(0, 0, cols, rows));
                    }
                    _ => {}
                }
            }
        }

        execute!(std::io::stdout(), DisableMouseCapture)?;
        self.terminal.show_cursor()?;
        crossterm::terminal::disable_raw_mode()?;
        Ok(())
    }

    fn click(&mut self, column: u16, row: u16) -> Result<()> {
        let inner = canvas_inner(self.terminal.size()?);
        if let Some((x, y)) = cell_to_pixel(inner, column, row) {
            self.ctx.click(x, y);
        }
        Ok(())
    }

    fn fit(&mut self, area: Rect) {
        let (cols, rows) = canvas_pixels(canvas_inner(area));
        self.ctx.resize(cols, rows);
    }

    fn submit_settings(&mut self) {
        let settings = self.ui_state.form.settings.clone();
        match self.ctx.submit_settings(&settings) {
            Ok(true) => info!(
                teams = settings.team_count,
                population = settings.population,
                "Submitted settings"
            ),
            Ok(false) => warn!("Settings not sent: channel is not open"),
            Err(err) => {
                warn!(error = %err, "Settings rejected");
                self.ui_state.push_log(format!("Settings rejected: {}", err));
            }
        }
    }
}
