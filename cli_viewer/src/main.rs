use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};

use clap::{Parser, ValueEnum};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use swarm_view::{
    load_viewer_config, ChannelEvent, FrameSource, PollingSource, TransportKind, ViewerConfig,
    WebSocketSource,
};
use tokio::sync::mpsc::unbounded_channel;
use tracing::info;

mod app;
mod ui;

use app::ViewerApp;

#[derive(Clone)]
struct ChannelWriter {
    sender: Sender<String>,
}

impl std::io::Write for ChannelWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Ok(text) = String::from_utf8(buf.to_vec()) {
            let _ = self.sender.send(text);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum TransportArg {
    Websocket,
    Polling,
}

impl From<TransportArg> for TransportKind {
    fn from(value: TransportArg) -> Self {
        match value {
            TransportArg::Websocket => TransportKind::Websocket,
            TransportArg::Polling => TransportKind::Polling,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Terminal viewer for the team swarm simulation", long_about = None)]
struct Cli {
    /// Viewer config file. Defaults to $SWARM_VIEW_CONFIG_PATH, then the builtin config.
    #[arg(long)]
    config: Option<PathBuf>,
    /// WebSocket endpoint streaming simulation snapshots.
    #[arg(long)]
    endpoint: Option<String>,
    /// Frame transport to use.
    #[arg(long, value_enum)]
    transport: Option<TransportArg>,
    /// URL polled by the legacy polling transport.
    #[arg(long)]
    poll_url: Option<String>,
}

impl Cli {
    fn apply(&self, config: &mut ViewerConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(transport) = self.transport {
            config.transport = transport.into();
        }
        if let Some(poll_url) = &self.poll_url {
            config.poll_url = poll_url.clone();
        }
    }
}

fn frame_source(config: &ViewerConfig) -> Box<dyn FrameSource> {
    match config.transport {
        TransportKind::Websocket => Box::new(WebSocketSource::new(config.endpoint.clone())),
        TransportKind::Polling => Box::new(PollingSource::new(
            config.poll_url.clone(),
            config.poll_interval(),
        )),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let (log_tx, log_rx) = mpsc::channel::<String>();
    let log_writer_tx = log_tx.clone();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .with_writer(move || ChannelWriter {
            sender: log_writer_tx.clone(),
        })
        .init();

    let cli = Cli::parse();
    let (mut config, config_path) = load_viewer_config(cli.config.as_deref());
    cli.apply(&mut config);
    info!(
        transport = ?config.transport,
        endpoint = %config.endpoint,
        config = ?config_path,
        "Starting swarm viewer"
    );

    let source = frame_source(&config);
    let format = source.format();
    let (event_tx, event_rx) = unbounded_channel::<ChannelEvent>();
    let (outbound_tx, outbound_rx) = unbounded_channel::<String>();
    let source_handle = source.spawn(event_tx, outbound_rx);

    let ui_handle = std::thread::spawn(move || -> color_eyre::Result<()> {
        let app = ViewerApp::new(&config, format, event_rx, outbound_tx, log_rx)?;
        app.run()
    });

    let joined = tokio::task::spawn_blocking(move || ui_handle.join()).await?;
    source_handle.abort();
    match joined {
        Ok(result) => result,
        Err(_) => Err(eyre!("viewer thread panicked")),
    }
}
