/// Stockdock Kiosk
///
/// Live NSE index cards in the terminal:
/// - Tab switches between paged and free scrolling navigation
/// - Left/right arrows or a mouse swipe change page, 1-9 jump to a page
/// - Drag with the mouse in scroll mode, release to fling
///
/// Broker and behaviour are configured through `STOCKDOCK_*` environment variables; logs go to
/// `STOCKDOCK_LOG_FILE` (default `stockdock.log`) since the terminal is taken by the UI.
use std::{
    error::Error,
    fs::OpenOptions,
    io,
    sync::Mutex,
    time::{Duration, Instant},
};

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{
        self, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
    },
};
use ratatui::{Terminal, backend::CrosstermBackend};
use stockdock_core::{KioskConfig, TransportEvent, nse_indices};
use stockdock_kiosk::{App, MqttTransport, viewport_for};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILE: &str = "stockdock.log";
const EVENT_BUFFER: usize = 1024;
const DRAW_INTERVAL: Duration = Duration::from_millis(16);
const INPUT_POLL: Duration = Duration::from_millis(5);

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_logging()?;

    let config = KioskConfig::from_env()?;
    info!(
        host = %config.feed.host,
        port = config.feed.port,
        topic = %config.feed.topic,
        mode = %config.initial_mode,
        "starting stockdock kiosk"
    );

    let (transport, mut transport_rx) = MqttTransport::new(EVENT_BUFFER);
    let (columns, rows) = terminal::size()?;
    let mut app = App::new(config, nse_indices(), transport, viewport_for(columns, rows))?;

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    app.start();

    let result = run(&mut terminal, &mut app, &mut transport_rx).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    info!("stockdock kiosk stopped");
    result
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<MqttTransport>,
    transport_rx: &mut mpsc::Receiver<TransportEvent>,
) -> Result<(), Box<dyn Error>> {
    let mut last_draw: Option<Instant> = None;

    while app.is_running() {
        while let Ok(event) = transport_rx.try_recv() {
            app.on_transport_event(event);
        }

        if event::poll(INPUT_POLL)? {
            app.on_terminal_event(event::read()?);
        }

        app.tick();

        if last_draw.is_none_or(|drawn| drawn.elapsed() >= DRAW_INTERVAL) {
            terminal.draw(|frame| app.draw(frame))?;
            last_draw = Some(Instant::now());
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    Ok(())
}

/// Initialize logging to a file, the terminal being owned by the UI.
fn init_logging() -> Result<(), Box<dyn Error>> {
    let path =
        std::env::var("STOCKDOCK_LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
