//! Kiosk application state: owns the core components and translates terminal input, transport
//! events and elapsed time into core operations on one loop.

use std::time::{Duration, Instant};

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::Frame;
use stockdock_core::{
    Catalog, ConfigError, FeedSession, FeedTransport, KioskConfig, NavigationMode, Navigator,
    QuoteRegistry, TimerQueue, TransportEvent, Viewport,
};
use tracing::{debug, info};

use crate::surface::{TerminalSurface, cells_to_px, viewport_for};

/// User intent decoded from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    ToggleMode,
    NextPage,
    PreviousPage,
    /// Zero based page index
    GoToPage(usize),
}

/// Decode a key press, ignoring repeats and releases.
pub fn command_for(key: KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Command::Quit),
        KeyCode::Tab => Some(Command::ToggleMode),
        KeyCode::Right => Some(Command::NextPage),
        KeyCode::Left => Some(Command::PreviousPage),
        KeyCode::Char(digit @ '1'..='9') => Some(Command::GoToPage(digit as usize - '1' as usize)),
        _ => None,
    }
}

#[derive(Debug)]
pub struct App<T> {
    session: FeedSession<T>,
    navigator: Navigator,
    quotes: QuoteRegistry,
    timers: TimerQueue,
    surface: TerminalSurface,
    initial_mode: NavigationMode,
    started: Instant,
    running: bool,
}

impl<T> App<T>
where
    T: FeedTransport,
{
    pub fn new(
        config: KioskConfig,
        catalog: Catalog,
        transport: T,
        viewport: Viewport,
    ) -> Result<Self, ConfigError> {
        catalog.keys.validate(&catalog.layout)?;

        let page_count = catalog.layout.page_count();
        Ok(Self {
            session: FeedSession::new(config.feed, catalog.keys, transport),
            navigator: Navigator::new(page_count, viewport, config.physics, config.paging),
            quotes: QuoteRegistry::from_layout(&catalog.layout),
            timers: TimerQueue::new(),
            surface: TerminalSurface::new(page_count),
            initial_mode: config.initial_mode,
            started: Instant::now(),
            running: true,
        })
    }

    /// Paint the initial deck and schedule the first connection attempt.
    pub fn start(&mut self) {
        self.navigator.present(
            self.initial_mode,
            &mut self.quotes,
            &mut self.timers,
            &mut self.surface,
        );
        self.session.schedule_start(&mut self.timers);
        info!(
            mode = %self.navigator.mode(),
            cards = self.quotes.len(),
            "kiosk started"
        );
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn session(&self) -> &FeedSession<T> {
        &self.session
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn surface(&self) -> &TerminalSurface {
        &self.surface
    }

    pub fn on_transport_event(&mut self, event: TransportEvent) {
        let report = self.session.on_event(
            event,
            &mut self.timers,
            &mut self.quotes,
            &mut self.surface,
        );
        if let Some(report) = report {
            debug!(
                applied = report.applied,
                unknown = report.unknown,
                incomplete = report.incomplete,
                "feed message applied"
            );
        }
    }

    pub fn on_terminal_event(&mut self, event: Event) {
        let at = self.started.elapsed();
        self.on_terminal_event_at(event, at);
    }

    fn on_terminal_event_at(&mut self, event: Event, at: Duration) {
        match event {
            Event::Key(key) => {
                if let Some(command) = command_for(key) {
                    self.apply(command);
                }
            }
            Event::Mouse(mouse) => self.on_mouse(mouse, at),
            Event::Resize(columns, rows) => {
                self.navigator
                    .set_viewport(viewport_for(columns, rows), &mut self.surface);
            }
            _ => {}
        }
    }

    /// Fire every timer due by now.
    pub fn tick(&mut self) {
        let now = self.started.elapsed();
        self.tick_at(now);
    }

    fn tick_at(&mut self, now: Duration) {
        for key in self.timers.advance_to(now) {
            if !self.session.on_timer(key, &mut self.timers) {
                self.navigator
                    .on_timer(key, &mut self.timers, &mut self.surface);
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        self.surface
            .draw(frame, self.session.state(), self.session.stats());
    }

    pub fn apply(&mut self, command: Command) {
        let timers = &mut self.timers;
        let surface = &mut self.surface;

        match command {
            Command::Quit => {
                self.session.stop(timers);
                self.running = false;
            }
            Command::ToggleMode => {
                self.navigator.toggle_mode(&mut self.quotes, timers, surface);
            }
            Command::NextPage => {
                self.navigator.next(timers, surface);
            }
            Command::PreviousPage => {
                self.navigator.previous(timers, surface);
            }
            Command::GoToPage(page) => {
                self.navigator.go_to(page, timers, surface);
            }
        }
    }

    fn on_mouse(&mut self, mouse: MouseEvent, at: Duration) {
        let x = cells_to_px(mouse.column);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.navigator.drag_start(x, at, &mut self.timers);
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                self.navigator.drag_move(x, at, &mut self.surface);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.navigator
                    .drag_end(x, at, &mut self.timers, &mut self.surface);
            }
            _ => {}
        }
    }
}
