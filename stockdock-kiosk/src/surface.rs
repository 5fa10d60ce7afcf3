//! Ratatui presentation of the card deck: the [`CardRenderer`] the core drives, and the frame
//! drawing that samples it.

use std::{collections::HashMap, time::Instant};

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use stockdock_core::{
    CardRef, CardRenderer, ConnectionState, FeedStats, NavigationMode, Quote, SlideTransition,
    Surface, Viewport,
    catalog::{CARDS_PER_PAGE, CARDS_PER_ROW, CardSlot},
};

// Palette shared with the rest of the terminal tooling
const C_UP: Color = Color::Rgb(100, 220, 100);
const C_DOWN: Color = Color::Rgb(220, 100, 100);
const C_NEUTRAL: Color = Color::Rgb(180, 180, 100);
const C_DIM: Color = Color::Rgb(120, 120, 120);
const C_BRIGHT: Color = Color::Rgb(220, 220, 220);
const C_ACCENT: Color = Color::Rgb(100, 180, 220);
const C_HEADER: Color = Color::Rgb(180, 130, 220);

/// Virtual pixels per terminal column (and row) handed to the navigation core.
pub const PX_PER_CELL: f64 = 10.0;

const HEADER_HEIGHT: u16 = 3;
const FOOTER_HEIGHT: u16 = 1;

pub fn cells_to_px(cells: u16) -> f64 {
    f64::from(cells) * PX_PER_CELL
}

pub fn px_to_cells(px: f64) -> i32 {
    (px / PX_PER_CELL).round() as i32
}

/// Viewport of a terminal of `columns` x `rows`.
pub fn viewport_for(columns: u16, rows: u16) -> Viewport {
    Viewport::new(cells_to_px(columns), cells_to_px(rows))
}

#[derive(Debug, Clone, Copy)]
struct ActiveSlide {
    transition: SlideTransition,
    started: Instant,
}

/// Card contents and surface positions as last instructed by the core.
#[derive(Debug, Clone)]
pub struct TerminalSurface {
    page_count: usize,
    cards: HashMap<CardRef, Quote>,
    mode: NavigationMode,
    visible_page: usize,
    slide: Option<ActiveSlide>,
    strip_offset: f64,
}

impl TerminalSurface {
    pub fn new(page_count: usize) -> Self {
        Self {
            page_count,
            cards: HashMap::new(),
            mode: NavigationMode::Paged,
            visible_page: 0,
            slide: None,
            strip_offset: 0.0,
        }
    }

    pub fn mode(&self) -> NavigationMode {
        self.mode
    }

    pub fn visible_page(&self) -> usize {
        self.visible_page
    }

    pub fn strip_offset(&self) -> f64 {
        self.strip_offset
    }

    pub fn card(&self, card: CardRef) -> Option<&Quote> {
        self.cards.get(&card)
    }

    pub fn is_sliding(&self) -> bool {
        self.slide.is_some()
    }

    /// Draw header, active surface and footer over the whole frame.
    pub fn draw(&self, frame: &mut Frame, connection: ConnectionState, stats: &FeedStats) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(4),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(frame.area());

        render_header(frame, chunks[0], self.mode, connection, stats);
        match self.mode {
            NavigationMode::Paged => self.render_paged(frame, chunks[1]),
            NavigationMode::Scroll => self.render_strip(frame, chunks[1]),
        }
        self.render_footer(frame, chunks[2]);
    }

    fn render_paged(&self, frame: &mut Frame, area: Rect) {
        match &self.slide {
            Some(active) => {
                let elapsed = active.started.elapsed();
                if active.transition.is_finished(elapsed) {
                    // Core has not confirmed the landing yet
                    self.render_page(frame, area, active.transition.to, 0.0);
                    return;
                }
                let (outgoing, incoming) = active.transition.offsets_at(elapsed);
                self.render_page(frame, area, active.transition.from, outgoing);
                self.render_page(frame, area, active.transition.to, incoming);
            }
            None => self.render_page(frame, area, self.visible_page, 0.0),
        }
    }

    fn render_page(&self, frame: &mut Frame, area: Rect, page: usize, offset: f64) {
        for slot in (0..CARDS_PER_PAGE).map(|slot| CardSlot::new(page, slot)) {
            let (x, width) = column_span(area.width, offset, slot.column());
            self.render_card(frame, area, CardRef::new(Surface::Paged, slot), x, width);
        }
    }

    fn render_strip(&self, frame: &mut Frame, area: Rect) {
        for page in 0..self.page_count {
            for slot in (0..CARDS_PER_PAGE).map(|slot| CardSlot::new(page, slot)) {
                let (x, width) = column_span(area.width, self.strip_offset, slot.strip_column());
                self.render_card(frame, area, CardRef::new(Surface::Strip, slot), x, width);
            }
        }
    }

    fn render_card(&self, frame: &mut Frame, area: Rect, card: CardRef, x: i32, width: i32) {
        let Some(quote) = self.cards.get(&card) else {
            return;
        };
        let Some((left, visible_width)) = clip_columns(area, x, width) else {
            return;
        };

        let row_height = area.height / 2;
        let rect = Rect::new(
            left,
            area.y + card.slot.row() as u16 * row_height,
            visible_width,
            row_height,
        );

        let border = if quote.is_positive { C_UP } else { C_DOWN };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border));
        frame.render_widget(Paragraph::new(card_lines(quote)).block(block), rect);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let mut spans = match self.mode {
            NavigationMode::Paged => {
                let current = self.slide.map_or(self.visible_page, |active| active.transition.to);
                vec![Span::styled(
                    page_dots(current, self.page_count),
                    Style::default().fg(C_ACCENT),
                )]
            }
            NavigationMode::Scroll => vec![Span::styled(
                "◀ drag to scroll ▶",
                Style::default().fg(C_ACCENT),
            )],
        };
        spans.push(Span::styled(
            "   Tab mode · ←/→ page · 1-9 jump · q quit",
            Style::default().fg(C_DIM),
        ));

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

impl CardRenderer for TerminalSurface {
    fn render_quote(&mut self, card: CardRef, quote: &Quote) {
        self.cards.insert(card, quote.clone());
    }

    fn set_strip_offset(&mut self, offset: f64) {
        self.strip_offset = offset;
    }

    fn set_page_visible(&mut self, page: usize) {
        self.visible_page = page;
        self.slide = None;
    }

    fn begin_slide(&mut self, transition: &SlideTransition) {
        self.slide = Some(ActiveSlide {
            transition: *transition,
            started: Instant::now(),
        });
    }

    fn show_mode(&mut self, mode: NavigationMode) {
        self.mode = mode;
    }
}

fn render_header(
    frame: &mut Frame,
    area: Rect,
    mode: NavigationMode,
    connection: ConnectionState,
    stats: &FeedStats,
) {
    let status_color = match connection {
        ConnectionState::Connected => C_UP,
        ConnectionState::Connecting | ConnectionState::Reconnecting => C_NEUTRAL,
        ConnectionState::Disconnected => C_DOWN,
    };

    let mut spans = vec![
        Span::styled(
            format!("● {}", connection.to_string().to_uppercase()),
            Style::default().fg(status_color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", mode.to_string().to_uppercase()),
            Style::default().fg(C_ACCENT),
        ),
        Span::styled(
            format!("  msgs {}", stats.messages_accepted),
            Style::default().fg(C_DIM),
        ),
        Span::styled(
            format!("  {}", chrono::Local::now().format("%H:%M:%S")),
            Style::default().fg(C_BRIGHT),
        ),
    ];
    if let Some(error) = &stats.last_error {
        spans.push(Span::styled(
            format!("  {error}"),
            Style::default().fg(C_DOWN),
        ));
    }

    let block = Block::default()
        .title(" NSE INDICES ")
        .title_style(Style::default().fg(C_HEADER).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(C_DIM));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

pub fn trend_arrow(is_positive: bool) -> &'static str {
    if is_positive { "▲" } else { "▼" }
}

/// Name, value and coloured change of one card.
pub fn card_lines(quote: &Quote) -> Vec<Line<'static>> {
    let change_color = if quote.is_positive { C_UP } else { C_DOWN };
    vec![
        Line::from(Span::styled(
            quote.display_name.to_string(),
            Style::default().fg(C_DIM),
        )),
        Line::from(Span::styled(
            quote.value.clone(),
            Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("{} {}", trend_arrow(quote.is_positive), quote.change_text()),
            Style::default().fg(change_color),
        )),
    ]
}

/// Page indicator, eg/ "○ ● ○".
pub fn page_dots(current: usize, page_count: usize) -> String {
    (0..page_count)
        .map(|page| if page == current { "●" } else { "○" })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `(x, width)` in columns of card column `column` when column `0` starts at `offset` pixels.
///
/// Edges are rounded from pixels so the last column ends exactly where the core's strip ends.
pub fn column_span(area_width: u16, offset: f64, column: usize) -> (i32, i32) {
    let column_px = cells_to_px(area_width) / CARDS_PER_ROW as f64;
    let left = px_to_cells(offset + column as f64 * column_px);
    let right = px_to_cells(offset + (column + 1) as f64 * column_px);
    (left, right - left)
}

/// Visible `(left, width)` of a card spanning columns `x..x + width` of `area`, if any.
pub fn clip_columns(area: Rect, x: i32, width: i32) -> Option<(u16, u16)> {
    let left = x.max(0);
    let right = (x + width).min(i32::from(area.width));
    if right <= left {
        return None;
    }
    Some((area.x + left as u16, (right - left) as u16))
}
