//! Latest value of every catalog quote, and the redraw fan-out to each materialized card.

use crate::catalog::{CardSlot, ScreenLayout};
use crate::render::{CardRef, CardRenderer, Surface};
use indexmap::IndexMap;
use smol_str::SmolStr;
use tracing::debug;

/// A single market quote shown on one or more cards.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    /// Stable slug of the display name, eg/ "nifty-50"
    pub id: SmolStr,
    pub display_name: SmolStr,
    /// Currency-formatted last price, eg/ "₹ 22,419.95"
    pub value: String,
    /// Percent change rounded to two decimals
    pub change_percent: f64,
    pub is_positive: bool,
}

impl Quote {
    pub fn new(display_name: &str, value: impl Into<String>, change_percent: f64) -> Self {
        let change_percent = round_change(change_percent);
        Self {
            id: slug(display_name),
            display_name: SmolStr::new(display_name),
            value: value.into(),
            change_percent,
            is_positive: change_percent >= 0.0,
        }
    }

    /// Two-decimal percent text, eg/ "0.79%".
    pub fn change_text(&self) -> String {
        format!("{:.2}%", self.change_percent)
    }
}

/// Round to the two decimals that are displayed, normalising -0.00 to 0.00 so sign and text agree.
fn round_change(change_percent: f64) -> f64 {
    let rounded = (change_percent * 100.0).round() / 100.0;
    if rounded == 0.0 { 0.0 } else { rounded }
}

fn slug(display_name: &str) -> SmolStr {
    let mut slug = String::with_capacity(display_name.len());
    for word in display_name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
    {
        if !slug.is_empty() {
            slug.push('-');
        }
        slug.push_str(&word.to_ascii_lowercase());
    }
    SmolStr::new(slug)
}

/// Format a last traded price as Indian Rupees with thousands grouping, eg/ 22419.95 -> "₹ 22,419.95".
pub fn format_inr(ltp: f64) -> String {
    let fixed = format!("{:.2}", ltp.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if ltp < 0.0 { "-" } else { "" };
    format!("₹ {sign}{grouped}.{fraction}")
}

#[derive(Debug, Clone)]
struct Entry {
    quote: Quote,
    slots: Vec<CardSlot>,
}

/// Authoritative latest [`Quote`] per display name.
///
/// Every display name maps to the slots it occupies in the [`ScreenLayout`]; an update redraws
/// each of those slots on every [`Surface`] that has been materialized.
#[derive(Debug, Clone)]
pub struct QuoteRegistry {
    // Display name -> quote, in first-appearance layout order
    entries: IndexMap<SmolStr, Entry>,
    // Surfaces whose cards exist and must be kept in sync
    paged: bool,
    strip: bool,
}

impl QuoteRegistry {
    /// Seed one quote per distinct display name from the layout's catalog values.
    ///
    /// A name that appears twice keeps the first seed value and remembers both slots.
    pub fn from_layout(layout: &ScreenLayout) -> Self {
        let mut entries = IndexMap::<SmolStr, Entry>::new();

        for (slot, entry) in layout.slots() {
            entries
                .entry(entry.display_name.clone())
                .or_insert_with(|| Entry {
                    quote: Quote::new(&entry.display_name, entry.value.clone(), entry.change_percent),
                    slots: Vec::new(),
                })
                .slots
                .push(slot);
        }

        Self {
            entries,
            paged: false,
            strip: false,
        }
    }

    pub fn get(&self, display_name: &str) -> Option<&Quote> {
        self.entries.get(display_name).map(|entry| &entry.quote)
    }

    /// Slots occupied by `display_name`, empty for names outside the catalog.
    pub fn slots(&self, display_name: &str) -> &[CardSlot] {
        self.entries
            .get(display_name)
            .map(|entry| entry.slots.as_slice())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Quote> {
        self.entries.values().map(|entry| &entry.quote)
    }

    /// Overwrite the quote and redraw every materialized card showing it.
    ///
    /// Returns `false`, with no renderer call, when `display_name` is not in the catalog.
    pub fn update<R>(
        &mut self,
        display_name: &str,
        value: impl Into<String>,
        change_percent: f64,
        renderer: &mut R,
    ) -> bool
    where
        R: CardRenderer,
    {
        let Some(entry) = self.entries.get_mut(display_name) else {
            debug!(%display_name, "ignoring update for quote outside the catalog");
            return false;
        };

        entry.quote = Quote::new(display_name, value, change_percent);

        for surface in [Surface::Paged, Surface::Strip] {
            if !Self::surface_flag(self.paged, self.strip, surface) {
                continue;
            }
            for slot in &entry.slots {
                renderer.render_quote(CardRef::new(surface, *slot), &entry.quote);
            }
        }

        true
    }

    /// Create the cards of `surface` by painting every quote into its slots.
    ///
    /// Only the first call per surface paints; returns whether it did.
    pub fn materialize<R>(&mut self, surface: Surface, renderer: &mut R) -> bool
    where
        R: CardRenderer,
    {
        if self.is_materialized(surface) {
            return false;
        }

        match surface {
            Surface::Paged => self.paged = true,
            Surface::Strip => self.strip = true,
        }

        for entry in self.entries.values() {
            for slot in &entry.slots {
                renderer.render_quote(CardRef::new(surface, *slot), &entry.quote);
            }
        }

        debug!(?surface, quotes = self.entries.len(), "materialized surface");
        true
    }

    pub fn is_materialized(&self, surface: Surface) -> bool {
        Self::surface_flag(self.paged, self.strip, surface)
    }

    fn surface_flag(paged: bool, strip: bool, surface: Surface) -> bool {
        match surface {
            Surface::Paged => paged,
            Surface::Strip => strip,
        }
    }
}
