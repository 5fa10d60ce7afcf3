//! Static market catalog: which feed identifiers exist, what they are called on screen, and
//! where each card sits in the paged 3×2 layout.

use crate::error::ConfigError;
use fnv::FnvHashMap;
use smol_str::SmolStr;

/// Cards per page.
pub const CARDS_PER_PAGE: usize = 6;
/// Cards per grid row.
pub const CARDS_PER_ROW: usize = 3;

/// Position of a card within the [`ScreenLayout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardSlot {
    pub page: usize,
    pub slot: usize,
}

impl CardSlot {
    pub fn new(page: usize, slot: usize) -> Self {
        Self { page, slot }
    }

    /// Grid row (0 or 1) of the slot.
    pub fn row(&self) -> usize {
        self.slot / CARDS_PER_ROW
    }

    /// Grid column (0..3) of the slot.
    pub fn column(&self) -> usize {
        self.slot % CARDS_PER_ROW
    }

    /// Column in the continuous scroll strip, where pages are laid side by side.
    pub fn strip_column(&self) -> usize {
        self.page * CARDS_PER_ROW + self.column()
    }
}

/// Seed content of one card.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub display_name: SmolStr,
    /// Currency-formatted seed value, eg/ "₹ 22,419.95"
    pub value: String,
    pub change_percent: f64,
}

impl CatalogEntry {
    pub fn new(display_name: &str, value: &str, change_percent: f64) -> Self {
        Self {
            display_name: SmolStr::new(display_name),
            value: value.to_string(),
            change_percent,
        }
    }
}

/// Ordered pages of exactly [`CARDS_PER_PAGE`] cards. Immutable once built.
///
/// Display names are not required to be unique. A name placed on several slots (the NSE deck
/// shows "Nifty India Manufacturing" twice) is one card entity: every slot shares the same
/// [`Quote`](crate::Quote) and redraws on each update. Use [`ScreenLayout::slots_of`] to find them.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenLayout {
    pages: Vec<Vec<CatalogEntry>>,
}

impl ScreenLayout {
    pub fn new(pages: Vec<Vec<CatalogEntry>>) -> Result<Self, ConfigError> {
        if pages.is_empty() {
            return Err(ConfigError::EmptyLayout);
        }

        if let Some((page, cards)) = pages
            .iter()
            .enumerate()
            .find(|(_, cards)| cards.len() != CARDS_PER_PAGE)
        {
            return Err(ConfigError::PageSize {
                page,
                len: cards.len(),
                expected: CARDS_PER_PAGE,
            });
        }

        Ok(Self { pages })
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, page: usize) -> Option<&[CatalogEntry]> {
        self.pages.get(page).map(Vec::as_slice)
    }

    pub fn entry(&self, slot: CardSlot) -> Option<&CatalogEntry> {
        self.pages.get(slot.page)?.get(slot.slot)
    }

    /// Every card in page-major order with its slot.
    pub fn slots(&self) -> impl Iterator<Item = (CardSlot, &CatalogEntry)> {
        self.pages.iter().enumerate().flat_map(|(page, cards)| {
            cards
                .iter()
                .enumerate()
                .map(move |(slot, entry)| (CardSlot::new(page, slot), entry))
        })
    }

    /// Every slot occupied by `display_name`, in page-major order. May yield more than one.
    pub fn slots_of<'a>(&'a self, display_name: &'a str) -> impl Iterator<Item = CardSlot> + 'a {
        self.slots()
            .filter(move |(_, entry)| entry.display_name == display_name)
            .map(|(slot, _)| slot)
    }
}

/// Immutable map from a feed identifier (eg/ "IDX-I-7") to the display name of a card.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayKeyMap {
    names: FnvHashMap<SmolStr, SmolStr>,
}

impl DisplayKeyMap {
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self {
            names: pairs
                .into_iter()
                .map(|(key, name)| (SmolStr::new(key), SmolStr::new(name)))
                .collect(),
        }
    }

    /// Display name for the feed identifier, `None` for identifiers outside the catalog.
    pub fn resolve(&self, key: &str) -> Option<&SmolStr> {
        self.names.get(key)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Check that every mapped display name is materialized somewhere in `layout`.
    pub fn validate(&self, layout: &ScreenLayout) -> Result<(), ConfigError> {
        for (key, display_name) in &self.names {
            if layout.slots_of(display_name).next().is_none() {
                return Err(ConfigError::UnknownDisplayName {
                    key: key.to_string(),
                    display_name: display_name.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Layout and key map as shipped.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pub layout: ScreenLayout,
    pub keys: DisplayKeyMap,
}

const NSE_INDICES: [[(&str, &str, f64); CARDS_PER_PAGE]; 9] = [
    [
        ("Nifty 50", "₹ 22,419.95", 0.79),
        ("Nifty Bank", "₹ 47,580.30", 0.82),
        ("Nifty IT", "₹ 37,890.15", 1.12),
        ("Nifty Auto", "₹ 19,875.40", 0.45),
        ("Nifty FMCG", "₹ 52,640.75", 0.28),
        ("Nifty Pharma", "₹ 15,980.60", -0.32),
    ],
    [
        ("Nifty Metal", "₹ 7,890.25", 1.45),
        ("Nifty Media", "₹ 2,340.85", -0.78),
        ("Nifty Realty", "₹ 890.45", 0.92),
        ("Nifty PSU Bank", "₹ 4,570.30", 1.23),
        ("Nifty Private Bank", "₹ 23,780.55", 0.67),
        ("Nifty Energy", "₹ 34,560.90", -0.45),
    ],
    [
        ("Nifty Financial Services", "₹ 19,870.35", 0.56),
        ("Nifty Consumer Durables", "₹ 31,240.80", -0.23),
        ("Nifty Oil & Gas", "₹ 12,450.65", 0.89),
        ("Nifty Healthcare", "₹ 9,780.40", 0.34),
        ("Nifty PSE", "₹ 5,670.25", -0.67),
        ("Nifty Infrastructure", "₹ 6,890.15", 0.78),
    ],
    [
        ("Nifty MNC", "₹ 21,340.75", 0.45),
        ("Nifty Services Sector", "₹ 27,890.60", -0.34),
        ("Nifty India Digital", "₹ 8,970.30", 1.56),
        ("Nifty India Consumption", "₹ 11,230.85", 0.23),
        ("Nifty CPSE", "₹ 3,450.40", -0.89),
        ("Nifty India Manufacturing", "₹ 4,560.95", 0.67),
    ],
    [
        ("Nifty Midcap 50", "₹ 12,780.45", 0.91),
        ("Nifty Midcap 100", "₹ 15,670.30", -0.45),
        ("Nifty Smallcap 50", "₹ 5,890.65", 1.23),
        ("Nifty Smallcap 100", "₹ 7,450.20", 0.78),
        ("Nifty Midcap Liquid 15", "₹ 9,230.75", -0.56),
        ("Nifty India Defence", "₹ 6,780.90", 1.12),
    ],
    [
        ("Nifty Alpha 50", "₹ 18,920.35", 0.34),
        ("Nifty50 Value 20", "₹ 13,450.80", -0.67),
        ("Nifty50 Equal Weight", "₹ 16,780.65", 0.89),
        ("Nifty100 Equal Weight", "₹ 14,560.40", 0.45),
        ("Nifty100 Low Volatility 30", "₹ 11,890.25", -0.23),
        ("Nifty Alpha Low-Volatility 30", "₹ 8,670.60", 1.34),
    ],
    [
        ("Nifty200 Quality 30", "₹ 17,890.30", 0.67),
        ("Nifty100 Quality 30", "₹ 15,450.85", -0.45),
        ("Nifty50 Dividend Points", "₹ 12,670.40", 0.91),
        ("Nifty Dividend Opportunities 50", "₹ 9,890.95", 0.23),
        ("Nifty Growth Sectors 15", "₹ 7,450.20", -0.78),
        ("Nifty100 ESG", "₹ 5,670.75", 1.12),
    ],
    [
        ("Nifty100 Enhanced ESG", "₹ 14,560.30", 0.45),
        ("Nifty200 Momentum 30", "₹ 11,890.85", -0.34),
        ("Nifty Commodities", "₹ 8,970.40", 1.23),
        ("Nifty India Manufacturing", "₹ 6,780.95", 0.56),
        ("Nifty Microcap 250", "₹ 4,560.20", -0.89),
        ("Nifty Total Market", "₹ 3,450.75", 0.67),
    ],
    [
        ("Nifty500 Value 50", "₹ 13,670.30", 0.91),
        ("Nifty Next 50", "₹ 10,890.85", -0.45),
        ("Nifty100 Liquid 15", "₹ 8,450.40", 1.23),
        ("Nifty MidSmallcap 400", "₹ 6,780.95", 0.34),
        ("Nifty200 Alpha 30", "₹ 4,560.20", -0.67),
        ("India VIX", "₹ 786.0", -0.79),
    ],
];

/// The NSE indices screen: 9 pages, 54 cards, keyed `IDX-I-1` ..= `IDX-I-54` in layout order.
///
/// "Nifty India Manufacturing" appears twice in the shipped layout, so `IDX-I-24` and
/// `IDX-I-46` resolve to the same quote.
pub fn nse_indices() -> Catalog {
    let pages = NSE_INDICES
        .iter()
        .map(|page| {
            page.iter()
                .map(|(name, value, change)| CatalogEntry::new(name, value, *change))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let keys = DisplayKeyMap::new(
        NSE_INDICES
            .iter()
            .flatten()
            .enumerate()
            .map(|(index, (name, _, _))| (format!("IDX-I-{}", index + 1), *name)),
    );

    Catalog {
        layout: ScreenLayout { pages },
        keys,
    }
}
