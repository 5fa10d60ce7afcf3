/// Stockdock Core - market kiosk interaction and synchronisation engine
///
/// Everything here runs on the single UI loop and is driven by explicit events and timers:
/// - Feed session: TLS push-feed connection lifecycle, reconnect and periodic refresh
/// - Quote registry: feed identifier to card resolution, update fan-out to every visible card
/// - Navigation: paged deck with animated slides, or a free-scrolling strip with inertia
///
/// Network I/O and drawing are injected through [`FeedTransport`] and [`CardRenderer`], and time
/// through [`Scheduler`], so the whole core can be driven synthetically.
pub mod catalog;
pub mod config;
pub mod error;
pub mod feed;
pub mod nav;
pub mod quote;
pub mod render;
pub mod timer;

pub use catalog::{CardSlot, Catalog, CatalogEntry, DisplayKeyMap, ScreenLayout, nse_indices};
pub use config::{FeedConfig, KioskConfig, PagingConfig, ScrollPhysics};
pub use error::{ConfigError, PayloadError, TransportError};
pub use feed::{
    BatchReport, ConnectionState, FeedSession, FeedStats, FeedTransport, TransportEvent,
};
pub use nav::{NavigationMode, NavigationState, Navigator};
pub use quote::{Quote, QuoteRegistry, format_inr};
pub use render::{CardRef, CardRenderer, SlideTransition, Surface, Viewport};
pub use timer::{Scheduler, TimerKey, TimerQueue};
