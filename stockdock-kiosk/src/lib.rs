/// Stockdock Kiosk - terminal front end for the market kiosk core
///
/// Wires the core to the outside world:
/// - MQTT over TLS transport feeding quote batches into the feed session
/// - Ratatui surface drawing the paged deck and the scroll strip
/// - Input mapping from keys and mouse drags onto navigation requests
pub mod app;
pub mod mqtt;
pub mod surface;

pub use app::{App, Command, command_for};
pub use mqtt::{MqttTransport, mqtt_options};
pub use surface::{PX_PER_CELL, TerminalSurface, viewport_for};
