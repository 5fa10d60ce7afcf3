//! Configuration for the feed session, scroll physics and paged navigation.
//!
//! Defaults reproduce the production kiosk; [`KioskConfig::from_env`] layers `STOCKDOCK_*`
//! environment overrides on top.

use crate::error::ConfigError;
use crate::nav::NavigationMode;
use std::str::FromStr;
use std::time::Duration;

/// Broker connection and subscription settings, owned by one [`FeedSession`](crate::feed::FeedSession).
///
/// TLS with server certificate verification is always on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    /// Broker host name
    pub host: String,
    /// Broker TLS port
    pub port: u16,
    pub client_id: String,
    pub username: String,
    pub password: String,
    /// Topic carrying the screen index data
    pub topic: String,
    pub keep_alive: Duration,
    /// Constant delay between reconnection attempts
    pub reconnect_interval: Duration,
    /// Period of the unsubscribe/resubscribe refresh while connected
    pub refresh_interval: Duration,
    /// Delay before the first connection attempt
    pub connect_delay: Duration,
    /// Capacity of the transport request queue
    pub request_capacity: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            host: "mqtt.dhan.co".to_string(),
            port: 8443,
            client_id: "mqtt-12x".to_string(),
            username: "device".to_string(),
            password: "device".to_string(),
            topic: "stockdock/screen/nse-indices".to_string(),
            keep_alive: Duration::from_secs(60),
            reconnect_interval: Duration::from_secs(5),
            refresh_interval: Duration::from_secs(2),
            connect_delay: Duration::from_secs(1),
            request_capacity: 10,
        }
    }
}

impl FeedConfig {
    /// Create a new configuration for a custom broker host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = delay;
        self
    }
}

/// Tunable constants of the drag / flick interaction.
///
/// One named preset per deployed kiosk variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollPhysics {
    /// Pointer deltas smaller than this (px) are ignored as jitter
    pub jitter_px: f64,
    /// Multiplier applied to pointer deltas before moving the strip
    pub drag_gain: f64,
    /// Clamp applied to each instantaneous velocity sample (px/s)
    pub max_sample_velocity: f64,
    /// Number of samples averaged into the tracked velocity
    pub velocity_window: usize,
    /// Minimum release velocity (px/s) that starts inertia
    pub release_threshold: f64,
    /// Clamp applied to the release velocity (px/s)
    pub max_release_velocity: f64,
    /// Per-tick velocity multiplier during inertia
    pub friction: f64,
    /// Inertia stops once |velocity| drops below this (px/s)
    pub stop_velocity: f64,
    /// Inertia stops once a tick would move less than this (px)
    pub min_step_px: f64,
    /// Share of the overshoot past a bound that is applied while dragging
    pub edge_resistance: f64,
    /// Per-event delta (px) under which a move counts as "slow"; `None` disables suppression
    pub slow_move_px: Option<f64>,
    /// A slow move this close to release, or no move at all for this long, suppresses inertia
    pub slow_release_window: Duration,
    /// Inertial frame interval
    pub tick_interval: Duration,
}

impl ScrollPhysics {
    /// Two-mode kiosk: light, 1:1 tracking.
    pub fn standard() -> Self {
        Self {
            jitter_px: 1.0,
            drag_gain: 1.0,
            max_sample_velocity: 3000.0,
            velocity_window: 1,
            release_threshold: 200.0,
            max_release_velocity: 2000.0,
            friction: 0.95,
            stop_velocity: 20.0,
            min_step_px: 0.0,
            edge_resistance: 0.3,
            slow_move_px: None,
            slow_release_window: Duration::from_millis(200),
            tick_interval: Duration::from_millis(16),
        }
    }

    /// Scroll-only kiosk: amplified drag and long glide.
    pub fn responsive() -> Self {
        Self {
            jitter_px: 2.0,
            drag_gain: 1.15,
            max_sample_velocity: 4600.0,
            release_threshold: 350.0,
            max_release_velocity: 2875.0,
            friction: 0.94,
            stop_velocity: 35.0,
            edge_resistance: 0.4,
            ..Self::standard()
        }
    }

    /// LCD touch panel: smoothed velocity, strong friction, slow-release suppression.
    pub fn touch() -> Self {
        Self {
            drag_gain: 2.0,
            max_sample_velocity: 4000.0,
            velocity_window: 5,
            release_threshold: 500.0,
            max_release_velocity: 4000.0,
            friction: 0.92,
            stop_velocity: 30.0,
            min_step_px: 1.0,
            slow_move_px: Some(5.0),
            ..Self::standard()
        }
    }
}

impl Default for ScrollPhysics {
    fn default() -> Self {
        Self::standard()
    }
}

impl FromStr for ScrollPhysics {
    type Err = ConfigError;

    fn from_str(preset: &str) -> Result<Self, Self::Err> {
        match preset.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::standard()),
            "responsive" => Ok(Self::responsive()),
            "touch" => Ok(Self::touch()),
            _ => Err(ConfigError::UnknownPreset(preset.to_string())),
        }
    }
}

/// Paged navigation constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PagingConfig {
    /// Horizontal drag (px) a swipe must exceed to change page
    pub swipe_threshold_px: f64,
    /// Fixed slide duration, independent of page distance
    pub transition: Duration,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            swipe_threshold_px: 50.0,
            transition: Duration::from_millis(300),
        }
    }
}

/// Everything the kiosk needs to wire the core together.
#[derive(Debug, Clone, PartialEq)]
pub struct KioskConfig {
    pub feed: FeedConfig,
    pub physics: ScrollPhysics,
    pub paging: PagingConfig,
    pub initial_mode: NavigationMode,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            feed: FeedConfig::default(),
            physics: ScrollPhysics::default(),
            paging: PagingConfig::default(),
            initial_mode: NavigationMode::Paged,
        }
    }
}

impl KioskConfig {
    /// Defaults overridden by `STOCKDOCK_*` process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `STOCKDOCK_*` variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("STOCKDOCK_BROKER_HOST") {
            config.feed.host = host;
        }
        if let Some(port) = lookup("STOCKDOCK_BROKER_PORT") {
            config.feed.port = port.parse().map_err(|error| ConfigError::InvalidEnv {
                var: "STOCKDOCK_BROKER_PORT",
                value: port.clone(),
                reason: format!("{error}"),
            })?;
        }
        if let Some(client_id) = lookup("STOCKDOCK_CLIENT_ID") {
            config.feed.client_id = client_id;
        }
        if let Some(username) = lookup("STOCKDOCK_USERNAME") {
            config.feed.username = username;
        }
        if let Some(password) = lookup("STOCKDOCK_PASSWORD") {
            config.feed.password = password;
        }
        if let Some(topic) = lookup("STOCKDOCK_TOPIC") {
            if topic.trim().is_empty() {
                return Err(ConfigError::InvalidEnv {
                    var: "STOCKDOCK_TOPIC",
                    value: topic,
                    reason: "topic must not be empty".to_string(),
                });
            }
            config.feed.topic = topic;
        }
        if let Some(preset) = lookup("STOCKDOCK_PHYSICS") {
            config.physics = preset.parse()?;
        }
        if let Some(mode) = lookup("STOCKDOCK_MODE") {
            config.initial_mode = mode.parse()?;
        }

        Ok(config)
    }
}
