//! Feed session management: connection lifecycle to the quote broker and delivery of parsed
//! updates into the [`QuoteRegistry`].
//!
//! [`FeedSession`] is a sans-IO state machine. Network I/O lives behind [`FeedTransport`], whose
//! outcomes are marshalled back onto the UI loop as [`TransportEvent`]s; retries and the periodic
//! refresh are timers armed on a [`Scheduler`].
//!
//! ```text
//!               start()                 Connected
//! Disconnected ─────────► Connecting ───────────────► Connected
//!      ▲                     │  ▲                        │
//!      │ stop()   ConnectFailed  │ Reconnect timer       │ Disconnected / subscribe fault
//!      │ (any state)         ▼  │                        ▼
//!      └──────────────────  Reconnecting ◄───────────────┘
//! ```

use crate::catalog::DisplayKeyMap;
use crate::config::FeedConfig;
use crate::error::TransportError;
use crate::quote::{QuoteRegistry, format_inr};
use crate::render::CardRenderer;
use crate::timer::{Scheduler, TimerKey};
use derive_more::{Constructor, Display};
use tracing::{debug, info, warn};

pub mod payload;

pub use payload::{FeedRecord, ParsedBatch, parse_batch};

/// Lifecycle of the broker connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ConnectionState {
    #[display("disconnected")]
    Disconnected,
    #[display("connecting")]
    Connecting,
    #[display("connected")]
    Connected,
    #[display("reconnecting")]
    Reconnecting,
}

/// Network side of a [`FeedSession`].
///
/// Requests are non-blocking: `connect` only initiates the connection and its outcome is later
/// delivered as [`TransportEvent::Connected`] or [`TransportEvent::ConnectFailed`]. An `Err`
/// return means the request could not even be issued.
pub trait FeedTransport {
    fn connect(&mut self, config: &FeedConfig) -> Result<(), TransportError>;

    fn subscribe(&mut self, topic: &str) -> Result<(), TransportError>;

    fn unsubscribe(&mut self, topic: &str) -> Result<(), TransportError>;

    /// Close the current connection. Events of a closed connection must not be delivered.
    fn disconnect(&mut self) -> Result<(), TransportError>;
}

/// Outcome of transport activity, delivered on the UI loop in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Broker accepted the connection
    Connected,
    /// Connection attempt failed before being established
    ConnectFailed(TransportError),
    /// Established connection was lost
    Disconnected(Option<TransportError>),
    /// Raw message published on the subscribed topic
    Message(Vec<u8>),
}

/// Outcome of applying one accepted feed message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Constructor)]
pub struct BatchReport {
    /// Records that updated a catalog quote
    pub applied: usize,
    /// Elements missing `key`, `ltp` or `p_ch`
    pub incomplete: usize,
    /// Records whose `key` is outside the catalog
    pub unknown: usize,
}

/// Session counters surfaced for diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedStats {
    pub messages_accepted: u64,
    pub messages_rejected: u64,
    pub records_applied: u64,
    pub reconnect_attempts: u64,
    pub last_error: Option<TransportError>,
}

/// Owns the connection lifecycle to the feed broker.
///
/// Invariants, checked after every call:
/// - [`TimerKey::Reconnect`] is armed iff the state is [`ConnectionState::Reconnecting`].
/// - [`TimerKey::Refresh`] is armed iff the state is [`ConnectionState::Connected`].
#[derive(Debug)]
pub struct FeedSession<T> {
    config: FeedConfig,
    keys: DisplayKeyMap,
    transport: T,
    state: ConnectionState,
    stats: FeedStats,
}

impl<T> FeedSession<T>
where
    T: FeedTransport,
{
    pub fn new(config: FeedConfig, keys: DisplayKeyMap, transport: T) -> Self {
        Self {
            config,
            keys,
            transport,
            state: ConnectionState::Disconnected,
            stats: FeedStats::default(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn stats(&self) -> &FeedStats {
        &self.stats
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Defer the first [`start`](Self::start) by the configured connect delay.
    pub fn schedule_start<S>(&mut self, timers: &mut S)
    where
        S: Scheduler,
    {
        timers.arm(TimerKey::Startup, self.config.connect_delay);
    }

    /// Connect unless already connected or connecting.
    ///
    /// A pending reconnect is pre-empted by an immediate attempt.
    pub fn start<S>(&mut self, timers: &mut S)
    where
        S: Scheduler,
    {
        match self.state {
            ConnectionState::Connected | ConnectionState::Connecting => {
                debug!(state = %self.state, "feed session already active");
            }
            ConnectionState::Disconnected | ConnectionState::Reconnecting => {
                timers.cancel(TimerKey::Startup);
                self.connect(timers);
            }
        }
    }

    /// Cancel every timer, unsubscribe, disconnect and go idle. Safe from any state.
    pub fn stop<S>(&mut self, timers: &mut S)
    where
        S: Scheduler,
    {
        timers.cancel(TimerKey::Startup);
        timers.cancel(TimerKey::Reconnect);
        timers.cancel(TimerKey::Refresh);

        if self.state == ConnectionState::Connected {
            if let Err(error) = self.transport.unsubscribe(&self.config.topic) {
                warn!(%error, "failed to unsubscribe while stopping feed session");
            }
        }

        if matches!(
            self.state,
            ConnectionState::Connected | ConnectionState::Connecting
        ) {
            if let Err(error) = self.transport.disconnect() {
                warn!(%error, "failed to disconnect while stopping feed session");
            }
        }

        if self.state != ConnectionState::Disconnected {
            info!(from = %self.state, "feed session stopped");
        }
        self.state = ConnectionState::Disconnected;
    }

    /// Handle a fired timer, returning `false` for keys the session does not own.
    pub fn on_timer<S>(&mut self, key: TimerKey, timers: &mut S) -> bool
    where
        S: Scheduler,
    {
        match key {
            TimerKey::Startup => {
                self.start(timers);
                true
            }
            TimerKey::Reconnect => {
                if self.state == ConnectionState::Reconnecting {
                    self.stats.reconnect_attempts += 1;
                    info!(
                        attempt = self.stats.reconnect_attempts,
                        "Reconnecting to {}:{}", self.config.host, self.config.port
                    );
                    self.connect(timers);
                }
                true
            }
            TimerKey::Refresh => {
                if self.state == ConnectionState::Connected {
                    self.refresh(timers);
                }
                true
            }
            TimerKey::InertialTick | TimerKey::PageTransition => false,
        }
    }

    /// Handle a transport event. Returns a report for every feed message that was applied.
    pub fn on_event<S, R>(
        &mut self,
        event: TransportEvent,
        timers: &mut S,
        quotes: &mut QuoteRegistry,
        renderer: &mut R,
    ) -> Option<BatchReport>
    where
        S: Scheduler,
        R: CardRenderer,
    {
        match event {
            TransportEvent::Connected => {
                self.on_connected(timers);
                None
            }
            TransportEvent::ConnectFailed(error) => {
                self.on_link_lost(timers, Some(error));
                None
            }
            TransportEvent::Disconnected(error) => {
                self.on_link_lost(timers, error);
                None
            }
            TransportEvent::Message(payload) => self.on_message(&payload, quotes, renderer),
        }
    }

    fn connect<S>(&mut self, timers: &mut S)
    where
        S: Scheduler,
    {
        timers.cancel(TimerKey::Reconnect);
        self.state = ConnectionState::Connecting;
        debug!("Connecting to {}:{}", self.config.host, self.config.port);

        if let Err(error) = self.transport.connect(&self.config) {
            self.fail(timers, Some(error));
        }
    }

    fn on_connected<S>(&mut self, timers: &mut S)
    where
        S: Scheduler,
    {
        match self.state {
            ConnectionState::Connecting | ConnectionState::Reconnecting => {}
            ConnectionState::Connected => {
                debug!("ignoring duplicate connection acknowledgement");
                return;
            }
            ConnectionState::Disconnected => {
                debug!("connection established after stop, closing it");
                if let Err(error) = self.transport.disconnect() {
                    debug!(%error, "failed to close late connection");
                }
                return;
            }
        }

        timers.cancel(TimerKey::Reconnect);
        self.state = ConnectionState::Connected;
        info!("Connected to {}:{}", self.config.host, self.config.port);

        match self.transport.subscribe(&self.config.topic) {
            Ok(()) => {
                info!(topic = %self.config.topic, "subscribed to feed topic");
                timers.arm_repeating(TimerKey::Refresh, self.config.refresh_interval);
            }
            Err(error) => self.drop_link(timers, error),
        }
    }

    fn on_link_lost<S>(&mut self, timers: &mut S, error: Option<TransportError>)
    where
        S: Scheduler,
    {
        match (self.state, error) {
            (ConnectionState::Connecting | ConnectionState::Connected, Some(error))
                if !error.is_disconnect() =>
            {
                warn!(%error, state = %self.state, "transport fault does not affect the link");
                self.stats.last_error = Some(error);
            }
            (ConnectionState::Connecting | ConnectionState::Connected, error) => {
                self.fail(timers, error)
            }
            (ConnectionState::Reconnecting | ConnectionState::Disconnected, error) => {
                debug!(state = %self.state, ?error, "ignoring link loss of inactive connection");
            }
        }
    }

    /// Unsubscribe then resubscribe to provoke a fresh push from the broker.
    fn refresh<S>(&mut self, timers: &mut S)
    where
        S: Scheduler,
    {
        let topic = &self.config.topic;
        let result = self
            .transport
            .unsubscribe(topic)
            .and_then(|()| self.transport.subscribe(topic));

        match result {
            Ok(()) => debug!(%topic, "refreshed feed subscription"),
            Err(error) => self.drop_link(timers, error),
        }
    }

    /// Close a connection that can no longer be used and fall back to reconnecting.
    fn drop_link<S>(&mut self, timers: &mut S, error: TransportError)
    where
        S: Scheduler,
    {
        if let Err(close) = self.transport.disconnect() {
            debug!(error = %close, "failed to close broken connection");
        }
        self.fail(timers, Some(error));
    }

    fn fail<S>(&mut self, timers: &mut S, error: Option<TransportError>)
    where
        S: Scheduler,
    {
        match &error {
            Some(error) => warn!(
                %error,
                retry_in = ?self.config.reconnect_interval,
                "feed connection lost"
            ),
            None => warn!(
                retry_in = ?self.config.reconnect_interval,
                "feed connection closed by broker"
            ),
        }

        timers.cancel(TimerKey::Refresh);
        self.state = ConnectionState::Reconnecting;
        timers.arm(TimerKey::Reconnect, self.config.reconnect_interval);

        if error.is_some() {
            self.stats.last_error = error;
        }
    }

    fn on_message<R>(
        &mut self,
        payload: &[u8],
        quotes: &mut QuoteRegistry,
        renderer: &mut R,
    ) -> Option<BatchReport>
    where
        R: CardRenderer,
    {
        if self.state == ConnectionState::Disconnected {
            debug!(bytes = payload.len(), "dropping message received after stop");
            return None;
        }

        let batch = match parse_batch(payload) {
            Ok(batch) => batch,
            Err(error) => {
                self.stats.messages_rejected += 1;
                warn!(%error, bytes = payload.len(), "rejected feed message");
                return None;
            }
        };

        let mut report = BatchReport::new(0, batch.incomplete, 0);
        for record in batch.records {
            let Some(display_name) = self.keys.resolve(&record.key) else {
                debug!(key = %record.key, "ignoring record for unknown feed key");
                report.unknown += 1;
                continue;
            };

            if quotes.update(display_name, format_inr(record.ltp), record.p_ch, renderer) {
                report.applied += 1;
            } else {
                report.unknown += 1;
            }
        }

        if report.incomplete > 0 {
            debug!(incomplete = report.incomplete, "skipped incomplete feed records");
        }

        self.stats.messages_accepted += 1;
        self.stats.records_applied += report.applied as u64;
        Some(report)
    }
}

/// A request issued to a [`ScriptedTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Connect { host: String, port: u16 },
    Subscribe(String),
    Unsubscribe(String),
    Disconnect,
}

/// In-memory [`FeedTransport`] that records requests and fails on demand.
///
/// Connection outcomes are not generated: the driver feeds [`TransportEvent`]s to the session
/// itself, exactly as the UI loop does with a real transport.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    pub calls: Vec<TransportCall>,
    pub fail_connect: bool,
    pub fail_subscribe: bool,
    pub fail_unsubscribe: bool,
}

impl ScriptedTransport {
    pub fn count(&self, matches: impl Fn(&TransportCall) -> bool) -> usize {
        self.calls.iter().filter(|call| matches(call)).count()
    }
}

impl FeedTransport for ScriptedTransport {
    fn connect(&mut self, config: &FeedConfig) -> Result<(), TransportError> {
        self.calls.push(TransportCall::Connect {
            host: config.host.clone(),
            port: config.port,
        });
        if self.fail_connect {
            return Err(TransportError::Connect {
                host: config.host.clone(),
                port: config.port,
                reason: "scripted failure".to_string(),
            });
        }
        Ok(())
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), TransportError> {
        self.calls.push(TransportCall::Subscribe(topic.to_string()));
        if self.fail_subscribe {
            return Err(TransportError::Subscribe {
                topic: topic.to_string(),
                reason: "scripted failure".to_string(),
            });
        }
        Ok(())
    }

    fn unsubscribe(&mut self, topic: &str) -> Result<(), TransportError> {
        self.calls.push(TransportCall::Unsubscribe(topic.to_string()));
        if self.fail_unsubscribe {
            return Err(TransportError::Unsubscribe {
                topic: topic.to_string(),
                reason: "scripted failure".to_string(),
            });
        }
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), TransportError> {
        self.calls.push(TransportCall::Disconnect);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::nse_indices;
    use crate::render::{RecordingRenderer, Surface};
    use crate::timer::TimerQueue;
    use std::time::Duration;

    struct Harness {
        session: FeedSession<ScriptedTransport>,
        timers: TimerQueue,
        quotes: QuoteRegistry,
        renderer: RecordingRenderer,
    }

    impl Harness {
        fn new(transport: ScriptedTransport) -> Self {
            let catalog = nse_indices();
            let mut quotes = QuoteRegistry::from_layout(&catalog.layout);
            let mut renderer = RecordingRenderer::default();
            quotes.materialize(Surface::Paged, &mut renderer);
            renderer.clear();

            Self {
                session: FeedSession::new(FeedConfig::default(), catalog.keys, transport),
                timers: TimerQueue::new(),
                quotes,
                renderer,
            }
        }

        fn event(&mut self, event: TransportEvent) -> Option<BatchReport> {
            self.session
                .on_event(event, &mut self.timers, &mut self.quotes, &mut self.renderer)
        }

        fn advance_to(&mut self, now: Duration) {
            for key in self.timers.advance_to(now) {
                self.session.on_timer(key, &mut self.timers);
            }
        }

        fn connected() -> Self {
            let mut harness = Self::new(ScriptedTransport::default());
            harness.session.start(&mut harness.timers);
            harness.event(TransportEvent::Connected);
            harness
        }

        fn assert_timer_invariants(&self) {
            let state = self.session.state();
            assert_eq!(
                self.timers.is_armed(TimerKey::Reconnect),
                state == ConnectionState::Reconnecting,
                "reconnect timer in state {state}"
            );
            assert_eq!(
                self.timers.is_armed(TimerKey::Refresh),
                state == ConnectionState::Connected,
                "refresh timer in state {state}"
            );
        }
    }

    #[test]
    fn test_connect_subscribes_and_arms_refresh() {
        let harness = Harness::connected();

        assert_eq!(harness.session.state(), ConnectionState::Connected);
        assert_eq!(
            harness.session.transport().calls,
            vec![
                TransportCall::Connect {
                    host: "mqtt.dhan.co".to_string(),
                    port: 8443
                },
                TransportCall::Subscribe("stockdock/screen/nse-indices".to_string()),
            ]
        );
        harness.assert_timer_invariants();
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut harness = Harness::connected();
        harness.session.start(&mut harness.timers);

        let connects = harness
            .session
            .transport()
            .count(|call| matches!(call, TransportCall::Connect { .. }));
        assert_eq!(connects, 1);

        let mut connecting = Harness::new(ScriptedTransport::default());
        connecting.session.start(&mut connecting.timers);
        connecting.session.start(&mut connecting.timers);
        assert_eq!(connecting.session.transport().calls.len(), 1);
        assert_eq!(connecting.session.state(), ConnectionState::Connecting);
    }

    #[test]
    fn test_scheduled_start_waits_for_connect_delay() {
        let mut harness = Harness::new(ScriptedTransport::default());
        harness.session.schedule_start(&mut harness.timers);

        harness.advance_to(Duration::from_millis(999));
        assert_eq!(harness.session.state(), ConnectionState::Disconnected);

        harness.advance_to(Duration::from_secs(1));
        assert_eq!(harness.session.state(), ConnectionState::Connecting);
    }

    #[test]
    fn test_refresh_unsubscribes_then_resubscribes() {
        let mut harness = Harness::connected();
        harness.session.transport_mut().calls.clear();

        harness.advance_to(Duration::from_secs(2));
        harness.advance_to(Duration::from_secs(4));

        let topic = "stockdock/screen/nse-indices".to_string();
        assert_eq!(
            harness.session.transport().calls,
            vec![
                TransportCall::Unsubscribe(topic.clone()),
                TransportCall::Subscribe(topic.clone()),
                TransportCall::Unsubscribe(topic.clone()),
                TransportCall::Subscribe(topic),
            ]
        );
        harness.assert_timer_invariants();
    }

    #[test]
    fn test_connect_failure_retries_on_fixed_interval() {
        let mut harness = Harness::new(ScriptedTransport {
            fail_connect: true,
            ..Default::default()
        });

        harness.session.start(&mut harness.timers);
        assert_eq!(harness.session.state(), ConnectionState::Reconnecting);
        harness.assert_timer_invariants();

        for second in [5, 10, 15] {
            harness.advance_to(Duration::from_secs(second));
            assert_eq!(harness.session.state(), ConnectionState::Reconnecting);
            harness.assert_timer_invariants();
        }

        let connects = harness
            .session
            .transport()
            .count(|call| matches!(call, TransportCall::Connect { .. }));
        assert_eq!(connects, 4);
        assert_eq!(harness.session.stats().reconnect_attempts, 3);
        assert!(matches!(
            harness.session.stats().last_error,
            Some(TransportError::Connect { .. })
        ));
    }

    #[test]
    fn test_disconnect_event_reconnects() {
        let mut harness = Harness::connected();

        harness.event(TransportEvent::Disconnected(Some(TransportError::Closed(
            "connection reset by peer".to_string(),
        ))));
        assert_eq!(harness.session.state(), ConnectionState::Reconnecting);
        harness.assert_timer_invariants();

        harness.advance_to(Duration::from_secs(5));
        assert_eq!(harness.session.state(), ConnectionState::Connecting);
        harness.assert_timer_invariants();

        harness.event(TransportEvent::Connected);
        assert_eq!(harness.session.state(), ConnectionState::Connected);
        harness.assert_timer_invariants();
    }

    #[test]
    fn test_disconnect_fault_keeps_link() {
        let mut harness = Harness::connected();
        let fault = TransportError::Disconnect("request channel full".to_string());

        harness.event(TransportEvent::Disconnected(Some(fault.clone())));

        assert_eq!(harness.session.state(), ConnectionState::Connected);
        assert_eq!(harness.session.stats().last_error, Some(fault));
        assert_eq!(harness.session.stats().reconnect_attempts, 0);
        harness.assert_timer_invariants();

        harness.advance_to(Duration::from_secs(2));
        assert_eq!(harness.session.state(), ConnectionState::Connected);
        assert!(
            harness
                .session
                .transport()
                .calls
                .contains(&TransportCall::Unsubscribe(FeedConfig::default().topic))
        );
    }

    #[test]
    fn test_subscribe_failure_is_treated_as_disconnect() {
        let mut harness = Harness::new(ScriptedTransport {
            fail_subscribe: true,
            ..Default::default()
        });

        harness.session.start(&mut harness.timers);
        harness.event(TransportEvent::Connected);

        assert_eq!(harness.session.state(), ConnectionState::Reconnecting);
        assert_eq!(
            harness.session.transport().calls.last(),
            Some(&TransportCall::Disconnect)
        );
        harness.assert_timer_invariants();
    }

    #[test]
    fn test_refresh_failure_is_treated_as_disconnect() {
        let mut harness = Harness::connected();
        harness.session.transport_mut().fail_unsubscribe = true;

        harness.advance_to(Duration::from_secs(2));

        assert_eq!(harness.session.state(), ConnectionState::Reconnecting);
        harness.assert_timer_invariants();
    }

    #[test]
    fn test_stop_from_every_state() {
        struct TestCase {
            setup: fn() -> Harness,
            expected_calls: Vec<TransportCall>,
        }

        let topic = "stockdock/screen/nse-indices".to_string();
        let tests = vec![
            TestCase {
                // TC0: never started
                setup: || Harness::new(ScriptedTransport::default()),
                expected_calls: vec![],
            },
            TestCase {
                // TC1: mid-connect
                setup: || {
                    let mut harness = Harness::new(ScriptedTransport::default());
                    harness.session.start(&mut harness.timers);
                    harness.session.transport_mut().calls.clear();
                    harness
                },
                expected_calls: vec![TransportCall::Disconnect],
            },
            TestCase {
                // TC2: connected
                setup: || {
                    let mut harness = Harness::connected();
                    harness.session.transport_mut().calls.clear();
                    harness
                },
                expected_calls: vec![
                    TransportCall::Unsubscribe(topic.clone()),
                    TransportCall::Disconnect,
                ],
            },
            TestCase {
                // TC3: waiting to reconnect
                setup: || {
                    let mut harness = Harness::new(ScriptedTransport {
                        fail_connect: true,
                        ..Default::default()
                    });
                    harness.session.start(&mut harness.timers);
                    harness.session.transport_mut().calls.clear();
                    harness
                },
                expected_calls: vec![],
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let mut harness = (test.setup)();
            harness.session.stop(&mut harness.timers);

            assert_eq!(
                harness.session.state(),
                ConnectionState::Disconnected,
                "TC{} failed",
                index
            );
            assert_eq!(
                harness.session.transport().calls,
                test.expected_calls,
                "TC{} failed",
                index
            );
            assert_eq!(harness.timers.next_deadline(), None, "TC{} failed", index);
        }
    }

    #[test]
    fn test_late_connect_after_stop_is_closed() {
        let mut harness = Harness::new(ScriptedTransport::default());
        harness.session.start(&mut harness.timers);
        harness.session.stop(&mut harness.timers);
        harness.session.transport_mut().calls.clear();

        harness.event(TransportEvent::Connected);

        assert_eq!(harness.session.state(), ConnectionState::Disconnected);
        assert_eq!(
            harness.session.transport().calls,
            vec![TransportCall::Disconnect]
        );
        harness.assert_timer_invariants();
    }

    #[test]
    fn test_message_updates_registry() {
        let mut harness = Harness::connected();

        let report = harness.event(TransportEvent::Message(
            br#"[{"key":"IDX-I-1","ltp":22419.95,"p_ch":0.79},{"key":"IDX-I-99","ltp":1,"p_ch":1},{"key":"IDX-I-2"}]"#
                .to_vec(),
        ));

        assert_eq!(report, Some(BatchReport::new(1, 1, 1)));

        let nifty = harness.quotes.get("Nifty 50").unwrap();
        assert_eq!(nifty.value, "₹ 22,419.95");
        assert_eq!(nifty.change_percent, 0.79);
        assert!(nifty.is_positive);
        assert_eq!(harness.renderer.quote_calls().count(), 1);
        assert_eq!(harness.session.stats().records_applied, 1);
    }

    #[test]
    fn test_rejected_message_keeps_session_alive() {
        let mut harness = Harness::connected();

        let payloads: [&[u8]; 3] = [br#"{"key":"IDX-I-1"}"#, b"not json", &[0xc3, 0x28]];
        for payload in payloads {
            assert_eq!(harness.event(TransportEvent::Message(payload.to_vec())), None);
        }

        assert_eq!(harness.session.state(), ConnectionState::Connected);
        assert_eq!(harness.session.stats().messages_rejected, 3);
        assert!(harness.renderer.calls.is_empty());
        harness.assert_timer_invariants();
    }

    #[test]
    fn test_message_after_stop_is_dropped() {
        let mut harness = Harness::connected();
        harness.session.stop(&mut harness.timers);

        let report = harness.event(TransportEvent::Message(
            br#"[{"key":"IDX-I-1","ltp":1.0,"p_ch":1.0}]"#.to_vec(),
        ));

        assert_eq!(report, None);
        assert_eq!(harness.quotes.get("Nifty 50").unwrap().value, "₹ 22,419.95");
    }

    #[test]
    fn test_connection_state_display() {
        assert_eq!(ConnectionState::Reconnecting.to_string(), "reconnecting");
        assert_eq!(ConnectionState::Connected.to_string(), "connected");
    }
}
