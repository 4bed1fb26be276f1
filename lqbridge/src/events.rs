//! Listener registry and delivery of SDK events to the host.
//!
//! The SDK emits from its own tasks; the host registers callbacks. This
//! module is the single hand-off point between the two.
//!
//! # Delivery model
//!
//! - Every registration owns an unbounded queue drained by one delivery
//!   task, so a listener sees events in emission order and a slow listener
//!   never holds up the others.
//! - An emitted event is encoded once and queued to every listener
//!   registered at that moment.
//! - Removal flips the registration's `active` flag; the delivery task
//!   checks it before every callback, so nothing is delivered after
//!   [`EventBridge::remove_listener`] returns (a callback already running
//!   finishes).
//! - Callbacks run on tokio's blocking pool, one at a time per listener,
//!   so a host callback may block without stalling runtime workers.
//! - Domain events go to `event-{id}`; log lines go to [`LOG_TOPIC`] and do
//!   not need a live session.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use lqbridge_proto::{LogEntry, SdkEvent, WireValue, encode_object};
use rand::RngExt;
use rand::rng;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task;
use tokio_util::task::TaskTracker;

use crate::error::BridgeError;

/// Topic log lines are delivered on.
pub const LOG_TOPIC: &str = "lqbridgeLog";

/// Prefix of per-subscription event topics.
pub const EVENT_TOPIC_PREFIX: &str = "event-";

/// Opaque identifier of one listener registration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId(String);

impl SubscriptionId {
    fn random() -> Self {
        let bits: u128 = rng().random();
        Self(format!("{bits:032x}"))
    }

    /// The identifier as handed to the host.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Topic events for this subscription are delivered on.
    #[must_use]
    pub fn topic(&self) -> String {
        format!("{EVENT_TOPIC_PREFIX}{}", self.0)
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubscriptionId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for SubscriptionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One document delivered to a listener.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    /// `event-{id}` or [`LOG_TOPIC`].
    pub topic: String,
    /// Encoded [`SdkEvent`] or [`LogEntry`].
    pub payload: WireValue,
}

/// Host-side callback receiving deliveries.
///
/// Called on a blocking-pool thread, never concurrently for the same
/// listener. A callback that blocks delays only its own listener's queue.
pub trait EventListener: Send + Sync + 'static {
    /// Handles one delivery.
    fn on_event(&self, delivery: Delivery);
}

impl<F> EventListener for F
where
    F: Fn(Delivery) + Send + Sync + 'static,
{
    fn on_event(&self, delivery: Delivery) {
        self(delivery);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Events,
    Logs,
}

struct Registration {
    channel: Channel,
    active: Arc<AtomicBool>,
    queue: mpsc::UnboundedSender<WireValue>,
}

impl Registration {
    fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
    }
}

struct Inner {
    listeners: DashMap<SubscriptionId, Registration>,
    tracker: TaskTracker,
}

/// Registry of host listeners and fan-out point for SDK events.
///
/// Cheap to clone; clones share the registry.
#[derive(Clone)]
pub struct EventBridge {
    inner: Arc<Inner>,
}

impl fmt::Debug for EventBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBridge")
            .field("listeners", &self.inner.listeners.len())
            .field("delivery_tasks", &self.inner.tracker.len())
            .finish()
    }
}

impl Default for EventBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBridge {
    /// Creates an empty bridge.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                listeners: DashMap::new(),
                tracker: TaskTracker::new(),
            }),
        }
    }

    /// Registers a domain-event listener under a fresh id.
    ///
    /// The caller is responsible for checking that a session is live.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Generic`] when called outside a tokio runtime.
    pub fn add_listener<L: EventListener>(&self, listener: L) -> Result<SubscriptionId, BridgeError> {
        self.register(Channel::Events, listener)
    }

    /// Registers a log listener under a fresh id.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Generic`] when called outside a tokio runtime.
    pub fn add_log_listener<L: EventListener>(
        &self,
        listener: L,
    ) -> Result<SubscriptionId, BridgeError> {
        self.register(Channel::Logs, listener)
    }

    /// Removes a registration. Unknown ids are ignored.
    ///
    /// Returns whether a registration was removed.
    pub fn remove_listener(&self, id: &SubscriptionId) -> bool {
        let Some((_, registration)) = self.inner.listeners.remove(id) else {
            return false;
        };
        registration.deactivate();
        #[cfg(feature = "telemetry")]
        tracing::debug!(subscription = %id, "listener removed");
        true
    }

    /// Removes a domain-event registration, leaving log listeners alone even
    /// when `id` names one.
    pub fn remove_event_listener(&self, id: &SubscriptionId) -> bool {
        let removed = self
            .inner
            .listeners
            .remove_if(id, |_, registration| registration.channel == Channel::Events);
        let Some((_, registration)) = removed else {
            return false;
        };
        registration.deactivate();
        #[cfg(feature = "telemetry")]
        tracing::debug!(subscription = %id, "event listener removed");
        true
    }

    /// Removes every domain-event listener, keeping log listeners.
    ///
    /// Returns how many were removed.
    pub fn clear_event_listeners(&self) -> usize {
        let before = self.inner.listeners.len();
        self.inner.listeners.retain(|_, registration| {
            let keep = registration.channel != Channel::Events;
            if !keep {
                registration.deactivate();
            }
            keep
        });
        before.saturating_sub(self.inner.listeners.len())
    }

    /// Number of live domain-event listeners.
    #[must_use]
    pub fn event_listener_count(&self) -> usize {
        self.count(Channel::Events)
    }

    /// Number of live log listeners.
    #[must_use]
    pub fn log_listener_count(&self) -> usize {
        self.count(Channel::Logs)
    }

    /// Encodes `event` once and queues it to every event listener.
    pub fn emit(&self, event: &SdkEvent) {
        self.dispatch(Channel::Events, encode_object(event));
    }

    /// Encodes `entry` once and queues it to every log listener.
    pub fn emit_log(&self, entry: &LogEntry) {
        self.dispatch(Channel::Logs, encode_object(entry));
    }

    /// A handle the SDK uses to emit.
    #[must_use]
    pub fn sink(&self) -> EventSink {
        EventSink {
            bridge: self.clone(),
        }
    }

    /// Removes every listener and waits for in-flight deliveries to finish.
    ///
    /// Registrations racing with the shutdown are refused.
    pub async fn shutdown(&self) {
        self.inner.tracker.close();
        self.inner.listeners.retain(|_, registration| {
            registration.deactivate();
            false
        });
        self.inner.tracker.wait().await;
        self.inner.tracker.reopen();
    }

    fn count(&self, channel: Channel) -> usize {
        self.inner
            .listeners
            .iter()
            .filter(|entry| entry.value().channel == channel)
            .count()
    }

    fn register<L: EventListener>(
        &self,
        channel: Channel,
        listener: L,
    ) -> Result<SubscriptionId, BridgeError> {
        let runtime = Handle::try_current()
            .map_err(|_| BridgeError::generic("Event delivery needs a running tokio runtime"))?;

        let (queue, mut pending) = mpsc::unbounded_channel::<WireValue>();
        let active = Arc::new(AtomicBool::new(true));
        let registration = Registration {
            channel,
            active: Arc::clone(&active),
            queue,
        };
        let id = self.insert_fresh(registration);
        // Checked after the insert: either shutdown's sweep sees this entry
        // or this sees the closed tracker.
        if self.inner.tracker.is_closed() {
            if let Some((_, registration)) = self.inner.listeners.remove(&id) {
                registration.deactivate();
            }
            return Err(BridgeError::generic("Event delivery is shutting down"));
        }

        let topic = match channel {
            Channel::Events => id.topic(),
            Channel::Logs => LOG_TOPIC.to_owned(),
        };
        self.inner.tracker.spawn_on(
            async move {
                let listener = Arc::new(listener);
                while let Some(payload) = pending.recv().await {
                    if !active.load(Ordering::Acquire) {
                        break;
                    }
                    let delivery = Delivery {
                        topic: topic.clone(),
                        payload,
                    };
                    let listener = Arc::clone(&listener);
                    // A panicking callback ends its subscription.
                    if task::spawn_blocking(move || listener.on_event(delivery))
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
            },
            &runtime,
        );

        #[cfg(feature = "telemetry")]
        tracing::debug!(subscription = %id, ?channel, "listener registered");
        Ok(id)
    }

    fn insert_fresh(&self, registration: Registration) -> SubscriptionId {
        loop {
            let id = SubscriptionId::random();
            if let Entry::Vacant(slot) = self.inner.listeners.entry(id.clone()) {
                slot.insert(registration);
                return id;
            }
        }
    }

    fn dispatch(&self, channel: Channel, payload: WireValue) {
        let targets: Vec<_> = self
            .inner
            .listeners
            .iter()
            .filter(|entry| entry.value().channel == channel)
            .map(|entry| entry.value().queue.clone())
            .collect();
        for queue in targets {
            // A closed queue means the listener was removed after the snapshot.
            let _ = queue.send(payload.clone());
        }
    }
}

/// The SDK's handle for emitting events and log lines.
#[derive(Debug, Clone)]
pub struct EventSink {
    bridge: EventBridge,
}

impl EventSink {
    /// Emits a domain event.
    pub fn emit(&self, event: &SdkEvent) {
        self.bridge.emit(event);
    }

    /// Emits a log line.
    pub fn log(&self, level: &str, line: impl Into<String>) {
        self.bridge.emit_log(&LogEntry::new(level, line));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use lqbridge_proto::{Payment, PaymentState, PaymentType, decode_object};
    use tokio::sync::mpsc::UnboundedReceiver;

    use super::*;

    fn collector() -> (
        impl EventListener,
        UnboundedReceiver<Delivery>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        (move |delivery: Delivery| {
            let _ = tx.send(delivery);
        }, rx)
    }

    fn payment(amount_sat: u64) -> Payment {
        Payment {
            tx_id: None,
            swap_id: None,
            timestamp: 0,
            amount_sat,
            fees_sat: 0,
            preimage: None,
            refund_tx_id: None,
            refund_tx_amount_sat: None,
            payment_type: PaymentType::Receive,
            status: PaymentState::Pending,
        }
    }

    async fn next(rx: &mut UnboundedReceiver<Delivery>) -> Delivery {
        tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn delivers_on_subscription_topic() {
        let bridge = EventBridge::new();
        let (listener, mut rx) = collector();
        let id = bridge.add_listener(listener).unwrap();

        bridge.emit(&SdkEvent::Synced);
        let delivery = next(&mut rx).await;
        assert_eq!(delivery.topic, format!("event-{id}"));
        assert_eq!(
            decode_object::<SdkEvent>(&delivery.payload).unwrap(),
            SdkEvent::Synced
        );
    }

    #[tokio::test]
    async fn preserves_per_listener_order() {
        let bridge = EventBridge::new();
        let (listener, mut rx) = collector();
        bridge.add_listener(listener).unwrap();

        for amount in 1..=50 {
            bridge.emit(&SdkEvent::PaymentPending {
                details: payment(amount),
            });
        }
        for amount in 1..=50 {
            let delivery = next(&mut rx).await;
            let event = decode_object::<SdkEvent>(&delivery.payload).unwrap();
            assert_eq!(event.details().map(|p| p.amount_sat), Some(amount));
        }
    }

    #[tokio::test]
    async fn every_listener_gets_every_event() {
        let bridge = EventBridge::new();
        let (a, mut rx_a) = collector();
        let (b, mut rx_b) = collector();
        let id_a = bridge.add_listener(a).unwrap();
        let id_b = bridge.add_listener(b).unwrap();
        assert_ne!(id_a, id_b);

        bridge.emit(&SdkEvent::Synced);
        assert_eq!(next(&mut rx_a).await.topic, id_a.topic());
        assert_eq!(next(&mut rx_b).await.topic, id_b.topic());
    }

    #[tokio::test]
    async fn nothing_is_delivered_after_removal() {
        let bridge = EventBridge::new();
        let seen = Arc::new(Mutex::new(0_usize));
        let counter = Arc::clone(&seen);
        let id = bridge
            .add_listener(move |_: Delivery| *counter.lock().unwrap() += 1)
            .unwrap();

        assert!(bridge.remove_listener(&id));
        bridge.emit(&SdkEvent::Synced);
        bridge.shutdown().await;
        assert_eq!(*seen.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn removal_is_idempotent() {
        let bridge = EventBridge::new();
        let (listener, _rx) = collector();
        let id = bridge.add_listener(listener).unwrap();
        assert!(bridge.remove_listener(&id));
        assert!(!bridge.remove_listener(&id));
        assert!(!bridge.remove_listener(&SubscriptionId::from("never-registered")));
    }

    #[tokio::test]
    async fn event_removal_ignores_log_listeners() {
        let bridge = EventBridge::new();
        let (listener, _rx) = collector();
        let logger = bridge.add_log_listener(listener).unwrap();
        assert!(!bridge.remove_event_listener(&logger));
        assert_eq!(bridge.log_listener_count(), 1);
    }

    #[tokio::test]
    async fn logs_use_the_fixed_topic() {
        let bridge = EventBridge::new();
        let (events, mut rx_events) = collector();
        let (logs, mut rx_logs) = collector();
        bridge.add_listener(events).unwrap();
        bridge.add_log_listener(logs).unwrap();

        bridge.sink().log("INFO", "hello");
        let delivery = next(&mut rx_logs).await;
        assert_eq!(delivery.topic, LOG_TOPIC);
        assert_eq!(
            decode_object::<LogEntry>(&delivery.payload).unwrap(),
            LogEntry::new("INFO", "hello")
        );
        assert!(rx_events.try_recv().is_err());
    }

    #[tokio::test]
    async fn clearing_events_keeps_log_listeners() {
        let bridge = EventBridge::new();
        let (a, _rx_a) = collector();
        let (b, _rx_b) = collector();
        let (c, _rx_c) = collector();
        bridge.add_listener(a).unwrap();
        bridge.add_listener(b).unwrap();
        bridge.add_log_listener(c).unwrap();

        assert_eq!(bridge.clear_event_listeners(), 2);
        assert_eq!(bridge.event_listener_count(), 0);
        assert_eq!(bridge.log_listener_count(), 1);
    }

    #[test]
    fn registration_needs_a_runtime() {
        let bridge = EventBridge::new();
        let err = bridge.add_listener(|_: Delivery| {}).unwrap_err();
        assert!(matches!(err, BridgeError::Generic(_)));
    }

    #[test]
    fn ids_are_hex_encoded_128_bits() {
        let id = SubscriptionId::random();
        assert_eq!(id.as_str().len(), 32);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    /// A listener that signals `entered` and then blocks until `release`
    /// yields a value or is dropped.
    fn gated() -> (
        impl EventListener,
        UnboundedReceiver<()>,
        std::sync::mpsc::Sender<()>,
    ) {
        let (entered, entered_rx) = mpsc::unbounded_channel();
        let (release, gate) = std::sync::mpsc::channel::<()>();
        let gate = Mutex::new(gate);
        let listener = move |_: Delivery| {
            let _ = entered.send(());
            let _ = gate.lock().unwrap().recv();
        };
        (listener, entered_rx, release)
    }

    #[tokio::test(flavor = "current_thread")]
    async fn blocking_listener_does_not_stall_others() {
        let bridge = EventBridge::new();
        let (slow, mut entered, release) = gated();
        let (fast, mut rx) = collector();
        bridge.add_listener(slow).unwrap();
        bridge.add_listener(fast).unwrap();

        bridge.emit(&SdkEvent::Synced);
        entered.recv().await.unwrap();
        assert_eq!(
            decode_object::<SdkEvent>(&next(&mut rx).await.payload).unwrap(),
            SdkEvent::Synced
        );

        drop(release);
        tokio::time::timeout(Duration::from_secs(2), bridge.shutdown())
            .await
            .unwrap();
    }

    #[tokio::test(flavor = "current_thread")]
    async fn registration_during_shutdown_is_refused() {
        let bridge = EventBridge::new();
        let (slow, mut entered, release) = gated();
        bridge.add_listener(slow).unwrap();
        bridge.emit(&SdkEvent::Synced);
        entered.recv().await.unwrap();

        let closing = bridge.clone();
        let shutdown = tokio::spawn(async move { closing.shutdown().await });
        while !bridge.inner.tracker.is_closed() {
            tokio::task::yield_now().await;
        }
        let (late, _rx) = collector();
        assert!(matches!(
            bridge.add_listener(late),
            Err(BridgeError::Generic(_))
        ));
        assert_eq!(bridge.event_listener_count(), 0);

        drop(release);
        tokio::time::timeout(Duration::from_secs(2), shutdown)
            .await
            .unwrap()
            .unwrap();
        let (after, _rx) = collector();
        bridge.add_listener(after).unwrap();
    }
}
