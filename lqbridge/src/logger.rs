//! Forwards `tracing` events to the host's log topic.
//!
//! Install [`LogForwardLayer`] next to any other layer; every event becomes a
//! [`LogEntry`] delivered to the listener registered with `set_logger`.
//!
//! ```ignore
//! use tracing_subscriber::prelude::*;
//!
//! tracing_subscriber::registry()
//!     .with(LogForwardLayer::new(bridge.events().clone()))
//!     .init();
//! ```

use std::fmt::{self, Write as _};

use lqbridge_proto::LogEntry;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::events::EventBridge;

/// Listener bookkeeping logs here; forwarding it would echo every
/// registration back to the logger.
const SKIPPED_MODULE: &str = "lqbridge::events";

/// A [`Layer`] turning `tracing` events into host log lines.
#[derive(Debug, Clone)]
pub struct LogForwardLayer {
    events: EventBridge,
}

impl LogForwardLayer {
    /// Forwards into `events`' log listeners.
    #[must_use]
    pub const fn new(events: EventBridge) -> Self {
        Self { events }
    }
}

impl<S: Subscriber> Layer<S> for LogForwardLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if metadata
            .module_path()
            .is_some_and(|path| path.starts_with(SKIPPED_MODULE))
        {
            return;
        }
        if self.events.log_listener_count() == 0 {
            return;
        }
        let mut line = LineWriter::default();
        event.record(&mut line);
        self.events.emit_log(&LogEntry::new(
            metadata.level().to_string(),
            line.finish(metadata.target()),
        ));
    }
}

#[derive(Default)]
struct LineWriter {
    message: String,
    fields: String,
}

impl LineWriter {
    fn finish(self, target: &str) -> String {
        format!("{target}: {}{}", self.message, self.fields)
    }
}

impl Visit for LineWriter {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={value}", field.name());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={value:?}", field.name());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use lqbridge_proto::decode_object;
    use tokio::sync::mpsc;
    use tracing_subscriber::prelude::*;

    use super::*;
    use crate::events::Delivery;

    #[tokio::test]
    async fn forwards_events_with_fields() {
        let events = EventBridge::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        events
            .add_log_listener(move |delivery: Delivery| {
                let _ = tx.send(delivery);
            })
            .unwrap();

        let subscriber = tracing_subscriber::registry().with(LogForwardLayer::new(events.clone()));
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(target: "wallet", swap = "ab12", "refund broadcast");
        });

        let delivery = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        let entry = decode_object::<LogEntry>(&delivery.payload).unwrap();
        assert_eq!(entry.level, "WARN");
        assert_eq!(entry.line, "wallet: refund broadcast swap=ab12");
    }
}
