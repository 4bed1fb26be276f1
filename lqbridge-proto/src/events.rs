//! Asynchronous documents flowing from the SDK to the host: domain events
//! and log lines.

use crate::DecodeError;
use crate::payment::Payment;
use crate::record::{Record, WireEnum, WireObject};
use crate::registry;
use crate::schema::{ObjectSchema, wire_enum};

wire_enum! {
    /// Discriminant of an [`SdkEvent`], carried in its `type` key.
    pub enum SdkEventKind as SDK_EVENT_KIND("SdkEventKind") {
        /// A payment failed.
        PaymentFailed => "PAYMENT_FAILED" / "payment_failed",
        /// A payment is in flight.
        PaymentPending => "PAYMENT_PENDING" / "payment_pending",
        /// A failed payment was refunded.
        PaymentRefunded => "PAYMENT_REFUNDED" / "payment_refunded",
        /// A refund was broadcast and awaits confirmation.
        PaymentRefundPending => "PAYMENT_REFUND_PENDING" / "payment_refund_pending",
        /// A payment settled.
        PaymentSucceeded => "PAYMENT_SUCCEEDED" / "payment_succeeded",
        /// A payment is waiting for on-chain confirmation.
        PaymentWaitingConfirmation => "PAYMENT_WAITING_CONFIRMATION" / "payment_waiting_confirmation",
        /// The wallet finished a sync round.
        Synced => "SYNCED" / "synced",
    }
}

/// A domain event emitted by the SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdkEvent {
    /// A payment failed.
    PaymentFailed {
        /// The affected payment.
        details: Payment,
    },
    /// A payment is in flight.
    PaymentPending {
        /// The affected payment.
        details: Payment,
    },
    /// A failed payment was refunded.
    PaymentRefunded {
        /// The affected payment.
        details: Payment,
    },
    /// A refund awaits confirmation.
    PaymentRefundPending {
        /// The affected payment.
        details: Payment,
    },
    /// A payment settled.
    PaymentSucceeded {
        /// The affected payment.
        details: Payment,
    },
    /// A payment waits for confirmation.
    PaymentWaitingConfirmation {
        /// The affected payment.
        details: Payment,
    },
    /// The wallet finished syncing.
    Synced,
}

impl SdkEvent {
    /// Builds an event from its discriminant and optional payload.
    ///
    /// # Errors
    ///
    /// [`DecodeError::MissingMandatoryField`] for `details` when a payment
    /// event has no payment attached.
    pub fn new(kind: SdkEventKind, details: Option<Payment>) -> Result<Self, DecodeError> {
        if kind == SdkEventKind::Synced {
            return Ok(Self::Synced);
        }
        let details = details.ok_or(DecodeError::MissingMandatoryField {
            field: "details",
            object: registry::SDK_EVENT.name,
        })?;
        Ok(match kind {
            SdkEventKind::PaymentFailed => Self::PaymentFailed { details },
            SdkEventKind::PaymentPending => Self::PaymentPending { details },
            SdkEventKind::PaymentRefunded => Self::PaymentRefunded { details },
            SdkEventKind::PaymentRefundPending => Self::PaymentRefundPending { details },
            SdkEventKind::PaymentSucceeded => Self::PaymentSucceeded { details },
            SdkEventKind::PaymentWaitingConfirmation => {
                Self::PaymentWaitingConfirmation { details }
            }
            SdkEventKind::Synced => Self::Synced,
        })
    }

    /// The event's discriminant.
    #[must_use]
    pub const fn kind(&self) -> SdkEventKind {
        match self {
            Self::PaymentFailed { .. } => SdkEventKind::PaymentFailed,
            Self::PaymentPending { .. } => SdkEventKind::PaymentPending,
            Self::PaymentRefunded { .. } => SdkEventKind::PaymentRefunded,
            Self::PaymentRefundPending { .. } => SdkEventKind::PaymentRefundPending,
            Self::PaymentSucceeded { .. } => SdkEventKind::PaymentSucceeded,
            Self::PaymentWaitingConfirmation { .. } => SdkEventKind::PaymentWaitingConfirmation,
            Self::Synced => SdkEventKind::Synced,
        }
    }

    /// The payment this event is about, if any.
    #[must_use]
    pub const fn details(&self) -> Option<&Payment> {
        match self {
            Self::PaymentFailed { details }
            | Self::PaymentPending { details }
            | Self::PaymentRefunded { details }
            | Self::PaymentRefundPending { details }
            | Self::PaymentSucceeded { details }
            | Self::PaymentWaitingConfirmation { details } => Some(details),
            Self::Synced => None,
        }
    }
}

impl WireObject for SdkEvent {
    const SCHEMA: &'static ObjectSchema = &registry::SDK_EVENT;

    fn from_record(mut record: Record) -> Result<Self, DecodeError> {
        let kind = record.required_enum("type")?;
        let details = record.optional_object("details")?;
        Self::new(kind, details)
    }

    fn to_record(&self) -> Record {
        Record::new(Self::SCHEMA)
            .with("type", self.kind().variant())
            .with_optional("details", self.details().map(Payment::to_record))
    }
}

/// One log line forwarded to the host's log topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Formatted message.
    pub line: String,
    /// Level name, e.g. `INFO`.
    pub level: String,
}

impl LogEntry {
    /// Creates a log entry.
    pub fn new(level: impl Into<String>, line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            level: level.into(),
        }
    }
}

impl WireObject for LogEntry {
    const SCHEMA: &'static ObjectSchema = &registry::LOG_ENTRY;

    fn from_record(mut record: Record) -> Result<Self, DecodeError> {
        Ok(Self {
            line: record.required("line")?,
            level: record.required("level")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new(Self::SCHEMA)
            .with("line", self.line.as_str())
            .with("level", self.level.as_str())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::codec::{decode_object, encode_object};
    use crate::payment::{PaymentState, PaymentType};
    use crate::wire::WireValue;

    fn payment() -> Payment {
        Payment {
            tx_id: None,
            swap_id: Some("swap".into()),
            timestamp: 1,
            amount_sat: 1000,
            fees_sat: 10,
            preimage: None,
            refund_tx_id: None,
            refund_tx_amount_sat: None,
            payment_type: PaymentType::Receive,
            status: PaymentState::Complete,
        }
    }

    #[test]
    fn synced_encodes_null_details() {
        let wire = encode_object(&SdkEvent::Synced);
        assert_eq!(
            wire,
            WireValue::map([
                ("type", WireValue::from("synced")),
                ("details", WireValue::Null),
            ])
        );
        assert_eq!(decode_object::<SdkEvent>(&wire).unwrap(), SdkEvent::Synced);
    }

    #[test]
    fn payment_events_round_trip() {
        let event = SdkEvent::PaymentSucceeded { details: payment() };
        let wire = encode_object(&event);
        assert_eq!(wire.get("type"), Some(&WireValue::from("payment_succeeded")));
        assert_eq!(decode_object::<SdkEvent>(&wire).unwrap(), event);
    }

    #[test]
    fn payment_event_without_details_is_rejected() {
        let wire = WireValue::from(json!({"type": "payment_failed"}));
        assert_eq!(
            decode_object::<SdkEvent>(&wire).unwrap_err(),
            DecodeError::MissingMandatoryField {
                field: "details",
                object: "SdkEvent"
            }
        );
    }

    #[test]
    fn log_entry_round_trips() {
        let entry = LogEntry::new("INFO", "synced in 20ms");
        assert_eq!(decode_object::<LogEntry>(&encode_object(&entry)).unwrap(), entry);
    }
}
