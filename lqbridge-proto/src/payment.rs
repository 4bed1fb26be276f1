//! Payment history entries.

use crate::DecodeError;
use crate::record::{Record, WireEnum, WireObject};
use crate::registry;
use crate::schema::{ObjectSchema, wire_enum};

wire_enum! {
    /// Direction of a payment.
    pub enum PaymentType as PAYMENT_TYPE("PaymentType") {
        /// Incoming funds.
        Receive => "RECEIVE" / "receive",
        /// Outgoing funds.
        Send => "SEND" / "send",
    }
}

wire_enum! {
    /// Lifecycle state of a payment's swap.
    pub enum PaymentState as PAYMENT_STATE("PaymentState") {
        /// Swap created, nothing broadcast yet.
        Created => "CREATED" / "created",
        /// Lockup seen, waiting for the counterpart.
        Pending => "PENDING" / "pending",
        /// Claimed and settled.
        Complete => "COMPLETE" / "complete",
        /// Swap failed; funds may be refundable.
        Failed => "FAILED" / "failed",
        /// Swap expired before completing.
        TimedOut => "TIMED_OUT" / "timed_out",
    }
}

/// One entry of the wallet's payment history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    /// On-chain transaction, once broadcast.
    pub tx_id: Option<String>,
    /// Swap the payment went through, if any.
    pub swap_id: Option<String>,
    /// Unix timestamp in seconds.
    pub timestamp: u32,
    /// Amount moved, in satoshi.
    pub amount_sat: u64,
    /// Fees paid, in satoshi.
    pub fees_sat: u64,
    /// Preimage proving payment, for Lightning sends.
    pub preimage: Option<String>,
    /// Refund transaction, for failed sends.
    pub refund_tx_id: Option<String>,
    /// Refunded amount, in satoshi.
    pub refund_tx_amount_sat: Option<u64>,
    /// Direction.
    pub payment_type: PaymentType,
    /// Current state.
    pub status: PaymentState,
}

impl WireObject for Payment {
    const SCHEMA: &'static ObjectSchema = &registry::PAYMENT;

    fn from_record(mut record: Record) -> Result<Self, DecodeError> {
        Ok(Self {
            tx_id: record.optional("txId")?,
            swap_id: record.optional("swapId")?,
            timestamp: record.required("timestamp")?,
            amount_sat: record.required("amountSat")?,
            fees_sat: record.required("feesSat")?,
            preimage: record.optional("preimage")?,
            refund_tx_id: record.optional("refundTxId")?,
            refund_tx_amount_sat: record.optional("refundTxAmountSat")?,
            payment_type: record.required_enum("paymentType")?,
            status: record.required_enum("status")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new(Self::SCHEMA)
            .with_optional("txId", self.tx_id.as_deref())
            .with_optional("swapId", self.swap_id.as_deref())
            .with("timestamp", self.timestamp)
            .with("amountSat", self.amount_sat)
            .with("feesSat", self.fees_sat)
            .with_optional("preimage", self.preimage.as_deref())
            .with_optional("refundTxId", self.refund_tx_id.as_deref())
            .with_optional("refundTxAmountSat", self.refund_tx_amount_sat)
            .with("paymentType", self.payment_type.variant())
            .with("status", self.status.variant())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::codec::{decode_list, decode_object, encode_list, encode_object};
    use crate::wire::WireValue;

    fn sample() -> Payment {
        Payment {
            tx_id: Some("f00d".into()),
            swap_id: None,
            timestamp: 1_718_000_000,
            amount_sat: 21_000,
            fees_sat: 150,
            preimage: None,
            refund_tx_id: None,
            refund_tx_amount_sat: None,
            payment_type: PaymentType::Send,
            status: PaymentState::TimedOut,
        }
    }

    #[test]
    fn payment_round_trips_with_nulls() {
        let wire = encode_object(&sample());
        assert_eq!(wire.get("swapId"), Some(&WireValue::Null));
        assert_eq!(wire.get("status"), Some(&WireValue::from("timed_out")));
        assert_eq!(wire.get("timestamp"), Some(&WireValue::Int(1_718_000_000)));
        assert_eq!(decode_object::<Payment>(&wire).unwrap(), sample());
    }

    #[test]
    fn payment_lists_round_trip() {
        let mut refunded = sample();
        refunded.status = PaymentState::Failed;
        refunded.refund_tx_id = Some("beef".into());
        refunded.refund_tx_amount_sat = Some(20_000);
        let payments = vec![sample(), refunded];
        let wire = encode_list(&payments);
        assert_eq!(decode_list::<Payment>(&wire).unwrap(), payments);
    }

    #[test]
    fn timestamp_from_host_double() {
        let wire = WireValue::from(json!({
            "timestamp": 1_718_000_000.0,
            "amountSat": 1,
            "feesSat": 0,
            "paymentType": "receive",
            "status": "PENDING",
        }));
        let payment = decode_object::<Payment>(&wire).unwrap();
        assert_eq!(payment.timestamp, 1_718_000_000);
        assert_eq!(payment.status, PaymentState::Pending);
    }
}
