//! Response objects returned by the SDK, plus the acknowledgement document.
//!
//! [`PrepareReceiveResponse`] and [`PrepareSendResponse`] double as the
//! inputs of `receivePayment` and `sendPayment`: the host echoes the quote
//! back to commit to it.

use crate::DecodeError;
use crate::record::{Record, WireObject};
use crate::registry;
use crate::schema::ObjectSchema;
use crate::wire::WireValue;

/// Value of the `status` key in an acknowledgement.
pub const ACK_STATUS: &str = "ok";

/// The `{status: "ok"}` document side-effect-only operations resolve with.
#[must_use]
pub fn ack() -> WireValue {
    WireValue::map([("status", WireValue::from(ACK_STATUS))])
}

/// Wallet balance and identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetInfoResponse {
    /// Confirmed balance in satoshi.
    pub balance_sat: u64,
    /// Hex-encoded wallet public key.
    pub pubkey: String,
}

impl WireObject for GetInfoResponse {
    const SCHEMA: &'static ObjectSchema = &registry::GET_INFO_RESPONSE;

    fn from_record(mut record: Record) -> Result<Self, DecodeError> {
        Ok(Self {
            balance_sat: record.required("balanceSat")?,
            pubkey: record.required("pubkey")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new(Self::SCHEMA)
            .with("balanceSat", self.balance_sat)
            .with("pubkey", self.pubkey.as_str())
    }
}

/// Quote for receiving a payment through a swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareReceiveResponse {
    /// Hash of the swap pair the quote was made against.
    pub pair_hash: String,
    /// Amount the payer sends, in satoshi.
    pub payer_amount_sat: u64,
    /// Swap fees, in satoshi.
    pub fees_sat: u64,
}

impl WireObject for PrepareReceiveResponse {
    const SCHEMA: &'static ObjectSchema = &registry::PREPARE_RECEIVE_RESPONSE;

    fn from_record(mut record: Record) -> Result<Self, DecodeError> {
        Ok(Self {
            pair_hash: record.required("pairHash")?,
            payer_amount_sat: record.required("payerAmountSat")?,
            fees_sat: record.required("feesSat")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new(Self::SCHEMA)
            .with("pairHash", self.pair_hash.as_str())
            .with("payerAmountSat", self.payer_amount_sat)
            .with("feesSat", self.fees_sat)
    }
}

/// Quote for paying an invoice through a swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareSendResponse {
    /// Swap identifier.
    pub id: String,
    /// Amount the wallet pays, in satoshi.
    pub payer_amount_sat: u64,
    /// Amount the invoice receives, in satoshi.
    pub receiver_amount_sat: u64,
    /// Total fees, in satoshi.
    pub total_fees: u64,
    /// Address the wallet funds the swap through.
    pub funding_address: String,
    /// The invoice being paid.
    pub invoice: String,
}

impl WireObject for PrepareSendResponse {
    const SCHEMA: &'static ObjectSchema = &registry::PREPARE_SEND_RESPONSE;

    fn from_record(mut record: Record) -> Result<Self, DecodeError> {
        Ok(Self {
            id: record.required("id")?,
            payer_amount_sat: record.required("payerAmountSat")?,
            receiver_amount_sat: record.required("receiverAmountSat")?,
            total_fees: record.required("totalFees")?,
            funding_address: record.required("fundingAddress")?,
            invoice: record.required("invoice")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new(Self::SCHEMA)
            .with("id", self.id.as_str())
            .with("payerAmountSat", self.payer_amount_sat)
            .with("receiverAmountSat", self.receiver_amount_sat)
            .with("totalFees", self.total_fees)
            .with("fundingAddress", self.funding_address.as_str())
            .with("invoice", self.invoice.as_str())
    }
}

/// A swap created to receive a payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivePaymentResponse {
    /// Swap identifier.
    pub id: String,
    /// Invoice for the payer.
    pub invoice: String,
}

impl WireObject for ReceivePaymentResponse {
    const SCHEMA: &'static ObjectSchema = &registry::RECEIVE_PAYMENT_RESPONSE;

    fn from_record(mut record: Record) -> Result<Self, DecodeError> {
        Ok(Self {
            id: record.required("id")?,
            invoice: record.required("invoice")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new(Self::SCHEMA)
            .with("id", self.id.as_str())
            .with("invoice", self.invoice.as_str())
    }
}

/// A sent payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendPaymentResponse {
    /// Transaction that funded the swap.
    pub txid: String,
}

impl WireObject for SendPaymentResponse {
    const SCHEMA: &'static ObjectSchema = &registry::SEND_PAYMENT_RESPONSE;

    fn from_record(mut record: Record) -> Result<Self, DecodeError> {
        Ok(Self {
            txid: record.required("txid")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new(Self::SCHEMA).with("txid", self.txid.as_str())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::codec::{decode_object, encode_object};

    const PUBKEY: &str = "03d902f35f560e0470c63313c7369168d9d7df2d49bf295fd9fb7cb109ccee0494";

    #[test]
    fn get_info_response_encodes_balance_as_double() {
        let response = GetInfoResponse {
            balance_sat: 1500,
            pubkey: PUBKEY.into(),
        };
        assert_eq!(
            encode_object(&response),
            WireValue::map([
                ("balanceSat", WireValue::Double(1500.0)),
                ("pubkey", WireValue::from(PUBKEY)),
            ])
        );
    }

    #[test]
    fn prepare_send_response_round_trips() {
        let response = PrepareSendResponse {
            id: "swap-1".into(),
            payer_amount_sat: 10_250,
            receiver_amount_sat: 10_000,
            total_fees: 250,
            funding_address: "lq1qq...".into(),
            invoice: "lnbc100u1...".into(),
        };
        let wire = encode_object(&response);
        assert_eq!(decode_object::<PrepareSendResponse>(&wire).unwrap(), response);
    }

    #[test]
    fn prepare_receive_response_accepts_host_doubles() {
        let wire = WireValue::from(json!({
            "pairHash": "abc",
            "payerAmountSat": 5000.0,
            "feesSat": 31.0,
        }));
        let response = decode_object::<PrepareReceiveResponse>(&wire).unwrap();
        assert_eq!(response.payer_amount_sat, 5000);
        assert_eq!(response.fees_sat, 31);
    }

    #[test]
    fn ack_is_status_ok() {
        assert_eq!(ack().to_string(), r#"{"status":"ok"}"#);
    }
}
