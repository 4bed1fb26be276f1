//! Wire documents and typed objects for the lqbridge host bridge.
//!
//! This crate defines everything that crosses the host boundary: the
//! dynamic [`WireValue`] document, the static schema registry describing
//! every object and enum, and the codec that converts between the two. It
//! has minimal dependencies (`serde`, `serde_json`, `thiserror`) and is
//! shared by the bridge runtime and the command-line host.
//!
//! # Modules
//!
//! - [`wire`] - Dynamic wire documents and their JSON view
//! - [`schema`] - Object, field and enum shape descriptions
//! - [`registry`] - The canonical schema of every boundary object
//! - [`validate`] - Mandatory-field presence checks
//! - [`record`] - Schema-conforming records and the typed layer
//! - [`codec`] - Decode and encode between wire documents and records
//! - [`requests`], [`responses`], [`payment`], [`events`] - Typed objects

pub mod codec;
pub mod events;
pub mod payment;
pub mod record;
pub mod registry;
pub mod requests;
pub mod responses;
pub mod schema;
pub mod validate;
pub mod wire;

pub use codec::{decode, decode_list, decode_object, encode, encode_list, encode_object};
pub use events::{LogEntry, SdkEvent, SdkEventKind};
pub use payment::{Payment, PaymentState, PaymentType};
pub use record::{FromValue, IntoValue, Record, Value, WireEnum, WireObject};
pub use requests::{
    BackupRequest, ConnectRequest, GetInfoRequest, Network, PrepareReceiveRequest,
    PrepareSendRequest, RestoreRequest,
};
pub use responses::{
    GetInfoResponse, PrepareReceiveResponse, PrepareSendResponse, ReceivePaymentResponse,
    SendPaymentResponse, ack,
};
pub use wire::{WireMap, WireValue};

/// Errors raised while decoding a wire document against a schema.
///
/// Display strings match what hosts already show to users, so they are
/// passed through unchanged as failure messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// A mandatory field is absent or null.
    #[error("Missing mandatory field {field} for type {object}")]
    MissingMandatoryField {
        /// Wire key of the missing field.
        field: &'static str,
        /// Type name of the object being decoded.
        object: &'static str,
    },

    /// A value has the wrong wire type for its field.
    #[error("Unexpected type {0}")]
    UnexpectedType(String),

    /// A value has the right type but is out of range for its field.
    #[error("Unexpected value for field {0}")]
    UnexpectedValue(&'static str),

    /// A string is not a variant of the field's enum table.
    #[error("Unknown enum variant {0}")]
    UnknownEnumVariant(String),
}
