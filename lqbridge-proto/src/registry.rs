//! The canonical schema registry.
//!
//! Every object that crosses the boundary has exactly one schema here, and
//! every enum table is listed in [`ENUMS`]. Typed structs point at these
//! statics through [`WireObject::SCHEMA`](crate::WireObject::SCHEMA).

use crate::events::SDK_EVENT_KIND;
use crate::payment::{PAYMENT_STATE, PAYMENT_TYPE};
use crate::requests::NETWORK;
use crate::schema::{EnumSchema, FieldKind, FieldSpec, ObjectSchema};

/// `ConnectRequest`.
pub static CONNECT_REQUEST: ObjectSchema = ObjectSchema {
    name: "ConnectRequest",
    fields: &[
        FieldSpec {
            name: "mnemonic",
            mandatory: true,
            kind: FieldKind::String,
        },
        FieldSpec {
            name: "network",
            mandatory: true,
            kind: FieldKind::Enum(&NETWORK),
        },
        FieldSpec {
            name: "dataDir",
            mandatory: false,
            kind: FieldKind::String,
        },
    ],
};

/// `GetInfoRequest`.
pub static GET_INFO_REQUEST: ObjectSchema = ObjectSchema {
    name: "GetInfoRequest",
    fields: &[FieldSpec {
        name: "withScan",
        mandatory: true,
        kind: FieldKind::Bool,
    }],
};

/// `GetInfoResponse`.
pub static GET_INFO_RESPONSE: ObjectSchema = ObjectSchema {
    name: "GetInfoResponse",
    fields: &[
        FieldSpec {
            name: "balanceSat",
            mandatory: true,
            kind: FieldKind::UInt64,
        },
        FieldSpec {
            name: "pubkey",
            mandatory: true,
            kind: FieldKind::String,
        },
    ],
};

/// `PrepareReceiveRequest`.
pub static PREPARE_RECEIVE_REQUEST: ObjectSchema = ObjectSchema {
    name: "PrepareReceiveRequest",
    fields: &[FieldSpec {
        name: "payerAmountSat",
        mandatory: true,
        kind: FieldKind::UInt64,
    }],
};

/// `PrepareReceiveResponse`.
pub static PREPARE_RECEIVE_RESPONSE: ObjectSchema = ObjectSchema {
    name: "PrepareReceiveResponse",
    fields: &[
        FieldSpec {
            name: "pairHash",
            mandatory: true,
            kind: FieldKind::String,
        },
        FieldSpec {
            name: "payerAmountSat",
            mandatory: true,
            kind: FieldKind::UInt64,
        },
        FieldSpec {
            name: "feesSat",
            mandatory: true,
            kind: FieldKind::UInt64,
        },
    ],
};

/// `PrepareSendRequest`.
pub static PREPARE_SEND_REQUEST: ObjectSchema = ObjectSchema {
    name: "PrepareSendRequest",
    fields: &[FieldSpec {
        name: "invoice",
        mandatory: true,
        kind: FieldKind::String,
    }],
};

/// `PrepareSendResponse`.
pub static PREPARE_SEND_RESPONSE: ObjectSchema = ObjectSchema {
    name: "PrepareSendResponse",
    fields: &[
        FieldSpec {
            name: "id",
            mandatory: true,
            kind: FieldKind::String,
        },
        FieldSpec {
            name: "payerAmountSat",
            mandatory: true,
            kind: FieldKind::UInt64,
        },
        FieldSpec {
            name: "receiverAmountSat",
            mandatory: true,
            kind: FieldKind::UInt64,
        },
        FieldSpec {
            name: "totalFees",
            mandatory: true,
            kind: FieldKind::UInt64,
        },
        FieldSpec {
            name: "fundingAddress",
            mandatory: true,
            kind: FieldKind::String,
        },
        FieldSpec {
            name: "invoice",
            mandatory: true,
            kind: FieldKind::String,
        },
    ],
};

/// `ReceivePaymentResponse`.
pub static RECEIVE_PAYMENT_RESPONSE: ObjectSchema = ObjectSchema {
    name: "ReceivePaymentResponse",
    fields: &[
        FieldSpec {
            name: "id",
            mandatory: true,
            kind: FieldKind::String,
        },
        FieldSpec {
            name: "invoice",
            mandatory: true,
            kind: FieldKind::String,
        },
    ],
};

/// `SendPaymentResponse`.
pub static SEND_PAYMENT_RESPONSE: ObjectSchema = ObjectSchema {
    name: "SendPaymentResponse",
    fields: &[FieldSpec {
        name: "txid",
        mandatory: true,
        kind: FieldKind::String,
    }],
};

/// `BackupRequest`.
pub static BACKUP_REQUEST: ObjectSchema = ObjectSchema {
    name: "BackupRequest",
    fields: &[FieldSpec {
        name: "backupPath",
        mandatory: false,
        kind: FieldKind::String,
    }],
};

/// `RestoreRequest`.
pub static RESTORE_REQUEST: ObjectSchema = ObjectSchema {
    name: "RestoreRequest",
    fields: &[FieldSpec {
        name: "backupPath",
        mandatory: false,
        kind: FieldKind::String,
    }],
};

/// `Payment`.
pub static PAYMENT: ObjectSchema = ObjectSchema {
    name: "Payment",
    fields: &[
        FieldSpec {
            name: "txId",
            mandatory: false,
            kind: FieldKind::String,
        },
        FieldSpec {
            name: "swapId",
            mandatory: false,
            kind: FieldKind::String,
        },
        FieldSpec {
            name: "timestamp",
            mandatory: true,
            kind: FieldKind::UInt32,
        },
        FieldSpec {
            name: "amountSat",
            mandatory: true,
            kind: FieldKind::UInt64,
        },
        FieldSpec {
            name: "feesSat",
            mandatory: true,
            kind: FieldKind::UInt64,
        },
        FieldSpec {
            name: "preimage",
            mandatory: false,
            kind: FieldKind::String,
        },
        FieldSpec {
            name: "refundTxId",
            mandatory: false,
            kind: FieldKind::String,
        },
        FieldSpec {
            name: "refundTxAmountSat",
            mandatory: false,
            kind: FieldKind::UInt64,
        },
        FieldSpec {
            name: "paymentType",
            mandatory: true,
            kind: FieldKind::Enum(&PAYMENT_TYPE),
        },
        FieldSpec {
            name: "status",
            mandatory: true,
            kind: FieldKind::Enum(&PAYMENT_STATE),
        },
    ],
};

/// `SdkEvent`. `details` is required for every type except `synced`, which
/// the typed layer enforces.
pub static SDK_EVENT: ObjectSchema = ObjectSchema {
    name: "SdkEvent",
    fields: &[
        FieldSpec {
            name: "type",
            mandatory: true,
            kind: FieldKind::Enum(&SDK_EVENT_KIND),
        },
        FieldSpec {
            name: "details",
            mandatory: false,
            kind: FieldKind::Object(&PAYMENT),
        },
    ],
};

/// `LogEntry`.
pub static LOG_ENTRY: ObjectSchema = ObjectSchema {
    name: "LogEntry",
    fields: &[
        FieldSpec {
            name: "line",
            mandatory: true,
            kind: FieldKind::String,
        },
        FieldSpec {
            name: "level",
            mandatory: true,
            kind: FieldKind::String,
        },
    ],
};

/// Every registered object schema.
pub static OBJECTS: &[&ObjectSchema] = &[
    &CONNECT_REQUEST,
    &GET_INFO_REQUEST,
    &GET_INFO_RESPONSE,
    &PREPARE_RECEIVE_REQUEST,
    &PREPARE_RECEIVE_RESPONSE,
    &PREPARE_SEND_REQUEST,
    &PREPARE_SEND_RESPONSE,
    &RECEIVE_PAYMENT_RESPONSE,
    &SEND_PAYMENT_RESPONSE,
    &BACKUP_REQUEST,
    &RESTORE_REQUEST,
    &PAYMENT,
    &SDK_EVENT,
    &LOG_ENTRY,
];

/// Every registered enum table.
pub static ENUMS: &[&EnumSchema] = &[&NETWORK, &PAYMENT_TYPE, &PAYMENT_STATE, &SDK_EVENT_KIND];

/// Looks up an object schema by type name.
#[must_use]
pub fn object(name: &str) -> Option<&'static ObjectSchema> {
    OBJECTS.iter().copied().find(|schema| schema.name == name)
}

/// Looks up an enum table by type name.
#[must_use]
pub fn enumeration(name: &str) -> Option<&'static EnumSchema> {
    ENUMS.iter().copied().find(|schema| schema.name == name)
}
