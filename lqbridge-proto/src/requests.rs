//! Request objects sent from the host to the SDK.

use std::fmt;

use crate::DecodeError;
use crate::record::{Record, WireEnum, WireObject};
use crate::registry;
use crate::schema::{ObjectSchema, wire_enum};

wire_enum! {
    /// Liquid network the wallet operates on.
    pub enum Network as NETWORK("Network") {
        /// Liquid mainnet.
        Mainnet => "MAINNET" / "mainnet",
        /// Liquid testnet.
        Testnet => "TESTNET" / "testnet",
        /// Signet-backed test network.
        Signet => "SIGNET" / "signet",
        /// Local regression-test network.
        Regtest => "REGTEST" / "regtest",
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Opens a session. The mnemonic is redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectRequest {
    /// BIP-39 mnemonic of the wallet.
    pub mnemonic: String,
    /// Network to connect to.
    pub network: Network,
    /// Directory the SDK keeps its state in.
    pub data_dir: Option<String>,
}

impl fmt::Debug for ConnectRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectRequest")
            .field("mnemonic", &"<redacted>")
            .field("network", &self.network)
            .field("data_dir", &self.data_dir)
            .finish()
    }
}

impl WireObject for ConnectRequest {
    const SCHEMA: &'static ObjectSchema = &registry::CONNECT_REQUEST;

    fn from_record(mut record: Record) -> Result<Self, DecodeError> {
        Ok(Self {
            mnemonic: record.required("mnemonic")?,
            network: record.required_enum("network")?,
            data_dir: record.optional("dataDir")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new(Self::SCHEMA)
            .with("mnemonic", self.mnemonic.as_str())
            .with("network", self.network.variant())
            .with_optional("dataDir", self.data_dir.as_deref())
    }
}

/// Asks for the wallet balance and identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetInfoRequest {
    /// Rescan the chain before answering.
    pub with_scan: bool,
}

impl WireObject for GetInfoRequest {
    const SCHEMA: &'static ObjectSchema = &registry::GET_INFO_REQUEST;

    fn from_record(mut record: Record) -> Result<Self, DecodeError> {
        Ok(Self {
            with_scan: record.required("withScan")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new(Self::SCHEMA).with("withScan", self.with_scan)
    }
}

/// Asks for a quote to receive `payer_amount_sat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrepareReceiveRequest {
    /// Amount the payer will send, in satoshi.
    pub payer_amount_sat: u64,
}

impl WireObject for PrepareReceiveRequest {
    const SCHEMA: &'static ObjectSchema = &registry::PREPARE_RECEIVE_REQUEST;

    fn from_record(mut record: Record) -> Result<Self, DecodeError> {
        Ok(Self {
            payer_amount_sat: record.required("payerAmountSat")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new(Self::SCHEMA).with("payerAmountSat", self.payer_amount_sat)
    }
}

/// Asks for a quote to pay a Lightning invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareSendRequest {
    /// BOLT11 invoice to pay.
    pub invoice: String,
}

impl WireObject for PrepareSendRequest {
    const SCHEMA: &'static ObjectSchema = &registry::PREPARE_SEND_REQUEST;

    fn from_record(mut record: Record) -> Result<Self, DecodeError> {
        Ok(Self {
            invoice: record.required("invoice")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new(Self::SCHEMA).with("invoice", self.invoice.as_str())
    }
}

/// Writes a wallet backup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackupRequest {
    /// Target file; the SDK picks a default location when absent.
    pub backup_path: Option<String>,
}

impl WireObject for BackupRequest {
    const SCHEMA: &'static ObjectSchema = &registry::BACKUP_REQUEST;

    fn from_record(mut record: Record) -> Result<Self, DecodeError> {
        Ok(Self {
            backup_path: record.optional("backupPath")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new(Self::SCHEMA).with_optional("backupPath", self.backup_path.as_deref())
    }
}

/// Restores the wallet from a backup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreRequest {
    /// Source file; the SDK uses its latest backup when absent.
    pub backup_path: Option<String>,
}

impl WireObject for RestoreRequest {
    const SCHEMA: &'static ObjectSchema = &registry::RESTORE_REQUEST;

    fn from_record(mut record: Record) -> Result<Self, DecodeError> {
        Ok(Self {
            backup_path: record.optional("backupPath")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new(Self::SCHEMA).with_optional("backupPath", self.backup_path.as_deref())
    }
}
