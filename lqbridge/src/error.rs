//! Error types and the translation of errors into boundary failures.
//!
//! Three layers:
//!
//! - [`SdkError`] - the closed set of errors the wallet SDK reports
//! - [`BridgeError`] - everything a bridge operation can fail with
//! - [`BridgeFailure`] - the `(code, message)` pair handed to the host,
//!   carrying the original error as its [`source`](std::error::Error::source)
//!
//! Translation is an exhaustive `match` ([`AsBridgeFailure`]), so adding a
//! variant without deciding its code is a compile error.

use std::error::Error;
use std::fmt;

use lqbridge_proto::DecodeError;

/// Errors reported by the wallet SDK.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum SdkError {
    /// The swap's funds were already claimed.
    #[error("The specified funds have already been claimed")]
    AlreadyClaimed,
    /// The amount is outside the swap provider's limits.
    #[error("The specified amount is outside the allowed range")]
    AmountOutOfRange,
    /// Any other failure.
    #[error("Generic error: {err}")]
    Generic {
        /// Description.
        err: String,
    },
    /// The fee quote expired or does not match.
    #[error("The provided fees have expired")]
    InvalidOrExpiredFees,
    /// The wallet cannot cover amount plus fees.
    #[error("Cannot pay: not enough funds")]
    InsufficientFunds,
    /// The invoice could not be parsed or is for another network.
    #[error("The specified invoice is not valid")]
    InvalidInvoice,
    /// The swap preimage did not hash to the expected value.
    #[error("The generated preimage is not valid")]
    InvalidPreimage,
    /// Wallet-library failure.
    #[error("Lwk error: {err}")]
    LwkError {
        /// Description.
        err: String,
    },
    /// The swap provider returned no trading pairs.
    #[error("Boltz did not return any pairs from the request")]
    PairsNotFound,
    /// Swap state could not be stored.
    #[error("Could not store the swap details locally")]
    PersistError,
    /// The payment failed and was refunded.
    #[error("The payment has been refunded. Reason for failure: {err}")]
    Refunded {
        /// Why the payment failed.
        err: String,
        /// The refund transaction.
        refund_tx_id: String,
    },
    /// Broadcasting failed.
    #[error("Could not send the transaction: {err}")]
    SendError {
        /// Description.
        err: String,
    },
    /// Signing failed.
    #[error("Could not sign the transaction: {err}")]
    SignerError {
        /// Description.
        err: String,
    },
}

impl SdkError {
    /// Creates a [`SdkError::Generic`].
    pub fn generic(err: impl Into<String>) -> Self {
        Self::Generic { err: err.into() }
    }
}

/// Errors a bridge operation can fail with.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The request document did not match its schema.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// The operation needs a live session and there is none.
    #[error("Not initialized")]
    NotInitialized,
    /// `connect` was called while a session exists or is being opened.
    #[error("Already initialized")]
    AlreadyInitialized,
    /// The SDK rejected the operation.
    #[error(transparent)]
    Sdk(#[from] SdkError),
    /// Anything else, already phrased for the host.
    #[error("{0}")]
    Generic(String),
}

impl BridgeError {
    /// Creates a [`BridgeError::Generic`].
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic(message.into())
    }
}

/// Symbolic failure codes seen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    /// A mandatory field was absent or null.
    MissingMandatoryField,
    /// A value had the wrong wire type.
    UnexpectedType,
    /// A value was out of range.
    UnexpectedValue,
    /// An enum string was not in its table.
    UnknownEnumVariant,
    /// No live session.
    NotInitialized,
    /// A session already exists.
    AlreadyInitialized,
    /// Unclassified failure.
    Generic,
    /// Funds already claimed.
    AlreadyClaimed,
    /// Amount out of range.
    AmountOutOfRange,
    /// Fee quote expired.
    InvalidOrExpiredFees,
    /// Not enough funds.
    InsufficientFunds,
    /// Bad invoice.
    InvalidInvoice,
    /// Bad preimage.
    InvalidPreimage,
    /// Wallet-library failure.
    LwkError,
    /// No swap pairs.
    PairsNotFound,
    /// Storage failure.
    PersistError,
    /// Payment refunded.
    Refunded,
    /// Broadcast failure.
    SendError,
    /// Signing failure.
    SignerError,
}

impl ErrorCode {
    /// The code string as sent to the host.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MissingMandatoryField => "MissingMandatoryField",
            Self::UnexpectedType => "UnexpectedType",
            Self::UnexpectedValue => "UnexpectedValue",
            Self::UnknownEnumVariant => "UnknownEnumVariant",
            Self::NotInitialized => "NotInitialized",
            Self::AlreadyInitialized => "AlreadyInitialized",
            Self::Generic => "Generic",
            Self::AlreadyClaimed => "AlreadyClaimed",
            Self::AmountOutOfRange => "AmountOutOfRange",
            Self::InvalidOrExpiredFees => "InvalidOrExpiredFees",
            Self::InsufficientFunds => "InsufficientFunds",
            Self::InvalidInvoice => "InvalidInvoice",
            Self::InvalidPreimage => "InvalidPreimage",
            Self::LwkError => "LwkError",
            Self::PairsNotFound => "PairsNotFound",
            Self::PersistError => "PersistError",
            Self::Refunded => "Refunded",
            Self::SendError => "SendError",
            Self::SignerError => "SignerError",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for converting errors into the `(code, message)` pair the host sees.
pub trait AsBridgeFailure {
    /// Returns the failure code and message for this error.
    fn as_bridge_failure(&self) -> (ErrorCode, String);
}

impl AsBridgeFailure for SdkError {
    fn as_bridge_failure(&self) -> (ErrorCode, String) {
        match self {
            Self::AlreadyClaimed => (ErrorCode::AlreadyClaimed, self.to_string()),
            Self::AmountOutOfRange => (ErrorCode::AmountOutOfRange, self.to_string()),
            Self::Generic { err } => (ErrorCode::Generic, err.clone()),
            Self::InvalidOrExpiredFees => (ErrorCode::InvalidOrExpiredFees, self.to_string()),
            Self::InsufficientFunds => (ErrorCode::InsufficientFunds, self.to_string()),
            Self::InvalidInvoice => (ErrorCode::InvalidInvoice, self.to_string()),
            Self::InvalidPreimage => (ErrorCode::InvalidPreimage, self.to_string()),
            Self::LwkError { err } => (ErrorCode::LwkError, err.clone()),
            Self::PairsNotFound => (ErrorCode::PairsNotFound, self.to_string()),
            Self::PersistError => (ErrorCode::PersistError, self.to_string()),
            Self::Refunded { err, .. } => (ErrorCode::Refunded, err.clone()),
            Self::SendError { err } => (ErrorCode::SendError, err.clone()),
            Self::SignerError { err } => (ErrorCode::SignerError, err.clone()),
        }
    }
}

impl AsBridgeFailure for DecodeError {
    fn as_bridge_failure(&self) -> (ErrorCode, String) {
        let code = match self {
            Self::MissingMandatoryField { .. } => ErrorCode::MissingMandatoryField,
            Self::UnexpectedType(_) => ErrorCode::UnexpectedType,
            Self::UnexpectedValue(_) => ErrorCode::UnexpectedValue,
            Self::UnknownEnumVariant(_) => ErrorCode::UnknownEnumVariant,
        };
        (code, self.to_string())
    }
}

impl AsBridgeFailure for BridgeError {
    fn as_bridge_failure(&self) -> (ErrorCode, String) {
        match self {
            Self::Decode(err) => err.as_bridge_failure(),
            Self::Sdk(err) => err.as_bridge_failure(),
            Self::NotInitialized => (ErrorCode::NotInitialized, self.to_string()),
            Self::AlreadyInitialized => (ErrorCode::AlreadyInitialized, self.to_string()),
            Self::Generic(message) => (ErrorCode::Generic, message.clone()),
        }
    }
}

/// A failure as handed to the host: a code, a message and the cause.
#[derive(Debug)]
pub struct BridgeFailure {
    code: ErrorCode,
    message: String,
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl BridgeFailure {
    /// Creates a failure without an underlying cause.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Translates `err`, keeping it as the cause.
    pub fn from_error<E>(err: E) -> Self
    where
        E: AsBridgeFailure + Error + Send + Sync + 'static,
    {
        let (code, message) = err.as_bridge_failure();
        Self {
            code,
            message,
            source: Some(Box::new(err)),
        }
    }

    /// Wraps an arbitrary error as [`ErrorCode::Generic`] with its display
    /// text.
    pub fn generic<E>(err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            code: ErrorCode::Generic,
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// The failure code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// The human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Downcasts the retained cause.
    #[must_use]
    pub fn cause<E: Error + 'static>(&self) -> Option<&E> {
        self.source.as_deref().and_then(|s| s.downcast_ref::<E>())
    }
}

impl fmt::Display for BridgeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl Error for BridgeFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_deref().map(|s| s as &(dyn Error + 'static))
    }
}

impl From<BridgeError> for BridgeFailure {
    fn from(err: BridgeError) -> Self {
        Self::from_error(err)
    }
}

impl From<SdkError> for BridgeFailure {
    fn from(err: SdkError) -> Self {
        Self::from_error(err)
    }
}

impl From<DecodeError> for BridgeFailure {
    fn from(err: DecodeError) -> Self {
        Self::from_error(err)
    }
}
