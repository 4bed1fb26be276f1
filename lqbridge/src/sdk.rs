//! The wallet SDK as seen by the bridge.
//!
//! Payment and swap logic lives behind these traits. The bridge only
//! decodes requests, checks the session, calls through and encodes the
//! answer.

use std::sync::Arc;

use async_trait::async_trait;
use lqbridge_proto::{
    BackupRequest, ConnectRequest, GetInfoRequest, GetInfoResponse, Payment,
    PrepareReceiveRequest, PrepareReceiveResponse, PrepareSendRequest, PrepareSendResponse,
    ReceivePaymentResponse, RestoreRequest, SendPaymentResponse,
};

use crate::error::SdkError;
use crate::events::EventSink;

/// A connected wallet.
#[async_trait]
pub trait LiquidSdk: Send + Sync {
    /// Balance and identity, optionally after a rescan.
    async fn get_info(&self, request: GetInfoRequest) -> Result<GetInfoResponse, SdkError>;

    /// Quotes paying an invoice.
    async fn prepare_send_payment(
        &self,
        request: &PrepareSendRequest,
    ) -> Result<PrepareSendResponse, SdkError>;

    /// Pays a previously quoted invoice.
    async fn send_payment(
        &self,
        request: &PrepareSendResponse,
    ) -> Result<SendPaymentResponse, SdkError>;

    /// Quotes receiving an amount.
    async fn prepare_receive_payment(
        &self,
        request: &PrepareReceiveRequest,
    ) -> Result<PrepareReceiveResponse, SdkError>;

    /// Creates the swap for a previously quoted receive.
    async fn receive_payment(
        &self,
        request: &PrepareReceiveResponse,
    ) -> Result<ReceivePaymentResponse, SdkError>;

    /// Payment history, newest first.
    async fn list_payments(&self) -> Result<Vec<Payment>, SdkError>;

    /// Synchronises wallet state with the chain and swap provider.
    async fn sync(&self) -> Result<(), SdkError>;

    /// Writes a backup.
    async fn backup(&self, request: BackupRequest) -> Result<(), SdkError>;

    /// Restores from a backup.
    async fn restore(&self, request: RestoreRequest) -> Result<(), SdkError>;

    /// Stops background work. The handle is dropped afterwards.
    async fn disconnect(&self) -> Result<(), SdkError>;
}

/// Opens wallets.
#[async_trait]
pub trait SdkConnector: Send + Sync {
    /// Opens the wallet described by `request`. The SDK emits through
    /// `events` for as long as it lives.
    async fn connect(
        &self,
        request: ConnectRequest,
        events: EventSink,
    ) -> Result<Arc<dyn LiquidSdk>, SdkError>;
}
