//! The host-facing facade.
//!
//! Every operation takes a wire document and resolves with a wire document
//! or a [`BridgeFailure`]. The order is always the same: decode the request
//! (so malformed input fails before anything else), check the session, call
//! the SDK, encode the answer. SDK errors pass through the translator on the
//! way out.

use std::fmt;
use std::sync::Arc;

use lqbridge_proto::{
    BackupRequest, ConnectRequest, GetInfoRequest, GetInfoResponse, Payment,
    DecodeError, PrepareReceiveRequest, PrepareReceiveResponse, PrepareSendRequest, PrepareSendResponse,
    ReceivePaymentResponse, RestoreRequest, SendPaymentResponse, WireValue, ack, decode_object,
    encode_list, encode_object,
};
use tokio::sync::Mutex;
#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::config::{BridgeConfig, DATA_DIR_ERROR};
use crate::error::{BridgeError, BridgeFailure, ErrorCode};
use crate::events::{EventBridge, EventListener, SubscriptionId};
use crate::sdk::SdkConnector;
use crate::session::{SessionGuard, SessionStatus};

/// Host bridge around one wallet session.
pub struct LiquidBridge {
    config: BridgeConfig,
    connector: Arc<dyn SdkConnector>,
    session: SessionGuard,
    events: EventBridge,
    logger: Mutex<Option<SubscriptionId>>,
}

impl fmt::Debug for LiquidBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiquidBridge")
            .field("config", &self.config)
            .field("session", &self.session)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

impl LiquidBridge {
    /// Creates a bridge opening wallets through `connector`.
    pub fn new<C: SdkConnector + 'static>(connector: C) -> Self {
        Self::with_config(connector, BridgeConfig::default())
    }

    /// Creates a bridge with explicit settings.
    pub fn with_config<C: SdkConnector + 'static>(connector: C, config: BridgeConfig) -> Self {
        Self {
            config,
            connector: Arc::new(connector),
            session: SessionGuard::new(),
            events: EventBridge::new(),
            logger: Mutex::new(None),
        }
    }

    /// Settings in effect.
    #[must_use]
    pub const fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// The listener registry.
    #[must_use]
    pub const fn events(&self) -> &EventBridge {
        &self.events
    }

    /// Current session state.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.session.status()
    }

    /// Opens the wallet described by a `ConnectRequest` document.
    ///
    /// # Errors
    ///
    /// Decode failures, `AlreadyInitialized`, `Generic` for an unusable data
    /// directory, or the connector's translated error.
    pub async fn connect(&self, args: &WireValue) -> Result<WireValue, BridgeFailure> {
        self.connect_inner(args).await?;
        Ok(ack())
    }

    /// Closes the session and drops every event subscription.
    ///
    /// # Errors
    ///
    /// `NotInitialized`, or the SDK's translated error, in which case the
    /// session stays open.
    pub async fn disconnect(&self) -> Result<WireValue, BridgeFailure> {
        self.disconnect_inner().await?;
        Ok(ack())
    }

    /// Balance and identity for a `GetInfoRequest` document.
    ///
    /// # Errors
    ///
    /// Decode failures, `NotInitialized`, or the SDK's translated error.
    pub async fn get_info(&self, args: &WireValue) -> Result<WireValue, BridgeFailure> {
        Ok(encode_object(&self.get_info_inner(args).await?))
    }

    /// Quotes a send for a `PrepareSendRequest` document.
    ///
    /// # Errors
    ///
    /// Decode failures, `NotInitialized`, or the SDK's translated error.
    pub async fn prepare_send_payment(&self, args: &WireValue) -> Result<WireValue, BridgeFailure> {
        Ok(encode_object(&self.prepare_send_inner(args).await?))
    }

    /// Executes a send from a `PrepareSendResponse` document.
    ///
    /// # Errors
    ///
    /// Decode failures, `NotInitialized`, or the SDK's translated error.
    pub async fn send_payment(&self, args: &WireValue) -> Result<WireValue, BridgeFailure> {
        Ok(encode_object(&self.send_inner(args).await?))
    }

    /// Quotes a receive for a `PrepareReceiveRequest` document.
    ///
    /// # Errors
    ///
    /// Decode failures, `NotInitialized`, or the SDK's translated error.
    pub async fn prepare_receive_payment(
        &self,
        args: &WireValue,
    ) -> Result<WireValue, BridgeFailure> {
        Ok(encode_object(&self.prepare_receive_inner(args).await?))
    }

    /// Creates a receive from a `PrepareReceiveResponse` document.
    ///
    /// # Errors
    ///
    /// Decode failures, `NotInitialized`, or the SDK's translated error.
    pub async fn receive_payment(&self, args: &WireValue) -> Result<WireValue, BridgeFailure> {
        Ok(encode_object(&self.receive_inner(args).await?))
    }

    /// Payment history as a list of `Payment` documents, newest first.
    ///
    /// # Errors
    ///
    /// `NotInitialized`, or the SDK's translated error.
    pub async fn list_payments(&self) -> Result<WireValue, BridgeFailure> {
        Ok(encode_list(&self.list_payments_inner().await?))
    }

    /// Synchronises the wallet.
    ///
    /// # Errors
    ///
    /// `NotInitialized`, or the SDK's translated error.
    pub async fn sync(&self) -> Result<WireValue, BridgeFailure> {
        self.sync_inner().await?;
        Ok(ack())
    }

    /// Writes a backup described by a `BackupRequest` document.
    ///
    /// # Errors
    ///
    /// Decode failures, `NotInitialized`, or the SDK's translated error.
    pub async fn backup(&self, args: &WireValue) -> Result<WireValue, BridgeFailure> {
        self.backup_inner(args).await?;
        Ok(ack())
    }

    /// Restores from a `RestoreRequest` document.
    ///
    /// # Errors
    ///
    /// Decode failures, `NotInitialized`, or the SDK's translated error.
    pub async fn restore(&self, args: &WireValue) -> Result<WireValue, BridgeFailure> {
        self.restore_inner(args).await?;
        Ok(ack())
    }

    /// Routes log lines to `listener`, replacing any previous logger.
    ///
    /// Works with or without a session.
    ///
    /// # Errors
    ///
    /// `Generic` outside a tokio runtime.
    pub async fn set_logger<L: EventListener>(
        &self,
        listener: L,
    ) -> Result<WireValue, BridgeFailure> {
        let mut current = self.logger.lock().await;
        let id = self.events.add_log_listener(listener)?;
        if let Some(previous) = current.replace(id) {
            self.events.remove_listener(&previous);
        }
        Ok(ack())
    }

    /// Subscribes `listener` to domain events and returns the subscription
    /// id. Events arrive on `event-{id}`.
    ///
    /// # Errors
    ///
    /// `NotInitialized`, or `Generic` outside a tokio runtime.
    #[allow(clippy::unused_async)] // async like every other host operation
    pub async fn add_event_listener<L: EventListener>(
        &self,
        listener: L,
    ) -> Result<WireValue, BridgeFailure> {
        let events = &self.events;
        let id = self.session.with_live(|_| events.add_listener(listener))?;
        Ok(WireValue::String(id.to_string()))
    }

    /// Cancels a subscription. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// `NotInitialized`.
    #[allow(clippy::unused_async)] // async like every other host operation
    pub async fn remove_event_listener(&self, id: &str) -> Result<WireValue, BridgeFailure> {
        let events = &self.events;
        let id = SubscriptionId::from(id);
        self.session
            .with_live(|_| Ok(events.remove_event_listener(&id)))?;
        Ok(ack())
    }

    /// Routes an operation by its host method name.
    ///
    /// `removeEventListener` takes the id either as a bare string or as
    /// `{"id": ...}`. Listener registration is not routable since it takes a
    /// callback.
    ///
    /// # Errors
    ///
    /// Whatever the operation fails with; `Generic` for unknown methods.
    pub async fn dispatch(
        &self,
        method: &str,
        args: &WireValue,
    ) -> Result<WireValue, BridgeFailure> {
        match method {
            "connect" => self.connect(args).await,
            "disconnect" => self.disconnect().await,
            "getInfo" => self.get_info(args).await,
            "prepareSendPayment" => self.prepare_send_payment(args).await,
            "sendPayment" => self.send_payment(args).await,
            "prepareReceivePayment" => self.prepare_receive_payment(args).await,
            "receivePayment" => self.receive_payment(args).await,
            "listPayments" => self.list_payments().await,
            "sync" => self.sync().await,
            "backup" => self.backup(args).await,
            "restore" => self.restore(args).await,
            "removeEventListener" => {
                let id = args
                    .as_str()
                    .or_else(|| args.get("id").and_then(WireValue::as_str))
                    .ok_or_else(|| {
                        BridgeFailure::from(DecodeError::UnexpectedType(
                            args.type_name().to_owned(),
                        ))
                    })?;
                self.remove_event_listener(id).await
            }
            other => Err(BridgeFailure::new(
                ErrorCode::Generic,
                format!("Unknown method {other}"),
            )),
        }
    }

    /// Stops every delivery task. Pending deliveries finish first.
    pub async fn shutdown(&self) {
        self.logger.lock().await.take();
        self.events.shutdown().await;
    }

    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "lqbridge.connect", skip_all, err)
    )]
    async fn connect_inner(&self, args: &WireValue) -> Result<(), BridgeError> {
        let mut request: ConnectRequest = decode_object(args)?;
        let config = &self.config;
        let connector = Arc::clone(&self.connector);
        let sink = self.events.sink();
        // The data directory is only touched once the guard has left Disconnected.
        self.session
            .connect(|| async move {
                if let Some(dir) = config.resolve_data_dir(request.data_dir.as_deref()) {
                    if let Err(err) = config.prepare_data_dir(&dir) {
                        #[cfg(feature = "telemetry")]
                        tracing::warn!(dir = %dir.display(), error = %err, "data directory unusable");
                        #[cfg(not(feature = "telemetry"))]
                        let _ = err;
                        return Err(BridgeError::generic(DATA_DIR_ERROR));
                    }
                    request.data_dir = Some(dir.to_string_lossy().into_owned());
                }
                connector
                    .connect(request, sink)
                    .await
                    .map_err(BridgeError::from)
            })
            .await?;

        #[cfg(feature = "telemetry")]
        tracing::info!("session connected");
        Ok(())
    }

    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "lqbridge.disconnect", skip_all, err)
    )]
    async fn disconnect_inner(&self) -> Result<(), BridgeError> {
        let events = &self.events;
        self.session
            .disconnect(
                |sdk| async move { sdk.disconnect().await.map_err(BridgeError::from) },
                || {
                    let released = events.clear_event_listeners();
                    #[cfg(feature = "telemetry")]
                    tracing::debug!(subscriptions = released, "event listeners released");
                    #[cfg(not(feature = "telemetry"))]
                    let _ = released;
                },
            )
            .await?;

        #[cfg(feature = "telemetry")]
        tracing::info!("session disconnected");
        Ok(())
    }

    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "lqbridge.get_info", skip_all, err)
    )]
    async fn get_info_inner(&self, args: &WireValue) -> Result<GetInfoResponse, BridgeError> {
        let request: GetInfoRequest = decode_object(args)?;
        let sdk = self.session.handle()?;
        Ok(sdk.get_info(request).await?)
    }

    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "lqbridge.prepare_send_payment", skip_all, err)
    )]
    async fn prepare_send_inner(&self, args: &WireValue) -> Result<PrepareSendResponse, BridgeError> {
        let request: PrepareSendRequest = decode_object(args)?;
        let sdk = self.session.handle()?;
        Ok(sdk.prepare_send_payment(&request).await?)
    }

    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "lqbridge.send_payment", skip_all, err)
    )]
    async fn send_inner(&self, args: &WireValue) -> Result<SendPaymentResponse, BridgeError> {
        let request: PrepareSendResponse = decode_object(args)?;
        let sdk = self.session.handle()?;
        Ok(sdk.send_payment(&request).await?)
    }

    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "lqbridge.prepare_receive_payment", skip_all, err)
    )]
    async fn prepare_receive_inner(
        &self,
        args: &WireValue,
    ) -> Result<PrepareReceiveResponse, BridgeError> {
        let request: PrepareReceiveRequest = decode_object(args)?;
        let sdk = self.session.handle()?;
        Ok(sdk.prepare_receive_payment(&request).await?)
    }

    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "lqbridge.receive_payment", skip_all, err)
    )]
    async fn receive_inner(&self, args: &WireValue) -> Result<ReceivePaymentResponse, BridgeError> {
        let request: PrepareReceiveResponse = decode_object(args)?;
        let sdk = self.session.handle()?;
        Ok(sdk.receive_payment(&request).await?)
    }

    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "lqbridge.list_payments", skip_all, err)
    )]
    async fn list_payments_inner(&self) -> Result<Vec<Payment>, BridgeError> {
        let sdk = self.session.handle()?;
        Ok(sdk.list_payments().await?)
    }

    #[cfg_attr(feature = "telemetry", instrument(name = "lqbridge.sync", skip_all, err))]
    async fn sync_inner(&self) -> Result<(), BridgeError> {
        let sdk = self.session.handle()?;
        Ok(sdk.sync().await?)
    }

    #[cfg_attr(feature = "telemetry", instrument(name = "lqbridge.backup", skip_all, err))]
    async fn backup_inner(&self, args: &WireValue) -> Result<(), BridgeError> {
        let request: BackupRequest = decode_object(args)?;
        let sdk = self.session.handle()?;
        Ok(sdk.backup(request).await?)
    }

    #[cfg_attr(feature = "telemetry", instrument(name = "lqbridge.restore", skip_all, err))]
    async fn restore_inner(&self, args: &WireValue) -> Result<(), BridgeError> {
        let request: RestoreRequest = decode_object(args)?;
        let sdk = self.session.handle()?;
        Ok(sdk.restore(request).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use lqbridge_proto::{LogEntry, SdkEvent, decode_list};
    use serde_json::json;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    use super::*;
    use crate::events::{Delivery, LOG_TOPIC};
    use crate::simulated::SimulatedConnector;

    const MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon \
                            abandon abandon abandon about";

    fn bridge() -> LiquidBridge {
        LiquidBridge::new(SimulatedConnector::with_balance(100_000))
    }

    fn connect_args() -> WireValue {
        WireValue::from(json!({"mnemonic": MNEMONIC, "network": "regtest"}))
    }

    fn collector() -> (impl EventListener, UnboundedReceiver<Delivery>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            move |delivery: Delivery| {
                let _ = tx.send(delivery);
            },
            rx,
        )
    }

    async fn next(rx: &mut UnboundedReceiver<Delivery>) -> Delivery {
        tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap()
    }

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("lqbridge-{}-{name}", std::process::id()))
    }

    #[tokio::test]
    async fn operations_need_a_session() {
        let bridge = bridge();
        let err = bridge
            .get_info(&WireValue::from(json!({"withScan": false})))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotInitialized);
        assert_eq!(bridge.sync().await.unwrap_err().code(), ErrorCode::NotInitialized);
        assert_eq!(
            bridge.disconnect().await.unwrap_err().code(),
            ErrorCode::NotInitialized
        );
        let (listener, _rx) = collector();
        assert_eq!(
            bridge.add_event_listener(listener).await.unwrap_err().code(),
            ErrorCode::NotInitialized
        );
    }

    #[tokio::test]
    async fn malformed_requests_fail_before_the_session_check() {
        let bridge = bridge();
        let err = bridge.get_info(&WireValue::from(json!({}))).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::MissingMandatoryField);
        assert_eq!(
            err.message(),
            "Missing mandatory field withScan for type GetInfoRequest"
        );

        let err = bridge
            .connect(&WireValue::from(json!({"mnemonic": MNEMONIC, "network": "mainet"})))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnknownEnumVariant);
        assert_eq!(bridge.status(), SessionStatus::Disconnected);
    }

    #[tokio::test]
    async fn connect_twice_is_already_initialized() {
        let bridge = bridge();
        assert_eq!(bridge.connect(&connect_args()).await.unwrap(), ack());
        let err = bridge.connect(&connect_args()).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::AlreadyInitialized);
        assert_eq!(err.message(), "Already initialized");
    }

    #[tokio::test]
    async fn connector_failure_leaves_the_bridge_disconnected() {
        let bridge = bridge();
        let err = bridge
            .connect(&WireValue::from(json!({"mnemonic": "too short", "network": "regtest"})))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Generic);
        assert_eq!(err.message(), "Invalid mnemonic");
        assert_eq!(bridge.status(), SessionStatus::Disconnected);
        bridge.connect(&connect_args()).await.unwrap();
    }

    #[tokio::test]
    async fn get_info_encodes_balance_as_double() {
        let bridge = bridge();
        bridge.connect(&connect_args()).await.unwrap();
        let info = bridge
            .get_info(&WireValue::from(json!({"withScan": true})))
            .await
            .unwrap();
        assert_eq!(info.get("balanceSat"), Some(&WireValue::Double(100_000.0)));
    }

    #[tokio::test]
    async fn send_flow_through_dispatch() {
        let bridge = bridge();
        bridge.dispatch("connect", &connect_args()).await.unwrap();

        let quote = bridge
            .dispatch(
                "prepareSendPayment",
                &WireValue::from(json!({"invoice": "lnbcrt20000n1demo"})),
            )
            .await
            .unwrap();
        assert_eq!(quote.get("receiverAmountSat"), Some(&WireValue::Double(20_000.0)));

        let sent = bridge.dispatch("sendPayment", &quote).await.unwrap();
        assert!(sent.get("txid").and_then(WireValue::as_str).is_some());

        let payments = bridge.dispatch("listPayments", &WireValue::Null).await.unwrap();
        let payments = decode_list::<Payment>(&payments).unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].amount_sat, 20_000);
    }

    #[tokio::test]
    async fn sdk_errors_are_translated() {
        let bridge = bridge();
        bridge.connect(&connect_args()).await.unwrap();
        let err = bridge
            .prepare_send_payment(&WireValue::from(json!({"invoice": "lnbcrt900000n1big"})))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InsufficientFunds);
        assert_eq!(err.message(), "Cannot pay: not enough funds");

        let err = bridge
            .prepare_receive_payment(&WireValue::from(json!({"payerAmountSat": 5})))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::AmountOutOfRange);
    }

    #[tokio::test]
    async fn unknown_method_is_generic() {
        let err = bridge()
            .dispatch("payEverybody", &WireValue::Null)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Generic);
        assert_eq!(err.message(), "Unknown method payEverybody");
    }

    #[tokio::test]
    async fn listeners_receive_events_until_disconnect() {
        let bridge = bridge();
        bridge.connect(&connect_args()).await.unwrap();
        let (listener, mut rx) = collector();
        let id = bridge.add_event_listener(listener).await.unwrap();
        let id = id.as_str().unwrap().to_owned();

        bridge.sync().await.unwrap();
        let delivery = next(&mut rx).await;
        assert_eq!(delivery.topic, format!("event-{id}"));
        assert_eq!(
            decode_object::<SdkEvent>(&delivery.payload).unwrap(),
            SdkEvent::Synced
        );

        bridge.disconnect().await.unwrap();
        assert_eq!(bridge.events().event_listener_count(), 0);
        assert_eq!(
            bridge.remove_event_listener(&id).await.unwrap_err().code(),
            ErrorCode::NotInitialized
        );
    }

    #[tokio::test]
    async fn removing_a_listener_twice_succeeds() {
        let bridge = bridge();
        bridge.connect(&connect_args()).await.unwrap();
        let (listener, _rx) = collector();
        let id = bridge.add_event_listener(listener).await.unwrap();

        let args = WireValue::map([("id", id.clone())]);
        assert_eq!(bridge.dispatch("removeEventListener", &args).await.unwrap(), ack());
        assert_eq!(bridge.dispatch("removeEventListener", &id).await.unwrap(), ack());
        assert_eq!(bridge.events().event_listener_count(), 0);
    }

    #[tokio::test]
    async fn logger_works_before_connect() {
        let bridge = bridge();
        let (listener, mut rx) = collector();
        assert_eq!(bridge.set_logger(listener).await.unwrap(), ack());

        bridge.connect(&connect_args()).await.unwrap();
        let delivery = next(&mut rx).await;
        assert_eq!(delivery.topic, LOG_TOPIC);
        assert_eq!(
            decode_object::<LogEntry>(&delivery.payload).unwrap(),
            LogEntry::new("INFO", "Connected to regtest")
        );
    }

    #[tokio::test]
    async fn set_logger_replaces_the_previous_logger() {
        let bridge = bridge();
        let (first, _rx_first) = collector();
        let (second, _rx_second) = collector();
        bridge.set_logger(first).await.unwrap();
        bridge.set_logger(second).await.unwrap();
        assert_eq!(bridge.events().log_listener_count(), 1);

        bridge.connect(&connect_args()).await.unwrap();
        bridge.disconnect().await.unwrap();
        assert_eq!(bridge.events().log_listener_count(), 1);
    }

    #[tokio::test]
    async fn default_data_dir_is_created() {
        let dir = scratch_dir("default");
        let _ = std::fs::remove_dir_all(&dir);
        let bridge = LiquidBridge::with_config(
            SimulatedConnector::default(),
            BridgeConfig::default().with_data_dir(&dir),
        );
        bridge.connect(&connect_args()).await.unwrap();
        assert!(dir.is_dir());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn unusable_data_dir_fails_before_the_sdk() {
        let file = scratch_dir("not-a-dir");
        std::fs::write(&file, b"occupied").unwrap();
        let nested = file.join("wallet");

        let bridge = bridge();
        let args = WireValue::from(json!({
            "mnemonic": MNEMONIC,
            "network": "regtest",
            "dataDir": nested.to_string_lossy(),
        }));
        let err = bridge.connect(&args).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::Generic);
        assert_eq!(err.message(), DATA_DIR_ERROR);
        assert_eq!(bridge.status(), SessionStatus::Disconnected);
        let _ = std::fs::remove_file(&file);
    }

    #[tokio::test]
    async fn rejected_connect_leaves_the_data_dir_alone() {
        let bridge = bridge();
        bridge.connect(&connect_args()).await.unwrap();

        let dir = scratch_dir("second-connect");
        let _ = std::fs::remove_dir_all(&dir);
        let args = WireValue::from(json!({
            "mnemonic": MNEMONIC,
            "network": "regtest",
            "dataDir": dir.to_string_lossy(),
        }));
        let err = bridge.connect(&args).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::AlreadyInitialized);
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn remove_listener_rejects_non_string_ids() {
        let bridge = bridge();
        bridge.connect(&connect_args()).await.unwrap();
        let err = bridge
            .dispatch("removeEventListener", &WireValue::from(json!(42)))
            .await
            .unwrap_err();
        let expected = BridgeFailure::from(DecodeError::UnexpectedType("Int".into()));
        assert_eq!(err.code(), ErrorCode::UnexpectedType);
        assert_eq!(err.message(), expected.message());
    }

    #[tokio::test]
    async fn huge_host_amounts_fail_cleanly() {
        let bridge = bridge();
        bridge.connect(&connect_args()).await.unwrap();
        let quote = WireValue::from(json!({
            "id": "x",
            "payerAmountSat": 1.0,
            "receiverAmountSat": 1.8e19,
            "totalFees": 1.8e19,
            "fundingAddress": "lq1qq",
            "invoice": "lnbc1n1",
        }));
        let err = bridge.dispatch("sendPayment", &quote).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidOrExpiredFees);

        let request = WireValue::from(json!({"invoice": "lnbc18446744073709551615n1"}));
        let err = bridge.prepare_send_payment(&request).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::AmountOutOfRange);
    }
}
