//! An in-memory wallet standing in for the real SDK.
//!
//! Deterministic enough for tests and demos: no network, no persistence.
//! Sends settle immediately; receives stay pending until the next `sync`,
//! which stands in for the payer paying the invoice.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use lqbridge_proto::{
    BackupRequest, ConnectRequest, GetInfoRequest, GetInfoResponse, Network, Payment,
    PaymentState, PaymentType, PrepareReceiveRequest, PrepareReceiveResponse,
    PrepareSendRequest, PrepareSendResponse, ReceivePaymentResponse, RestoreRequest, SdkEvent,
    SendPaymentResponse,
};
use rand::RngExt;
use rand::rng;
use tokio::sync::Mutex;

use crate::error::SdkError;
use crate::events::EventSink;
use crate::sdk::{LiquidSdk, SdkConnector};

/// Smallest amount a receive swap accepts.
pub const MIN_RECEIVE_SAT: u64 = 1_000;
/// Largest amount a receive swap accepts.
pub const MAX_RECEIVE_SAT: u64 = 25_000_000;

const SEND_BASE_FEE_SAT: u64 = 25;
const RECEIVE_BASE_FEE_SAT: u64 = 20;

fn random_hex(bytes: usize) -> String {
    let mut rng = rng();
    (0..bytes)
        .map(|_| format!("{:02x}", rng.random::<u8>()))
        .collect()
}

fn now() -> u32 {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs());
    u32::try_from(secs).unwrap_or(u32::MAX)
}

/// Reads the amount out of a simulated invoice: `ln<hrp><amount-in-sat>...`.
fn invoice_amount(invoice: &str) -> Option<u64> {
    let rest = invoice.strip_prefix("ln")?;
    let digits_at = rest.find(|c: char| c.is_ascii_digit())?;
    let digits: String = rest[digits_at..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok().filter(|amount| *amount > 0)
}

#[derive(Debug, Default)]
struct Wallet {
    balance_sat: u64,
    payments: Vec<Payment>,
    last_backup: Option<String>,
    closed: bool,
}

/// Simulated wallet.
#[derive(Debug)]
pub struct SimulatedSdk {
    network: Network,
    pubkey: String,
    wallet: Mutex<Wallet>,
    events: Option<EventSink>,
}

impl Default for SimulatedSdk {
    fn default() -> Self {
        Self::new(Network::Regtest, 0, None)
    }
}

impl SimulatedSdk {
    /// Creates a wallet holding `balance_sat`, emitting through `events`.
    #[must_use]
    pub fn new(network: Network, balance_sat: u64, events: Option<EventSink>) -> Self {
        Self {
            network,
            pubkey: format!("02{}", random_hex(32)),
            wallet: Mutex::new(Wallet {
                balance_sat,
                ..Wallet::default()
            }),
            events,
        }
    }

    /// Network the wallet was opened on.
    #[must_use]
    pub const fn network(&self) -> Network {
        self.network
    }

    fn emit(&self, event: &SdkEvent) {
        if let Some(events) = &self.events {
            events.emit(event);
        }
    }

    fn log(&self, level: &str, line: String) {
        if let Some(events) = &self.events {
            events.log(level, line);
        }
    }

    async fn open_wallet(&self) -> Result<tokio::sync::MutexGuard<'_, Wallet>, SdkError> {
        let wallet = self.wallet.lock().await;
        if wallet.closed {
            return Err(SdkError::generic("Wallet is closed"));
        }
        Ok(wallet)
    }
}

#[async_trait]
impl LiquidSdk for SimulatedSdk {
    async fn get_info(&self, request: GetInfoRequest) -> Result<GetInfoResponse, SdkError> {
        let wallet = self.open_wallet().await?;
        if request.with_scan {
            self.log("DEBUG", format!("Full scan on {}", self.network));
        }
        Ok(GetInfoResponse {
            balance_sat: wallet.balance_sat,
            pubkey: self.pubkey.clone(),
        })
    }

    async fn prepare_send_payment(
        &self,
        request: &PrepareSendRequest,
    ) -> Result<PrepareSendResponse, SdkError> {
        let wallet = self.open_wallet().await?;
        let receiver_amount_sat = invoice_amount(&request.invoice).ok_or(SdkError::InvalidInvoice)?;
        let total_fees = SEND_BASE_FEE_SAT + receiver_amount_sat / 1_000;
        let payer_amount_sat = receiver_amount_sat
            .checked_add(total_fees)
            .ok_or(SdkError::AmountOutOfRange)?;
        if payer_amount_sat > wallet.balance_sat {
            return Err(SdkError::InsufficientFunds);
        }
        Ok(PrepareSendResponse {
            id: random_hex(6),
            payer_amount_sat,
            receiver_amount_sat,
            total_fees,
            funding_address: format!("lq1qq{}", random_hex(20)),
            invoice: request.invoice.clone(),
        })
    }

    async fn send_payment(
        &self,
        request: &PrepareSendResponse,
    ) -> Result<SendPaymentResponse, SdkError> {
        let mut wallet = self.open_wallet().await?;
        if request.receiver_amount_sat.checked_add(request.total_fees)
            != Some(request.payer_amount_sat)
        {
            return Err(SdkError::InvalidOrExpiredFees);
        }
        let remaining = wallet
            .balance_sat
            .checked_sub(request.payer_amount_sat)
            .ok_or(SdkError::InsufficientFunds)?;
        wallet.balance_sat = remaining;

        let txid = random_hex(32);
        let mut payment = Payment {
            tx_id: Some(txid.clone()),
            swap_id: Some(request.id.clone()),
            timestamp: now(),
            amount_sat: request.receiver_amount_sat,
            fees_sat: request.total_fees,
            preimage: Some(random_hex(32)),
            refund_tx_id: None,
            refund_tx_amount_sat: None,
            payment_type: PaymentType::Send,
            status: PaymentState::Pending,
        };
        self.emit(&SdkEvent::PaymentPending {
            details: payment.clone(),
        });
        payment.status = PaymentState::Complete;
        wallet.payments.push(payment.clone());
        self.emit(&SdkEvent::PaymentSucceeded { details: payment });
        self.log("INFO", format!("Sent swap {} in tx {txid}", request.id));
        Ok(SendPaymentResponse { txid })
    }

    async fn prepare_receive_payment(
        &self,
        request: &PrepareReceiveRequest,
    ) -> Result<PrepareReceiveResponse, SdkError> {
        let _wallet = self.open_wallet().await?;
        if !(MIN_RECEIVE_SAT..=MAX_RECEIVE_SAT).contains(&request.payer_amount_sat) {
            return Err(SdkError::AmountOutOfRange);
        }
        Ok(PrepareReceiveResponse {
            pair_hash: random_hex(16),
            payer_amount_sat: request.payer_amount_sat,
            fees_sat: RECEIVE_BASE_FEE_SAT + request.payer_amount_sat / 400,
        })
    }

    async fn receive_payment(
        &self,
        request: &PrepareReceiveResponse,
    ) -> Result<ReceivePaymentResponse, SdkError> {
        let mut wallet = self.open_wallet().await?;
        if !(MIN_RECEIVE_SAT..=MAX_RECEIVE_SAT).contains(&request.payer_amount_sat) {
            return Err(SdkError::AmountOutOfRange);
        }
        let amount_sat = request
            .payer_amount_sat
            .checked_sub(request.fees_sat)
            .filter(|amount| *amount > 0)
            .ok_or(SdkError::InvalidOrExpiredFees)?;
        let id = random_hex(6);
        let hrp = match self.network {
            Network::Mainnet => "bc",
            Network::Testnet | Network::Signet => "tb",
            Network::Regtest => "bcrt",
        };
        let invoice = format!("ln{hrp}{}n1sim{id}", request.payer_amount_sat);
        let payment = Payment {
            tx_id: None,
            swap_id: Some(id.clone()),
            timestamp: now(),
            amount_sat,
            fees_sat: request.fees_sat,
            preimage: None,
            refund_tx_id: None,
            refund_tx_amount_sat: None,
            payment_type: PaymentType::Receive,
            status: PaymentState::Pending,
        };
        wallet.payments.push(payment.clone());
        self.emit(&SdkEvent::PaymentPending { details: payment });
        Ok(ReceivePaymentResponse { id, invoice })
    }

    async fn list_payments(&self) -> Result<Vec<Payment>, SdkError> {
        let wallet = self.open_wallet().await?;
        Ok(wallet.payments.iter().rev().cloned().collect())
    }

    async fn sync(&self) -> Result<(), SdkError> {
        let mut guard = self.open_wallet().await?;
        let wallet = &mut *guard;
        let mut settled = Vec::new();
        for payment in &mut wallet.payments {
            if payment.payment_type != PaymentType::Receive || payment.status != PaymentState::Pending
            {
                continue;
            }
            // A credit that would overflow the balance stays pending.
            let Some(balance_sat) = wallet.balance_sat.checked_add(payment.amount_sat) else {
                continue;
            };
            wallet.balance_sat = balance_sat;
            payment.status = PaymentState::Complete;
            payment.tx_id = Some(random_hex(32));
            settled.push(payment.clone());
        }
        drop(guard);
        for payment in settled {
            self.emit(&SdkEvent::PaymentSucceeded { details: payment });
        }
        self.emit(&SdkEvent::Synced);
        Ok(())
    }

    async fn backup(&self, request: BackupRequest) -> Result<(), SdkError> {
        let mut wallet = self.open_wallet().await?;
        let path = request
            .backup_path
            .unwrap_or_else(|| "wallet-backup.sql".to_owned());
        self.log("INFO", format!("Backup written to {path}"));
        wallet.last_backup = Some(path);
        Ok(())
    }

    async fn restore(&self, request: RestoreRequest) -> Result<(), SdkError> {
        let wallet = self.open_wallet().await?;
        let path = request
            .backup_path
            .or_else(|| wallet.last_backup.clone())
            .ok_or_else(|| SdkError::generic("No backup found"))?;
        self.log("INFO", format!("Restored from {path}"));
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), SdkError> {
        let mut wallet = self.wallet.lock().await;
        wallet.closed = true;
        Ok(())
    }
}

/// Opens [`SimulatedSdk`] wallets.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedConnector {
    initial_balance_sat: u64,
}

impl SimulatedConnector {
    /// Every opened wallet starts with `balance_sat`.
    #[must_use]
    pub const fn with_balance(balance_sat: u64) -> Self {
        Self {
            initial_balance_sat: balance_sat,
        }
    }
}

#[async_trait]
impl SdkConnector for SimulatedConnector {
    async fn connect(
        &self,
        request: ConnectRequest,
        events: EventSink,
    ) -> Result<Arc<dyn LiquidSdk>, SdkError> {
        if request.mnemonic.split_whitespace().count() < 12 {
            return Err(SdkError::generic("Invalid mnemonic"));
        }
        events.log("INFO", format!("Connected to {}", request.network));
        Ok(Arc::new(SimulatedSdk::new(
            request.network,
            self.initial_balance_sat,
            Some(events),
        )))
    }
}
