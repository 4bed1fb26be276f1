#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Host bridge runtime for a Liquid wallet SDK.
//!
//! The bridge sits between a host (a mobile app, a scripting runtime, a
//! command line) and the wallet SDK. Hosts speak loosely typed documents
//! ([`proto::WireValue`]); the SDK speaks typed requests and a closed error
//! set. The bridge decodes and validates requests, guards the single wallet
//! session, translates SDK errors into stable `(code, message)` pairs and
//! fans SDK events out to host listeners.
//!
//! # Overview
//!
//! ```ignore
//! let bridge = LiquidBridge::new(connector);
//! bridge.connect(&connect_request).await?;
//! let id = bridge.add_event_listener(|delivery: Delivery| { /* ... */ }).await?;
//! let info = bridge.dispatch("getInfo", &get_info_request).await?;
//! ```
//!
//! # Modules
//!
//! - [`bridge`] - The host-facing facade and method routing
//! - [`config`] - Bridge settings (default data directory)
//! - [`error`] - SDK errors, bridge errors and their translation into failures
//! - [`events`] - Listener registry and ordered event delivery
//! - [`sdk`] - Trait seams for the wallet SDK
//! - [`session`] - Connection lifecycle guard
//!
//! # Feature Flags
//!
//! - `simulator` - An in-memory wallet implementing the SDK traits
//! - `telemetry` - Tracing instrumentation and a layer forwarding `tracing`
//!   events to the host's log topic

pub mod bridge;
pub mod config;
pub mod error;
pub mod events;
#[cfg(feature = "telemetry")]
pub mod logger;
pub mod sdk;
pub mod session;
#[cfg(any(test, feature = "simulator"))]
pub mod simulated;

pub use lqbridge_proto as proto;

pub use bridge::LiquidBridge;
pub use config::BridgeConfig;
pub use error::{AsBridgeFailure, BridgeError, BridgeFailure, ErrorCode, SdkError};
pub use events::{Delivery, EventBridge, EventListener, EventSink, SubscriptionId};
pub use sdk::{LiquidSdk, SdkConnector};
pub use session::SessionStatus;
