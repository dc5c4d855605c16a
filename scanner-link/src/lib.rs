//! Scanner Link - mobile-scanner pairing and live relay channel for a POS register
//!
//! Generates a short pairing session id, publishes the address a second
//! device scans to join, and keeps a persistent WebSocket to the relay:
//! decoded scan events land in the active order, scanner presence and
//! channel faults surface as operator notices.

pub mod catalog;
pub mod channel;
pub mod config;
pub mod decode;
pub mod dispatch;
pub mod error;
pub mod notify;
pub mod order;
pub mod scan;
pub mod session;

pub use catalog::{CatalogLookup, HttpCatalog};
pub use channel::{ChannelEvent, ChannelState, RelayChannel, RelayChannelHandle};
pub use config::ChannelConfig;
pub use error::{CatalogError, ChannelError};
pub use notify::Notifier;
pub use order::{ActiveOrder, OrderLine};
pub use scan::{ScanConsumer, ScanCue};
pub use session::PairingSession;

// Re-export shared types for convenience
pub use shared::message::{
    InboundEvent, Notice, NoticeCategory, NoticeLevel, OutboundMessage, ScannerStatus,
};
pub use shared::models::Product;
