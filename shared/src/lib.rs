//! Shared types for the scanner-link pairing channel
//!
//! Wire message types exchanged between a POS register and the scanner
//! relay, operator notice payloads, catalog records, and small utilities.

pub mod message;
pub mod models;
pub mod response;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Wire message re-exports (for convenient access)
pub use message::{DeviceInfo, InboundEvent, OutboundMessage, ScannerStatus};
pub use response::ApiResponse;
