//! Inbound frame decoding
//!
//! Strict JSON first. Frames that fail strict parsing but plainly carry a
//! scan get a pattern fallback that recovers the `code` field: the relay
//! has been seen delivering payloads that are not well-formed JSON, and
//! losing the scan is worse than tolerating the frame. Everything outside
//! this module only ever sees typed [`InboundEvent`]s.

use regex::Regex;
use shared::message::InboundEvent;
use tokio_tungstenite::tungstenite::Message;

/// Decode one WebSocket frame into an event.
///
/// `None` means the frame carried nothing actionable: undecodable payload
/// (logged and dropped) or a transport-level frame the channel loop
/// handles itself.
pub fn decode_frame(msg: &Message) -> Option<InboundEvent> {
    match msg {
        Message::Text(text) => decode_text(text),
        Message::Binary(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => decode_text(text),
            Err(e) => {
                tracing::warn!("binary frame is not UTF-8, dropped: {e}");
                None
            }
        },
        _ => None, // Ping/Pong/Close belong to the channel loop
    }
}

/// Decode raw frame text into an event.
pub fn decode_text(text: &str) -> Option<InboundEvent> {
    match serde_json::from_str::<InboundEvent>(text) {
        Ok(event) => Some(event),
        Err(e) => {
            if text.contains("barcode") || text.contains("code") {
                if let Some(code) = extract_code(text) {
                    tracing::warn!(%code, "strict parse failed, recovered scan code: {e}");
                    return Some(InboundEvent::Barcode { code });
                }
            }
            tracing::warn!("undecodable frame dropped: {e}");
            None
        }
    }
}

/// Best-effort extraction of the quoted value following a `"code":` key.
fn extract_code(text: &str) -> Option<String> {
    let re = Regex::new(r#""code"\s*:\s*"([^"]+)""#).unwrap();
    re.captures(text).map(|caps| caps[1].to_string())
}
