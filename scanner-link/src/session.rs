//! Pairing session: the short-lived association between one register
//! and one mobile scanner.

use shared::util;

/// One pairing attempt, identified by a short opaque id.
///
/// Created when the owning screen mounts or when the operator asks for a
/// fresh code; replaced wholesale on reset. The id is embedded both in
/// the pairing URL the second device scans and in the relay address the
/// channel dials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingSession {
    session_id: String,
}

impl PairingSession {
    /// Create a session with a fresh random id.
    pub fn generate() -> Self {
        Self {
            session_id: util::session_id(),
        }
    }

    /// Wrap an existing id.
    pub fn from_id(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Address a second device visits to join this session:
    /// `{origin}/scanner?session={id}`. Rendered by the owning UI as a
    /// scannable code and as copyable text. String construction only.
    pub fn pairing_url(&self, origin: &str) -> String {
        format!(
            "{}/scanner?session={}",
            origin.trim_end_matches('/'),
            self.session_id
        )
    }

    /// Relay endpoint for this session. The socket scheme follows the
    /// serving origin: a register served over HTTPS gets `wss`.
    pub fn relay_url(&self, origin: &str) -> String {
        let ws_origin = origin
            .trim_end_matches('/')
            .replace("https://", "wss://")
            .replace("http://", "ws://");
        format!("{ws_origin}/api/ws/pos/{}", self.session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_produces_fresh_ids() {
        let a = PairingSession::generate();
        let b = PairingSession::generate();
        assert_eq!(a.session_id().len(), util::SESSION_ID_LEN);
        assert_ne!(a.session_id(), b.session_id());
    }

    #[test]
    fn test_pairing_url_shape() {
        let session = PairingSession::from_id("Ab3dE9xQ");
        assert_eq!(
            session.pairing_url("https://pos.example.com"),
            "https://pos.example.com/scanner?session=Ab3dE9xQ"
        );
        // Trailing slash must not produce a double separator
        assert_eq!(
            session.pairing_url("https://pos.example.com/"),
            "https://pos.example.com/scanner?session=Ab3dE9xQ"
        );
    }

    #[test]
    fn test_relay_url_scheme_follows_origin() {
        let session = PairingSession::from_id("Ab3dE9xQ");
        assert_eq!(
            session.relay_url("https://pos.example.com"),
            "wss://pos.example.com/api/ws/pos/Ab3dE9xQ"
        );
        assert_eq!(
            session.relay_url("http://localhost:8080"),
            "ws://localhost:8080/api/ws/pos/Ab3dE9xQ"
        );
    }
}
