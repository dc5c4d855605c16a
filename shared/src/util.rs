use chrono::SecondsFormat;

/// Pairing session id length
pub const SESSION_ID_LEN: usize = 8;

/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Current UTC time as an RFC 3339 string, millisecond precision.
///
/// Wire timestamps (`ping`, `heartbeat_response`, `connection_confirmed`)
/// all use this format.
pub fn iso_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Generate a pairing session id: 8 characters drawn uniformly from
/// `A`–`Z`, `a`–`z`, `0`–`9`.
///
/// Not cryptographic: the id scopes a single operator-attended pairing
/// attempt and collision risk at that scale is negligible.
pub fn session_id() -> String {
    use rand::Rng;
    use rand::distributions::Alphanumeric;

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_ID_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_shape() {
        for _ in 0..100 {
            let id = session_id();
            assert_eq!(id.len(), SESSION_ID_LEN);
            assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_session_id_freshness() {
        // 62^8 values; consecutive collisions across a small batch would
        // indicate a broken generator, not bad luck.
        let ids: std::collections::HashSet<String> = (0..50).map(|_| session_id()).collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_iso_now_is_rfc3339() {
        let ts = iso_now();
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }
}
