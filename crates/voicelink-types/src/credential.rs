use serde::{Deserialize, Serialize};
use std::fmt;

/// Short-lived join credential for one connection attempt.
///
/// Serialized in the issuer's response shape: `token`, `roomName`, `url`,
/// `identity`. Never cached; a new attempt always fetches a new one.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCredential {
    /// Participant identity embedded in the token.
    #[serde(default)]
    pub identity: String,
    pub room_name: String,
    /// Endpoint of the real-time transport.
    #[serde(rename = "url")]
    pub transport_url: String,
    /// Opaque join token.
    pub token: String,
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredential")
            .field("identity", &self.identity)
            .field("room_name", &self.room_name)
            .field("transport_url", &self.transport_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_issuer_response() {
        let json = r#"{"token":"jwt","roomName":"r1","url":"ws://localhost:7880","identity":"user-1"}"#;
        let credential: SessionCredential = serde_json::from_str(json).unwrap();
        assert_eq!(credential.room_name, "r1");
        assert_eq!(credential.transport_url, "ws://localhost:7880");
        assert_eq!(credential.identity, "user-1");
        assert_eq!(credential.token, "jwt");
    }

    #[test]
    fn identity_is_optional_on_the_wire() {
        let json = r#"{"token":"jwt","roomName":"r1","url":"ws://localhost:7880"}"#;
        let credential: SessionCredential = serde_json::from_str(json).unwrap();
        assert!(credential.identity.is_empty());
    }

    #[test]
    fn debug_redacts_token() {
        let credential = SessionCredential {
            identity: "user-1".to_string(),
            room_name: "r1".to_string(),
            transport_url: "ws://localhost:7880".to_string(),
            token: "secret-jwt".to_string(),
        };
        let rendered = format!("{:?}", credential);
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("secret-jwt"));
    }
}
