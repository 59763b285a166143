use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Token payload. `sub` is the user id; times are unix seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
    pub kind: TokenKind,
}

impl Claims {
    pub fn new(sub: Uuid, kind: TokenKind, issued: OffsetDateTime, ttl: Duration, iss: &str, aud: &str) -> Self {
        Self {
            sub,
            iat: issued.unix_timestamp(),
            exp: (issued + ttl).unix_timestamp(),
            iss: iss.to_string(),
            aud: aud.to_string(),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn expiry_is_issue_time_plus_ttl() {
        let issued = datetime!(2024-05-01 12:00 UTC);
        let c = Claims::new(Uuid::nil(), TokenKind::Refresh, issued, Duration::minutes(90), "i", "a");
        assert_eq!(c.exp - c.iat, 90 * 60);
        assert_eq!(serde_json::to_value(&c).unwrap()["kind"], "refresh");
    }
}
