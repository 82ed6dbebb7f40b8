use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The decoded contents of a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    /// Unique per issuance.
    pub id: Uuid,
    /// The user the token was issued to.
    pub username: String,
    /// When the token was issued.
    pub issued_at: DateTime<Utc>,
    /// When the token stops being accepted.
    pub expired_at: DateTime<Utc>,
}

impl Payload {
    /// Builds a payload for `username` valid from `now` for `duration`.
    pub fn new(username: &str, duration: Duration, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.to_string(),
            issued_at: now,
            expired_at: now + duration,
        }
    }

    /// Returns `true` once `now` is strictly past the expiry instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expired_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_boundary_is_inclusive() {
        let now = Utc::now();
        let payload = Payload::new("alice123", Duration::minutes(1), now);

        assert!(!payload.is_expired_at(now));
        assert!(!payload.is_expired_at(payload.expired_at));
        assert!(payload.is_expired_at(payload.expired_at + Duration::milliseconds(1)));
    }

    #[test]
    fn every_payload_gets_its_own_id() {
        let now = Utc::now();
        let a = Payload::new("alice123", Duration::minutes(1), now);
        let b = Payload::new("alice123", Duration::minutes(1), now);
        assert_ne!(a.id, b.id);
    }
}
