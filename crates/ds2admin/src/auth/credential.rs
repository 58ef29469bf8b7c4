//! Persisted credential record.

use chrono::{DateTime, Duration, TimeZone, Utc};

use super::BearerToken;

/// Which storage tier holds a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Durability {
    /// Survives process restarts.
    #[default]
    Durable,
    /// Lives only as long as the current process.
    Ephemeral,
}

impl Durability {
    /// Map the "remember me" choice onto a storage tier.
    pub fn from_remember(remember: bool) -> Self {
        if remember {
            Durability::Durable
        } else {
            Durability::Ephemeral
        }
    }

    /// The other tier.
    pub fn other(self) -> Self {
        match self {
            Durability::Durable => Durability::Ephemeral,
            Durability::Ephemeral => Durability::Durable,
        }
    }
}

/// A bearer token together with its absolute expiry.
///
/// `durability` is not persisted: it records which backing the
/// credential was read from or should be written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: BearerToken,
    pub expires_at: DateTime<Utc>,
    pub durability: Durability,
}

impl Credential {
    pub fn new(token: BearerToken, expires_at: DateTime<Utc>, durability: Durability) -> Self {
        Self {
            token,
            expires_at,
            durability,
        }
    }

    /// Build a credential for a freshly issued token valid for
    /// `expires_in_secs` seconds from now.
    pub fn issued(token: BearerToken, expires_in_secs: i64, durability: Durability) -> Self {
        let expires_at = Duration::try_seconds(expires_in_secs)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self::new(token, expires_at, durability)
    }

    /// Rebuild a credential from a stored millisecond timestamp.
    ///
    /// Timestamps outside chrono's range read as the epoch, which is
    /// always expired.
    pub fn from_millis(token: BearerToken, expires_at_ms: i64, durability: Durability) -> Self {
        let expires_at = Utc
            .timestamp_millis_opt(expires_at_ms)
            .single()
            .unwrap_or(DateTime::UNIX_EPOCH);
        Self::new(token, expires_at, durability)
    }

    /// Expiry as milliseconds since the Unix epoch.
    pub fn expires_at_millis(&self) -> i64 {
        self.expires_at.timestamp_millis()
    }

    /// Whether the credential is stale at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Whether the credential is stale right now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Time left before expiry, clamped at zero.
    pub fn remaining(&self) -> Duration {
        (self.expires_at - Utc::now()).max(Duration::zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> BearerToken {
        BearerToken::new("tok").unwrap()
    }

    #[test]
    fn issued_expiry_is_now_plus_expires_in() {
        let before = Utc::now();
        let cred = Credential::issued(token(), 86_400, Durability::Durable);
        let after = Utc::now();

        assert!(cred.expires_at >= before + Duration::seconds(86_400));
        assert!(cred.expires_at <= after + Duration::seconds(86_400));
        assert!(!cred.is_expired());
    }

    #[test]
    fn expiry_boundary_counts_as_expired() {
        let now = Utc::now();
        let cred = Credential::new(token(), now, Durability::Ephemeral);
        assert!(cred.is_expired_at(now));
        assert!(!cred.is_expired_at(now - Duration::milliseconds(1)));
    }

    #[test]
    fn millis_round_trip_and_zero_is_expired() {
        let cred = Credential::from_millis(token(), 1_700_000_000_123, Durability::Durable);
        assert_eq!(cred.expires_at_millis(), 1_700_000_000_123);

        let zero = Credential::from_millis(token(), 0, Durability::Durable);
        assert!(zero.is_expired());
        assert_eq!(zero.remaining(), Duration::zero());
    }

    #[test]
    fn remember_maps_to_durability() {
        assert_eq!(Durability::from_remember(true), Durability::Durable);
        assert_eq!(Durability::from_remember(false), Durability::Ephemeral);
        assert_eq!(Durability::Durable.other(), Durability::Ephemeral);
        assert_eq!(Durability::default(), Durability::Durable);
    }
}
