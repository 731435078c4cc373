use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use super::errors::JwtError;

/// Bearer token claims.
///
/// The subject is the numeric user id. Tokens are self-contained: nothing
/// here is persisted, and `exp` always equals `iat` plus the issuing TTL.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user identifier)
    pub sub: i64,

    /// Email of the subject at issuance time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims for user authentication with automatic expiration.
    ///
    /// # Arguments
    /// * `user_id` - Numeric user identifier
    /// * `email` - User email
    /// * `expiration_hours` - Hours until token expires
    pub fn for_user(user_id: i64, email: impl Into<String>, expiration_hours: i64) -> Self {
        Self::issued_at(user_id, email, Utc::now(), expiration_hours)
    }

    /// Create claims with an explicit issuance instant.
    pub fn issued_at(
        user_id: i64,
        email: impl Into<String>,
        now: DateTime<Utc>,
        expiration_hours: i64,
    ) -> Self {
        let expiration = now + Duration::hours(expiration_hours);

        Self {
            sub: user_id,
            email: Some(email.into()),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        }
    }

    /// Check if token is expired.
    ///
    /// A token is only valid strictly before its expiration instant.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }
}

/// Claims exactly as they come off the wire.
///
/// Generic JSON decoding may hand numbers back as floats, so the subject is
/// kept loosely typed until it has been checked.
#[derive(Debug, Deserialize)]
pub(crate) struct RawClaims {
    sub: Value,
    #[serde(default)]
    email: Option<Value>,
    iat: i64,
    exp: i64,
}

impl TryFrom<RawClaims> for Claims {
    type Error = JwtError;

    fn try_from(raw: RawClaims) -> Result<Self, Self::Error> {
        let sub = subject_from(&raw.sub)?;

        let email = match raw.email {
            None | Some(Value::Null) => None,
            Some(Value::String(email)) => Some(email),
            Some(other) => {
                return Err(JwtError::InvalidClaims(format!(
                    "email must be a string, got {}",
                    other
                )))
            }
        };

        Ok(Self {
            sub,
            email,
            iat: raw.iat,
            exp: raw.exp,
        })
    }
}

fn subject_from(value: &Value) -> Result<i64, JwtError> {
    let Value::Number(number) = value else {
        return Err(JwtError::InvalidSubject);
    };

    if let Some(id) = number.as_i64() {
        return if id >= 0 {
            Ok(id)
        } else {
            Err(JwtError::InvalidSubject)
        };
    }

    match number.as_f64() {
        Some(id) if id.is_finite() && id >= 0.0 && id.fract() == 0.0 && id < i64::MAX as f64 => {
            Ok(id as i64)
        }
        _ => Err(JwtError::InvalidSubject),
    }
}
