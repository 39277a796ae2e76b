//! Signed OAuth `state` tokens for the account-linking flow.
//!
//! The originating email address is threaded through the provider's
//! OAuth redirect inside a short-lived HS256 JWT, so the callback can
//! recover it and reject forged or replayed-late callbacks without any
//! server-side session.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// State lifetime: the user has this long to finish the provider's
/// consent screen.
const STATE_LIFETIME_MINUTES: i64 = 10;

/// Error type for state verification failures.
#[derive(Debug, thiserror::Error)]
pub enum LinkStateError {
    /// The token is malformed, tampered with, or expired.
    #[error("Invalid or expired link state: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

/// Claims carried through the OAuth redirect.
#[derive(Debug, Serialize, Deserialize)]
struct LinkStateClaims {
    /// The email address that started the linking flow.
    sub: String,
    /// Random nonce for uniqueness.
    nonce: String,
    /// Expiration timestamp.
    exp: i64,
    /// Issued at timestamp.
    iat: i64,
}

/// Issue a signed state token carrying `email`.
pub fn issue(secret: &str, email: &str) -> String {
    let now = Utc::now();
    let claims = LinkStateClaims {
        sub: email.to_string(),
        nonce: format!("{:032x}", rand::rng().random::<u128>()),
        exp: (now + Duration::minutes(STATE_LIFETIME_MINUTES)).timestamp(),
        iat: now.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("HS256 signing cannot fail with a valid secret")
}

/// Verify a state token and return the email it carries.
pub fn verify(secret: &str, state: &str) -> Result<String, LinkStateError> {
    let data = decode::<LinkStateClaims>(
        state,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims.sub)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_recovers_email() {
        let state = issue("secret", "alice@example.com");
        let email = verify("secret", &state).unwrap();
        assert_eq!(email, "alice@example.com");
    }

    #[test]
    fn tampered_state_is_rejected() {
        let mut state = issue("secret", "alice@example.com");
        state.push('x');
        assert!(verify("secret", &state).is_err());
    }

    #[test]
    fn state_signed_with_other_secret_is_rejected() {
        let state = issue("secret-a", "alice@example.com");
        assert!(verify("secret-b", &state).is_err());
    }

    #[test]
    fn garbage_state_is_rejected() {
        assert!(verify("secret", "not-a-jwt").is_err());
    }

    #[test]
    fn states_are_unique_per_issue() {
        let a = issue("secret", "alice@example.com");
        let b = issue("secret", "alice@example.com");
        assert_ne!(a, b);
    }
}
