// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Stateless session tokens (HS256 JWT).
//!
//! Claims are limited to the subject (user id) and expiry. Nothing is stored
//! server-side, so a token stays valid until it expires.

use crate::config::Config;
use crate::time_utils::SharedClock;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Session token claims.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// A freshly signed token and its lifetime in seconds.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: u64,
}

/// Signing failed. Only possible with an unusable key.
#[derive(Debug, thiserror::Error)]
#[error("Failed to sign session token: {0}")]
pub struct TokenError(#[from] jsonwebtoken::errors::Error);

/// Token rejected for any reason (malformed, bad signature, expired).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Invalid session token")]
pub struct InvalidToken;

/// Issues and verifies session tokens with the process signing key.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: u64,
    clock: SharedClock,
}

impl TokenService {
    pub fn new(config: &Config, clock: SharedClock) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(&config.jwt_signing_key),
            decoding_key: DecodingKey::from_secret(&config.jwt_signing_key),
            ttl_secs: config.token_ttl_secs,
            clock,
        }
    }

    fn now_secs(&self) -> u64 {
        self.clock.now().timestamp().max(0) as u64
    }

    /// Sign a token for `user_id` expiring `ttl_secs` from now.
    pub fn issue(&self, user_id: &str) -> Result<IssuedToken, TokenError> {
        let claims = Claims {
            sub: user_id.to_string(),
            exp: self.now_secs().saturating_add(self.ttl_secs),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;

        Ok(IssuedToken {
            token,
            expires_in: self.ttl_secs,
        })
    }

    /// Check signature and expiry, returning the subject.
    ///
    /// Every failure collapses into [`InvalidToken`]; the reason is logged at
    /// debug level only.
    pub fn verify(&self, token: &str) -> Result<String, InvalidToken> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the injected clock below.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            tracing::debug!(error = %e, "Rejected session token");
            InvalidToken
        })?;

        if data.claims.exp <= self.now_secs() {
            tracing::debug!("Rejected expired session token");
            return Err(InvalidToken);
        }
        if data.claims.sub.is_empty() {
            return Err(InvalidToken);
        }

        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_utils::{system_clock, FixedClock};
    use chrono::{Duration, Utc};
    use std::sync::Arc;

    fn service() -> TokenService {
        TokenService::new(&Config::test_default(), system_clock())
    }

    #[test]
    fn test_issue_verify_roundtrip() {
        let tokens = service();
        let issued = tokens.issue("user-123").unwrap();

        assert_eq!(issued.expires_in, 3600);
        assert_eq!(tokens.verify(&issued.token).unwrap(), "user-123");
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = Config::test_default();
        let two_hours_ago = Utc::now() - Duration::hours(2);
        let past = TokenService::new(&config, Arc::new(FixedClock(two_hours_ago)));
        let issued = past.issue("user-123").unwrap();

        assert_eq!(service().verify(&issued.token), Err(InvalidToken));
    }

    #[test]
    fn test_token_valid_until_expiry() {
        let config = Config::test_default();
        let start = Utc::now();
        let issuer = TokenService::new(&config, Arc::new(FixedClock(start)));
        let token = issuer.issue("user-123").unwrap().token;

        let just_before = TokenService::new(
            &config,
            Arc::new(FixedClock(start + Duration::seconds(3599))),
        );
        assert!(just_before.verify(&token).is_ok());

        let at_expiry = TokenService::new(
            &config,
            Arc::new(FixedClock(start + Duration::seconds(3600))),
        );
        assert_eq!(at_expiry.verify(&token), Err(InvalidToken));
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let mut config = Config::test_default();
        config.token_ttl_secs = u64::MAX;
        let tokens = TokenService::new(&config, system_clock());

        let issued = tokens.issue("user-123").unwrap();
        assert_eq!(issued.expires_in, u64::MAX);
        assert_eq!(tokens.verify(&issued.token).unwrap(), "user-123");
    }

    #[test]
    fn test_wrong_key_rejected() {
        let issued = service().issue("user-123").unwrap();

        let mut other = Config::test_default();
        other.jwt_signing_key = b"a_completely_different_key_here!".to_vec();
        let verifier = TokenService::new(&other, system_clock());

        assert_eq!(verifier.verify(&issued.token), Err(InvalidToken));
    }

    #[test]
    fn test_tampered_and_malformed_rejected() {
        let tokens = service();
        let issued = tokens.issue("user-123").unwrap();

        let mut tampered = issued.token.clone();
        tampered.push('x');
        assert_eq!(tokens.verify(&tampered), Err(InvalidToken));
        assert_eq!(tokens.verify(""), Err(InvalidToken));
        assert_eq!(tokens.verify("not.a.jwt"), Err(InvalidToken));
    }

    #[test]
    fn test_empty_subject_rejected() {
        let tokens = service();
        let issued = tokens.issue("").unwrap();
        assert_eq!(tokens.verify(&issued.token), Err(InvalidToken));
    }

    #[test]
    fn test_claims_limited_to_sub_and_exp() {
        let issued = service().issue("user-123").unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        let data = decode::<serde_json::Value>(
            &issued.token,
            &DecodingKey::from_secret(b"ignored"),
            &validation,
        )
        .unwrap();
        let claims = data.claims.as_object().unwrap();

        assert_eq!(claims.len(), 2);
        assert!(claims.contains_key("sub"));
        assert!(claims.contains_key("exp"));
    }
}
