//! Token issuance and stateless verification.
//!
//! Tokens are HS256 JWTs carrying `{sub, iat, exp}`. A token is accepted iff
//! its signature verifies against the signing secret AND `now < exp`. There
//! is no issuer/audience check, no leeway and no revocation list.

use std::fmt;

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::AuthError;

/// Validity window of every issued token.
pub const TOKEN_TTL_HOURS: i64 = 2;

/// Process-wide HMAC secret. Read once at startup and handed to the issuer
/// and verifier; every replica must share the same value.
#[derive(Clone)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self(secret.into())
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(..)")
    }
}

/// JWT claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Provider-assigned account id.
    pub sub: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Mints signed, time-bounded tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &SigningSecret) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(TOKEN_TTL_HOURS),
        }
    }

    pub fn issue(&self, subject: &str) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
        self.issue_at(subject, Utc::now())
    }

    pub fn issue_at(
        &self,
        subject: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
        let expires_at = now + self.ttl;
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(IssuedToken { token, expires_at })
    }
}

/// Verifies tokens minted by a [`TokenIssuer`] sharing the same secret.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &SigningSecret) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked by hand so it can be told apart from a bad
        // signature and evaluated against an injected clock.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Signature first, then expiry: a forged token is reported as invalid
    /// even when its `exp` has also passed.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!("Token rejected: {e}");
            AuthError::InvalidToken
        })?;

        if now.timestamp() >= data.claims.exp {
            debug!(
                "Token for {} expired at {:?}",
                data.claims.sub,
                Utc.timestamp_opt(data.claims.exp, 0).single()
            );
            return Err(AuthError::ExpiredToken);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret() -> SigningSecret {
        SigningSecret::new("test-secret-key-test-secret-key!")
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    /// Replaces the first character of the signature segment.
    fn flip_signature(token: &str) -> String {
        let (head, sig) = token.rsplit_once('.').unwrap();
        let mut chars: Vec<char> = sig.chars().collect();
        chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
        format!("{head}.{}", chars.into_iter().collect::<String>())
    }

    #[test]
    fn test_issue_then_verify_resolves_subject() {
        let issuer = TokenIssuer::new(&secret());
        let verifier = TokenVerifier::new(&secret());

        let issued = issuer.issue("U1").unwrap();
        let claims = verifier.verify(&issued.token).unwrap();

        assert_eq!(claims.sub, "U1");
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_HOURS * 3600);
        assert_eq!(issued.expires_at.timestamp(), claims.exp);
    }

    #[test]
    fn test_valid_until_one_second_before_expiry() {
        let issued = TokenIssuer::new(&secret()).issue_at("U1", t0()).unwrap();
        let at = t0() + Duration::hours(2) - Duration::seconds(1);
        assert!(TokenVerifier::new(&secret()).verify_at(&issued.token, at).is_ok());
    }

    #[test]
    fn test_expired_exactly_at_ttl() {
        let issued = TokenIssuer::new(&secret()).issue_at("U1", t0()).unwrap();
        let at = t0() + Duration::hours(2);
        assert_eq!(
            TokenVerifier::new(&secret()).verify_at(&issued.token, at),
            Err(AuthError::ExpiredToken)
        );
    }

    #[test]
    fn test_expired_against_wall_clock() {
        let issued_at = Utc::now() - Duration::hours(2) - Duration::seconds(1);
        let issued = TokenIssuer::new(&secret()).issue_at("U1", issued_at).unwrap();
        assert_eq!(
            TokenVerifier::new(&secret()).verify(&issued.token),
            Err(AuthError::ExpiredToken)
        );
    }

    #[test]
    fn test_flipped_signature_is_invalid() {
        let issued = TokenIssuer::new(&secret()).issue("U1").unwrap();
        let tampered = flip_signature(&issued.token);
        assert_ne!(tampered, issued.token);
        assert_eq!(
            TokenVerifier::new(&secret()).verify(&tampered),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn test_forged_and_expired_reports_invalid() {
        let issued = TokenIssuer::new(&secret()).issue_at("U1", t0()).unwrap();
        let tampered = flip_signature(&issued.token);
        let later = t0() + Duration::hours(5);
        assert_eq!(
            TokenVerifier::new(&secret()).verify_at(&tampered, later),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn test_other_secret_is_invalid() {
        let issued = TokenIssuer::new(&SigningSecret::new("another-secret-another-secret-!!"))
            .issue("U1")
            .unwrap();
        assert_eq!(
            TokenVerifier::new(&secret()).verify(&issued.token),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn test_garbage_is_invalid() {
        let verifier = TokenVerifier::new(&secret());
        assert_eq!(verifier.verify("garbage"), Err(AuthError::InvalidToken));
        assert_eq!(verifier.verify("a.b.c"), Err(AuthError::InvalidToken));
        assert_eq!(verifier.verify(""), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_missing_subject_is_invalid() {
        #[derive(Serialize)]
        struct NoSub {
            iat: i64,
            exp: i64,
        }
        let now = Utc::now().timestamp();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &NoSub { iat: now, exp: now + 60 },
            &EncodingKey::from_secret(secret().as_bytes()),
        )
        .unwrap();
        assert_eq!(
            TokenVerifier::new(&secret()).verify(&token),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn test_audience_claim_is_ignored() {
        #[derive(Serialize)]
        struct WithAudience {
            sub: String,
            iat: i64,
            exp: i64,
            aud: String,
        }
        let now = Utc::now().timestamp();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &WithAudience {
                sub: "U1".into(),
                iat: now,
                exp: now + 60,
                aud: "x".into(),
            },
            &EncodingKey::from_secret(secret().as_bytes()),
        )
        .unwrap();
        let claims = TokenVerifier::new(&secret()).verify(&token).unwrap();
        assert_eq!(claims.sub, "U1");
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        assert_eq!(format!("{:?}", secret()), "SigningSecret(..)");
    }
}
