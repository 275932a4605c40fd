//! JWT token service implementation.
//!
//! Tokens are HS256-signed and carry exactly `{user_id, exp}`. The subject
//! may arrive as a JSON number or a numeric string (other token issuers emit
//! both); anything else is rejected.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use quill_core::ports::{AuthError, TokenClaims, TokenService};

/// JWT token service configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            expiration_hours: 24,
        }
    }
}

/// Wire-level claims.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(deserialize_with = "numeric_subject")]
    user_id: i64,
    /// Expiration timestamp, unix seconds.
    exp: i64,
}

/// Accept the subject as a positive integer or a numeric string and
/// normalize it; any other representation fails verification.
fn numeric_subject<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct SubjectVisitor;

    impl serde::de::Visitor<'_> for SubjectVisitor {
        type Value = i64;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("a positive integer or numeric string")
        }

        fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<i64, E> {
            if v == 0 || v > i64::MAX as u64 {
                return Err(E::custom("user id out of range"));
            }
            Ok(v as i64)
        }

        fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<i64, E> {
            if v <= 0 {
                return Err(E::custom("user id must be positive"));
            }
            Ok(v)
        }

        fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<i64, E> {
            v.parse::<i64>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| E::custom("user id string is not a positive integer"))
        }
    }

    deserializer.deserialize_any(SubjectVisitor)
}

/// JWT-based token service.
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: JwtConfig,
}

impl JwtTokenService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            encoding_key,
            decoding_key,
            config,
        }
    }

    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").unwrap_or_else(|_| "change-me-in-production".to_string());

        if secret == "change-me-in-production" {
            let is_production = std::env::var("RUST_ENV")
                .map(|v| v == "production" || v == "prod")
                .unwrap_or(false);

            if is_production {
                tracing::error!(
                    "SECURITY: Using default JWT secret in production! Set JWT_SECRET environment variable."
                );
            } else {
                tracing::warn!("Using default JWT secret. Set JWT_SECRET for production use.");
            }
        }

        let config = JwtConfig {
            secret,
            expiration_hours: std::env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(24),
        };
        Self::new(config)
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expired means expired: no grace window.
        validation.leeway = 0;
        validation
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, user_id: i64) -> Result<String, AuthError> {
        let exp = Utc::now() + TimeDelta::hours(self.config.expiration_hours);
        let claims = Claims {
            user_id,
            exp: exp.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Self::validation()).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            },
        )?;

        Ok(TokenClaims {
            user_id: token_data.claims.user_id,
            exp: token_data.claims.exp,
        })
    }

    fn expiry_seconds(&self) -> i64 {
        self.config.expiration_hours * 3600
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key".to_string(),
            expiration_hours: 24,
        }
    }

    fn encode_raw(secret: &str, claims: serde_json::Value) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn issue_then_verify_roundtrips_the_subject() {
        let service = JwtTokenService::new(test_config());

        let token = service.issue(42).unwrap();
        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.user_id, 42);
    }

    #[test]
    fn issued_token_expires_in_24_hours() {
        let service = JwtTokenService::new(test_config());

        let token = service.issue(1).unwrap();
        let claims = service.verify(&token).unwrap();

        let delta = claims.exp - Utc::now().timestamp();
        assert!((86_399..=86_401).contains(&delta), "delta was {delta}");
    }

    #[test]
    fn expired_token_is_rejected_even_with_valid_signature() {
        let issuer = JwtTokenService::new(JwtConfig {
            secret: "test-secret-key".to_string(),
            expiration_hours: -1,
        });
        let verifier = JwtTokenService::new(test_config());

        let token = issuer.issue(1).unwrap();
        let result = verifier.verify(&token);

        assert!(matches!(result.unwrap_err(), AuthError::TokenExpired));
    }

    #[test]
    fn numeric_string_subject_is_accepted() {
        let service = JwtTokenService::new(test_config());
        let exp = Utc::now().timestamp() + 3600;
        let token = encode_raw("test-secret-key", json!({"user_id": "42", "exp": exp}));

        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.user_id, 42);
    }

    #[test]
    fn non_numeric_subject_is_rejected() {
        let service = JwtTokenService::new(test_config());
        let exp = Utc::now().timestamp() + 3600;

        for subject in [json!("abc"), json!(true), json!(-3), json!("0")] {
            let token = encode_raw(
                "test-secret-key",
                json!({"user_id": subject.clone(), "exp": exp}),
            );
            assert!(
                matches!(service.verify(&token), Err(AuthError::InvalidToken(_))),
                "subject {subject} should have been rejected"
            );
        }
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let service = JwtTokenService::new(test_config());
        let exp = Utc::now().timestamp() + 3600;
        let token = encode_raw("other-secret", json!({"user_id": 1, "exp": exp}));

        assert!(matches!(
            service.verify(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let service = JwtTokenService::new(test_config());
        assert!(service.verify("not-a-token").is_err());
    }
}
