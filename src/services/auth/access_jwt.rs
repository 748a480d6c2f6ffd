use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::{error::Error as StdError, fmt};

use crate::config::AccessTokenKey;
use crate::services::auth::role::{Role, parse_roles};
use crate::services::identity;

// Errors returned by access-token verification + claim extraction.
#[derive(Debug)]
pub enum AccessJwtError {
    InvalidKey(String),
    Jwt(jsonwebtoken::errors::Error),
    EmptyClaim(&'static str),
}

impl fmt::Display for AccessJwtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKey(e) => write!(f, "invalid verification key: {}", e),
            Self::Jwt(e) => write!(f, "jwt verification failed: {}", e),
            Self::EmptyClaim(name) => write!(f, "empty '{}' claim", name),
        }
    }
}

impl StdError for AccessJwtError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Jwt(e) => Some(e),
            _ => None,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AccessJwtError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        Self::Jwt(e)
    }
}

/// Access token (JWT) claims as issued by the identity service.
///
/// NOTE:
/// - `roles` is kept as a raw `Value`: issuers send either a list or a comma-separated string.
/// - `sub` is optional at the serde level so that a missing subject is reported as
///   `EmptyClaim("sub")` rather than a generic decode error.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    pub exp: u64,

    #[serde(default)]
    pub roles: serde_json::Value,
}

/// What the rest of the service sees after a token was accepted.
///
/// - `username` is trimmed and zero-width stripped, but keeps its case
///   (ownership comparisons case-fold on their own)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedAccessToken {
    pub username: String,
    pub roles: Vec<Role>,
}

/// Access-token verifier (HS256 shared secret or EdDSA public key).
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenVerifier {
    pub fn new(
        key: &AccessTokenKey,
        issuer: Option<&str>,
        audience: Option<&str>,
        leeway_seconds: u64,
    ) -> Result<Self, AccessJwtError> {
        let (decoding_key, algorithm) = match key {
            AccessTokenKey::Secret(secret) => {
                (DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256)
            }
            AccessTokenKey::Ed25519PublicPem(pem) => (
                DecodingKey::from_ed_pem(pem.as_bytes())
                    .map_err(|e| AccessJwtError::InvalidKey(e.to_string()))?,
                Algorithm::EdDSA,
            ),
        };

        let mut validation = Validation::new(algorithm);
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }
        match audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        validation.leeway = leeway_seconds;

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    // Verify and decode a JWT access token (signature, exp, iss/aud when configured).
    pub fn verify(&self, token: &str) -> Result<AccessTokenClaims, jsonwebtoken::errors::Error> {
        let data =
            jsonwebtoken::decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)?;

        Ok(data.claims)
    }

    /// Verify, then convert claims into the application-side type.
    ///
    /// This is the entry-point for the authentication middleware.
    pub fn verify_verified(&self, token: &str) -> Result<VerifiedAccessToken, AccessJwtError> {
        let claims = self.verify(token)?;

        let username = claims
            .sub
            .as_deref()
            .map(identity::clean)
            .filter(|s| !s.is_empty())
            .ok_or(AccessJwtError::EmptyClaim("sub"))?;

        tracing::debug!(raw_roles = %claims.roles, "roles claim");

        Ok(VerifiedAccessToken {
            username,
            roles: parse_roles(&claims.roles),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::testing::{TEST_SECRET, mint_token, mint_token_with, now_secs, test_verifier};

    #[test]
    fn valid_token_yields_clean_username_and_roles() {
        let token = mint_token(" Alice\u{200B}", json!(["ROLE_USER"]));

        let verified = test_verifier().verify_verified(&token).unwrap();

        assert_eq!(verified.username, "Alice");
        assert_eq!(verified.roles, vec![Role::User]);
    }

    #[test]
    fn comma_separated_roles_are_accepted() {
        let token = mint_token("root", json!("ROLE_ADMIN,ROLE_USER"));

        let verified = test_verifier().verify_verified(&token).unwrap();

        assert_eq!(verified.roles, vec![Role::Admin, Role::User]);
    }

    #[test]
    fn missing_roles_claim_means_no_roles() {
        let token = mint_token_with(TEST_SECRET, json!({"sub": "alice", "exp": now_secs() + 600}));

        let verified = test_verifier().verify_verified(&token).unwrap();

        assert!(verified.roles.is_empty());
    }

    #[test]
    fn blank_subject_is_rejected() {
        let token = mint_token(" \u{200B} ", json!(["ROLE_USER"]));

        let err = test_verifier().verify_verified(&token).unwrap_err();

        assert!(matches!(err, AccessJwtError::EmptyClaim("sub")));
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = mint_token_with(
            TEST_SECRET,
            json!({"sub": "alice", "roles": ["ROLE_USER"], "exp": now_secs() - 3600}),
        );

        assert!(matches!(
            test_verifier().verify_verified(&token),
            Err(AccessJwtError::Jwt(_))
        ));
    }

    #[test]
    fn wrong_signature_is_rejected() {
        let token = mint_token_with(
            "some-other-secret-entirely",
            json!({"sub": "alice", "exp": now_secs() + 600}),
        );

        assert!(test_verifier().verify_verified(&token).is_err());
    }

    #[test]
    fn issuer_is_checked_when_configured() {
        let verifier = TokenVerifier::new(
            &AccessTokenKey::Secret(TEST_SECRET.into()),
            Some("https://iam.example"),
            None,
            0,
        )
        .unwrap();

        let wrong = mint_token_with(
            TEST_SECRET,
            json!({"sub": "alice", "iss": "https://evil.example", "exp": now_secs() + 600}),
        );
        let right = mint_token_with(
            TEST_SECRET,
            json!({"sub": "alice", "iss": "https://iam.example", "exp": now_secs() + 600}),
        );

        assert!(verifier.verify_verified(&wrong).is_err());
        assert!(verifier.verify_verified(&right).is_ok());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(test_verifier().verify_verified("not.a.jwt").is_err());
    }

    #[test]
    fn invalid_public_key_is_reported() {
        let err = TokenVerifier::new(
            &AccessTokenKey::Ed25519PublicPem("not a pem".into()),
            None,
            None,
            60,
        )
        .unwrap_err();

        assert!(matches!(err, AccessJwtError::InvalidKey(_)));
    }
}
