//! Verification of HMAC-signed JWTs and resolution of their subjects.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Sha256, Sha384, Sha512};
use tracing::debug;

use identra_core::{AppError, AppResult};
use identra_domain::User;

/// HMAC JWS algorithms accepted for token signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JwsAlgorithm {
    /// HMAC with SHA-256.
    #[serde(rename = "HS256")]
    Hs256,
    /// HMAC with SHA-384.
    #[serde(rename = "HS384")]
    Hs384,
    /// HMAC with SHA-512.
    #[serde(rename = "HS512")]
    Hs512,
}

impl JwsAlgorithm {
    /// Returns the standard JOSE name of the algorithm.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hs256 => "HS256",
            Self::Hs384 => "HS384",
            Self::Hs512 => "HS512",
        }
    }
}

impl FromStr for JwsAlgorithm {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "HS256" => Ok(Self::Hs256),
            "HS384" => Ok(Self::Hs384),
            "HS512" => Ok(Self::Hs512),
            _ => Err(AppError::Unauthorized(format!(
                "unsupported JWS algorithm '{value}'"
            ))),
        }
    }
}

/// The protected header of a JWS token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JwsHeaders {
    /// Signature algorithm declared by the token.
    #[serde(rename = "alg")]
    pub algorithm: JwsAlgorithm,
}

impl JwsHeaders {
    /// Parses the decoded header JSON.
    pub fn parse(decoded: &[u8]) -> AppResult<Self> {
        serde_json::from_slice(decoded)
            .map_err(|parse_error| AppError::Unauthorized(format!("invalid JWS header: {parse_error}")))
    }
}

/// Lookup port resolving token subjects to stored users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Returns the user with the given username, if any.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;
}

/// An in-progress HMAC verification over the signed part of a token.
pub enum JwsVerificationSignature {
    /// HMAC-SHA-256 state.
    Hs256(Hmac<Sha256>),
    /// HMAC-SHA-384 state.
    Hs384(Hmac<Sha384>),
    /// HMAC-SHA-512 state.
    Hs512(Hmac<Sha512>),
}

impl JwsVerificationSignature {
    /// Feeds signed bytes into the state.
    pub fn update(&mut self, data: &[u8]) {
        match self {
            Self::Hs256(mac) => mac.update(data),
            Self::Hs384(mac) => mac.update(data),
            Self::Hs512(mac) => mac.update(data),
        }
    }

    /// Consumes the state, checking the tag in constant time.
    #[must_use]
    pub fn verify(self, tag: &[u8]) -> bool {
        match self {
            Self::Hs256(mac) => mac.verify_slice(tag).is_ok(),
            Self::Hs384(mac) => mac.verify_slice(tag).is_ok(),
            Self::Hs512(mac) => mac.verify_slice(tag).is_ok(),
        }
    }
}

/// Verifies tokens minted by this deployment and resolves their subjects.
pub struct JwtVerifier {
    issuer: String,
    algorithm: JwsAlgorithm,
    key: Vec<u8>,
    users: Arc<dyn UserRepository>,
}

impl JwtVerifier {
    /// Creates a verifier for the given issuer, algorithm and shared key.
    #[must_use]
    pub fn new(
        issuer: impl Into<String>,
        algorithm: JwsAlgorithm,
        key: impl Into<Vec<u8>>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            algorithm,
            key: key.into(),
            users,
        }
    }

    /// Returns the issuer whose tokens this verifier accepts.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Returns the only algorithm this verifier accepts.
    #[must_use]
    pub fn algorithm(&self) -> JwsAlgorithm {
        self.algorithm
    }

    /// Returns a fresh verification state keyed with the shared secret.
    pub fn verification_signature(&self) -> AppResult<JwsVerificationSignature> {
        let invalid_key =
            |_| AppError::Internal("JWS key rejected by the HMAC implementation".to_owned());
        Ok(match self.algorithm {
            JwsAlgorithm::Hs256 => {
                JwsVerificationSignature::Hs256(Hmac::new_from_slice(&self.key).map_err(invalid_key)?)
            }
            JwsAlgorithm::Hs384 => {
                JwsVerificationSignature::Hs384(Hmac::new_from_slice(&self.key).map_err(invalid_key)?)
            }
            JwsAlgorithm::Hs512 => {
                JwsVerificationSignature::Hs512(Hmac::new_from_slice(&self.key).map_err(invalid_key)?)
            }
        })
    }

    /// Checks the signature over the signed part of a token.
    ///
    /// A token declaring any algorithm other than the configured one is
    /// rejected outright.
    #[must_use]
    pub fn verify(&self, headers: &JwsHeaders, signed: &[u8], signature: &[u8]) -> bool {
        if headers.algorithm != self.algorithm {
            debug!(
                declared = headers.algorithm.as_str(),
                expected = self.algorithm.as_str(),
                "token declares an unsupported algorithm"
            );
            return false;
        }

        match self.verification_signature() {
            Ok(mut state) => {
                state.update(signed);
                state.verify(signature)
            }
            Err(_) => false,
        }
    }

    /// Verifies a compact-serialized token and returns its claims.
    ///
    /// Checks, in order: structure, header, signature, issuer. Any failure
    /// maps to [`AppError::Unauthorized`].
    pub fn verify_compact(&self, token: &str) -> AppResult<Value> {
        let mut parts = token.split('.');
        let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(AppError::Unauthorized("malformed JWT".to_owned()));
        };

        let decode = |part: &str| {
            URL_SAFE_NO_PAD
                .decode(part)
                .map_err(|_| AppError::Unauthorized("malformed JWT".to_owned()))
        };
        let headers = JwsHeaders::parse(&decode(header_b64)?)?;
        let signature = decode(signature_b64)?;

        let signed = format!("{header_b64}.{payload_b64}");
        if !self.verify(&headers, signed.as_bytes(), &signature) {
            return Err(AppError::Unauthorized("invalid JWT signature".to_owned()));
        }

        let claims: Value = serde_json::from_slice(&decode(payload_b64)?)
            .map_err(|_| AppError::Unauthorized("malformed JWT claims".to_owned()))?;
        if claims.get("iss").and_then(Value::as_str) != Some(self.issuer.as_str()) {
            return Err(AppError::Unauthorized("unknown JWT issuer".to_owned()));
        }

        Ok(claims)
    }

    /// Resolves a verified token subject to its stored user.
    pub async fn resolve(&self, subject: &str) -> AppResult<Option<User>> {
        self.users.find_by_username(subject).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use hmac::{Hmac, Mac};
    use serde_json::json;
    use sha2::Sha256;

    use identra_core::{AppError, AppResult};
    use identra_domain::User;

    use super::{JwsAlgorithm, JwtVerifier, UserRepository};

    const KEY: &[u8] = b"ZW7pRixehFuNUtnY5Se47IemgMryTzaz";
    const ISSUER: &str = "identra";

    struct FakeUsers;

    #[async_trait]
    impl UserRepository for FakeUsers {
        async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
            Ok((username == "rossini").then(|| User::new("1417acbe", "rossini")))
        }
    }

    fn token(header: serde_json::Value, claims: serde_json::Value, key: &[u8]) -> String {
        let header_b64 = URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_b64 = URL_SAFE_NO_PAD.encode(claims.to_string());
        let mut mac = Hmac::<Sha256>::new_from_slice(key).unwrap_or_else(|_| unreachable!());
        mac.update(format!("{header_b64}.{payload_b64}").as_bytes());
        let signature_b64 = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        format!("{header_b64}.{payload_b64}.{signature_b64}")
    }

    fn verifier() -> JwtVerifier {
        JwtVerifier::new(ISSUER, JwsAlgorithm::Hs256, KEY, Arc::new(FakeUsers))
    }

    #[test]
    fn well_signed_token_yields_its_claims() {
        let token = token(
            json!({"alg": "HS256", "typ": "JWT"}),
            json!({"iss": ISSUER, "sub": "rossini"}),
            KEY,
        );

        let claims = verifier().verify_compact(&token).unwrap_or_else(|_| unreachable!());
        assert_eq!(claims["sub"], "rossini");
    }

    #[test]
    fn token_signed_with_another_key_is_rejected() {
        let token = token(
            json!({"alg": "HS256"}),
            json!({"iss": ISSUER, "sub": "rossini"}),
            b"the wrong key entirely..........",
        );

        let result = verifier().verify_compact(&token);
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn token_declaring_another_algorithm_is_rejected() {
        let token = token(
            json!({"alg": "HS512"}),
            json!({"iss": ISSUER, "sub": "rossini"}),
            KEY,
        );

        let result = verifier().verify_compact(&token);
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn token_from_another_issuer_is_rejected() {
        let token = token(
            json!({"alg": "HS256"}),
            json!({"iss": "someone-else", "sub": "rossini"}),
            KEY,
        );

        let result = verifier().verify_compact(&token);
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn malformed_token_is_rejected() {
        let result = verifier().verify_compact("definitely.not-a-jwt");
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn subject_resolution_goes_through_the_user_repository() {
        let verifier = verifier();
        let user = verifier
            .resolve("rossini")
            .await
            .unwrap_or_else(|_| unreachable!())
            .unwrap_or_else(|| unreachable!());
        assert_eq!(user.username(), "rossini");
        assert!(verifier
            .resolve("nobody")
            .await
            .unwrap_or_else(|_| unreachable!())
            .is_none());
    }
}
