//! Bearer token issuance and verification.
//!
//! Tokens are HS256 JWTs. Verification checks the signature, issuer,
//! audience and expiry; a token that fails any check is rejected as a whole.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Signing settings.
#[derive(Clone, Debug)]
pub struct TokenConfig {
    /// Shared HMAC secret.
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    /// How long an issued token stays valid.
    pub lifetime: Duration,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_SECRET.to_string(),
            issuer: "UserManagementAPI".to_string(),
            audience: "UserManagementAPIClients".to_string(),
            lifetime: Duration::hours(1),
        }
    }
}

pub(crate) const DEFAULT_SECRET: &str = "YourSuperSecretKeyForJWTTokenGeneration123456";

/// Claims carried by every token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// Display name
    pub name: String,
    pub role: String,
    pub iss: String,
    pub aud: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// A freshly signed token and the instant it stops being valid.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// The verified caller, attached to the request by the authentication layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub role: String,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self { username: claims.sub, role: claims.role }
    }
}

/// Issues and verifies tokens with one fixed key pair.
pub struct TokenService {
    config: TokenConfig,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(config: TokenConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            config,
        }
    }

    /// Signs a token for `username` with the given role claim.
    pub fn issue(&self, username: &str, role: &str) -> Result<IssuedToken, Error> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.config.lifetime)
            .ok_or(Error::TokenLifetime)?;
        let claims = Claims {
            sub: username.to_string(),
            name: username.to_string(),
            role: role.to_string(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(IssuedToken { token, expires_at })
    }

    /// Verifies signature, issuer, audience and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding, &self.validation).map(|data| data.claims)
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::errors::ErrorKind;

    use super::*;

    fn service() -> TokenService {
        TokenService::new(TokenConfig::default())
    }

    #[test]
    fn issued_token_round_trips_claims() {
        let tokens = service();
        let issued = tokens.issue("admin", "Admin").unwrap();
        let claims = tokens.verify(&issued.token).unwrap();

        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.name, "admin");
        assert_eq!(claims.role, "Admin");
        assert_eq!(claims.iss, "UserManagementAPI");
        assert_eq!(claims.aud, "UserManagementAPIClients");
        assert_eq!(claims.exp, issued.expires_at.timestamp());
    }

    #[test]
    fn expiry_is_about_an_hour_ahead() {
        let issued = service().issue("admin", "Admin").unwrap();
        let ahead = issued.expires_at - Utc::now();
        assert!(ahead > Duration::minutes(59) && ahead <= Duration::hours(1));
    }

    #[test]
    fn rejects_token_signed_with_another_secret() {
        let other = TokenService::new(TokenConfig { secret: "another-secret".into(), ..TokenConfig::default() });
        let issued = other.issue("admin", "Admin").unwrap();

        let err = service().verify(&issued.token).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidSignature));
    }

    #[test]
    fn rejects_wrong_audience_and_issuer() {
        let foreign_aud = TokenService::new(TokenConfig { audience: "someone-else".into(), ..TokenConfig::default() });
        let token = foreign_aud.issue("admin", "Admin").unwrap().token;
        assert!(matches!(service().verify(&token).unwrap_err().kind(), ErrorKind::InvalidAudience));

        let foreign_iss = TokenService::new(TokenConfig { issuer: "someone-else".into(), ..TokenConfig::default() });
        let token = foreign_iss.issue("admin", "Admin").unwrap().token;
        assert!(matches!(service().verify(&token).unwrap_err().kind(), ErrorKind::InvalidIssuer));
    }

    #[test]
    fn rejects_expired_token() {
        let expired = TokenService::new(TokenConfig { lifetime: Duration::seconds(-120), ..TokenConfig::default() });
        let token = expired.issue("admin", "Admin").unwrap().token;
        assert!(matches!(service().verify(&token).unwrap_err().kind(), ErrorKind::ExpiredSignature));
    }

    #[test]
    fn lifetime_past_the_end_of_time_is_an_error() {
        let endless = TokenService::new(TokenConfig { lifetime: Duration::days(1_000_000_000), ..TokenConfig::default() });
        assert!(matches!(endless.issue("admin", "Admin"), Err(Error::TokenLifetime)));
    }

    #[test]
    fn parses_bearer_header() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Bearer"), None);
    }
}
