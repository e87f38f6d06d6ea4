//! Access tokens.
//!
//! Clients authenticate with an HS256 JWT, sent either as `Authorization: Bearer <token>` or in the `checkout_token`
//! cookie. The token subject is the account id and the `roles` claim lists what the account may do.
//!
//! Handlers that need an authenticated caller take [`JwtClaims`] as an argument. Handlers where a login is optional
//! take [`OptionalClaims`], which is empty when no token was sent but still rejects a bad token.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, web, FromRequest, HttpMessage, HttpRequest};
use checkout_engine::db_types::Role;
use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

pub const AUTH_COOKIE: &str = "checkout_token";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// The account id. Encoded as a string, as JWT subjects are.
    #[serde(with = "subject")]
    pub sub: i64,
    pub roles: Vec<Role>,
    pub iat: i64,
    pub exp: i64,
}

mod subject {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(id: &i64, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&id.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        let s = String::deserialize(d)?;
        s.parse::<i64>().map_err(|e| D::Error::custom(format!("Invalid subject {s}. {e}")))
    }
}

impl JwtClaims {
    pub fn account_id(&self) -> i64 {
        self.sub
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: chrono::Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.reveal().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
            lifetime: config.token_lifetime,
        }
    }

    /// Issues an access token for the account. Callers are responsible for having authenticated the account first.
    pub fn issue_token(&self, account_id: i64, roles: Vec<Role>) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = JwtClaims { sub: account_id, roles, iat: now.timestamp(), exp: (now + self.lifetime).timestamp() };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::CouldNotIssueToken(e.to_string()))
    }

    pub fn validate(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let data = decode::<JwtClaims>(token, &self.decoding_key, &self.validation).map_err(|e| match e.kind() {
            ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
                AuthError::PoorlyFormattedToken(e.to_string())
            },
            _ => AuthError::ValidationError(e.to_string()),
        })?;
        Ok(data.claims)
    }
}

/// The raw access token from the `Authorization` header, or failing that, the auth cookie.
fn access_token(req: &HttpRequest) -> Option<String> {
    let from_header = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string());
    from_header.or_else(|| req.cookie(AUTH_COOKIE).map(|c| c.value().to_string())).filter(|t| !t.is_empty())
}

/// Validates the access token on the request. `Ok(None)` means no token was sent at all.
///
/// Validated claims are cached in the request extensions, so the ACL middleware and the handler only decode once.
pub fn claims_from_request(req: &HttpRequest) -> Result<Option<JwtClaims>, ServerError> {
    let cached = req.extensions().get::<JwtClaims>().cloned();
    if cached.is_some() {
        return Ok(cached);
    }
    let Some(token) = access_token(req) else {
        return Ok(None);
    };
    let issuer = req
        .app_data::<web::Data<TokenIssuer>>()
        .ok_or_else(|| ServerError::ConfigurationError("No token issuer has been configured".to_string()))?;
    let claims = issuer.validate(&token).map_err(|e| {
        debug!("🔐️ Rejected access token. {e}");
        e
    })?;
    trace!("🔐️ Access token validated for account #{}", claims.sub);
    req.extensions_mut().insert(claims.clone());
    Ok(Some(claims))
}

impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = claims_from_request(req).and_then(|c| c.ok_or_else(|| AuthError::MissingToken.into()));
        ready(result)
    }
}

/// Claims for routes that guests may also call.
#[derive(Debug, Clone)]
pub struct OptionalClaims(pub Option<JwtClaims>);

impl OptionalClaims {
    pub fn account_id(&self) -> Option<i64> {
        self.0.as_ref().map(JwtClaims::account_id)
    }
}

impl FromRequest for OptionalClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(claims_from_request(req).map(OptionalClaims))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn issued_tokens_validate() {
        let issuer = TokenIssuer::new(&AuthConfig::new("0123456789abcdef0123456789abcdef"));
        let token = issuer.issue_token(42, vec![Role::Customer]).unwrap();
        let claims = issuer.validate(&token).unwrap();
        assert_eq!(claims.account_id(), 42);
        assert!(claims.has_role(Role::Customer));
        assert!(!claims.has_role(Role::Admin));
    }

    #[test]
    fn tokens_from_another_key_are_rejected() {
        let issuer = TokenIssuer::new(&AuthConfig::new("0123456789abcdef0123456789abcdef"));
        let other = TokenIssuer::new(&AuthConfig::new("fedcba9876543210fedcba9876543210"));
        let token = other.issue_token(42, vec![Role::Admin]).unwrap();
        assert!(matches!(issuer.validate(&token), Err(AuthError::ValidationError(_))));
        assert!(matches!(issuer.validate("not-a-token"), Err(AuthError::PoorlyFormattedToken(_))));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let mut config = AuthConfig::new("0123456789abcdef0123456789abcdef");
        config.token_lifetime = chrono::Duration::hours(-1);
        let issuer = TokenIssuer::new(&config);
        let token = issuer.issue_token(7, vec![Role::Customer]).unwrap();
        assert!(matches!(issuer.validate(&token), Err(AuthError::ValidationError(_))));
    }
}
