//! Session tokens
//!
//! Once the identity provider has vouched for a user (see `/auth/session`), the server hands out a session token. The
//! token is an HS256 JWT signed with the session secret. Clients send it back in the `mdl_access_token` header, and
//! the session middleware turns it back into [`SessionClaims`].
use std::{
    future::{ready, Ready},
    time::Duration,
};

use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::*;
use matchday_common::Secret;
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

pub const SESSION_TOKEN_HEADER: &str = "mdl_access_token";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user_id: i64,
    pub email: String,
    /// Expiry, in seconds since the Unix epoch
    pub exp: i64,
}

impl SessionClaims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Handlers can take `SessionClaims` as an argument. The claims are only available on routes wrapped by the session
/// middleware.
impl FromRequest for SessionClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<SessionClaims>().cloned().ok_or_else(|| {
            warn!("🔐️ No session claims found in request extensions");
            ServerError::AuthenticationError(AuthError::MissingToken)
        });
        ready(claims)
    }
}

#[derive(Clone)]
pub struct TokenIssuer {
    secret: Secret<String>,
    lifetime: Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self { secret: config.session_secret.clone(), lifetime: config.session_lifetime }
    }

    /// Issues a session token for the user. The caller is responsible for having authenticated the user first.
    pub fn issue_token(&self, user_id: i64, email: &str) -> Result<(String, SessionClaims), AuthError> {
        let lifetime = chrono::Duration::from_std(self.lifetime)
            .map_err(|e| AuthError::ValidationError(format!("Invalid session lifetime. {e}")))?;
        let exp = (Utc::now() + lifetime).timestamp();
        let claims = SessionClaims { user_id, email: email.to_string(), exp };
        let token = self.sign(&claims)?;
        Ok((token, claims))
    }

    pub fn sign(&self, claims: &SessionClaims) -> Result<String, AuthError> {
        let key = EncodingKey::from_secret(self.secret.reveal().as_bytes());
        encode(&Header::new(Algorithm::HS256), claims, &key).map_err(|e| {
            error!("🔐️ Could not sign session token. {e}");
            AuthError::ValidationError(e.to_string())
        })
    }

    /// Checks the signature and expiry of a session token and returns its claims.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let key = DecodingKey::from_secret(self.secret.reveal().as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = decode::<SessionClaims>(token.trim(), &key, &validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
                AuthError::PoorlyFormattedToken(e.to_string())
            },
            _ => AuthError::ValidationError(e.to_string()),
        })?;
        Ok(data.claims)
    }
}
