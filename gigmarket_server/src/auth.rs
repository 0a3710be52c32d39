//! Access token handling.
//!
//! The authentication collaborator in front of this service issues short-lived HS256 JWTs. Handlers receive the
//! verified claims by taking a [`JwtClaims`] parameter: the [`FromRequest`] impl reads the `gmk_access_token` header
//! and verifies it against the [`TokenIssuer`] registered in app data. Role enforcement stays in the handlers, via
//! [`JwtClaims::require_role`].

use std::future::{ready, Ready};

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use chrono::{Duration, Utc};
use gigmarket_engine::db_types::Role;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{config::AuthConfig, errors::{AuthError, ServerError}};

pub const ACCESS_TOKEN_HEADER: &str = "gmk_access_token";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// The authenticated user id.
    pub sub: String,
    pub role: Role,
    /// Expiry, as a unix timestamp.
    pub exp: i64,
}

impl JwtClaims {
    pub fn require_role(&self, required: Role) -> Result<(), ServerError> {
        if self.role == required {
            Ok(())
        } else {
            Err(AuthError::InsufficientRole { required, actual: self.role }.into())
        }
    }
}

impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(claims_from_request(req))
    }
}

fn claims_from_request(req: &HttpRequest) -> Result<JwtClaims, ServerError> {
    let issuer = req
        .app_data::<web::Data<TokenIssuer>>()
        .ok_or_else(|| ServerError::InitializeError("No TokenIssuer is registered with the server".to_string()))?;
    let header = req.headers().get(ACCESS_TOKEN_HEADER).ok_or(AuthError::MissingToken)?;
    let token = header.to_str().map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
    let claims = issuer.verify_token(token)?;
    debug!("💻️ Access token verified for [{}] ({})", claims.sub, claims.role);
    Ok(claims)
}

pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.reveal().as_bytes();
        Self { encoding_key: EncodingKey::from_secret(secret), decoding_key: DecodingKey::from_secret(secret) }
    }

    /// Issue a new access token for the given user and role. The token is valid for 24 hours unless a duration is
    /// given.
    pub fn issue_token(&self, user_id: &str, role: Role, duration: Option<Duration>) -> Result<String, AuthError> {
        let duration = duration.unwrap_or_else(|| Duration::hours(24));
        let exp = (Utc::now() + duration).timestamp();
        let claims = JwtClaims { sub: user_id.to_string(), role, exp };
        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| AuthError::ValidationError(e.to_string()))
    }

    pub fn verify_token(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<JwtClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| AuthError::ValidationError(e.to_string()))?;
        Ok(data.claims)
    }
}
