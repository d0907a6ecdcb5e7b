//! Session tokens: HS256 JWTs carrying the caller's role and location.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Scope, User};

/// Lifetime of a session token.
pub const TOKEN_TTL_HOURS: i64 = 72;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Employee number.
    pub sub: String,
    pub name: String,
    pub role_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlet_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_id: Option<i64>,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or_else(Utc::now)
    }
}

/// The authenticated identity attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub nip: String,
    pub name: String,
    pub role_id: i64,
    pub area_id: Option<i64>,
    pub outlet_id: Option<i64>,
}

impl Caller {
    #[must_use]
    pub fn scope(&self) -> Scope {
        Scope::resolve(self.role_id, self.area_id, self.outlet_id)
    }
}

impl From<Claims> for Caller {
    fn from(claims: Claims) -> Self {
        Self {
            nip: claims.sub,
            name: claims.name,
            role_id: claims.role_id,
            area_id: claims.area_id,
            outlet_id: claims.outlet_id,
        }
    }
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtService {
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, Duration::hours(TOKEN_TTL_HOURS))
    }

    #[must_use]
    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
            ttl,
        }
    }

    /// Issues a signed token for `user`, valid from `now` for the configured TTL.
    pub fn issue(&self, user: &User, now: DateTime<Utc>) -> Result<(String, Claims)> {
        let claims = Claims {
            sub: user.nip.clone(),
            name: user.user_full_name.clone(),
            role_id: user.role_id,
            outlet_id: user.outlet_id,
            area_id: user.area_id,
            jti: uuid::Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| Error::internal("failed to sign token", e))?;
        Ok((token, claims))
    }

    /// Checks the signature and expiry of a token and returns its claims.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| Error::unauthenticated(format!("invalid token: {e}")))
    }
}
