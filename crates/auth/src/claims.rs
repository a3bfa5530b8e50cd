use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use detailops_core::TenantId;

use crate::{PrincipalId, Role};

/// JWT claims model (transport-agnostic).
///
/// This is the minimal set of claims the platform expects once a token has
/// been decoded/verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject / principal identifier.
    pub sub: PrincipalId,

    /// Tenant context for the token.
    pub tenant_id: TenantId,

    /// RBAC roles granted within the tenant context.
    pub roles: Vec<Role>,

    /// Issued-at timestamp.
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,

    #[error("malformed token: {0}")]
    Malformed(String),
}

/// Deterministically validate JWT claims.
///
/// Note: this validates the *claims* only. Signature verification / decoding
/// lives in [`JwtValidator`] implementations.
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

/// Token verification seam used by the HTTP layer.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError>;
}

/// On-the-wire claim layout (numeric timestamps, raw uuids).
#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    sub: Uuid,
    tenant_id: Uuid,
    roles: Vec<String>,
    iat: i64,
    exp: i64,
}

/// HS256 (shared-secret) JWT validator.
#[derive(Clone)]
pub struct Hs256JwtValidator {
    decoding: DecodingKey,
    encoding: EncodingKey,
}

impl Hs256JwtValidator {
    pub fn new(secret: Vec<u8>) -> Self {
        Self {
            decoding: DecodingKey::from_secret(&secret),
            encoding: EncodingKey::from_secret(&secret),
        }
    }

    /// Issue a signed token for the given claims (dev/test tooling).
    pub fn issue(&self, claims: &JwtClaims) -> Result<String, TokenValidationError> {
        let wire = WireClaims {
            sub: (*claims.sub.as_uuid()),
            tenant_id: (*claims.tenant_id.as_uuid()),
            roles: claims.roles.iter().map(|r| r.as_str().to_string()).collect(),
            iat: claims.issued_at.timestamp(),
            exp: claims.expires_at.timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &wire, &self.encoding)
            .map_err(|e| TokenValidationError::Malformed(e.to_string()))
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError> {
        // Expiry is checked deterministically below, against the caller's
        // clock, not the library's.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let decoded = jsonwebtoken::decode::<WireClaims>(token, &self.decoding, &validation)
            .map_err(|e| TokenValidationError::Malformed(e.to_string()))?;

        let wire = decoded.claims;
        let issued_at = Utc
            .timestamp_opt(wire.iat, 0)
            .single()
            .ok_or_else(|| TokenValidationError::Malformed("bad iat".to_string()))?;
        let expires_at = Utc
            .timestamp_opt(wire.exp, 0)
            .single()
            .ok_or_else(|| TokenValidationError::Malformed("bad exp".to_string()))?;

        let claims = JwtClaims {
            sub: PrincipalId::from_uuid(wire.sub),
            tenant_id: TenantId::from_uuid(wire.tenant_id),
            roles: wire.roles.into_iter().map(Role::new).collect(),
            issued_at,
            expires_at,
        };

        validate_claims(&claims, now)?;
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims(now: DateTime<Utc>) -> JwtClaims {
        JwtClaims {
            sub: PrincipalId::new(),
            tenant_id: TenantId::new(),
            roles: vec![Role::staff()],
            issued_at: now - Duration::minutes(1),
            expires_at: now + Duration::hours(1),
        }
    }

    #[test]
    fn round_trips_issued_tokens() {
        let now = Utc::now();
        let validator = Hs256JwtValidator::new(b"test-secret".to_vec());
        let claims = claims(now);

        let token = validator.issue(&claims).unwrap();
        let parsed = validator.validate(&token, now).unwrap();

        assert_eq!(parsed.sub, claims.sub);
        assert_eq!(parsed.tenant_id, claims.tenant_id);
        assert_eq!(parsed.roles, claims.roles);
    }

    #[test]
    fn rejects_expired_tokens() {
        let now = Utc::now();
        let validator = Hs256JwtValidator::new(b"test-secret".to_vec());
        let mut claims = claims(now);
        claims.issued_at = now - Duration::hours(2);
        claims.expires_at = now - Duration::hours(1);

        let token = validator.issue(&claims).unwrap();
        let err = validator.validate(&token, now).unwrap_err();
        assert_eq!(err, TokenValidationError::Expired);
    }

    #[test]
    fn rejects_wrong_secret() {
        let now = Utc::now();
        let validator = Hs256JwtValidator::new(b"test-secret".to_vec());
        let other = Hs256JwtValidator::new(b"other-secret".to_vec());

        let token = validator.issue(&claims(now)).unwrap();
        assert!(matches!(
            other.validate(&token, now),
            Err(TokenValidationError::Malformed(_))
        ));
    }

    #[test]
    fn validate_claims_rejects_inverted_window() {
        let now = Utc::now();
        let mut c = claims(now);
        c.expires_at = c.issued_at;
        assert_eq!(
            validate_claims(&c, now),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }
}
