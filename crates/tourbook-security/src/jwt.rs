//! JWT token handling
//!
//! Two token kinds share one secret: session access tokens and short-lived
//! continuation tokens that carry a pending activity registration through the
//! login/registration round trip.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use tourbook_shared::constants::{TOKEN_PURPOSE_CONTINUE_REGISTRATION, TOKEN_TYPE_ACCESS};

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Token creation failed: {0}")]
    CreationError(String),
    #[error("Token validation failed: {0}")]
    ValidationError(String),
    #[error("Token expired")]
    TokenExpired,
    #[error("Token has wrong purpose")]
    WrongPurpose,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
    pub token_type: String,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.sub).map_err(|e| JwtError::ValidationError(e.to_string()))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContinuationClaims {
    pub activity_id: Uuid,
    pub purpose: String,
    pub iat: i64,
    pub exp: i64,
}

pub struct JwtService {
    secret: String,
    access_token_expiry: i64,
    continuation_token_expiry: i64,
}

impl JwtService {
    pub fn new(secret: String, access_expiry: i64, continuation_expiry: i64) -> Self {
        Self {
            secret,
            access_token_expiry: access_expiry,
            continuation_token_expiry: continuation_expiry,
        }
    }

    pub fn generate_access_token(&self, user_id: &Uuid, role: &str) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.access_token_expiry)).timestamp(),
            token_type: TOKEN_TYPE_ACCESS.to_string(),
        };
        self.sign(&claims)
    }

    pub fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        let claims: Claims = self.verify(token)?;
        if claims.token_type != TOKEN_TYPE_ACCESS {
            return Err(JwtError::WrongPurpose);
        }
        Ok(claims)
    }

    pub fn generate_continuation_token(&self, activity_id: &Uuid) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = ContinuationClaims {
            activity_id: *activity_id,
            purpose: TOKEN_PURPOSE_CONTINUE_REGISTRATION.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.continuation_token_expiry)).timestamp(),
        };
        self.sign(&claims)
    }

    /// Returns the activity a visitor tried to register for before signing in.
    pub fn validate_continuation_token(&self, token: &str) -> Result<Uuid, JwtError> {
        let claims: ContinuationClaims = self.verify(token)?;
        if claims.purpose != TOKEN_PURPOSE_CONTINUE_REGISTRATION {
            return Err(JwtError::WrongPurpose);
        }
        Ok(claims.activity_id)
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| JwtError::CreationError(e.to_string()))
    }

    fn verify<T: for<'de> Deserialize<'de>>(&self, token: &str) -> Result<T, JwtError> {
        decode::<T>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::TokenExpired,
            _ => JwtError::ValidationError(e.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new("test-secret".to_string(), 3600, 900)
    }

    #[test]
    fn access_token_round_trip() {
        let svc = service();
        let user_id = Uuid::new_v4();
        let token = svc.generate_access_token(&user_id, "customer").unwrap();
        let claims = svc.validate_access_token(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.role, "customer");
    }

    #[test]
    fn continuation_token_round_trip() {
        let svc = service();
        let activity_id = Uuid::new_v4();
        let token = svc.generate_continuation_token(&activity_id).unwrap();
        assert_eq!(svc.validate_continuation_token(&token).unwrap(), activity_id);
    }

    #[test]
    fn continuation_token_is_not_a_session() {
        let svc = service();
        let token = svc.generate_continuation_token(&Uuid::new_v4()).unwrap();
        assert!(svc.validate_access_token(&token).is_err());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let svc = service();
        let token = svc.generate_continuation_token(&Uuid::new_v4()).unwrap();
        let other = JwtService::new("other-secret".to_string(), 3600, 900);
        assert!(matches!(
            other.validate_continuation_token(&token),
            Err(JwtError::ValidationError(_))
        ));

        let forged = svc.generate_continuation_token(&Uuid::new_v4()).unwrap();
        let original: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        let broken = format!("{}.{}.{}", original[0], forged_parts[1], original[2]);
        assert!(svc.validate_continuation_token(&broken).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let svc = JwtService::new("test-secret".to_string(), 3600, -3600);
        let token = svc.generate_continuation_token(&Uuid::new_v4()).unwrap();
        assert!(matches!(
            svc.validate_continuation_token(&token),
            Err(JwtError::TokenExpired)
        ));
    }
}
