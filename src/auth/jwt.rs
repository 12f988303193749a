//! JWT authentication for console users.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{User, UserRole};
use crate::error::{HrError, HrResult};

/// JWT claims for authenticated users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// User email.
    pub email: String,
    /// Tenant the user works for.
    pub company_id: Uuid,
    /// User role.
    pub role: UserRole,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issued at time (Unix timestamp).
    pub iat: i64,
    /// Issuer.
    pub iss: String,
}

/// JWT token manager.
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    /// Token validity duration in hours.
    token_duration_hours: i64,
}

impl JwtManager {
    /// Create a new JWT manager with the given secret.
    pub fn new(secret: &str, issuer: String, token_duration_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            token_duration_hours,
        }
    }

    /// Token lifetime in seconds.
    pub fn expires_in_secs(&self) -> i64 {
        self.token_duration_hours * 3600
    }

    /// Generate a JWT token for a user.
    pub fn generate_token(&self, user: &User) -> HrResult<String> {
        let now = Utc::now();
        let exp = now + Duration::hours(self.token_duration_hours);

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            company_id: user.company_id,
            role: user.role,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| HrError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Validate and decode a JWT token.
    pub fn validate_token(&self, token: &str) -> HrResult<Claims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        let token_data: TokenData<Claims> =
            decode(token, &self.decoding_key, &validation).map_err(|e| {
                tracing::debug!(error = %e, "JWT validation failed");
                HrError::Unauthorized(format!("Invalid token: {}", e))
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole) -> User {
        User::new(
            Uuid::new_v4(),
            "rrhh@empresa.cl".to_string(),
            "Marta".to_string(),
            "password123",
            role,
        )
    }

    #[test]
    fn test_jwt_roundtrip() {
        let manager = JwtManager::new("test-secret-key-12345", "hr-core".to_string(), 8);
        let user = user(UserRole::Editor);

        let token = manager.generate_token(&user).unwrap();

        let claims = manager.validate_token(&token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.company_id, user.company_id);
        assert_eq!(claims.email, "rrhh@empresa.cl");
        assert_eq!(claims.role, UserRole::Editor);
        assert_eq!(claims.exp - claims.iat, 8 * 3600);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = JwtManager::new("secret-one-0123456789", "hr-core".to_string(), 8);
        let other = JwtManager::new("secret-two-0123456789", "hr-core".to_string(), 8);

        let token = issuer.generate_token(&user(UserRole::Admin)).unwrap();
        assert!(matches!(
            other.validate_token(&token),
            Err(HrError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let a = JwtManager::new("shared-secret-0123456789", "hr-core".to_string(), 8);
        let b = JwtManager::new("shared-secret-0123456789", "someone-else".to_string(), 8);

        let token = a.generate_token(&user(UserRole::Viewer)).unwrap();
        assert!(b.validate_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        // Negative lifetime puts exp well past the default leeway.
        let manager = JwtManager::new("test-secret-key-12345", "hr-core".to_string(), -1);
        let token = manager.generate_token(&user(UserRole::Admin)).unwrap();
        assert!(manager.validate_token(&token).is_err());
    }
}
