/// Authentication service - JWT, password and PIN handling
use crate::error::{Result, ServerError};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use remotejob_core::UserId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct AuthService {
    secret: String,
    bcrypt_cost: u32,
    user_token_expiration: Duration,
    admin_token_expiration: Duration,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: String, // User ID, or the admin email for admin tokens
    pub exp: i64,    // Expiration time
    pub iat: i64,    // Issued at
    #[serde(default)]
    pub is_admin: bool,
}

/// Identity attached to an authenticated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub is_admin: bool,
}

impl AuthService {
    pub fn new(secret: String, bcrypt_cost: u32, user_token_days: u64, admin_token_days: u64) -> Self {
        Self {
            secret,
            bcrypt_cost,
            user_token_expiration: Duration::days(user_token_days as i64),
            admin_token_expiration: Duration::days(admin_token_days as i64),
        }
    }

    /// Hash a password using bcrypt
    pub fn hash_password(&self, password: &str) -> Result<String> {
        bcrypt::hash(password, self.bcrypt_cost).map_err(ServerError::from)
    }

    /// Verify a password against a hash
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        bcrypt::verify(password, hash).map_err(ServerError::from)
    }

    /// Hash a withdrawal PIN; stored the same way as passwords
    pub fn hash_pin(&self, pin: &str) -> Result<String> {
        if pin.trim().is_empty() {
            return Err(ServerError::BadRequest("PIN is required".to_string()));
        }
        self.hash_password(pin.trim())
    }

    /// Verify a withdrawal PIN against its hash
    pub fn verify_pin(&self, pin: &str, hash: &str) -> Result<bool> {
        self.verify_password(pin.trim(), hash)
    }

    /// Create a token for a regular user
    pub fn create_user_token(&self, user_id: &UserId) -> Result<String> {
        self.create_token(user_id.as_str(), false, self.user_token_expiration)
    }

    /// Create a token for the administrator
    pub fn create_admin_token(&self, admin_email: &str) -> Result<String> {
        self.create_token(admin_email, true, self.admin_token_expiration)
    }

    /// Verify and decode a token
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let validation = Validation::default();

        let token_data = decode::<Claims>(token, &decoding_key, &validation)?;
        Ok(token_data.claims)
    }

    /// Verify a token and return the identity it carries
    pub fn authenticate(&self, token: &str) -> Result<Principal> {
        let claims = self.verify_token(token)?;
        Ok(Principal {
            user_id: UserId::new(claims.sub),
            is_admin: claims.is_admin,
        })
    }

    fn create_token(&self, subject: &str, is_admin: bool, expiration: Duration) -> Result<String> {
        let now = Utc::now();
        let exp = now + expiration;

        let claims = Claims {
            sub: subject.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            is_admin,
        };

        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::default(), &claims, &encoding_key).map_err(ServerError::from)
    }
}
