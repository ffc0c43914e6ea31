//! Authentication and authorization ports.

use uuid::Uuid;

/// Claims carried by a verified bearer token. The token binds only the
/// user id; role and active state are re-resolved from the store on each
/// request so revocation takes effect before expiry.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub exp: i64,
}

/// Token service trait for JWT operations. Stateless: a pure function of
/// the signing secret and its input.
pub trait TokenService: Send + Sync {
    /// Issue a signed, time-limited token for a user.
    fn generate_token(&self, user_id: Uuid) -> Result<String, AuthError>;

    /// Validate and decode a token.
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Token lifetime, for clients that want to schedule a refresh.
    fn expiration_seconds(&self) -> i64;
}

/// Password hashing service. Verification recomputes the hash; the stored
/// value is never reversible.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Hashing error: {0}")]
    HashingError(String),
}
