//! Authentication ports - token issuing/verification and password hashing.

/// Claims carried by a verified bearer token.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: i64,
    /// Absolute expiry, unix seconds.
    pub exp: i64,
}

/// Issues and verifies the opaque signed credential presented by clients.
pub trait TokenService: Send + Sync {
    /// Issue a token for `user_id`, expiring a configured duration from now.
    fn issue(&self, user_id: i64) -> Result<String, AuthError>;

    /// Verify signature and expiry, returning the embedded claims.
    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Lifetime of issued tokens, in seconds.
    fn expiry_seconds(&self) -> i64;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a stored hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication failures.
///
/// Everything except `Hashing` maps to an undifferentiated 401 at the HTTP
/// boundary; the variants exist for logging.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing authorization header")]
    MissingAuth,

    #[error("malformed authorization header")]
    MalformedHeader,

    #[error("token expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("invalid subject claim: {0}")]
    InvalidSubject(String),

    #[error("token subject does not resolve to a user")]
    UnknownSubject,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("hashing error: {0}")]
    Hashing(String),
}
