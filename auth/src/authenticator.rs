use std::sync::OnceLock;

use chrono::Utc;

use crate::jwt::claims::RawClaims;
use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Development fallback for the signing secret. Insecure: any deployment
/// must override it.
pub const INSECURE_DEFAULT_SECRET: &str = "dev_secret_change_me";

/// Default lifetime of an issued token.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Plaintext used to build the decoy digest for unknown accounts.
const DECOY_PASSWORD: &str = "decoy-password-for-unknown-accounts";

/// Authentication coordinator combining password verification and JWT generation.
///
/// Provides high-level authentication operations by coordinating
/// password hashing and JWT token handling.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
    token_ttl_hours: i64,
    decoy_hash: OnceLock<String>,
}

/// Result of successful authentication.
pub struct AuthenticationResult {
    /// JWT access token
    pub access_token: String,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for JWT signing
    ///
    /// # Returns
    /// Configured Authenticator instance issuing 24 hour tokens
    pub fn new(jwt_secret: &[u8]) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            jwt_handler: JwtHandler::new(jwt_secret),
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
            decoy_hash: OnceLock::new(),
        }
    }

    /// Replace the password hasher (and thereby the work factor).
    pub fn with_password_hasher(mut self, password_hasher: PasswordHasher) -> Self {
        self.password_hasher = password_hasher;
        self.decoy_hash = OnceLock::new();
        self
    }

    /// Set the lifetime of issued tokens.
    pub fn with_token_ttl_hours(mut self, hours: i64) -> Self {
        self.token_ttl_hours = hours;
        self
    }

    /// Hash a password for storage.
    ///
    /// # Arguments
    /// * `password` - Plaintext password
    ///
    /// # Returns
    /// Hashed password string
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Build the decoy digest ahead of the first login for an unknown account.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing with the configured cost failed
    pub fn warm_up(&self) -> Result<(), PasswordError> {
        self.decoy_hash().map(|_| ())
    }

    /// Burn the same verification cost as a real login attempt.
    ///
    /// Used when the account does not exist, so that an unknown email and a
    /// wrong password cannot be told apart by response time.
    pub fn verify_decoy(&self, password: &str) {
        match self.decoy_hash() {
            Ok(decoy) => {
                let _ = self.password_hasher.verify(password, decoy);
            }
            // No digest to verify against; hashing costs the same
            Err(_) => {
                let _ = self.password_hasher.hash(password);
            }
        }
    }

    fn decoy_hash(&self) -> Result<&str, PasswordError> {
        if let Some(hash) = self.decoy_hash.get() {
            return Ok(hash.as_str());
        }

        let hash = self.password_hasher.hash(DECOY_PASSWORD)?;
        Ok(self.decoy_hash.get_or_init(|| hash).as_str())
    }

    /// Verify credentials and generate JWT token.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `user_id` - Subject of the issued token
    /// * `email` - Email carried in the issued token
    ///
    /// # Returns
    /// AuthenticationResult with access token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Password verification failed
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        user_id: i64,
        email: &str,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        // Verify password
        let is_valid = self.password_hasher.verify(password, stored_hash)?;

        if !is_valid {
            return Err(AuthenticationError::InvalidCredentials);
        }

        // Generate JWT token
        let access_token = self.issue_token(user_id, email)?;

        Ok(AuthenticationResult { access_token })
    }

    /// Issue a token for a user without password verification.
    ///
    /// Used right after registration, when the credentials were just created.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token generation failed
    pub fn issue_token(&self, user_id: i64, email: &str) -> Result<String, JwtError> {
        let claims = Claims::for_user(user_id, email, self.token_ttl_hours);
        self.jwt_handler.encode(&claims)
    }

    /// Validate and decode a bearer token.
    ///
    /// # Arguments
    /// * `token` - JWT token string
    ///
    /// # Returns
    /// Decoded claims with a checked, non-negative subject
    ///
    /// # Errors
    /// * `Malformed`, `SignatureInvalid`, `Expired`, `AlgorithmMismatch` - Token rejected
    /// * `InvalidSubject`, `InvalidClaims` - Token verified but its payload has the wrong shape
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let raw: RawClaims = self.jwt_handler.decode(token)?;
        let claims = Claims::try_from(raw)?;

        if claims.is_expired(Utc::now().timestamp()) {
            return Err(JwtError::Expired);
        }

        Ok(claims)
    }
}
