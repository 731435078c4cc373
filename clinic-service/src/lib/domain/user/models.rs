use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;

use crate::user::errors::EmailError;
use crate::user::errors::UserError;
use crate::user::errors::UserIdError;

/// Registered account.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: EmailAddress,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Numeric account identifier, assigned by storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a storage or token identifier.
    ///
    /// # Errors
    /// * `Negative` - Identifiers are never negative
    pub fn new(id: i64) -> Result<Self, UserIdError> {
        if id < 0 {
            return Err(UserIdError::Negative(id));
        }
        Ok(Self(id))
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Arguments
    /// * `email` - Raw email string
    ///
    /// # Returns
    /// Validated EmailAddress value object
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        match email_address::EmailAddress::from_str(&email) {
            Ok(_) => Ok(Self(email)),
            Err(e) => Err(EmailError::InvalidFormat(e.to_string())),
        }
    }

    /// Get email as string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Account to be stored. The identifier and creation time are assigned by storage.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: EmailAddress,
    pub password_hash: String,
}

/// Validated registration request.
#[derive(Debug, Clone)]
pub struct RegisterCommand {
    pub email: EmailAddress,
    pub password: String,
}

impl RegisterCommand {
    /// # Errors
    /// * `MissingCredentials` - Email or password is empty
    /// * `InvalidEmail` - Email is malformed
    pub fn new(email: String, password: String) -> Result<Self, UserError> {
        if email.is_empty() || password.is_empty() {
            return Err(UserError::MissingCredentials);
        }

        Ok(Self {
            email: EmailAddress::new(email)?,
            password,
        })
    }
}

/// Login request. The email is not format-checked: an unknown or malformed
/// address fails the same way a wrong password does.
#[derive(Debug, Clone)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

impl LoginCommand {
    /// # Errors
    /// * `MissingCredentials` - Email or password is empty
    pub fn new(email: String, password: String) -> Result<Self, UserError> {
        if email.is_empty() || password.is_empty() {
            return Err(UserError::MissingCredentials);
        }

        Ok(Self { email, password })
    }
}

/// Bearer token handed out by registration or login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub user_id: UserId,
    pub token: String,
}
