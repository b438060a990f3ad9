use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;


/// Active operator session returned by the auth provider
#[derive(Clone, Debug)]
pub struct Session {
    pub token: Uuid,
    pub email: String,
    pub issued_at: DateTime<Utc>,
}

impl Session {
    pub fn new(email: &str) -> Self {
        Self {
            token: Uuid::new_v4(),
            email: email.to_string(),
            issued_at: Utc::now(),
        }
    }
}

/// Authentication errors
#[derive(Debug, Clone, PartialEq)]
pub enum AuthError {
    /// Email or password left empty
    MissingCredentials,
    /// Sign-up passwords do not match (checked locally, provider not called)
    PasswordMismatch,
    /// Provider rejected the credentials
    InvalidCredentials,
    /// Any other provider failure (network, account exists, ...)
    Provider(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingCredentials => write!(f, "email and password are required"),
            AuthError::PasswordMismatch => write!(f, "the passwords do not match"),
            AuthError::InvalidCredentials => write!(f, "invalid email or password"),
            AuthError::Provider(msg) => write!(f, "auth provider error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

/// External authentication provider (email + password)
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;
    async fn create_account(&self, email: &str, password: &str) -> Result<Session, AuthError>;
    async fn sign_out(&self, session: &Session) -> Result<(), AuthError>;
}

/// Local validation in front of the provider.
///
/// Empty credentials and sign-up password mismatches are rejected before the
/// provider is ever called; everything else is delegated unchanged. Errors
/// are terminal for the triggering action: no retry, no state change.
pub struct AuthClient<P: AuthProvider> {
    provider: P,
}

impl<P: AuthProvider> AuthClient<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        self.provider.sign_in(email, password).await
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<Session, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        if password != confirm_password {
            return Err(AuthError::PasswordMismatch);
        }

        self.provider.create_account(email, password).await
    }

    pub async fn sign_out(&self, session: &Session) -> Result<(), AuthError> {
        self.provider.sign_out(session).await
    }
}
