//! Authentication service.
//!
//! Password registration and login, plus the caller's own profile. A
//! successful login yields a bearer token from [`TokenSigner`].

mod error;
pub mod token;

pub use error::AuthError;
pub use token::{TokenError, TokenSigner};

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use teakspice_core::{Email, UserId};

use crate::db::RepositoryError;
use crate::db::users::{NewUser, UserRepository};
use crate::models::{ProfileUpdate, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Hash checked when the email is unknown, so a miss costs one Argon2
/// verification like a wrong password does.
static DUMMY_PASSWORD_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password("dummy password for unknown users").unwrap_or_default());

/// Registration details as submitted by the client.
pub struct Registration<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub password: &'a str,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    signer: &'a TokenSigner,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, signer: &'a TokenSigner) -> Self {
        Self {
            users: UserRepository::new(pool),
            signer,
        }
    }

    /// Register a new user with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(&self, registration: &Registration<'_>) -> Result<User, AuthError> {
        let email = Email::parse(registration.email)?;
        validate_password(registration.password)?;
        let password_hash = hash_password(registration.password)?;

        let new_user = NewUser {
            name: registration.name.trim(),
            email: &email,
            phone: registration.phone.trim(),
        };

        self.users
            .create_with_password(&new_user, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })
    }

    /// Login with email and password, returning the user and a fresh token.
    ///
    /// Unknown emails, malformed emails, and wrong passwords are all reported
    /// as `InvalidCredentials`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let Some((user, password_hash)) = self.users.get_credentials(&email).await? else {
            let _ = verify_password(password, &DUMMY_PASSWORD_HASH);
            return Err(AuthError::InvalidCredentials);
        };

        verify_password(password, &password_hash)?;

        let token = self.signer.issue(user.id)?;
        Ok((user, token))
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Apply a profile update and return the updated user.
    ///
    /// An update with no fields returns the profile unchanged.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    /// Returns `AuthError::UserAlreadyExists` if the new email is taken.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        update: &ProfileUpdate,
    ) -> Result<User, AuthError> {
        if update.is_empty() {
            return self.get_user(user_id).await;
        }

        self.users
            .update_profile(user_id, update)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?
            .ok_or(AuthError::UserNotFound)
    }
}

/// Hash a password with Argon2id and a random salt.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}
