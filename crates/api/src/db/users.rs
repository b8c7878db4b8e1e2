//! User repository for database operations.
//!
//! Accounts live in `shop.user`; password hashes in `shop.user_password`,
//! which is only touched on registration and login.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use teakspice_core::{Email, UserId};

use super::{RepositoryError, classify_write_error};
use crate::models::{ProfileUpdate, User};

const EMAIL_TAKEN: &str = "email already exists";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    name: String,
    email: String,
    phone: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            name: row.name,
            email,
            phone: row.phone,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// A new account as submitted at registration.
pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a Email,
    pub phone: &'a str,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, name, email, phone, created_at, updated_at
            FROM shop.user
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Create a user and their password hash in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_with_password(
        &self,
        new_user: &NewUser<'_>,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO shop.user (name, email, phone)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, phone, created_at, updated_at
            ",
        )
        .bind(new_user.name)
        .bind(new_user.email.as_str())
        .bind(new_user.phone)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| classify_write_error(e, EMAIL_TAKEN))?;

        let user = User::try_from(row)?;

        sqlx::query(
            r"
            INSERT INTO shop.user_password (user_id, password_hash)
            VALUES ($1, $2)
            ",
        )
        .bind(user.id)
        .bind(password_hash)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(user)
    }

    /// Look up a user and their password hash by email, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct CredentialRow {
            #[sqlx(flatten)]
            user: UserRow,
            password_hash: String,
        }

        let row = sqlx::query_as::<_, CredentialRow>(
            r"
            SELECT u.id, u.name, u.email, u.phone, u.created_at, u.updated_at,
                   p.password_hash
            FROM shop.user u
            JOIN shop.user_password p ON p.user_id = u.id
            WHERE u.email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| Ok((User::try_from(r.user)?, r.password_hash)))
            .transpose()
    }

    /// Apply a partial profile update and return the updated user.
    ///
    /// Returns `Ok(None)` if the user does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the new email belongs to another user.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            UPDATE shop.user
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                updated_at = now()
            WHERE id = $1
            RETURNING id, name, email, phone, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(update.name.as_deref())
        .bind(update.email.as_ref().map(Email::as_str))
        .bind(update.phone.as_deref())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| classify_write_error(e, EMAIL_TAKEN))?;

        row.map(User::try_from).transpose()
    }
}
