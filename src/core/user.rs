//! User business logic - registration, credential checks, and caller resolution.
//!
//! Passwords are hashed with Argon2id before they reach the database and are only ever
//! compared through the hasher. The chat layer never holds session state; it turns the
//! author of a command into a [`Caller`] with [`resolve_caller`] and passes that down.

use crate::{
    entities::{User, user},
    errors::{Error, Result},
};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{Set, SqlErr, prelude::*};
use std::collections::HashMap;
use tracing::{info, instrument};

/// The identity on whose behalf a ledger operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    /// Resolved user id
    pub user_id: i64,
}

impl Caller {
    /// Wraps an already-resolved user id.
    #[must_use]
    pub const fn new(user_id: i64) -> Self {
        Self { user_id }
    }
}

/// Input for [`register_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Plaintext password, hashed before storage
    pub password: String,
    /// Discord account to link, if registering from chat
    pub discord_id: Option<String>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::PasswordHash {
            message: e.to_string(),
        })
}

fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| Error::PasswordHash {
        message: e.to_string(),
    })?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Maps a unique-index hit on insert back to the registration error it stands for.
///
/// The lookup in [`register_user`] can race with another registration; the index on
/// `users` is what finally rejects the second one.
fn unique_violation(err: DbErr, email: String) -> Error {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) if message.contains("discord") => {
            Error::Validation {
                message: "This Discord account is already registered".to_string(),
            }
        }
        Some(SqlErr::UniqueConstraintViolation(_)) => Error::EmailTaken { email },
        _ => err.into(),
    }
}

/// Registers a new user with a hashed password.
///
/// The email is trimmed and lowercased before the uniqueness check, so
/// `Alice@Example.com` and `alice@example.com` are the same account.
#[instrument(skip(db, new_user), fields(email = %new_user.email))]
pub async fn register_user(db: &DatabaseConnection, new_user: NewUser) -> Result<user::Model> {
    let name = new_user.name.trim().to_string();
    let email = normalize_email(&new_user.email);

    if name.is_empty() {
        return Err(Error::Validation {
            message: "User name cannot be empty".to_string(),
        });
    }
    if email.is_empty() || !email.contains('@') {
        return Err(Error::Validation {
            message: format!("'{email}' is not a valid email address"),
        });
    }
    if new_user.password.is_empty() {
        return Err(Error::Validation {
            message: "Password cannot be empty".to_string(),
        });
    }

    if get_user_by_email(db, &email).await?.is_some() {
        return Err(Error::EmailTaken { email });
    }

    let password = hash_password(&new_user.password)?;
    let user = user::ActiveModel {
        name: Set(name),
        email: Set(email.clone()),
        password: Set(password),
        discord_id: Set(new_user.discord_id),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|e| unique_violation(e, email))?;

    info!(user_id = user.id, "Registered user");
    Ok(user)
}

/// Checks an email/password pair and returns the matching user.
///
/// Unknown emails and wrong passwords both produce [`Error::InvalidCredentials`].
pub async fn authenticate(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<user::Model> {
    let user = get_user_by_email(db, email)
        .await?
        .ok_or(Error::InvalidCredentials)?;

    if verify_password(password, &user.password)? {
        Ok(user)
    } else {
        Err(Error::InvalidCredentials)
    }
}

/// Finds a user by email (case-insensitive).
pub async fn get_user_by_email<C>(db: &C, email: &str) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find()
        .filter(user::Column::Email.eq(normalize_email(email)))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a user by primary key.
pub async fn get_user_by_id<C>(db: &C, user_id: i64) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Finds the user linked to a Discord account.
pub async fn get_user_by_discord_id(
    db: &DatabaseConnection,
    discord_id: &str,
) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::DiscordId.eq(discord_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Maps user ids to display names. Unknown ids are simply absent.
pub async fn get_user_names<I>(db: &DatabaseConnection, ids: I) -> Result<HashMap<i64, String>>
where
    I: IntoIterator<Item = i64>,
{
    let mut ids: Vec<i64> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();

    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    Ok(User::find()
        .filter(user::Column::Id.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u.name))
        .collect())
}

/// Turns a Discord account into the [`Caller`] for ledger operations.
pub async fn resolve_caller(db: &DatabaseConnection, discord_id: &str) -> Result<Caller> {
    get_user_by_discord_id(db, discord_id)
        .await?
        .map(|user| Caller::new(user.id))
        .ok_or_else(|| Error::UserNotFound {
            identifier: format!("discord:{discord_id}"),
        })
}
