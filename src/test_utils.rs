//! Shared test utilities for `SplitBuddy`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test users, groups, and expenses with sensible defaults.

use crate::{
    core::{
        expense::{self, NewExpense, SharePolicy},
        group,
        user::{self, Caller, NewUser},
    },
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;
use std::collections::BTreeMap;

/// Password given to every user created by [`create_test_user`].
pub const TEST_PASSWORD: &str = "correct horse battery staple";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Installs a test-friendly tracing subscriber. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// Registers a test user.
///
/// # Defaults
/// * `email`: lowercased name at `example.com`, e.g. `alice@example.com`
/// * `password`: [`TEST_PASSWORD`]
/// * `discord_id`: None
pub async fn create_test_user(db: &DatabaseConnection, name: &str) -> Result<entities::user::Model> {
    user::register_user(
        db,
        NewUser {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            password: TEST_PASSWORD.to_string(),
            discord_id: None,
        },
    )
    .await
}

/// Creates a group with `creator_id` as its first member.
pub async fn create_test_group(
    db: &DatabaseConnection,
    creator_id: i64,
    name: &str,
) -> Result<entities::expense_group::Model> {
    group::create_group(db, &Caller::new(creator_id), name, None).await
}

/// Registers a user and adds them to a group.
pub async fn create_member(
    db: &DatabaseConnection,
    group_id: i64,
    name: &str,
) -> Result<entities::user::Model> {
    let member = create_test_user(db, name).await?;
    group::add_member(db, group_id, &member.email).await?;
    Ok(member)
}

/// Records an expense paid by `payer_id` using the default [`SharePolicy`].
///
/// # Arguments
/// * `shares` - `(user_id, percentage)` pairs
pub async fn create_test_expense(
    db: &DatabaseConnection,
    group_id: i64,
    payer_id: i64,
    amount: f64,
    shares: &[(i64, f64)],
) -> Result<entities::expense::Model> {
    expense::create_expense(
        db,
        &Caller::new(payer_id),
        NewExpense {
            group_id,
            amount,
            description: Some("Test expense".to_string()),
            shares: shares.iter().copied().collect::<BTreeMap<_, _>>(),
        },
        &SharePolicy::default(),
    )
    .await
}

/// Sets up a complete test environment with one user and a group they created.
/// Returns (db, group, alice) for common test scenarios.
pub async fn setup_with_group() -> Result<(
    DatabaseConnection,
    entities::expense_group::Model,
    entities::user::Model,
)> {
    let db = setup_test_db().await?;
    let alice = create_test_user(&db, "Alice").await?;
    let group = create_test_group(&db, alice.id, "Test Group").await?;
    Ok((db, group, alice))
}
