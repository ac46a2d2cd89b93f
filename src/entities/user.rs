//! User entity - Represents a registered person who can pay for and owe on expenses.
//!
//! Users are created at registration and never updated afterwards. The email is unique,
//! the password column holds an Argon2id PHC string, and `discord_id` links the account
//! to the chat identity that issues commands.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key, column_name = "uid")]
    pub id: i64,
    /// Display name
    #[sea_orm(column_name = "uname")]
    pub name: String,
    /// Login email, unique across all users
    #[sea_orm(unique)]
    pub email: String,
    /// Argon2id hash of the password (never plaintext)
    #[serde(skip_serializing)]
    pub password: String,
    /// Discord user ID linked to this account, if any
    #[sea_orm(unique)]
    pub discord_id: Option<String>,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user belongs to many groups through memberships
    #[sea_orm(has_many = "super::group_membership::Entity")]
    Memberships,
    /// One user pays for many expenses
    #[sea_orm(has_many = "super::expense::Entity")]
    Expenses,
    /// One user owes many splits
    #[sea_orm(has_many = "super::expense_split::Entity")]
    Splits,
}

impl Related<super::group_membership::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Memberships.def()
    }
}

impl Related<super::expense::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl Related<super::expense_split::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Splits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
