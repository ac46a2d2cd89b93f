//! Group membership entity - Links one user to one expense group.
//!
//! The primary key is the (`grp_id`, `uid`) pair, so a user can appear in a group at
//! most once. Adding an existing member is a no-op at the query level.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Group membership database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "group_members")]
pub struct Model {
    /// Group the user belongs to
    #[sea_orm(primary_key, auto_increment = false, column_name = "grp_id")]
    pub group_id: i64,
    /// Member user
    #[sea_orm(primary_key, auto_increment = false, column_name = "uid")]
    pub user_id: i64,
    /// Date the user joined the group
    pub joined_at: Date,
}

/// Defines relationships between `GroupMembership` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each membership belongs to one group
    #[sea_orm(
        belongs_to = "super::expense_group::Entity",
        from = "Column::GroupId",
        to = "super::expense_group::Column::Id"
    )]
    Group,
    /// Each membership belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::expense_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
