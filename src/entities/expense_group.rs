//! Expense group entity - A named collection of users who share costs.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Expense group database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expense_groups")]
pub struct Model {
    /// Unique identifier for the group
    #[sea_orm(primary_key, column_name = "grp_id")]
    pub id: i64,
    /// Human-readable group name (e.g., "Flatmates", "Lisbon trip")
    #[sea_orm(column_name = "grp_name")]
    pub name: String,
    /// Optional free-form description
    pub description: Option<String>,
}

/// Defines relationships between `ExpenseGroup` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One group has many memberships
    #[sea_orm(has_many = "super::group_membership::Entity")]
    Memberships,
    /// One group has many expenses
    #[sea_orm(has_many = "super::expense::Entity")]
    Expenses,
    /// One group has many recorded settlements
    #[sea_orm(has_many = "super::settlement::Entity")]
    Settlements,
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

impl Related<super::settlement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Settlements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
