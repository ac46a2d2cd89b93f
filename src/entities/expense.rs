//! Expense entity - One payment made by a member on behalf of a group.
//!
//! Expenses are immutable once created. The date and time of occurrence are stored in
//! separate columns; together with the id they give the oldest-first order used when
//! settling debts.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Expense database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    /// Unique identifier for the expense
    #[sea_orm(primary_key, column_name = "eid")]
    pub id: i64,
    /// Group that owns this expense
    #[sea_orm(column_name = "grp_id")]
    pub group_id: i64,
    /// User who paid
    #[sea_orm(column_name = "paidby_user")]
    pub paid_by: i64,
    /// Total amount paid, always positive
    pub amount: f64,
    /// Day the expense was recorded (UTC)
    pub expense_date: Date,
    /// Time of day the expense was recorded (UTC)
    pub expense_time: Time,
    /// Free-form description, empty when none was given
    pub description: String,
}

/// Defines relationships between Expense and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each expense belongs to one group
    #[sea_orm(
        belongs_to = "super::expense_group::Entity",
        from = "Column::GroupId",
        to = "super::expense_group::Column::Id"
    )]
    Group,
    /// Each expense was paid by one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::PaidBy",
        to = "super::user::Column::Id"
    )]
    Payer,
    /// One expense has many splits
    #[sea_orm(has_many = "super::expense_split::Entity")]
    Splits,
}

impl Related<super::expense_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payer.def()
    }
}

impl Related<super::expense_split::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Splits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
