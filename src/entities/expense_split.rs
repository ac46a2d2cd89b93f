//! Expense split entity - One participant's owed share of one expense.
//!
//! `share_amount` is fixed at creation. Settlements raise `settled_amount` in place and
//! flip `settled` once nothing is outstanding, so a split can be partly paid back.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Expense split database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expense_splits")]
pub struct Model {
    /// Unique identifier for the split
    #[sea_orm(primary_key, column_name = "split_id")]
    pub id: i64,
    /// Expense this split belongs to
    #[sea_orm(column_name = "eid")]
    pub expense_id: i64,
    /// User who owes this share
    #[sea_orm(column_name = "uid")]
    pub user_id: i64,
    /// Owed share of the expense amount
    pub share_amount: f64,
    /// Portion of the share already paid back
    pub settled_amount: f64,
    /// True once the full share has been paid back
    pub settled: bool,
}

impl Model {
    /// Amount still owed on this split.
    #[must_use]
    pub fn outstanding(&self) -> f64 {
        self.share_amount - self.settled_amount
    }
}

/// Defines relationships between `ExpenseSplit` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each split belongs to one expense
    #[sea_orm(
        belongs_to = "super::expense::Entity",
        from = "Column::ExpenseId",
        to = "super::expense::Column::Id"
    )]
    Expense,
    /// Each split is owed by one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::expense::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expense.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
