//! Settlement entity - History of payments from one member to another.
//!
//! A settlement row records the payment itself. The effect on the ledger lives in the
//! `settled_amount`/`settled` columns of the splits it was applied to.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Settlement database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "settlements")]
pub struct Model {
    /// Unique identifier for the settlement
    #[sea_orm(primary_key, column_name = "settlement_id")]
    pub id: i64,
    /// Group the debt belonged to
    #[sea_orm(column_name = "grp_id")]
    pub group_id: i64,
    /// User paying back (the debtor)
    #[sea_orm(column_name = "payer_uid")]
    pub payer_id: i64,
    /// User being paid back (the creditor)
    #[sea_orm(column_name = "payee_uid")]
    pub payee_id: i64,
    /// Amount paid
    pub amount: f64,
    /// When the settlement was recorded
    pub settled_at: DateTimeUtc,
}

/// Defines relationships between Settlement and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each settlement belongs to one group
    #[sea_orm(
        belongs_to = "super::expense_group::Entity",
        from = "Column::GroupId",
        to = "super::expense_group::Column::Id"
    )]
    Group,
    /// The paying user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::PayerId",
        to = "super::user::Column::Id"
    )]
    Payer,
    /// The receiving user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::PayeeId",
        to = "super::user::Column::Id"
    )]
    Payee,
}

impl Related<super::expense_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
