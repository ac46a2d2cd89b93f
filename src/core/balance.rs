//! Balance aggregation - who owes whom inside a group.
//!
//! Balances are directional. Every ordered (debtor, creditor) pair is summed on its own,
//! so if Alice owes Bob 30 and Bob owes Alice 10 both obligations are reported; they are
//! never netted into a single figure. Splits owed by the payer of their own expense are
//! left out, as are settled splits.

use crate::{
    core::{group, user},
    entities::{Expense, ExpenseSplit, expense, expense_split},
    errors::Result,
};
use sea_orm::{
    FromQueryResult, JoinType, QuerySelect,
    prelude::*,
    sea_query::{Expr, Func, SimpleExpr},
};

/// Amounts closer than half a cent are treated as equal.
pub const CENT_TOLERANCE: f64 = 0.005;

/// Rounds an amount to two decimal places.
#[must_use]
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Outstanding amount one member owes another within a group.
#[derive(Debug, Clone, PartialEq)]
pub struct PairBalance {
    /// User who owes
    pub debtor_id: i64,
    /// User who paid and is owed
    pub creditor_id: i64,
    /// Outstanding amount, rounded to cents
    pub amount: f64,
}

/// A [`PairBalance`] with both user names resolved for display.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedBalance {
    /// User who owes
    pub debtor_id: i64,
    /// Debtor's display name
    pub debtor_name: String,
    /// User who is owed
    pub creditor_id: i64,
    /// Creditor's display name
    pub creditor_name: String,
    /// Outstanding amount, rounded to cents
    pub amount: f64,
}

/// Raw row of the grouped aggregation query.
#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct PairTotal {
    /// Split owner
    pub debtor_id: i64,
    /// Expense payer
    pub creditor_id: i64,
    /// Sum of outstanding split amounts
    pub amount: Option<f64>,
}

fn outstanding_expr() -> SimpleExpr {
    Expr::col((ExpenseSplit, expense_split::Column::ShareAmount))
        .sub(Expr::col((ExpenseSplit, expense_split::Column::SettledAmount)))
}

/// Rounds raw pair totals to cents and drops pairs with nothing outstanding.
#[must_use]
pub fn collapse_totals(rows: Vec<PairTotal>) -> Vec<PairBalance> {
    let mut balances: Vec<PairBalance> = rows
        .into_iter()
        .filter(|row| row.debtor_id != row.creditor_id)
        .map(|row| PairBalance {
            debtor_id: row.debtor_id,
            creditor_id: row.creditor_id,
            amount: round_cents(row.amount.unwrap_or_default()),
        })
        .filter(|balance| balance.amount > 0.0)
        .collect();

    balances.sort_by_key(|b| (b.debtor_id, b.creditor_id));
    balances
}

/// Computes the outstanding amount for every (debtor, creditor) pair in a group.
///
/// One grouped query sums `share_amount - settled_amount` over the group's unsettled
/// splits, excluding splits owed by the expense's own payer. Results are rounded to
/// cents and pairs at or below zero are dropped.
pub async fn get_balances<C>(db: &C, group_id: i64) -> Result<Vec<PairBalance>>
where
    C: ConnectionTrait,
{
    group::require_group(db, group_id).await?;

    let rows = ExpenseSplit::find()
        .select_only()
        .column_as(expense_split::Column::UserId, "debtor_id")
        .column_as(expense::Column::PaidBy, "creditor_id")
        .column_as(SimpleExpr::from(Func::sum(outstanding_expr())), "amount")
        .join(JoinType::InnerJoin, expense_split::Relation::Expense.def())
        .filter(expense::Column::GroupId.eq(group_id))
        .filter(expense_split::Column::Settled.eq(false))
        .filter(
            Expr::col((ExpenseSplit, expense_split::Column::UserId))
                .ne(Expr::col((Expense, expense::Column::PaidBy))),
        )
        .group_by(expense_split::Column::UserId)
        .group_by(expense::Column::PaidBy)
        .into_model::<PairTotal>()
        .all(db)
        .await?;

    Ok(collapse_totals(rows))
}

/// Same as [`get_balances`], with user names attached.
pub async fn get_balances_with_names(
    db: &DatabaseConnection,
    group_id: i64,
) -> Result<Vec<NamedBalance>> {
    let balances = get_balances(db, group_id).await?;
    let names = user::get_user_names(
        db,
        balances.iter().flat_map(|b| [b.debtor_id, b.creditor_id]),
    )
    .await?;

    let name_of = |id: i64| {
        names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("User {id}"))
    };

    Ok(balances
        .into_iter()
        .map(|b| NamedBalance {
            debtor_name: name_of(b.debtor_id),
            creditor_name: name_of(b.creditor_id),
            debtor_id: b.debtor_id,
            creditor_id: b.creditor_id,
            amount: b.amount,
        })
        .collect())
}

/// Total a user still owes to others across all of their groups.
pub async fn total_owed_by_user(db: &DatabaseConnection, user_id: i64) -> Result<f64> {
    let total: Option<Option<f64>> = ExpenseSplit::find()
        .select_only()
        .column_as(SimpleExpr::from(Func::sum(outstanding_expr())), "total_owed")
        .join(JoinType::InnerJoin, expense_split::Relation::Expense.def())
        .filter(expense_split::Column::UserId.eq(user_id))
        .filter(expense_split::Column::Settled.eq(false))
        .filter(expense::Column::PaidBy.ne(user_id))
        .into_tuple()
        .one(db)
        .await?;

    Ok(round_cents(total.flatten().unwrap_or_default()))
}
