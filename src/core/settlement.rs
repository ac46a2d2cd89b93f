//! Settlement business logic - paying back what one member owes another.
//!
//! A settlement is applied to the debtor's unsettled splits on expenses the creditor
//! paid for, oldest expense first. Each split absorbs as much as it still owes; the last
//! one touched may be left partly paid. Splits are updated in place and a settlement
//! row is stored as history, all inside one transaction.
//!
//! Every split update is guarded on the values that were read, so two settlements racing
//! over the same split cannot both apply: the loser sees no affected row, fails with
//! [`Error::SettlementConflict`], and its transaction rolls back.

use crate::{
    core::{
        balance::{CENT_TOLERANCE, round_cents},
        expense::validate_amount,
        group,
    },
    entities::{ExpenseSplit, Settlement, expense, expense_split, settlement},
    errors::{Error, Result},
};
use sea_orm::{JoinType, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{debug, info, instrument};

/// How much of a settlement goes to one split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Allocation {
    /// Split being paid down
    pub split_id: i64,
    /// `settled_amount` of the split when it was read
    pub previous_settled: f64,
    /// Amount of the settlement applied to this split
    pub applied: f64,
    /// New `settled_amount` for the split
    pub settled_amount: f64,
    /// Whether the split is now fully paid
    pub closes: bool,
}

/// Spreads `amount` over `splits` in the order given.
///
/// Each split takes up to its outstanding amount. A split left with less than half a
/// cent outstanding is closed at its full share. Splits after the money runs out are
/// not touched.
#[must_use]
pub fn allocate(amount: f64, splits: &[expense_split::Model]) -> Vec<Allocation> {
    let mut remaining = amount;
    let mut allocations = Vec::new();

    for split in splits {
        if remaining < CENT_TOLERANCE {
            break;
        }

        let owed = split.outstanding();
        if owed <= 0.0 {
            continue;
        }

        let applied = remaining.min(owed);
        remaining -= applied;

        let closes = owed - applied < CENT_TOLERANCE;
        allocations.push(Allocation {
            split_id: split.id,
            previous_settled: split.settled_amount,
            applied,
            settled_amount: if closes {
                split.share_amount
            } else {
                split.settled_amount + applied
            },
            closes,
        });
    }

    allocations
}

/// Unsettled splits `debtor_id` owes on expenses `creditor_id` paid in a group,
/// oldest expense first.
pub async fn outstanding_splits<C>(
    db: &C,
    group_id: i64,
    debtor_id: i64,
    creditor_id: i64,
) -> Result<Vec<expense_split::Model>>
where
    C: ConnectionTrait,
{
    ExpenseSplit::find()
        .join(JoinType::InnerJoin, expense_split::Relation::Expense.def())
        .filter(expense::Column::GroupId.eq(group_id))
        .filter(expense::Column::PaidBy.eq(creditor_id))
        .filter(expense_split::Column::UserId.eq(debtor_id))
        .filter(expense_split::Column::Settled.eq(false))
        .order_by_asc(expense::Column::ExpenseDate)
        .order_by_asc(expense::Column::ExpenseTime)
        .order_by_asc(expense::Column::Id)
        .order_by_asc(expense_split::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Writes allocations to their splits.
///
/// Each update only matches a split that is still unsettled with the same
/// `settled_amount` that was read. Run it inside a transaction: on a conflict the
/// updates already made must be rolled back by the caller.
pub async fn apply_allocations<C>(db: &C, allocations: &[Allocation]) -> Result<()>
where
    C: ConnectionTrait,
{
    for allocation in allocations {
        let result = ExpenseSplit::update_many()
            .col_expr(
                expense_split::Column::SettledAmount,
                Expr::value(allocation.settled_amount),
            )
            .col_expr(expense_split::Column::Settled, Expr::value(allocation.closes))
            .filter(expense_split::Column::Id.eq(allocation.split_id))
            .filter(expense_split::Column::Settled.eq(false))
            .filter(expense_split::Column::SettledAmount.eq(allocation.previous_settled))
            .exec(db)
            .await?;

        if result.rows_affected != 1 {
            return Err(Error::SettlementConflict {
                split_id: allocation.split_id,
            });
        }

        debug!(
            split_id = allocation.split_id,
            applied = allocation.applied,
            closes = allocation.closes,
            "Applied settlement to split"
        );
    }

    Ok(())
}

/// Records that `payer_id` paid `amount` to `payee_id` within a group.
///
/// Amounts under half a cent are rejected with [`Error::InvalidAmount`]. The stored
/// settlement carries the amount actually applied to splits, rounded to cents. Fails with [`Error::NothingToSettle`] when the payer owes the payee nothing there,
/// and with [`Error::Overpayment`] when `amount` exceeds what is owed. Any failure
/// leaves every split untouched.
#[instrument(skip(db))]
pub async fn settle(
    db: &DatabaseConnection,
    group_id: i64,
    payer_id: i64,
    payee_id: i64,
    amount: f64,
) -> Result<settlement::Model> {
    let amount = validate_amount(amount)?;
    if amount < CENT_TOLERANCE {
        return Err(Error::InvalidAmount { amount });
    }
    if payer_id == payee_id {
        return Err(Error::Validation {
            message: "A member cannot settle a debt with themselves".to_string(),
        });
    }

    let txn = db.begin().await?;

    group::require_group(&txn, group_id).await?;

    let open = outstanding_splits(&txn, group_id, payer_id, payee_id).await?;
    let outstanding: f64 = open.iter().map(expense_split::Model::outstanding).sum();

    if outstanding < CENT_TOLERANCE {
        return Err(Error::NothingToSettle {
            debtor: payer_id,
            creditor: payee_id,
        });
    }
    if amount > outstanding + CENT_TOLERANCE {
        return Err(Error::Overpayment {
            amount,
            outstanding: round_cents(outstanding),
        });
    }

    let allocations = allocate(amount, &open);
    if allocations.is_empty() {
        return Err(Error::NothingToSettle {
            debtor: payer_id,
            creditor: payee_id,
        });
    }
    apply_allocations(&txn, &allocations).await?;

    // History records what reached the splits, not what was asked for
    let applied = round_cents(allocations.iter().map(|a| a.applied).sum());

    let record = settlement::ActiveModel {
        group_id: Set(group_id),
        payer_id: Set(payer_id),
        payee_id: Set(payee_id),
        amount: Set(applied),
        settled_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(
        settlement_id = record.id,
        splits_touched = allocations.len(),
        "Recorded settlement"
    );
    Ok(record)
}

/// Retrieves a group's settlements, newest first.
pub async fn get_settlements_for_group(
    db: &DatabaseConnection,
    group_id: i64,
) -> Result<Vec<settlement::Model>> {
    Settlement::find()
        .filter(settlement::Column::GroupId.eq(group_id))
        .order_by_desc(settlement::Column::SettledAt)
        .order_by_desc(settlement::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
