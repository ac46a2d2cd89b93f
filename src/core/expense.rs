//! Expense business logic - recording payments and splitting them between members.
//!
//! An expense and all of its splits are written inside one database transaction, so
//! either the whole expense lands or nothing does. Each split owes
//! `amount * percentage / 100`; with percentages totalling 100 the splits add back up
//! to the expense amount.

use crate::{
    core::{
        group,
        user::{self, Caller},
    },
    entities::{Expense, ExpenseSplit, expense, expense_split},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::BTreeMap;
use tracing::{info, instrument, warn};

/// Rules for checking the percentage shares of a new expense.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SharePolicy {
    /// Reject share sets whose percentages do not add up to 100
    pub require_full_total: bool,
    /// Allowed distance from 100 when `require_full_total` is set
    pub tolerance: f64,
}

impl Default for SharePolicy {
    fn default() -> Self {
        Self {
            require_full_total: true,
            tolerance: 0.01,
        }
    }
}

/// Input for [`create_expense`].
#[derive(Debug, Clone)]
pub struct NewExpense {
    /// Group the expense is recorded in
    pub group_id: i64,
    /// Total amount paid
    pub amount: f64,
    /// Optional description
    pub description: Option<String>,
    /// Participant user id mapped to their percentage share
    pub shares: BTreeMap<i64, f64>,
}

/// Checks that an amount is a finite number greater than zero.
pub fn validate_amount(amount: f64) -> Result<f64> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(amount)
}

/// Parses a user-supplied amount such as `"12.50"`.
pub fn parse_amount(input: &str) -> Result<f64> {
    let amount = input
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::Validation {
            message: format!("'{}' is not a number", input.trim()),
        })?;
    validate_amount(amount)
}

/// Parses a share list like `"alice@example.com:60, bob@example.com:40"`.
///
/// Entries are separated by commas; each entry is `participant:percent` (or
/// `participant=percent`). The participant text is returned as written.
pub fn parse_shares(input: &str) -> Result<Vec<(String, f64)>> {
    let mut shares: Vec<(String, f64)> = Vec::new();

    for entry in input.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((who, percent)) = entry.rsplit_once([':', '=']) else {
            return Err(Error::Validation {
                message: format!("'{entry}' should look like participant:percent"),
            });
        };

        let who = who.trim();
        if who.is_empty() {
            return Err(Error::Validation {
                message: format!("'{entry}' is missing a participant"),
            });
        }
        if shares.iter().any(|(existing, _)| existing.eq_ignore_ascii_case(who)) {
            return Err(Error::Validation {
                message: format!("'{who}' is listed more than once"),
            });
        }

        let percent = percent.trim().parse::<f64>().map_err(|_| Error::Validation {
            message: format!("'{}' is not a valid percentage", percent.trim()),
        })?;
        shares.push((who.to_string(), percent));
    }

    if shares.is_empty() {
        return Err(Error::Validation {
            message: "No split members provided".to_string(),
        });
    }

    Ok(shares)
}

/// Turns parsed `(email, percent)` shares into user-id keyed shares.
///
/// Unknown emails fail with [`Error::UserNotFound`]. Two emails that resolve to the
/// same account are rejected as duplicates.
pub async fn resolve_shares(
    db: &DatabaseConnection,
    shares: Vec<(String, f64)>,
) -> Result<BTreeMap<i64, f64>> {
    let mut resolved = BTreeMap::new();

    for (email, percent) in shares {
        let participant = user::get_user_by_email(db, &email)
            .await?
            .ok_or_else(|| Error::UserNotFound {
                identifier: email.clone(),
            })?;
        if resolved.insert(participant.id, percent).is_some() {
            return Err(Error::Validation {
                message: format!("'{email}' is listed more than once"),
            });
        }
    }

    Ok(resolved)
}

fn validate_shares(shares: &BTreeMap<i64, f64>, policy: &SharePolicy) -> Result<()> {
    if shares.is_empty() {
        return Err(Error::Validation {
            message: "No split members provided".to_string(),
        });
    }

    if let Some((user_id, percent)) = shares.iter().find(|(_, p)| !p.is_finite() || **p < 0.0) {
        return Err(Error::Validation {
            message: format!("Share {percent} for user {user_id} is not a valid percentage"),
        });
    }

    let total: f64 = shares.values().sum();
    if (total - 100.0).abs() > policy.tolerance {
        if policy.require_full_total {
            return Err(Error::Validation {
                message: format!("Shares add up to {total}%, expected 100%"),
            });
        }
        warn!(total, "Recording expense whose shares do not add up to 100%");
    }

    Ok(())
}

/// Records an expense paid by `caller` and one split per entry in `shares`.
///
/// The payer and every participant must be members of the group; participants are
/// checked as strictly as the payer, so a split never names an outsider. If the payer
/// lists themselves, their split is stored like any other; balance aggregation ignores it.
#[instrument(skip(db, new_expense), fields(group_id = new_expense.group_id, amount = new_expense.amount))]
pub async fn create_expense(
    db: &DatabaseConnection,
    caller: &Caller,
    new_expense: NewExpense,
    policy: &SharePolicy,
) -> Result<expense::Model> {
    let amount = validate_amount(new_expense.amount)?;
    validate_shares(&new_expense.shares, policy)?;

    // Use a transaction so the expense never exists without its splits
    let txn = db.begin().await?;

    let group_id = group::require_group(&txn, new_expense.group_id).await?.id;

    if !group::is_member(&txn, group_id, caller.user_id).await? {
        return Err(Error::NotMember {
            user_id: caller.user_id,
            group_id,
        });
    }
    for &user_id in new_expense.shares.keys() {
        if !group::is_member(&txn, group_id, user_id).await? {
            return Err(Error::NotMember { user_id, group_id });
        }
    }

    let now = chrono::Utc::now();
    let expense = expense::ActiveModel {
        group_id: Set(group_id),
        paid_by: Set(caller.user_id),
        amount: Set(amount),
        expense_date: Set(now.date_naive()),
        expense_time: Set(now.time()),
        description: Set(new_expense
            .description
            .map(|d| d.trim().to_string())
            .unwrap_or_default()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let splits = new_expense
        .shares
        .iter()
        .map(|(&user_id, &percentage)| expense_split::ActiveModel {
            expense_id: Set(expense.id),
            user_id: Set(user_id),
            share_amount: Set(amount * percentage / 100.0),
            settled_amount: Set(0.0),
            settled: Set(false),
            ..Default::default()
        });
    ExpenseSplit::insert_many(splits).exec(&txn).await?;

    txn.commit().await?;

    info!(
        expense_id = expense.id,
        splits = new_expense.shares.len(),
        "Recorded expense"
    );
    Ok(expense)
}

/// Retrieves an expense by id.
pub async fn get_expense_by_id(
    db: &DatabaseConnection,
    expense_id: i64,
) -> Result<Option<expense::Model>> {
    Expense::find_by_id(expense_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the splits of an expense, failing if the expense does not exist.
pub async fn get_splits_for_expense(
    db: &DatabaseConnection,
    expense_id: i64,
) -> Result<Vec<expense_split::Model>> {
    get_expense_by_id(db, expense_id)
        .await?
        .ok_or(Error::ExpenseNotFound { expense_id })?;

    ExpenseSplit::find()
        .filter(expense_split::Column::ExpenseId.eq(expense_id))
        .order_by_asc(expense_split::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all expenses of a group, newest first.
pub async fn get_expenses_for_group(
    db: &DatabaseConnection,
    group_id: i64,
) -> Result<Vec<expense::Model>> {
    Expense::find()
        .filter(expense::Column::GroupId.eq(group_id))
        .order_by_desc(expense::Column::ExpenseDate)
        .order_by_desc(expense::Column::ExpenseTime)
        .order_by_desc(expense::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase, PaginatorTrait};

    fn shares(entries: &[(i64, f64)]) -> BTreeMap<i64, f64> {
        entries.iter().copied().collect()
    }

    #[tokio::test]
    async fn test_create_expense_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let caller = Caller::new(1);
        let policy = SharePolicy::default();

        for amount in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let result = create_expense(
                &db,
                &caller,
                NewExpense {
                    group_id: 1,
                    amount,
                    description: None,
                    shares: shares(&[(1, 100.0)]),
                },
                &policy,
            )
            .await;
            assert!(matches!(result, Err(Error::InvalidAmount { .. })));
        }

        let empty = create_expense(
            &db,
            &caller,
            NewExpense {
                group_id: 1,
                amount: 10.0,
                description: None,
                shares: BTreeMap::new(),
            },
            &policy,
        )
        .await;
        assert!(matches!(empty, Err(Error::Validation { .. })));

        let short = create_expense(
            &db,
            &caller,
            NewExpense {
                group_id: 1,
                amount: 10.0,
                description: None,
                shares: shares(&[(1, 50.0), (2, 40.0)]),
            },
            &policy,
        )
        .await;
        assert!(matches!(short, Err(Error::Validation { .. })));

        let negative = create_expense(
            &db,
            &caller,
            NewExpense {
                group_id: 1,
                amount: 10.0,
                description: None,
                shares: shares(&[(1, 150.0), (2, -50.0)]),
            },
            &policy,
        )
        .await;
        assert!(matches!(negative, Err(Error::Validation { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_expense_splits_sum_to_amount() -> Result<()> {
        let (db, group, alice) = setup_with_group().await?;
        let bob = create_member(&db, group.id, "Bob").await?;
        let carol = create_member(&db, group.id, "Carol").await?;

        let expense = create_expense(
            &db,
            &Caller::new(alice.id),
            NewExpense {
                group_id: group.id,
                amount: 100.0,
                description: Some("Groceries".to_string()),
                shares: shares(&[(alice.id, 33.34), (bob.id, 33.33), (carol.id, 33.33)]),
            },
            &SharePolicy::default(),
        )
        .await?;

        assert_eq!(expense.amount, 100.0);
        assert_eq!(expense.paid_by, alice.id);
        assert_eq!(expense.description, "Groceries");

        let splits = get_splits_for_expense(&db, expense.id).await?;
        assert_eq!(splits.len(), 3);
        assert!(splits.iter().all(|s| !s.settled && s.settled_amount == 0.0));

        let total: f64 = splits.iter().map(|s| s.share_amount).sum();
        assert!((total - 100.0).abs() < 1e-9);

        Ok(())
    }

    #[tokio::test]
    async fn test_payer_share_is_stored() -> Result<()> {
        let (db, group, alice) = setup_with_group().await?;
        let bob = create_member(&db, group.id, "Bob").await?;

        let expense = create_test_expense(
            &db,
            group.id,
            alice.id,
            100.0,
            &[(alice.id, 50.0), (bob.id, 50.0)],
        )
        .await?;

        let splits = get_splits_for_expense(&db, expense.id).await?;
        let alice_split = splits.iter().find(|s| s.user_id == alice.id).unwrap();
        let bob_split = splits.iter().find(|s| s.user_id == bob.id).unwrap();
        assert_eq!(alice_split.share_amount, 50.0);
        assert_eq!(bob_split.share_amount, 50.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_expense_rejects_non_members() -> Result<()> {
        let (db, group, alice) = setup_with_group().await?;
        let outsider = create_test_user(&db, "Mallory").await?;

        let result = create_test_expense(
            &db,
            group.id,
            alice.id,
            40.0,
            &[(alice.id, 50.0), (outsider.id, 50.0)],
        )
        .await;
        assert!(matches!(
            result,
            Err(Error::NotMember { user_id, .. }) if user_id == outsider.id
        ));

        let paid_by_outsider =
            create_test_expense(&db, group.id, outsider.id, 40.0, &[(alice.id, 100.0)]).await;
        assert!(matches!(paid_by_outsider, Err(Error::NotMember { .. })));

        // Nothing was written by the failed attempts
        assert_eq!(Expense::find().count(&db).await?, 0);
        assert_eq!(ExpenseSplit::find().count(&db).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_expense_unknown_group() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = create_test_user(&db, "Alice").await?;

        let result = create_test_expense(&db, 7, alice.id, 10.0, &[(alice.id, 100.0)]).await;
        assert!(matches!(result, Err(Error::GroupNotFound { group_id: 7 })));

        Ok(())
    }

    #[tokio::test]
    async fn test_lenient_policy_accepts_partial_shares() -> Result<()> {
        let (db, group, alice) = setup_with_group().await?;
        let bob = create_member(&db, group.id, "Bob").await?;

        let lenient = SharePolicy {
            require_full_total: false,
            tolerance: 0.01,
        };
        let expense = create_expense(
            &db,
            &Caller::new(alice.id),
            NewExpense {
                group_id: group.id,
                amount: 80.0,
                description: None,
                shares: shares(&[(bob.id, 50.0)]),
            },
            &lenient,
        )
        .await?;

        let splits = get_splits_for_expense(&db, expense.id).await?;
        assert_eq!(splits.len(), 1);
        assert_eq!(splits[0].share_amount, 40.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_failed_split_insert_rolls_back_expense() -> Result<()> {
        let (db, group, alice) = setup_with_group().await?;
        let bob = create_member(&db, group.id, "Bob").await?;

        // The expense row is inserted first, then the splits fail
        db.execute_unprepared(
            "CREATE TRIGGER reject_split BEFORE INSERT ON expense_splits \
             BEGIN SELECT RAISE(ABORT, 'splits unavailable'); END;",
        )
        .await?;

        let result =
            create_test_expense(&db, group.id, alice.id, 10.0, &[(alice.id, 50.0), (bob.id, 50.0)])
                .await;
        assert!(matches!(result, Err(Error::Database(_))));

        assert_eq!(Expense::find().count(&db).await?, 0);
        assert_eq!(ExpenseSplit::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_get_expenses_for_group_newest_first() -> Result<()> {
        let (db, group, alice) = setup_with_group().await?;

        let first = create_test_expense(&db, group.id, alice.id, 10.0, &[(alice.id, 100.0)]).await?;
        let second =
            create_test_expense(&db, group.id, alice.id, 20.0, &[(alice.id, 100.0)]).await?;

        let expenses = get_expenses_for_group(&db, group.id).await?;
        assert_eq!(expenses.len(), 2);
        assert_eq!(expenses[0].id, second.id);
        assert_eq!(expenses[1].id, first.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_splits_for_missing_expense() -> Result<()> {
        let db = setup_test_db().await?;

        let result = get_splits_for_expense(&db, 404).await;
        assert!(matches!(result, Err(Error::ExpenseNotFound { expense_id: 404 })));

        Ok(())
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(" 12.50 ").unwrap(), 12.5);
        assert!(matches!(parse_amount("twelve"), Err(Error::Validation { .. })));
        assert!(matches!(parse_amount("0"), Err(Error::InvalidAmount { .. })));
        assert!(matches!(parse_amount("-3"), Err(Error::InvalidAmount { .. })));
    }

    #[test]
    fn test_parse_shares() {
        let parsed = parse_shares("alice@example.com:60, bob@example.com=40").unwrap();
        assert_eq!(
            parsed,
            vec![
                ("alice@example.com".to_string(), 60.0),
                ("bob@example.com".to_string(), 40.0)
            ]
        );

        assert!(matches!(parse_shares(""), Err(Error::Validation { .. })));
        assert!(matches!(parse_shares("alice"), Err(Error::Validation { .. })));
        assert!(matches!(parse_shares("alice:half"), Err(Error::Validation { .. })));
        assert!(matches!(parse_shares(":50"), Err(Error::Validation { .. })));
        assert!(matches!(
            parse_shares("alice:50, ALICE:50"),
            Err(Error::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_resolve_shares() -> Result<()> {
        let (db, group, alice) = setup_with_group().await?;
        let bob = create_member(&db, group.id, "Bob").await?;

        let shares = parse_shares("Alice@Example.com:40, bob@example.com:60")?;
        let resolved = resolve_shares(&db, shares).await?;
        assert_eq!(resolved, BTreeMap::from([(alice.id, 40.0), (bob.id, 60.0)]));

        let unknown = resolve_shares(&db, vec![("zed@example.com".to_string(), 100.0)]).await;
        assert!(matches!(unknown, Err(Error::UserNotFound { .. })));

        Ok(())
    }
}
