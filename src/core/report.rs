//! Report generation business logic.
//!
//! This module builds the per-user dashboard and the per-group detail view. All
//! functions are framework-agnostic and return structured data that the bot layer
//! formats for display.

use crate::{
    core::{
        balance::{self, round_cents},
        group::{self, MemberInfo},
        user,
    },
    entities::{Expense, ExpenseSplit, expense, expense_group, expense_split, user as user_entity},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, prelude::*};
use std::collections::HashMap;

/// An expense with the names needed to show it outside its group.
#[derive(Debug, Clone)]
pub struct ExpenseSummary {
    /// The expense itself
    pub expense: expense::Model,
    /// Name of the member who paid
    pub payer_name: String,
    /// Name of the group it belongs to
    pub group_name: String,
}

/// Everything shown to a user when they open their dashboard.
#[derive(Debug, Clone)]
pub struct Dashboard {
    /// The user the dashboard belongs to
    pub user: user_entity::Model,
    /// Groups the user belongs to
    pub groups: Vec<expense_group::Model>,
    /// Most recent expenses across those groups, newest first
    pub recent_expenses: Vec<ExpenseSummary>,
    /// What the user still owes to others, across all groups
    pub total_owed: f64,
}

/// A split with its owner's name.
#[derive(Debug, Clone)]
pub struct SplitDetail {
    /// The split itself
    pub split: expense_split::Model,
    /// Name of the member who owes it
    pub user_name: String,
}

/// An expense with its payer's name and all of its splits.
#[derive(Debug, Clone)]
pub struct ExpenseDetail {
    /// The expense itself
    pub expense: expense::Model,
    /// Name of the member who paid
    pub payer_name: String,
    /// Splits of the expense
    pub splits: Vec<SplitDetail>,
}

/// Full view of one group.
#[derive(Debug, Clone)]
pub struct GroupDetails {
    /// The group
    pub group: expense_group::Model,
    /// Members ordered by name
    pub members: Vec<MemberInfo>,
    /// Expenses, newest first
    pub expenses: Vec<ExpenseDetail>,
}

fn name_or_placeholder(names: &HashMap<i64, String>, user_id: i64) -> String {
    names
        .get(&user_id)
        .cloned()
        .unwrap_or_else(|| format!("User {user_id}"))
}

/// Builds a user's dashboard.
///
/// # Arguments
/// * `db` - Database connection
/// * `user_id` - The user to report on
/// * `recent_limit` - Maximum number of recent expenses to include
pub async fn dashboard(
    db: &DatabaseConnection,
    user_id: i64,
    recent_limit: u64,
) -> Result<Dashboard> {
    let user = user::get_user_by_id(db, user_id)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            identifier: user_id.to_string(),
        })?;

    let groups = group::get_groups_for_user(db, user_id).await?;
    let group_names: HashMap<i64, String> =
        groups.iter().map(|g| (g.id, g.name.clone())).collect();

    let recent = if groups.is_empty() {
        Vec::new()
    } else {
        Expense::find()
            .filter(expense::Column::GroupId.is_in(groups.iter().map(|g| g.id)))
            .order_by_desc(expense::Column::ExpenseDate)
            .order_by_desc(expense::Column::ExpenseTime)
            .order_by_desc(expense::Column::Id)
            .limit(recent_limit)
            .all(db)
            .await?
    };

    let payer_names = user::get_user_names(db, recent.iter().map(|e| e.paid_by)).await?;
    let recent_expenses = recent
        .into_iter()
        .map(|expense| ExpenseSummary {
            payer_name: name_or_placeholder(&payer_names, expense.paid_by),
            group_name: group_names
                .get(&expense.group_id)
                .cloned()
                .unwrap_or_default(),
            expense,
        })
        .collect();

    let total_owed = balance::total_owed_by_user(db, user_id).await?;

    Ok(Dashboard {
        user,
        groups,
        recent_expenses,
        total_owed,
    })
}

/// Builds the detail view of a group: members, and every expense with its splits.
pub async fn group_details(db: &DatabaseConnection, group_id: i64) -> Result<GroupDetails> {
    let group = group::require_group(db, group_id).await?;
    let members = group::get_group_members(db, group_id).await?;
    let expenses = crate::core::expense::get_expenses_for_group(db, group_id).await?;

    let splits = if expenses.is_empty() {
        Vec::new()
    } else {
        ExpenseSplit::find()
            .filter(expense_split::Column::ExpenseId.is_in(expenses.iter().map(|e| e.id)))
            .order_by_asc(expense_split::Column::Id)
            .all(db)
            .await?
    };

    let names = user::get_user_names(
        db,
        expenses
            .iter()
            .map(|e| e.paid_by)
            .chain(splits.iter().map(|s| s.user_id)),
    )
    .await?;

    let mut splits_by_expense: HashMap<i64, Vec<SplitDetail>> = HashMap::new();
    for split in splits {
        splits_by_expense
            .entry(split.expense_id)
            .or_default()
            .push(SplitDetail {
                user_name: name_or_placeholder(&names, split.user_id),
                split,
            });
    }

    let expenses = expenses
        .into_iter()
        .map(|expense| ExpenseDetail {
            payer_name: name_or_placeholder(&names, expense.paid_by),
            splits: splits_by_expense.remove(&expense.id).unwrap_or_default(),
            expense,
        })
        .collect();

    Ok(GroupDetails {
        group,
        members,
        expenses,
    })
}

/// Formats an amount as currency, e.g. `"$12.50"`.
#[must_use]
pub fn format_currency(amount: f64) -> String {
    let rounded = round_cents(amount);
    if rounded < 0.0 {
        format!("-${:.2}", rounded.abs())
    } else {
        format!("${rounded:.2}")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::settlement::settle;
    use crate::test_utils::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(12.5), "$12.50");
        assert_eq!(format_currency(33.333), "$33.33");
        assert_eq!(format_currency(-4.0), "-$4.00");
        assert_eq!(format_currency(0.0), "$0.00");
    }

    #[tokio::test]
    async fn test_dashboard_for_new_user() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = create_test_user(&db, "Alice").await?;

        let board = dashboard(&db, alice.id, 5).await?;
        assert_eq!(board.user.id, alice.id);
        assert!(board.groups.is_empty());
        assert!(board.recent_expenses.is_empty());
        assert_eq!(board.total_owed, 0.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_dashboard_unknown_user() -> Result<()> {
        let db = setup_test_db().await?;

        let result = dashboard(&db, 77, 5).await;
        assert!(matches!(result, Err(Error::UserNotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_dashboard_recent_expenses_and_total_owed() -> Result<()> {
        let (db, group, alice) = setup_with_group().await?;
        let bob = create_member(&db, group.id, "Bob").await?;

        for amount in [10.0, 20.0, 30.0] {
            create_test_expense(&db, group.id, alice.id, amount, &[(bob.id, 100.0)]).await?;
        }
        settle(&db, group.id, bob.id, alice.id, 5.0).await?;

        let board = dashboard(&db, bob.id, 2).await?;
        assert_eq!(board.groups.len(), 1);
        assert_eq!(board.recent_expenses.len(), 2);
        assert_eq!(board.recent_expenses[0].expense.amount, 30.0);
        assert_eq!(board.recent_expenses[0].payer_name, "Alice");
        assert_eq!(board.recent_expenses[0].group_name, group.name);
        assert_eq!(board.total_owed, 55.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_group_details() -> Result<()> {
        let (db, group, alice) = setup_with_group().await?;
        let bob = create_member(&db, group.id, "Bob").await?;

        let older =
            create_test_expense(&db, group.id, alice.id, 40.0, &[(alice.id, 50.0), (bob.id, 50.0)])
                .await?;
        let newer = create_test_expense(&db, group.id, bob.id, 9.0, &[(alice.id, 100.0)]).await?;

        let details = group_details(&db, group.id).await?;
        assert_eq!(details.group.id, group.id);
        assert_eq!(details.members.len(), 2);
        assert_eq!(details.expenses.len(), 2);

        assert_eq!(details.expenses[0].expense.id, newer.id);
        assert_eq!(details.expenses[0].payer_name, "Bob");
        assert_eq!(details.expenses[0].splits.len(), 1);
        assert_eq!(details.expenses[0].splits[0].user_name, "Alice");

        assert_eq!(details.expenses[1].expense.id, older.id);
        assert_eq!(details.expenses[1].splits.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_group_details_unknown_group() -> Result<()> {
        let db = setup_test_db().await?;

        let result = group_details(&db, 5).await;
        assert!(matches!(result, Err(Error::GroupNotFound { group_id: 5 })));

        Ok(())
    }
}
