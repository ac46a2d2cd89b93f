//! Group business logic - creating groups and managing their members.
//!
//! Membership is idempotent: adding a user who already belongs to a group leaves the
//! single existing row in place and reports success.

use crate::{
    core::user::{self, Caller},
    entities::{ExpenseGroup, GroupMembership, User, expense_group, group_membership, user as user_entity},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::OnConflict};
use tracing::{debug, info, instrument};

/// A group member with the details needed for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    /// Member's user id
    pub user_id: i64,
    /// Member's display name
    pub name: String,
    /// Member's email
    pub email: String,
    /// Date the member joined
    pub joined_at: Date,
}

/// Creates a group and makes the caller its first member.
#[instrument(skip(db))]
pub async fn create_group(
    db: &DatabaseConnection,
    caller: &Caller,
    name: &str,
    description: Option<String>,
) -> Result<expense_group::Model> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation {
            message: "Group name cannot be empty".to_string(),
        });
    }

    let txn = db.begin().await?;

    user::get_user_by_id(&txn, caller.user_id)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            identifier: caller.user_id.to_string(),
        })?;

    let group = expense_group::ActiveModel {
        name: Set(name.to_string()),
        description: Set(description.filter(|d| !d.trim().is_empty())),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    add_member_by_id(&txn, group.id, caller.user_id).await?;

    txn.commit().await?;

    info!(group_id = group.id, "Created group");
    Ok(group)
}

/// Finds a group by id.
pub async fn get_group_by_id<C>(db: &C, group_id: i64) -> Result<Option<expense_group::Model>>
where
    C: ConnectionTrait,
{
    ExpenseGroup::find_by_id(group_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a group by id, failing with [`Error::GroupNotFound`] if it does not exist.
pub async fn require_group<C>(db: &C, group_id: i64) -> Result<expense_group::Model>
where
    C: ConnectionTrait,
{
    get_group_by_id(db, group_id)
        .await?
        .ok_or(Error::GroupNotFound { group_id })
}

/// Adds the user registered under `email` to a group.
///
/// Adding an existing member succeeds without creating a second row. Unknown emails
/// fail with [`Error::UserNotFound`], unknown groups with [`Error::GroupNotFound`].
#[instrument(skip(db))]
pub async fn add_member(
    db: &DatabaseConnection,
    group_id: i64,
    email: &str,
) -> Result<group_membership::Model> {
    require_group(db, group_id).await?;

    let member = user::get_user_by_email(db, email)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            identifier: email.trim().to_string(),
        })?;

    add_member_by_id(db, group_id, member.id).await
}

/// Inserts a membership row unless one already exists, then returns the stored row.
pub async fn add_member_by_id<C>(
    db: &C,
    group_id: i64,
    user_id: i64,
) -> Result<group_membership::Model>
where
    C: ConnectionTrait,
{
    let membership = group_membership::ActiveModel {
        group_id: Set(group_id),
        user_id: Set(user_id),
        joined_at: Set(chrono::Utc::now().date_naive()),
    };

    let inserted = GroupMembership::insert(membership)
        .on_conflict(
            OnConflict::columns([
                group_membership::Column::GroupId,
                group_membership::Column::UserId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    if inserted == 0 {
        debug!(group_id, user_id, "User already a member, nothing inserted");
    }

    GroupMembership::find_by_id((group_id, user_id))
        .one(db)
        .await?
        .ok_or(Error::NotMember { user_id, group_id })
}

/// Returns whether the user belongs to the group.
pub async fn is_member<C>(db: &C, group_id: i64, user_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    Ok(GroupMembership::find_by_id((group_id, user_id))
        .one(db)
        .await?
        .is_some())
}

/// Fails unless the group exists and the user belongs to it.
///
/// Returns the group so callers can show its name.
pub async fn require_member<C>(
    db: &C,
    group_id: i64,
    user_id: i64,
) -> Result<expense_group::Model>
where
    C: ConnectionTrait,
{
    let group = require_group(db, group_id).await?;
    if is_member(db, group_id, user_id).await? {
        Ok(group)
    } else {
        Err(Error::NotMember { user_id, group_id })
    }
}

/// Lists a group's members ordered by name.
pub async fn get_group_members(db: &DatabaseConnection, group_id: i64) -> Result<Vec<MemberInfo>> {
    let rows = GroupMembership::find()
        .filter(group_membership::Column::GroupId.eq(group_id))
        .find_also_related(User)
        .order_by_asc(user_entity::Column::Name)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(membership, member)| {
            member.map(|m| MemberInfo {
                user_id: m.id,
                name: m.name,
                email: m.email,
                joined_at: membership.joined_at,
            })
        })
        .collect())
}

/// Lists the groups a user belongs to, ordered by name.
pub async fn get_groups_for_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<expense_group::Model>> {
    ExpenseGroup::find()
        .inner_join(GroupMembership)
        .filter(group_membership::Column::UserId.eq(user_id))
        .order_by_asc(expense_group::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase, PaginatorTrait};

    #[tokio::test]
    async fn test_create_group_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_group(&db, &Caller::new(1), "  ", None).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_group_adds_creator() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = create_test_user(&db, "Alice").await?;

        let group = create_group(
            &db,
            &Caller::new(alice.id),
            "Flatmates",
            Some("Rent and bills".to_string()),
        )
        .await?;

        assert_eq!(group.name, "Flatmates");
        assert_eq!(group.description.as_deref(), Some("Rent and bills"));
        assert!(is_member(&db, group.id, alice.id).await?);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_group_unknown_caller() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_group(&db, &Caller::new(999), "Ghosts", None).await;
        assert!(matches!(result, Err(Error::UserNotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_add_member_is_idempotent() -> Result<()> {
        let (db, group, _alice) = setup_with_group().await?;
        let bob = create_test_user(&db, "Bob").await?;

        let first = add_member(&db, group.id, "bob@example.com").await?;
        let second = add_member(&db, group.id, "bob@example.com").await?;
        assert_eq!(first, second);

        let rows = GroupMembership::find()
            .filter(group_membership::Column::GroupId.eq(group.id))
            .filter(group_membership::Column::UserId.eq(bob.id))
            .count(&db)
            .await?;
        assert_eq!(rows, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_add_member_unknown_email() -> Result<()> {
        let (db, group, _alice) = setup_with_group().await?;

        let result = add_member(&db, group.id, "nobody@example.com").await;
        assert!(matches!(result, Err(Error::UserNotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_add_member_unknown_group() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, "Bob").await?;

        let result = add_member(&db, 42, "bob@example.com").await;
        assert!(matches!(result, Err(Error::GroupNotFound { group_id: 42 })));

        Ok(())
    }

    #[tokio::test]
    async fn test_group_members_and_groups_for_user() -> Result<()> {
        let (db, group, alice) = setup_with_group().await?;
        let bob = create_test_user(&db, "Bob").await?;
        add_member(&db, group.id, &bob.email).await?;

        let members = get_group_members(&db, group.id).await?;
        let names: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);

        let other = create_group(&db, &Caller::new(alice.id), "Book club", None).await?;
        let alice_groups = get_groups_for_user(&db, alice.id).await?;
        assert_eq!(alice_groups.len(), 2);
        assert_eq!(alice_groups[0].id, other.id);

        let bob_groups = get_groups_for_user(&db, bob.id).await?;
        assert_eq!(bob_groups.len(), 1);
        assert_eq!(bob_groups[0].id, group.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_require_member() -> Result<()> {
        let (db, group, alice) = setup_with_group().await?;
        let outsider = create_test_user(&db, "Mallory").await?;

        assert_eq!(require_member(&db, group.id, alice.id).await?.id, group.id);

        let result = require_member(&db, group.id, outsider.id).await;
        assert!(matches!(result, Err(Error::NotMember { .. })));

        let missing = require_member(&db, group.id + 100, alice.id).await;
        assert!(matches!(missing, Err(Error::GroupNotFound { .. })));

        Ok(())
    }
}
