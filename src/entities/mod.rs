//! Entity module - Contains all SeaORM entity definitions for the ledger database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod expense;
pub mod expense_group;
pub mod expense_split;
pub mod group_membership;
pub mod settlement;
pub mod user;

// Re-export specific types to avoid conflicts
pub use expense::{Column as ExpenseColumn, Entity as Expense, Model as ExpenseModel};
pub use expense_group::{
    Column as ExpenseGroupColumn, Entity as ExpenseGroup, Model as ExpenseGroupModel,
};
pub use expense_split::{
    Column as ExpenseSplitColumn, Entity as ExpenseSplit, Model as ExpenseSplitModel,
};
pub use group_membership::{
    Column as GroupMembershipColumn, Entity as GroupMembership, Model as GroupMembershipModel,
};
pub use settlement::{Column as SettlementColumn, Entity as Settlement, Model as SettlementModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
