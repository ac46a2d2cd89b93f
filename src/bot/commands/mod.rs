//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Account registration commands
pub mod account;

/// Balance and settlement commands
pub mod balance;

/// Expense recording commands
pub mod expense;

/// General utility commands
pub mod general;

/// Group management commands
pub mod group;

/// Dashboard commands
pub mod report;

// Export commands
pub use account::*;
pub use balance::*;
pub use expense::*;
pub use general::*;
pub use group::*;
pub use report::*;
