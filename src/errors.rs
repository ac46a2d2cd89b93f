//! Unified error types for `SplitBuddy`.
//!
//! Every ledger operation returns [`Result`]. Callers that need a structured payload
//! (a machine-readable kind plus a human-readable cause) convert the error with
//! [`Failure::from`].

use serde::Serialize;
use thiserror::Error;

/// All errors produced by the ledger, its configuration, and the bot layer.
#[derive(Debug, Error)]
pub enum Error {
    /// Storage failure (connection, query, or transaction)
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Input rejected before touching storage
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// Amount is zero, negative, or not a finite number
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// No user matches the given email, id, or Discord account
    #[error("User not found: {identifier}")]
    UserNotFound {
        /// The identifier that was looked up
        identifier: String,
    },

    /// No group with this id
    #[error("Group not found: {group_id}")]
    GroupNotFound {
        /// The missing group id
        group_id: i64,
    },

    /// No expense with this id
    #[error("Expense not found: {expense_id}")]
    ExpenseNotFound {
        /// The missing expense id
        expense_id: i64,
    },

    /// The user exists but does not belong to the group
    #[error("User {user_id} is not a member of group {group_id}")]
    NotMember {
        /// The user id
        user_id: i64,
        /// The group id
        group_id: i64,
    },

    /// Registration with an email that is already in use
    #[error("Email already registered: {email}")]
    EmailTaken {
        /// The duplicate email
        email: String,
    },

    /// Unknown email or wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The pair has no unsettled splits left
    #[error("Nothing left to settle: user {debtor} owes user {creditor} nothing")]
    NothingToSettle {
        /// The paying user
        debtor: i64,
        /// The receiving user
        creditor: i64,
    },

    /// Settlement exceeds the pair's outstanding total
    #[error("Settlement of {amount:.2} exceeds the outstanding {outstanding:.2}")]
    Overpayment {
        /// Requested settlement amount
        amount: f64,
        /// What is actually owed
        outstanding: f64,
    },

    /// Another settlement changed a split while this one was being applied
    #[error("Split {split_id} was modified by a concurrent settlement")]
    SettlementConflict {
        /// The contended split
        split_id: i64,
    },

    /// Password hashing or hash parsing failed
    #[error("Password hashing error: {message}")]
    PasswordHash {
        /// Underlying hasher message
        message: String,
    },

    /// A required environment variable is missing
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serenity/Poise framework error
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

/// Machine-readable failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad input: missing splits, non-numeric or non-positive amounts, bad credentials
    Validation,
    /// Unknown user, group, or expense
    NotFound,
    /// Connection or transaction failure
    Storage,
    /// Duplicate registration or an obligation that cannot be settled as requested
    Conflict,
    /// Configuration, environment, or framework problems
    Internal,
}

impl ErrorKind {
    /// Stable lowercase name used in replies and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Storage => "storage",
            Self::Conflict => "conflict",
            Self::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Classifies this error into the ledger's failure taxonomy.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. }
            | Self::InvalidAmount { .. }
            | Self::InvalidCredentials
            | Self::NotMember { .. } => ErrorKind::Validation,
            Self::UserNotFound { .. }
            | Self::GroupNotFound { .. }
            | Self::ExpenseNotFound { .. } => ErrorKind::NotFound,
            Self::EmailTaken { .. }
            | Self::NothingToSettle { .. }
            | Self::Overpayment { .. }
            | Self::SettlementConflict { .. } => ErrorKind::Conflict,
            Self::Database(_) => ErrorKind::Storage,
            Self::Config { .. }
            | Self::PasswordHash { .. }
            | Self::EnvVar(_)
            | Self::Io(_)
            | Self::Framework(_) => ErrorKind::Internal,
        }
    }
}

/// Structured failure result handed to callers instead of a raw error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    /// Failure category
    pub kind: ErrorKind,
    /// Human-readable cause
    pub cause: String,
}

impl From<&Error> for Failure {
    fn from(error: &Error) -> Self {
        Self {
            kind: error.kind(),
            cause: error.to_string(),
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.cause)
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
