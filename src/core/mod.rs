//! Framework-agnostic ledger logic.
//!
//! Nothing in here knows about Discord. Every function takes a database connection
//! and plain values, and returns entity models or small report structs.

pub mod balance;
pub mod expense;
pub mod group;
pub mod report;
pub mod settlement;
pub mod user;
