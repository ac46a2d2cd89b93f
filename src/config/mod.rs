/// Database connection and table creation
pub mod database;

/// Ledger and bot settings loaded from config.toml
pub mod settings;
