mod repository;

pub use repository::*;

/// SQL migration for the expenses, budgets and income tables.
/// Every statement is `CREATE TABLE IF NOT EXISTS`, so running it again is a no-op.
pub const MIGRATION_001_INITIAL: &str = include_str!("migrations/001_initial.sql");
