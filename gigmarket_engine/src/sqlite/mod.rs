//! SQLite database module for the GigMarket engine.

mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
