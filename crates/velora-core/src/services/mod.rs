//! Service wrappers shared across interfaces

mod database;

pub use database::DatabaseService;
