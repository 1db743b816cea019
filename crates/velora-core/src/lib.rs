//! Core library for the Velora clinic back office.
//!
//! Houses the article data model, the SQLite persistence layer, image
//! compression, asset-host URL handling, and the image lifecycle
//! orchestration shared by every interface.

pub mod compress;
pub mod db;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod publicid;
pub mod services;

pub use error::{Error, Result};
