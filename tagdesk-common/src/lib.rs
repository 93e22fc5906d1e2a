//! # TagDesk Common Library
//!
//! Shared code for the TagDesk complaint service:
//! - Complaint domain model (categories, sentiments, lifecycle status)
//! - Database initialization and schema
//! - Configuration loading and resolution
//! - Common error type

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
