//! Database access layer for tagdesk-api

pub mod complaints;

pub use complaints::{ComplaintFilter, ComplaintStats};
pub use tagdesk_common::db::{init_database, init_memory_database};
