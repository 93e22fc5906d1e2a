//! HTTP API handlers for tagdesk-api

pub mod complaints;
pub mod docs;
pub mod health;
pub mod root;

pub use complaints::complaint_routes;
pub use docs::{docs_routes, ApiDoc};
pub use health::health_routes;
pub use root::root_routes;
