//! Authentication and authorization for the dashboard API

pub mod password;
pub mod permission;
pub mod rate_limit;
pub mod tenant_auth;

pub use permission::{require_owner, require_permission};
pub use tenant_auth::{AccountRole, AuthIdentity};
