//! Data models
//!
//! Shared between comanda-cloud and the dashboard (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`,
//! enums map to PostgreSQL enum types through `sqlx::Type`.
//! All IDs are `i64` snowflakes, timestamps are Unix millis.

pub mod area;
pub mod category;
pub mod employee;
pub mod ifood;
pub mod menu;
pub mod mesa;
pub mod order;
pub mod permission;
pub mod product;
pub mod restaurant;
pub mod subscription;
pub mod whatsapp;

// Re-exports
pub use area::*;
pub use category::*;
pub use employee::*;
pub use ifood::*;
pub use menu::*;
pub use mesa::*;
pub use order::*;
pub use permission::*;
pub use product::*;
pub use restaurant::*;
pub use subscription::*;
pub use whatsapp::*;
