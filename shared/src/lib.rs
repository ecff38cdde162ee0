//! Shared types for comanda
//!
//! Domain models, the unified error system, PDV cart math and the
//! realtime change-feed payload, used by the cloud service and its tests.

pub mod error;
pub mod models;
pub mod pdv;
pub mod realtime;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use realtime::{ChangeAction, ChangeEvent, RealtimeMessage};
