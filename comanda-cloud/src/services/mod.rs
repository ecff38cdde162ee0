//! Multi-step workflows shared by handlers and background workers
//!
//! - [`orders`]: PDV finalize, status changes, mesa close, marketplace import
//! - [`notify`]: WhatsApp sends recorded in the message log
//! - [`billing`]: plan limits, subscribe/cancel, provider webhooks

pub mod billing;
pub mod notify;
pub mod orders;
