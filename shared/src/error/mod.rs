//! Error codes and the API error type
//!
//! Codes are grouped by domain in ranges of a thousand (`ErrorCategory`);
//! each maps to one HTTP status.
//!
//! ```
//! use shared::error::{ApiResponse, AppError, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::ProductNotFound).with_detail("product_id", 42);
//! let body = ApiResponse::<()>::error(&err);
//! assert_eq!(body.code, Some(6001));
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
