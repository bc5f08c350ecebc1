//! Gateway types module
//!
//! ## Input Types
//! - [`StrictDecimal`]: Format-validated amount for API input
//! - [`ValidatedJson`] / [`ApiQuery`]: Extractors with envelope-shaped rejections
//!
//! ## Output Types
//! - [`ApiResponse<T>`]: Unified API response wrapper
//! - [`ApiError`]: Error response with HTTP status and error code

pub mod extract;
pub mod money;
pub mod response;

// Re-export commonly used types at module root
pub use extract::{ApiQuery, ValidatedJson};
pub use money::StrictDecimal;
pub use response::{ApiError, ApiResponse, ApiResult, created, error_codes, ok};
