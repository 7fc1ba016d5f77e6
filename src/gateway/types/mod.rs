//! Gateway types module
//!
//! - [`ApiResponse<T>`]: Unified API response wrapper
//! - [`error_codes`]: Numeric codes carried in the envelope
//! - [`ApiResult<T>`]: Handler return type

pub mod response;

pub use response::{ApiResponse, ApiResult, created, error_codes, ok};
