//! # Vitrine Core
//!
//! Foundational types used throughout the Vitrine service:
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`serde`]: Deserialization helpers for loosely-typed query parameters
//!
//! # Example
//!
//! ```ignore
//! use vitrine_core::AppError;
//!
//! let error = AppError::service_unavailable(anyhow::anyhow!("catalog offline"));
//! ```

pub mod errors;
pub mod serde;

pub use errors::AppError;
