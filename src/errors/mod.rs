//! Centralized error handling for the profile proxy
//!
//! Two layers of errors exist:
//!
//! - **Upstream Errors**: what can go wrong talking to Instagram, reduced to
//!   a small set of kinds at the collaborator boundary
//! - **Application Errors**: what handlers see, each variant mapping to one
//!   HTTP status in `web::responses`
//!
//! # Usage
//!
//! ```rust
//! use ig_profile_proxy::errors::{AppError, AppResult, UpstreamError};
//!
//! fn lookup() -> AppResult<String> {
//!     Err(UpstreamError::ProfileNotFound { username: "ghost".into() }.into())
//! }
//!
//! assert!(matches!(lookup(), Err(AppError::NotFound { .. })));
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for upstream Results
pub type UpstreamResult<T> = Result<T, UpstreamError>;
