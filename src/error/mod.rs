//! The unified error handling system for the gateway.

// 1. Core Types
pub use auth::AuthError;
pub use types::{GatewayError, describe_error_chain};

/// A unified `Result` type for the entire gateway.
pub type Result<T> = std::result::Result<T, GatewayError>;

// 2. Module declarations
pub mod auth;
pub mod macros;
pub mod types;
