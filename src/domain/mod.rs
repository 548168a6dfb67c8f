//! Domain error handling for ThaiDeid.
//!
//! # Error Handling
//!
//! All fallible library operations return [`Result<T, DeidError>`]:
//!
//! ```rust
//! use thaideid::domain::{DeidError, Result};
//!
//! fn require_text(text: &str) -> Result<&str> {
//!     if text.trim().is_empty() {
//!         return Err(DeidError::InvalidInput("Text is required".to_string()));
//!     }
//!     Ok(text)
//! }
//! ```

pub mod errors;
pub mod result;

pub use errors::{DeidError, ValidatorError};
pub use result::Result;
