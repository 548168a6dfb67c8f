//! Result type alias for ThaiDeid

use super::errors::DeidError;

/// Result type alias for ThaiDeid operations
///
/// # Examples
///
/// ```
/// use thaideid::domain::result::Result;
/// use thaideid::domain::errors::DeidError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(DeidError::InvalidInput("Text is required".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, DeidError>;
