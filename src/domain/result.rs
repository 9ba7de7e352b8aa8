//! Result type alias for couchcopy
//!
//! This module provides a convenient Result type alias that uses CopyError
//! as the error type.

use super::errors::CopyError;

/// Result type alias for couchcopy operations
///
/// # Examples
///
/// ```
/// use couchcopy::domain::result::Result;
/// use couchcopy::domain::errors::CopyError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(CopyError::MalformedInput("missing rows".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, CopyError>;
