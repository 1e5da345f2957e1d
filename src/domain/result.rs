//! Result type alias for seqferry

use super::errors::SeqferryError;

/// Result type alias for seqferry operations
///
/// # Examples
///
/// ```
/// use seqferry::domain::result::Result;
/// use seqferry::domain::errors::SeqferryError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(SeqferryError::Archive("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, SeqferryError>;
