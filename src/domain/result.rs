//! Result type alias for courtsync

use super::errors::SyncError;

/// Result type alias for courtsync operations
///
/// # Examples
///
/// ```
/// use courtsync::domain::result::Result;
/// use courtsync::domain::errors::SyncError;
///
/// fn failing_function() -> Result<()> {
///     Err(SyncError::Validation("missing games array".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i64> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}
