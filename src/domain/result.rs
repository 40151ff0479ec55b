//! Result type alias for the provider

use super::errors::ProviderError;

/// Result type alias for provider operations
///
/// # Examples
///
/// ```
/// use mongodbatlas::domain::result::Result;
/// use mongodbatlas::domain::errors::ProviderError;
///
/// fn failing_function() -> Result<()> {
///     Err(ProviderError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, ProviderError>;
