use crate::error::AppError;

/// Validate a trimmed title (1-70 Unicode characters).
pub fn validate_title(title: &str) -> Result<(), AppError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 70 {
        return Err(AppError::Validation("Title must be 1-70 characters".into()));
    }
    Ok(())
}

/// Validate a description (at most 180 Unicode characters, may be empty).
pub fn validate_description(description: &str) -> Result<(), AppError> {
    if description.chars().count() > 180 {
        return Err(AppError::Validation(
            "Description must be at most 180 characters".into(),
        ));
    }
    Ok(())
}

/// Validate an enquiry message (1-255 Unicode characters).
pub fn validate_message(message: &str) -> Result<(), AppError> {
    let message = message.trim();
    if message.is_empty() || message.chars().count() > 255 {
        return Err(AppError::Validation(
            "Message must be 1-255 characters".into(),
        ));
    }
    Ok(())
}
