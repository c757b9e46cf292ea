use thiserror::Error;

/// Failures surfaced to callers of the mood, recommendation and check-in
/// operations. Degradation paths (media, speech, persistence reads) never
/// produce one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WellnessError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("unknown goal id: {0}")]
    UnknownGoal(String),

    #[error("activity catalog is empty")]
    CatalogEmpty,

    #[error("failed to persist mood entry: {0}")]
    Persistence(String),
}

impl WellnessError {
    pub fn validation(message: impl Into<String>) -> Self {
        WellnessError::Validation(message.into())
    }
}

/// Rejects blank free-text input (support messages, manual notes submitted on their own).
pub fn require_text(text: &str, field: &str) -> Result<String, WellnessError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(WellnessError::validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_rejected() {
        assert!(matches!(
            require_text("   \n", "message"),
            Err(WellnessError::Validation(_))
        ));
    }

    #[test]
    fn text_is_trimmed() {
        assert_eq!(require_text("  hi there ", "message").unwrap(), "hi there");
    }
}
