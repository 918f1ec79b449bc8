//! The display-name rule.

/// Fewest whitespace-separated words a user's name may have.
pub const MIN_NAME_WORDS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Name must contain at least {min} words")]
    TooFewWords { min: usize },
}

pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.split_whitespace().count() < MIN_NAME_WORDS {
        return Err(ValidationError::TooFewWords { min: MIN_NAME_WORDS });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_words_pass() {
        assert_eq!(validate_name("Ann Marie Lee"), Ok(()));
        assert_eq!(validate_name("  John   Michael\tDoe Jr "), Ok(()));
    }

    #[test]
    fn fewer_than_three_words_fail() {
        for name in ["", "   ", "Ann", "Ann Lee", " Ann   Lee "] {
            assert_eq!(
                validate_name(name),
                Err(ValidationError::TooFewWords { min: 3 }),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn message_names_the_rule() {
        let err = validate_name("Ann Lee").unwrap_err();
        assert_eq!(err.to_string(), "Name must contain at least 3 words");
    }
}
