//! Pre-flight validation for outgoing messages

use thiserror::Error;

/// Hard cap on message body length, counted in characters after
/// trimming. Matches the limit the backend enforces.
pub const MESSAGE_MAX_LENGTH: usize = 500;

/// A draft rejected before any network call was made.
///
/// The checks run in a fixed order — membership, emptiness, length —
/// and the first failure wins, so the user always sees the most
/// fundamental problem first.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    #[error("Join the thread to send messages.")]
    NotMember,
    #[error("Message content cannot be empty.")]
    Empty,
    #[error("Message content must be {max} characters or fewer.")]
    TooLong { max: usize },
}

/// Validate a draft, returning the trimmed body ready for submission.
pub fn validate_draft(
    content: &str,
    is_member: bool,
    max_length: usize,
) -> Result<String, SendError> {
    if !is_member {
        return Err(SendError::NotMember);
    }

    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(SendError::Empty);
    }

    if trimmed.chars().count() > max_length {
        return Err(SendError::TooLong { max: max_length });
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_valid_draft_is_trimmed() {
        let body = validate_draft("  hello there \n", true, MESSAGE_MAX_LENGTH);
        assert_eq!(body, Ok("hello there".to_string()));
    }

    #[test]
    fn test_membership_checked_first() {
        // Even an empty draft reports the membership problem first.
        assert_eq!(
            validate_draft("   ", false, MESSAGE_MAX_LENGTH),
            Err(SendError::NotMember)
        );
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\n\t")]
    fn test_whitespace_only_drafts_are_empty(#[case] content: &str) {
        assert_eq!(
            validate_draft(content, true, MESSAGE_MAX_LENGTH),
            Err(SendError::Empty)
        );
    }

    #[test]
    fn test_length_limit_counts_characters_after_trimming() {
        let exactly_max = "x".repeat(MESSAGE_MAX_LENGTH);
        let padded = format!("  {exactly_max}  ");
        assert!(validate_draft(&padded, true, MESSAGE_MAX_LENGTH).is_ok());

        let too_long = "x".repeat(MESSAGE_MAX_LENGTH + 1);
        assert_eq!(
            validate_draft(&too_long, true, MESSAGE_MAX_LENGTH),
            Err(SendError::TooLong {
                max: MESSAGE_MAX_LENGTH
            })
        );
    }

    #[test]
    fn test_length_limit_is_per_character_not_per_byte() {
        // 500 multibyte characters are within the limit.
        let multibyte = "ä".repeat(MESSAGE_MAX_LENGTH);
        assert!(validate_draft(&multibyte, true, MESSAGE_MAX_LENGTH).is_ok());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            SendError::TooLong { max: 500 }.to_string(),
            "Message content must be 500 characters or fewer."
        );
        assert_eq!(
            SendError::Empty.to_string(),
            "Message content cannot be empty."
        );
    }
}
