use common::tag_mark::{MAX_TAG_LENGTH, MAX_TAGS_PER_QUESTION, is_valid_tag, split_tagnames};

use crate::error::AppError;

pub const MAX_TITLE_LENGTH: usize = 300;
pub const MAX_BODY_LENGTH: usize = 100_000;
pub const MAX_COMMENT_LENGTH: usize = 600;

/// Validate a trimmed question title (1-300 Unicode characters).
pub fn validate_title(title: &str) -> Result<(), AppError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > MAX_TITLE_LENGTH {
        return Err(AppError::Validation(format!(
            "Title must be 1-{MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate a question or answer body.
pub fn validate_body(body: &str) -> Result<(), AppError> {
    if body.trim().is_empty() || body.chars().count() > MAX_BODY_LENGTH {
        return Err(AppError::Validation(format!(
            "Body must be non-empty and at most {MAX_BODY_LENGTH} characters"
        )));
    }
    Ok(())
}

pub fn validate_comment(body: &str) -> Result<(), AppError> {
    let len = body.trim().chars().count();
    if len == 0 || len > MAX_COMMENT_LENGTH {
        return Err(AppError::Validation(format!(
            "Comment must be 1-{MAX_COMMENT_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Split and validate a space separated tag list.
pub fn parse_tags(raw: &str) -> Result<Vec<String>, AppError> {
    let names = split_tagnames(raw);
    if names.is_empty() {
        return Err(AppError::Validation("At least one tag is required".into()));
    }
    if names.len() > MAX_TAGS_PER_QUESTION {
        return Err(AppError::Validation(format!(
            "At most {MAX_TAGS_PER_QUESTION} tags are allowed"
        )));
    }
    if let Some(bad) = names.iter().find(|n| !is_valid_tag(n)) {
        return Err(AppError::Validation(format!(
            "Invalid tag '{bad}': use up to {MAX_TAG_LENGTH} letters, digits or +#.-_"
        )));
    }
    Ok(names)
}
