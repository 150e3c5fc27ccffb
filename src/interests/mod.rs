//! The viewer's declared interests, matched against post tags by the feed.

pub mod handlers;

use std::collections::HashSet;

use crate::error::AppError;

pub const MAX_INTERESTS: usize = 50;
pub const MAX_LABEL_LENGTH: usize = 64;

/// Cleans a submitted interest list for storage.
///
/// Labels are trimmed and blanks dropped. Case-insensitive duplicates
/// collapse onto the first spelling, which is kept as typed.
pub fn sanitize_interests(labels: &[String]) -> Result<Vec<String>, AppError> {
    let mut seen = HashSet::new();
    let mut cleaned = Vec::new();

    for label in labels {
        let label = label.trim();
        if label.is_empty() {
            continue;
        }
        if label.chars().count() > MAX_LABEL_LENGTH {
            return Err(AppError::ValidationError(format!(
                "Interest labels are limited to {} characters",
                MAX_LABEL_LENGTH
            )));
        }
        if seen.insert(label.to_lowercase()) {
            cleaned.push(label.to_string());
        }
    }

    if cleaned.len() > MAX_INTERESTS {
        return Err(AppError::ValidationError(format!(
            "At most {} interests are allowed",
            MAX_INTERESTS
        )));
    }
    Ok(cleaned)
}
