//! Field validation for books, reviews and registrations.
//!
//! Each check collects one message per failing field and reports them all
//! together as a single [`CatalogueError::Validation`].

use crate::error::{CatalogueError, Result};

/// Earliest accepted publication year.
pub const MIN_PUBLICATION_YEAR: i32 = 1000;
/// Maximum description length in characters.
pub const MAX_DESCRIPTION_LEN: usize = 1000;
/// Maximum review comment length in characters.
pub const MAX_COMMENT_LEN: usize = 500;
/// Accepted rating range.
pub const RATING_RANGE: std::ops::RangeInclusive<i16> = 1..=5;
/// Accepted username length.
pub const USERNAME_LEN: std::ops::RangeInclusive<usize> = 3..=30;
/// Minimum password length.
pub const MIN_PASSWORD_LEN: usize = 6;

fn finish(errors: Vec<String>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(CatalogueError::Validation(errors))
    }
}

/// Trim a required text field.
#[must_use]
pub fn trim(value: &str) -> String {
    value.trim().to_string()
}

/// Trim an optional text field, collapsing blank values to `None`.
#[must_use]
pub fn trim_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

/// Validate book fields (already trimmed).
///
/// # Errors
///
/// Returns [`CatalogueError::Validation`] listing every failing field.
pub fn book(
    title: &str,
    author: &str,
    publication_year: Option<i32>,
    description: Option<&str>,
    current_year: i32,
) -> Result<()> {
    let mut errors = Vec::new();

    if title.is_empty() {
        errors.push("Please add a book title".to_string());
    }
    if author.is_empty() {
        errors.push("Please add an author".to_string());
    }
    if let Some(year) = publication_year {
        if !(MIN_PUBLICATION_YEAR..=current_year).contains(&year) {
            errors.push(format!(
                "Publication year must be between {MIN_PUBLICATION_YEAR} and {current_year}"
            ));
        }
    }
    if description.is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LEN) {
        errors.push(format!(
            "Description cannot be more than {MAX_DESCRIPTION_LEN} characters"
        ));
    }

    finish(errors)
}

/// Validate review fields (comment already trimmed).
///
/// # Errors
///
/// Returns [`CatalogueError::Validation`] listing every failing field.
pub fn review(rating: Option<i16>, comment: Option<&str>) -> Result<()> {
    let mut errors = Vec::new();

    match rating {
        None => errors.push("Please add a rating (1-5)".to_string()),
        Some(r) if !RATING_RANGE.contains(&r) => {
            errors.push("Rating must be between 1 and 5".to_string());
        }
        Some(_) => {}
    }
    if comment.is_some_and(|c| c.chars().count() > MAX_COMMENT_LEN) {
        errors.push(format!(
            "Comment cannot be more than {MAX_COMMENT_LEN} characters"
        ));
    }

    finish(errors)
}

/// Validate email address format.
///
/// Basic shape check: exactly one `@`, non-empty local part, a dot in the
/// domain, no whitespace, 3 to 255 characters.
///
/// # Examples
///
/// ```
/// use book_review_core::validation::is_valid_email;
///
/// assert!(is_valid_email("reader@example.com"));
/// assert!(!is_valid_email("reader@localhost"));
/// assert!(!is_valid_email("no-at-sign"));
/// ```
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 3 || email.len() > 255 || email.chars().any(char::is_whitespace) {
        return false;
    }

    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Validate registration fields.
///
/// # Errors
///
/// Returns [`CatalogueError::Validation`] listing every failing field.
pub fn registration(username: &str, email: &str, password: &str) -> Result<()> {
    let mut errors = Vec::new();

    let username_len = username.chars().count();
    if username.is_empty() {
        errors.push("Please add a username".to_string());
    } else if !USERNAME_LEN.contains(&username_len) {
        errors.push(format!(
            "Username must be between {} and {} characters",
            USERNAME_LEN.start(),
            USERNAME_LEN.end()
        ));
    } else if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        errors.push("Username may only contain letters, digits, '_', '-' and '.'".to_string());
    }

    if email.is_empty() {
        errors.push("Please add an email".to_string());
    } else if !is_valid_email(email) {
        errors.push("Please add a valid email".to_string());
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        ));
    }

    finish(errors)
}

#[cfg(test)]
#[allow(clippy::panic)] // Tests are allowed to panic on failures
mod tests {
    use super::*;

    fn messages(result: Result<()>) -> Vec<String> {
        match result {
            Err(CatalogueError::Validation(messages)) => messages,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn book_requires_title_and_author() {
        let errors = messages(book("", "", None, None, 2025));
        assert_eq!(errors, vec!["Please add a book title", "Please add an author"]);
    }

    #[test]
    fn book_rejects_future_publication_year() {
        let errors = messages(book("Dune", "Herbert", Some(2031), None, 2025));
        assert_eq!(errors, vec!["Publication year must be between 1000 and 2025"]);
        assert!(book("Dune", "Herbert", Some(2025), None, 2025).is_ok());
        assert!(book("Beowulf", "Unknown", Some(999), None, 2025).is_err());
    }

    #[test]
    fn book_rejects_long_description() {
        let long = "x".repeat(MAX_DESCRIPTION_LEN + 1);
        assert!(book("Dune", "Herbert", None, Some(&long), 2025).is_err());
        let exact = "x".repeat(MAX_DESCRIPTION_LEN);
        assert!(book("Dune", "Herbert", None, Some(&exact), 2025).is_ok());
    }

    #[test]
    fn review_requires_rating_in_range() {
        assert_eq!(messages(review(None, None)), vec!["Please add a rating (1-5)"]);
        assert_eq!(messages(review(Some(6), None)), vec!["Rating must be between 1 and 5"]);
        assert_eq!(messages(review(Some(0), None)), vec!["Rating must be between 1 and 5"]);
        assert!(review(Some(1), None).is_ok());
        assert!(review(Some(5), Some("Loved it")).is_ok());
    }

    #[test]
    fn review_comment_limit_counts_characters() {
        let at_limit = "é".repeat(MAX_COMMENT_LEN);
        assert!(review(Some(3), Some(&at_limit)).is_ok());
        let over = "é".repeat(MAX_COMMENT_LEN + 1);
        assert!(review(Some(3), Some(&over)).is_err());
    }

    #[test]
    fn trim_optional_collapses_blank_values() {
        assert_eq!(trim_optional(Some("  ")), None);
        assert_eq!(trim_optional(Some(" Fantasy ")), Some("Fantasy".to_string()));
        assert_eq!(trim_optional(None), None);
    }

    #[test]
    fn registration_collects_every_failure() {
        let errors = messages(registration("ab", "nope", "123"));
        assert_eq!(errors.len(), 3);
        assert!(registration("reader_1", "reader@example.com", "secret").is_ok());
    }
}
