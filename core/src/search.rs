//! Whole-word, case-insensitive matching of a search term.
//!
//! The term is escaped before it becomes part of a pattern, so user input is
//! always matched literally.

use crate::error::{CatalogueError, Result};
use crate::model::Book;
use regex::{Regex, RegexBuilder};

/// Compiled search term.
#[derive(Debug, Clone)]
pub struct SearchPattern {
    term: String,
    regex: Regex,
}

impl SearchPattern {
    /// Compile a search term.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::Validation`] when the term is blank.
    ///
    /// # Examples
    ///
    /// ```
    /// use book_review_core::SearchPattern;
    ///
    /// let pattern = SearchPattern::new("the").unwrap();
    /// assert!(pattern.is_match("The Hobbit"));
    /// assert!(!pattern.is_match("Amortized"));
    ///
    /// let literal = SearchPattern::new("c++").unwrap();
    /// assert!(!literal.is_match("cpp"));
    /// ```
    pub fn new(term: &str) -> Result<Self> {
        let term = term.trim();
        if term.is_empty() {
            return Err(CatalogueError::invalid("Search term (q) is required"));
        }

        let regex = RegexBuilder::new(&format!(r"\b{}\b", regex::escape(term)))
            .case_insensitive(true)
            .build()
            .map_err(|e| CatalogueError::invalid(format!("Search term is too complex: {e}")))?;

        Ok(Self {
            term: term.to_string(),
            regex,
        })
    }

    /// The trimmed term as typed.
    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Returns `true` if the term occurs as a whole word in `text`.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Returns `true` if the term matches the book's title or author.
    #[must_use]
    pub fn matches_book(&self, book: &Book) -> bool {
        self.is_match(&book.title) || self.is_match(&book.author)
    }

    /// The term escaped for a SQL `LIKE`/`ILIKE` pattern using `\` as escape.
    ///
    /// Stores can use this as a cheap substring pre-filter before applying
    /// [`SearchPattern::matches_book`].
    #[must_use]
    pub fn like_pattern(&self) -> String {
        let mut escaped = String::with_capacity(self.term.len() + 2);
        escaped.push('%');
        for c in self.term.chars() {
            if matches!(c, '%' | '_' | '\\') {
                escaped.push('\\');
            }
            escaped.push(c);
        }
        escaped.push('%');
        escaped
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn matches_whole_words_only() {
        let pattern = SearchPattern::new("the").unwrap();
        assert!(pattern.is_match("the lord of the rings"));
        assert!(pattern.is_match("Into THE Wild"));
        assert!(!pattern.is_match("Amortized"));
        assert!(!pattern.is_match("Theory of Everything"));
    }

    #[test]
    fn special_characters_are_literal() {
        let pattern = SearchPattern::new("a.c").unwrap();
        assert!(!pattern.is_match("abc"));
        assert!(pattern.is_match("the a.c manual"));

        let star = SearchPattern::new("(.*)").unwrap();
        assert!(!star.is_match("anything at all"));
    }

    #[test]
    fn blank_term_is_rejected() {
        let err = SearchPattern::new("   ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
        assert_eq!(err.to_string(), "Search term (q) is required");
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        let pattern = SearchPattern::new("100%_off\\").unwrap();
        assert_eq!(pattern.like_pattern(), "%100\\%\\_off\\\\%");
    }

    #[test]
    fn term_is_trimmed() {
        let pattern = SearchPattern::new("  Herbert ").unwrap();
        assert_eq!(pattern.term(), "Herbert");
        assert!(pattern.is_match("Frank Herbert"));
    }
}
