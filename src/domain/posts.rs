//! Post editor input normalization.

use super::error::DomainError;

/// Identifier value the editor uses to request a brand-new post.
pub const NEW_POST_SENTINEL: &str = "0";

/// Which record an editor submission addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostTarget {
    New,
    Existing(i64),
}

impl PostTarget {
    /// Interpret the raw `/edit/{id}` path segment.
    ///
    /// Only the exact sentinel `"0"` creates a post; every other value must be
    /// a base-10 integer naming an existing record.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let raw = raw.trim();
        if raw == NEW_POST_SENTINEL {
            return Ok(Self::New);
        }
        raw.parse::<i64>()
            .map(Self::Existing)
            .map_err(|_| DomainError::invalid_identifier(raw))
    }
}

/// Trimmed editor fields, ready for persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub slug: String,
    pub title: String,
    pub body: String,
    pub author: String,
}

impl PostDraft {
    pub fn new(slug: &str, title: &str, body: &str, author: &str) -> Self {
        Self {
            slug: slug.trim().to_lowercase(),
            title: title.trim().to_string(),
            body: body.trim().to_string(),
            author: author.trim().to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        ensure_non_empty(&self.slug, "slug")?;
        ensure_non_empty(&self.title, "title")?;
        ensure_non_empty(&self.body, "body")?;
        ensure_non_empty(&self.author, "author")
    }
}

pub(crate) fn ensure_non_empty(value: &str, field: &'static str) -> Result<(), DomainError> {
    if value.is_empty() {
        return Err(DomainError::empty_field(field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_requests_new_post() {
        assert_eq!(PostTarget::parse("0"), Ok(PostTarget::New));
        assert_eq!(PostTarget::parse(" 0 "), Ok(PostTarget::New));
    }

    #[test]
    fn numeric_identifier_addresses_existing_post() {
        assert_eq!(PostTarget::parse("42"), Ok(PostTarget::Existing(42)));
        assert_eq!(PostTarget::parse("00"), Ok(PostTarget::Existing(0)));
    }

    #[test]
    fn non_numeric_identifier_is_rejected() {
        assert_eq!(
            PostTarget::parse("hello"),
            Err(DomainError::invalid_identifier("hello"))
        );
    }

    #[test]
    fn draft_trims_fields_and_lowercases_slug() {
        let draft = PostDraft::new("  First-Post ", " Hello ", "\n<p>Body</p>\n", " Rashni ");
        assert_eq!(draft.slug, "first-post");
        assert_eq!(draft.title, "Hello");
        assert_eq!(draft.body, "<p>Body</p>");
        assert_eq!(draft.author, "Rashni");
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn whitespace_only_field_fails_validation() {
        let draft = PostDraft::new("slug", "   ", "body", "me");
        assert_eq!(draft.validate(), Err(DomainError::empty_field("title")));
    }
}
