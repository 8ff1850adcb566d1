//! Pattern based attribute lookup for a single opening tag.
//!
//! Attributes are matched as `<whitespace>name` optionally followed by `="value"`, with any run of
//! spaces or newlines allowed between `=` and the opening quote. Only double quoted values are
//! understood. A match must cover the whole attribute token, so `href` never matches `hreflang`.

use std::borrow::Cow;
use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::RewriteError;

/// Marker attribute flagging an anchor for rewriting. Its value optionally overrides the scheme.
pub const APP_LINK_ATTRIBUTE: &str = "data-app-link";
/// Marker attribute requesting a username in the generated link.
pub const USERNAME_ATTRIBUTE: &str = "data-username";
/// Attribute holding the link destination.
pub const HREF_ATTRIBUTE: &str = "href";

/// One occurrence of an attribute inside a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeMatch<'t> {
    /// Matched text: leading whitespace, name and the `="..."` part when present.
    pub full: &'t str,
    /// Byte range of [`Self::full`] within the searched tag.
    pub range: Range<usize>,
    /// `None` for a bare attribute, `Some` with the (possibly empty) quoted value otherwise.
    pub value: Option<&'t str>,
}

impl<'t> AttributeMatch<'t> {
    /// The attribute value, treating a bare attribute as an empty value.
    pub fn value_or_empty(&self) -> &'t str {
        self.value.unwrap_or("")
    }

    /// Whether the attribute carries a non-empty value.
    pub fn has_value(&self) -> bool {
        !self.value_or_empty().is_empty()
    }
}

/// Compiled matcher for one attribute name.
#[derive(Debug, Clone)]
pub struct AttributePattern {
    regex: Regex,
}

impl AttributePattern {
    /// Compile a case-insensitive matcher for `name`.
    pub fn new(name: &str) -> Result<Self, RewriteError> {
        let regex = Regex::new(&format!(
            r#"(?i)\s{}(?:=[ \t\r\n]*"([^"]*)")?"#,
            regex::escape(name)
        ))
        .map_err(|err| RewriteError::pattern("attribute", err))?;

        Ok(Self { regex })
    }

    /// First whole-token occurrence of the attribute in `tag`.
    pub fn find<'t>(&self, tag: &'t str) -> Option<AttributeMatch<'t>> {
        self.find_iter(tag).next()
    }

    /// Every whole-token occurrence of the attribute in `tag`, left to right.
    pub fn find_iter<'r, 't>(
        &'r self,
        tag: &'t str,
    ) -> impl Iterator<Item = AttributeMatch<'t>> + 'r
    where
        't: 'r,
    {
        self.regex.captures_iter(tag).filter_map(move |caps| {
            let whole = caps.get(0)?;
            if !ends_attribute_token(tag, whole.end()) {
                return None;
            }
            Some(AttributeMatch {
                full: whole.as_str(),
                range: whole.range(),
                value: caps.get(1).map(|value| value.as_str()),
            })
        })
    }

    /// Remove every occurrence of the attribute, including its leading whitespace.
    pub fn strip<'t>(&self, tag: &'t str) -> Cow<'t, str> {
        let mut matches = self.find_iter(tag).peekable();
        if matches.peek().is_none() {
            return Cow::Borrowed(tag);
        }

        let mut out = String::with_capacity(tag.len());
        let mut last = 0;
        for found in matches {
            out.push_str(&tag[last..found.range.start]);
            last = found.range.end;
        }
        out.push_str(&tag[last..]);
        Cow::Owned(out)
    }
}

/// Look up `name` in `tag`, distinguishing an absent attribute from a present one.
pub fn get_attribute<'t>(
    name: &str,
    tag: &'t str,
) -> Result<Option<AttributeMatch<'t>>, RewriteError> {
    let pattern = match name {
        APP_LINK_ATTRIBUTE => app_link_pattern()?,
        USERNAME_ATTRIBUTE => username_pattern()?,
        HREF_ATTRIBUTE => href_pattern()?,
        other => return Ok(AttributePattern::new(other)?.find(tag)),
    };
    Ok(pattern.find(tag))
}

pub(crate) fn app_link_pattern() -> Result<&'static AttributePattern, RewriteError> {
    static PATTERN: OnceLock<Result<AttributePattern, RewriteError>> = OnceLock::new();
    cached(&PATTERN, APP_LINK_ATTRIBUTE)
}

pub(crate) fn username_pattern() -> Result<&'static AttributePattern, RewriteError> {
    static PATTERN: OnceLock<Result<AttributePattern, RewriteError>> = OnceLock::new();
    cached(&PATTERN, USERNAME_ATTRIBUTE)
}

pub(crate) fn href_pattern() -> Result<&'static AttributePattern, RewriteError> {
    static PATTERN: OnceLock<Result<AttributePattern, RewriteError>> = OnceLock::new();
    cached(&PATTERN, HREF_ATTRIBUTE)
}

fn cached(
    cell: &'static OnceLock<Result<AttributePattern, RewriteError>>,
    name: &str,
) -> Result<&'static AttributePattern, RewriteError> {
    match cell.get_or_init(|| AttributePattern::new(name)) {
        Ok(pattern) => Ok(pattern),
        Err(RewriteError::Pattern { what, source }) => {
            Err(RewriteError::pattern(*what, source.clone()))
        }
    }
}

// A bare match followed by more name characters belongs to a longer attribute.
fn ends_attribute_token(tag: &str, end: usize) -> bool {
    match tag[end..].chars().next() {
        Some(ch) => !(ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | ':' | '.')),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_quoted_value() {
        let tag = r#"<a href="https://school.test/course" data-app-link="custom">"#;
        let found = get_attribute(APP_LINK_ATTRIBUTE, tag).unwrap().unwrap();
        assert_eq!(found.value, Some("custom"));
        assert_eq!(found.full, r#" data-app-link="custom""#);
    }

    #[test]
    fn distinguishes_bare_from_absent() {
        let tag = r#"<a href="https://school.test" data-app-link>"#;
        let found = get_attribute(APP_LINK_ATTRIBUTE, tag).unwrap().unwrap();
        assert_eq!(found.value, None);
        assert!(!found.has_value());
        assert!(get_attribute(USERNAME_ATTRIBUTE, tag).unwrap().is_none());
    }

    #[test]
    fn keeps_empty_quoted_value_distinct_from_bare() {
        let tag = r#"<a data-username="" href="x">"#;
        let found = get_attribute(USERNAME_ATTRIBUTE, tag).unwrap().unwrap();
        assert_eq!(found.value, Some(""));
        assert_eq!(found.value_or_empty(), "");
    }

    #[test]
    fn tolerates_newlines_before_the_quote() {
        let tag = "<a href=\n  \"https://school.test/x\"\ndata-app-link>";
        let href = get_attribute(HREF_ATTRIBUTE, tag).unwrap().unwrap();
        assert_eq!(href.value, Some("https://school.test/x"));
        assert!(get_attribute(APP_LINK_ATTRIBUTE, tag).unwrap().is_some());
    }

    #[test]
    fn matches_case_insensitively() {
        let tag = r#"<A HREF="https://school.test" DATA-APP-LINK="Scheme">"#;
        let found = get_attribute(APP_LINK_ATTRIBUTE, tag).unwrap().unwrap();
        assert_eq!(found.value, Some("Scheme"));
    }

    #[test]
    fn ignores_longer_attribute_names() {
        let tag = r#"<a hreflang="en" data-app-link-extra href="https://school.test">"#;
        let href = get_attribute(HREF_ATTRIBUTE, tag).unwrap().unwrap();
        assert_eq!(href.value, Some("https://school.test"));
        assert!(get_attribute(APP_LINK_ATTRIBUTE, tag).unwrap().is_none());
    }

    #[test]
    fn strips_every_occurrence_with_leading_space() {
        let pattern = AttributePattern::new("data-app-link").unwrap();
        let tag = r#"<a data-app-link href="x" data-app-link="y">"#;
        assert_eq!(pattern.strip(tag), r#"<a href="x">"#);
    }

    #[test]
    fn strip_without_match_borrows_input() {
        let pattern = AttributePattern::new("data-username").unwrap();
        let tag = r#"<a href="x">"#;
        assert!(matches!(pattern.strip(tag), Cow::Borrowed(_)));
    }

    #[test]
    fn escapes_custom_names() {
        let tag = r#"<a data.x="1" dataax="2">"#;
        let found = get_attribute("data.x", tag).unwrap().unwrap();
        assert_eq!(found.value, Some("1"));
    }
}
