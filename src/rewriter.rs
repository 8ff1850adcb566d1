//! Rewrites anchors marked with `data-app-link` so they open the companion app.
//!
//! Example markup:
//!
//! ```html
//! <a href="https://school.example.com/course/view.php?id=2" data-app-link>basic usage</a>
//! <a href="https://school.example.com" data-app-link="myscheme" data-username>advanced usage</a>
//! ```
//!
//! The first anchor becomes
//! `moodlemobile://https://school.example.com?redirect=https://school.example.com/course/view.php?id=2`,
//! the second `myscheme://https://alice@school.example.com` when `alice` is logged in.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, trace, warn};

use crate::attributes::{
    APP_LINK_ATTRIBUTE, AttributeMatch, AttributePattern, app_link_pattern, href_pattern,
    username_pattern,
};
use crate::context::RewriteContext;
use crate::error::RewriteError;

/// Scheme registered by the official mobile app, used when nothing else is configured.
pub const DEFAULT_APP_SCHEME: &str = "moodlemobile";

/// A post-processing step applied to rendered text.
pub trait TextFilter {
    /// Filter `text` for one request. Implementations never fail; on trouble they return the input.
    fn filter<'a>(&self, text: &'a str, context: &RewriteContext) -> Cow<'a, str>;
}

/// Stateless rewriter turning marked anchors into app links.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppLinkRewriter;

struct Patterns {
    anchor: &'static Regex,
    app_link: &'static AttributePattern,
    username: &'static AttributePattern,
    href: &'static AttributePattern,
}

impl AppLinkRewriter {
    /// Create a rewriter.
    pub fn new() -> Self {
        Self
    }

    /// Like [`TextFilter::filter`] but surfaces internal failures instead of swallowing them.
    pub fn try_filter<'a>(
        &self,
        text: &'a str,
        context: &RewriteContext,
    ) -> Result<Cow<'a, str>, RewriteError> {
        if context.is_non_interactive_request {
            debug!("skipping app link filter for non-interactive request");
            return Ok(Cow::Borrowed(text));
        }

        if !contains_trigger(text) {
            debug!("no data-app-link attribute, skipping");
            return Ok(Cow::Borrowed(text));
        }

        let patterns = patterns()?;
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        let mut rewritten = 0usize;

        for anchor in patterns.anchor.find_iter(text) {
            if let Cow::Owned(tag) = rewrite_tag(&patterns, anchor.as_str(), context) {
                out.push_str(&text[last..anchor.start()]);
                out.push_str(&tag);
                last = anchor.end();
                rewritten += 1;
            }
        }

        if rewritten == 0 {
            return Ok(Cow::Borrowed(text));
        }

        out.push_str(&text[last..]);
        debug!(anchors = rewritten, "rewrote app links");
        Ok(Cow::Owned(out))
    }

    /// Rewrite a single opening anchor tag, returning it untouched when it has no `href` or no
    /// trigger attribute.
    pub fn rewrite_tag<'t>(
        &self,
        tag: &'t str,
        context: &RewriteContext,
    ) -> Result<Cow<'t, str>, RewriteError> {
        Ok(rewrite_tag(&patterns()?, tag, context))
    }
}

impl TextFilter for AppLinkRewriter {
    fn filter<'a>(&self, text: &'a str, context: &RewriteContext) -> Cow<'a, str> {
        match self.try_filter(text, context) {
            Ok(filtered) => filtered,
            Err(err) => {
                warn!(error = %err, "app link filter failed, keeping original text");
                Cow::Borrowed(text)
            }
        }
    }
}

fn rewrite_tag<'t>(patterns: &Patterns, tag: &'t str, context: &RewriteContext) -> Cow<'t, str> {
    let Some(trigger) = patterns.app_link.find(tag) else {
        return Cow::Borrowed(tag);
    };
    let Some(href) = patterns.href.find(tag) else {
        return Cow::Borrowed(tag);
    };
    let href = href.value_or_empty();

    let scheme = effective_scheme(&trigger, context);
    let username = match patterns.username.find(tag) {
        None => "",
        Some(attr) if attr.has_value() => attr.value_or_empty(),
        Some(_) => context.current_username.as_str(),
    };

    let app_url = build_app_url(scheme, &context.base_url, username, href);
    trace!(%href, %app_url, "rewriting anchor");

    let without_trigger = patterns.app_link.strip(tag);
    let stripped = patterns.username.strip(&without_trigger);
    if href.is_empty() {
        // Nothing to point at the app, but the markers still go.
        return Cow::Owned(stripped.into_owned());
    }
    Cow::Owned(stripped.replace(href, &app_url))
}

/// Scheme for an anchor: the attribute value, then the configured override, then the default.
pub fn effective_scheme<'a>(trigger: &AttributeMatch<'a>, context: &'a RewriteContext) -> &'a str {
    if trigger.has_value() {
        trigger.value_or_empty()
    } else if !context.configured_scheme.is_empty() {
        &context.configured_scheme
    } else {
        DEFAULT_APP_SCHEME
    }
}

/// Compose `scheme://base[?redirect=href]`, skipping the redirect when `href` is the site root.
///
/// The redirect target is appended verbatim, without URL encoding.
pub fn build_app_url(scheme: &str, base_url: &str, username: &str, href: &str) -> String {
    let mut app_url = format!("{scheme}://{}", inject_username(base_url, username));
    if href != base_url {
        app_url.push_str("?redirect=");
        app_url.push_str(href);
    }
    app_url
}

/// Insert `username@` right after the leading `http://` or `https://` of `base_url`.
pub fn inject_username<'a>(base_url: &'a str, username: &str) -> Cow<'a, str> {
    if username.is_empty() {
        return Cow::Borrowed(base_url);
    }

    let prefix_len = ["https://", "http://"].iter().find_map(|prefix| {
        base_url
            .get(..prefix.len())
            .filter(|head| head.eq_ignore_ascii_case(prefix))
            .map(|_| prefix.len())
    });

    match prefix_len {
        Some(len) => {
            let (scheme, rest) = base_url.split_at(len);
            Cow::Owned(format!("{scheme}{username}@{rest}"))
        }
        None => Cow::Borrowed(base_url),
    }
}

fn contains_trigger(text: &str) -> bool {
    let needle = APP_LINK_ATTRIBUTE.as_bytes();
    text.as_bytes()
        .windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle))
}

fn anchor_pattern() -> Result<&'static Regex, RewriteError> {
    static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)<a\s[^>]*>"))
        .as_ref()
        .map_err(|err| RewriteError::pattern("anchor", err.clone()))
}

fn patterns() -> Result<Patterns, RewriteError> {
    Ok(Patterns {
        anchor: anchor_pattern()?,
        app_link: app_link_pattern()?,
        username: username_pattern()?,
        href: href_pattern()?,
    })
}
