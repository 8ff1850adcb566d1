//! Failures that can occur while rewriting anchors.
//!
//! None of these ever reach the caller of [`crate::TextFilter::filter`]: the rewriter logs them and
//! hands back the original text.

use thiserror::Error;

/// Internal failure raised while scanning or rewriting a block of text.
#[derive(Debug, Error)]
pub enum RewriteError {
    /// A scanning pattern could not be compiled.
    #[error("failed to compile {what} pattern")]
    Pattern {
        /// Short description of the pattern that failed.
        what: &'static str,
        /// Underlying regex compilation error.
        #[source]
        source: regex::Error,
    },
}

impl RewriteError {
    pub(crate) fn pattern(what: &'static str, source: regex::Error) -> Self {
        Self::Pattern { what, source }
    }
}
