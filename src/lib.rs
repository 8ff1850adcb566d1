#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod attributes;
pub mod config;
pub mod context;
pub mod error;
pub mod rewriter;

pub use config::FilterConfig;
pub use context::{RequestInfo, RewriteContext};
pub use error::RewriteError;
pub use rewriter::{AppLinkRewriter, DEFAULT_APP_SCHEME, TextFilter};
