//! Per-call values supplied by the host platform.

/// Path fragment identifying web-service entry points.
const WEB_SERVICE_PATH_FRAGMENT: &str = "webservice/";

/// Read-only inputs for a single rewriting call.
///
/// Build a fresh context for every request: the configured scheme can change between requests
/// and nothing here is cached by the rewriter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteContext {
    /// Canonical root URL of the site, e.g. `https://school.example.com`.
    pub base_url: String,
    /// Administrator supplied scheme override. Empty means "not configured".
    pub configured_scheme: String,
    /// Username of the logged in user, empty for anonymous visitors.
    pub current_username: String,
    /// Set when the caller is an API or web-service client rather than a browser.
    pub is_non_interactive_request: bool,
}

impl RewriteContext {
    /// Context for an anonymous, interactive request against `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Context whose non-interactive flag is derived from the incoming request.
    pub fn from_request(base_url: impl Into<String>, request: &RequestInfo) -> Self {
        Self::new(base_url).non_interactive(request.is_web_service_access())
    }

    /// Set the configured scheme override.
    pub fn with_configured_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.configured_scheme = scheme.into().trim().to_string();
        self
    }

    /// Record the current user. A user id of `0` is a guest and leaves the username empty.
    pub fn with_current_user(mut self, user_id: u64, username: impl Into<String>) -> Self {
        self.current_username = if user_id == 0 {
            String::new()
        } else {
            username.into()
        };
        self
    }

    /// Override the non-interactive flag.
    pub fn non_interactive(mut self, value: bool) -> Self {
        self.is_non_interactive_request = value;
        self
    }
}

/// What the host knows about the request being served.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestInfo {
    /// Request is handled by the web-service server layer.
    pub web_service_server: bool,
    /// Script path of the current request, when known.
    pub script_path: Option<String>,
    /// Raw `token` request parameter, when supplied.
    pub token: Option<String>,
}

impl RequestInfo {
    /// Whether the request comes from a web-service client (most likely the app itself).
    ///
    /// Besides the web-service server layer, file endpoints under `webservice/` are treated as
    /// web-service access when they carry a token, once reduced to its alphanumeric characters.
    pub fn is_web_service_access(&self) -> bool {
        if self.web_service_server {
            return true;
        }

        let Some(path) = self.script_path.as_deref() else {
            return false;
        };
        if !path.contains(WEB_SERVICE_PATH_FRAGMENT) {
            return false;
        }

        self.token
            .as_deref()
            .is_some_and(|token| token.chars().any(|ch| ch.is_ascii_alphanumeric()))
    }
}
