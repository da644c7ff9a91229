//! Custom-scheme redirect interception
//!
//! The provider finishes a login by navigating the embedded browser to
//! `<scheme>://auth#...session_token_code=<value>&...`. The browser must never
//! load that URL; the interceptor cancels it and recovers the code.

use inkstat_domain::constants::CODE_PARAM;
use inkstat_domain::AuthorizationCode;
use regex::Regex;

/// What the embedded browser should do with a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    /// Ordinary page load, let it through.
    Allow,
    /// Redirect on the custom scheme. Always cancelled, with or without a code.
    Cancel { code: Option<AuthorizationCode> },
}

impl NavigationDecision {
    #[must_use]
    pub fn is_cancel(&self) -> bool {
        matches!(self, Self::Cancel { .. })
    }
}

/// Inspects navigations for the login redirect scheme.
#[derive(Debug, Clone)]
pub struct RedirectInterceptor {
    scheme: String,
    code_pattern: Option<Regex>,
}

impl RedirectInterceptor {
    pub fn new(scheme: impl Into<String>) -> Self {
        Self { scheme: scheme.into(), code_pattern: code_pattern(CODE_PARAM) }
    }

    /// Use a different parameter name than `session_token_code`.
    #[must_use]
    pub fn with_param(mut self, param: &str) -> Self {
        self.code_pattern = code_pattern(param);
        self
    }

    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Whether `url` uses the redirect scheme (case-insensitive).
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        url.split_once(':')
            .is_some_and(|(scheme, _)| scheme.eq_ignore_ascii_case(&self.scheme))
    }

    /// Decide what to do with a navigation to `url`.
    #[must_use]
    pub fn intercept(&self, url: &str) -> NavigationDecision {
        if !self.matches(url) {
            return NavigationDecision::Allow;
        }
        let code = self.code_pattern.as_ref().and_then(|pattern| capture_code(pattern, url));
        NavigationDecision::Cancel { code }
    }
}

/// `param=<value>` at a parameter boundary, value up to the next `&` or `#`.
fn code_pattern(param: &str) -> Option<Regex> {
    Regex::new(&format!(r"(?:^|[?#&/]){}=([^&#]*)", regex::escape(param))).ok()
}

fn capture_code(pattern: &Regex, url: &str) -> Option<AuthorizationCode> {
    let value = pattern.captures(url)?.get(1)?.as_str();
    (!value.is_empty()).then(|| AuthorizationCode::new(value))
}

/// Extract the value of `param` from anywhere in `url`.
///
/// The value runs from just after `param=` to the next `&`, `#` or the end of
/// the string. Only matches at a parameter boundary count, so
/// `session_token_code_challenge=` is never mistaken for `session_token_code=`.
/// An empty value yields `None`.
pub fn extract_code(url: &str, param: &str) -> Option<AuthorizationCode> {
    capture_code(&code_pattern(param)?, url)
}
