/// Redirect URL templates
use crate::identity::{Did, Handle};
use axum::http::{header, HeaderMap, Uri};
use serde::{Deserialize, Serialize};

/// Fields of the inbound request available to templates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub scheme: String,
    pub host: String,
    pub path: String,
    pub query: String,
}

impl RequestContext {
    /// Capture template fields from a request's URI and headers
    ///
    /// Server-side URIs rarely carry a scheme, so `X-Forwarded-Proto` is used
    /// when present.
    pub fn new(uri: &Uri, headers: &HeaderMap) -> Self {
        let scheme = uri
            .scheme_str()
            .or_else(|| header_str(headers, "x-forwarded-proto"))
            .unwrap_or_default();

        let host = header_str(headers, header::HOST.as_str())
            .or_else(|| uri.authority().map(|a| a.as_str()))
            .unwrap_or_default();

        Self {
            scheme: scheme.to_string(),
            host: host.to_string(),
            path: uri.path().to_string(),
            query: uri.query().unwrap_or_default().to_string(),
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// A destination URL with `{token}` placeholders
///
/// Supported tokens: `{handle}`, `{did}`, `{handle.domain}`,
/// `{handle.username}`, `{request.scheme}`, `{request.host}`,
/// `{request.path}` and `{request.query}`. Substitution is literal; nothing
/// is escaped and unknown tokens are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UrlTemplate(pub String);

impl UrlTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn render(&self, request: &RequestContext, handle: &Handle, did: Option<&Did>) -> String {
        let replacements = [
            ("{handle}", handle.to_string()),
            ("{did}", did.map(|d| d.to_string()).unwrap_or_default()),
            ("{handle.domain}", handle.domain.to_string()),
            ("{handle.username}", handle.username.to_string()),
            ("{request.scheme}", request.scheme.clone()),
            ("{request.host}", request.host.clone()),
            ("{request.path}", request.path.clone()),
            ("{request.query}", request.query.clone()),
        ];

        replacements
            .iter()
            .fold(self.0.clone(), |url, (token, value)| url.replace(token, value))
    }
}
