//! HTTP transport types shared by the gateway and its transports.
//!
//! # Design
//! Requests and responses are plain data. The gateway decorates an
//! `HttpRequest` (credential header, default headers, base URL) and hands it
//! to a `Transport`; whatever comes back is classified without further I/O.
//! Keeping the decoration and the classification as pure functions over these
//! types makes both testable without a network.
//!
//! All fields use owned types so a request can move onto a blocking thread
//! without lifetime concerns.

use std::fmt;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// Callers build one with `HttpRequest::get` / `post_json` and friends using a
/// path relative to the API base URL. The gateway rewrites `path` into an
/// absolute URL just before sending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// POST with a JSON body and the matching content type.
    pub fn post_json<T: serde::Serialize>(
        path: impl Into<String>,
        body: &T,
    ) -> Result<Self, serde_json::Error> {
        Self::post(path).with_json(body)
    }

    pub fn with_json<T: serde::Serialize>(mut self, body: &T) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_string(body)?);
        Ok(self.with_header("content-type", "application/json"))
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        set_header(&mut self.headers, name.into(), value.into());
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Decode the envelope payload into `T`.
    ///
    /// Only meaningful on a response the gateway returned as a success.
    pub fn payload<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        let envelope: crate::envelope::Envelope<T> = serde_json::from_str(&self.body)?;
        Ok(envelope.data)
    }
}

/// Replace any header called `name` (ignoring case) with a single new entry.
pub(crate) fn set_header(headers: &mut Vec<(String, String)>, name: String, value: String) {
    headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
    headers.push((name, value));
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_header_replaces_same_name_ignoring_case() {
        let req = HttpRequest::get("/user/info")
            .with_header("Authorization", "old")
            .with_header("X-Trace", "1")
            .with_header("authorization", "new");
        assert_eq!(req.headers.len(), 2);
        assert_eq!(req.header("AUTHORIZATION"), Some("new"));
        assert_eq!(req.header("x-trace"), Some("1"));
    }

    #[test]
    fn post_json_sets_body_and_content_type() {
        let req = HttpRequest::post_json("/user/login", &serde_json::json!({"userAccount": "a"}))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.header("content-type"), Some("application/json"));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["userAccount"], "a");
    }

    #[test]
    fn payload_reads_envelope_data() {
        let resp = HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: r#"{"code":0,"data":{"id":7},"message":"ok"}"#.to_string(),
        };
        let data: serde_json::Value = resp.payload().unwrap();
        assert_eq!(data["id"], 7);
    }

    #[test]
    fn method_display() {
        assert_eq!(HttpMethod::Patch.to_string(), "PATCH");
    }
}
