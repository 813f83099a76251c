use std::fmt;
use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;

/// Callback receiving the number of request-body bytes handed to the
/// transport so far.
pub type BodyProgress = Arc<dyn Fn(u64) + Send + Sync>;

/// HTTP verbs used by the files and upload APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully buffered HTTP request.
#[derive(Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    pub on_body_progress: Option<BodyProgress>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: Bytes::new(),
            on_body_progress: None,
        }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    #[must_use]
    pub fn on_body_progress(mut self, on_body_progress: BodyProgress) -> Self {
        self.on_body_progress = Some(on_body_progress);
        self
    }

    /// First value of header `name`, compared case-insensitively.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(k, v)| {
                if k.eq_ignore_ascii_case("authorization") {
                    (k.as_str(), "***")
                } else {
                    (k.as_str(), v.as_str())
                }
            })
            .collect();
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &headers)
            .field("body_len", &self.body.len())
            .finish()
    }
}

/// A fully buffered HTTP response. Any status, including errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// First value of header `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Asynchronous HTTP transport.
///
/// This trait provides the single operation the upload engine and the files
/// service need: send a request, get the response back. Every status code is a
/// successful `send`; `Err` is reserved for failures where no response arrived
/// (connection refused or reset, timeout, DNS).
///
/// # Implementations
///
/// - [`ReqwestClient`]: Production implementation using `reqwest`
/// - Scripted mock implementations in tests
pub trait HttpClient: Send + Sync {
    /// Transport error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send `request` and buffer the whole response.
    ///
    /// Implementations should call `request.on_body_progress` as the body is
    /// written, when the transport allows observing it.
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = std::result::Result<HttpResponse, Self::Error>> + Send;
}

impl<C: HttpClient> HttpClient for Arc<C> {
    type Error = C::Error;

    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = std::result::Result<HttpResponse, Self::Error>> + Send {
        (**self).send(request)
    }
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use super::*;
    use futures_util::{StreamExt, stream};

    use crate::error::{Error, Result};

    /// Size of the body frames handed to the connection.
    const FRAME_SIZE: usize = 64 * 1024;

    /// Production HTTP client implementation using reqwest.
    ///
    /// Redirects are not followed: `308` is the resumable-upload status
    /// "Resume Incomplete", not a redirect.
    #[derive(Debug, Clone)]
    pub struct ReqwestClient {
        client: reqwest::Client,
    }

    impl ReqwestClient {
        /// Create a new ReqwestClient with default configuration.
        pub fn new() -> Result<Self> {
            let client = reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .map_err(|e| Error::ClientBuild(Box::new(e)))?;
            Ok(Self { client })
        }

        /// Wrap an already configured client. It should not follow redirects.
        pub fn with_client(client: reqwest::Client) -> Self {
            Self { client }
        }
    }

    fn framed_body(body: Bytes, progress: BodyProgress) -> reqwest::Body {
        let frames: Vec<Bytes> = (0..body.len())
            .step_by(FRAME_SIZE)
            .map(|start| body.slice(start..(start + FRAME_SIZE).min(body.len())))
            .collect();
        let mut sent = 0u64;
        let stream = stream::iter(frames).map(move |frame| {
            sent += frame.len() as u64;
            progress(sent);
            Ok::<Bytes, std::io::Error>(frame)
        });
        reqwest::Body::wrap_stream(stream)
    }

    impl HttpClient for ReqwestClient {
        type Error = reqwest::Error;

        async fn send(
            &self,
            request: HttpRequest,
        ) -> std::result::Result<HttpResponse, Self::Error> {
            let method = match request.method {
                Method::Get => reqwest::Method::GET,
                Method::Post => reqwest::Method::POST,
                Method::Put => reqwest::Method::PUT,
                Method::Patch => reqwest::Method::PATCH,
                Method::Delete => reqwest::Method::DELETE,
            };

            let mut builder = self.client.request(method, &request.url);
            for (key, value) in &request.headers {
                builder = builder.header(key.as_str(), value.as_str());
            }

            let len = request.body.len();
            builder = match request.on_body_progress {
                Some(progress) if len > 0 => builder
                    .header(reqwest::header::CONTENT_LENGTH, len)
                    .body(framed_body(request.body, progress)),
                _ => builder.body(request.body),
            };

            let response = builder.send().await?;
            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(k, v)| {
                    v.to_str()
                        .ok()
                        .map(|v| (k.as_str().to_string(), v.to_string()))
                })
                .collect();
            let body = response.bytes().await?;

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestClient;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let response = HttpResponse::new(308).with_header("range", "bytes=0-9");
        assert_eq!(response.header("Range"), Some("bytes=0-9"));
        assert_eq!(response.header("Location"), None);
    }

    #[test]
    fn request_debug_hides_authorization() {
        let request = HttpRequest::new(Method::Post, "https://example.test/")
            .header("Authorization", "Bearer ya29.secret")
            .header("X-Upload-Content-Type", "text/plain");
        let printed = format!("{request:?}");
        assert!(!printed.contains("ya29"));
        assert!(printed.contains("text/plain"));
        assert_eq!(request.header_value("authorization"), Some("Bearer ya29.secret"));
    }

    #[test]
    fn success_range() {
        assert!(HttpResponse::new(200).is_success());
        assert!(HttpResponse::new(204).is_success());
        assert!(!HttpResponse::new(308).is_success());
        assert!(!HttpResponse::new(404).is_success());
    }

    #[test]
    fn method_names() {
        assert_eq!(Method::Patch.to_string(), "PATCH");
        assert_eq!(Method::Put.as_str(), "PUT");
    }
}
