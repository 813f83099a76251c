use serde_json::Value;
use tracing::warn;

/// The final resource description returned when an upload completes.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadedResource {
    /// The response body parsed as JSON.
    Json(Value),

    /// The raw response body, when it is not JSON.
    Text(String),
}

impl UploadedResource {
    /// Interpret a completion body: JSON when it parses, raw text otherwise.
    pub fn from_body(body: &[u8]) -> Self {
        let text = String::from_utf8_lossy(body);
        if text.trim().is_empty() {
            return UploadedResource::Text(text.into_owned());
        }
        match serde_json::from_str(&text) {
            Ok(value) => UploadedResource::Json(value),
            Err(e) => {
                warn!(error = %e, "completion body is not JSON, keeping raw text");
                UploadedResource::Text(text.into_owned())
            }
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            UploadedResource::Json(value) => Some(value),
            UploadedResource::Text(_) => None,
        }
    }

    /// The `id` field of a JSON resource.
    pub fn id(&self) -> Option<&str> {
        self.as_json()?.get("id")?.as_str()
    }
}
