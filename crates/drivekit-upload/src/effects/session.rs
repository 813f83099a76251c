use serde_json::{Map, Value};
use tracing::debug;

use crate::core::session_url;
use crate::data::{ByteSource, Payload, UploadOptions, UploadSession, UploadTarget};
use crate::effects::http::{HttpClient, HttpRequest, Method};
use crate::error::{Error, Result};

/// Session metadata used when the caller supplies none:
/// `{"name": <payload name>, "mimeType": <content type>}`.
///
/// `name` is left out for unnamed payloads.
pub fn default_metadata<S: ByteSource>(payload: &Payload<S>) -> Value {
    let mut map = Map::new();
    if let Some(name) = payload.file_name() {
        map.insert("name".to_string(), Value::from(name));
    }
    map.insert("mimeType".to_string(), Value::from(payload.declared_type()));
    Value::Object(map)
}

/// Build the request that opens a session for `session`.
pub fn session_request(
    session: &UploadSession,
    metadata: &Value,
    options: &UploadOptions,
) -> HttpRequest {
    let method = match session.target() {
        UploadTarget::Create => Method::Post,
        UploadTarget::Replace { .. } => Method::Patch,
    };
    let url = session_url(&options.base_url, session.target().file_id(), &options.params);

    HttpRequest::new(method, url)
        .header("Authorization", session.token().bearer())
        .header("Content-Type", "application/json; charset=UTF-8")
        .header("X-Upload-Content-Length", session.total_len().to_string())
        .header("X-Upload-Content-Type", session.content_type())
        .body(metadata.to_string())
}

/// Opens resumable upload sessions.
pub struct SessionInitiator<'a, C> {
    client: &'a C,
}

impl<'a, C: HttpClient> SessionInitiator<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Open a session and return its URI, taken from the `Location` header.
    ///
    /// Every failure here is terminal; nothing is retried.
    pub async fn initiate(
        &self,
        session: &UploadSession,
        metadata: &Value,
        options: &UploadOptions,
    ) -> Result<String> {
        let request = session_request(session, metadata, options);
        debug!(method = %request.method, url = %request.url, "opening upload session");

        let response = self
            .client
            .send(request)
            .await
            .map_err(|e| Error::SessionTransport(Box::new(e)))?;

        if response.status >= 400 {
            return Err(Error::SessionInitiation(Box::new(response)));
        }

        response
            .header("Location")
            .map(str::to_string)
            .ok_or(Error::MissingSessionUri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::AccessToken;
    use serde_json::json;

    fn session(options: &UploadOptions) -> UploadSession {
        let payload = Payload::from_bytes(vec![0u8; 1234])
            .content_type("image/png")
            .name("cat.png");
        UploadSession::new(AccessToken::new("tok"), &payload, options)
    }

    #[test]
    fn create_request_uses_post_and_protocol_headers() {
        let options = UploadOptions::default();
        let metadata = json!({"name": "cat.png", "mimeType": "image/png"});
        let request = session_request(&session(&options), &metadata, &options);

        assert_eq!(request.method, Method::Post);
        assert_eq!(
            request.url,
            "https://www.googleapis.com/upload/drive/v3/files/?uploadType=resumable"
        );
        assert_eq!(request.header_value("Authorization"), Some("Bearer tok"));
        assert_eq!(
            request.header_value("Content-Type"),
            Some("application/json; charset=UTF-8")
        );
        assert_eq!(request.header_value("X-Upload-Content-Length"), Some("1234"));
        assert_eq!(request.header_value("X-Upload-Content-Type"), Some("image/png"));
        let body: Value = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(body, metadata);
    }

    #[test]
    fn replace_request_uses_patch_on_file_path() {
        let options = UploadOptions::default()
            .target(UploadTarget::replace("F1"))
            .base_url("https://upload.test/files/")
            .param("fields", "id");
        let request = session_request(&session(&options), &json!({}), &options);

        assert_eq!(request.method, Method::Patch);
        assert_eq!(request.url, "https://upload.test/files/F1?fields=id&uploadType=resumable");
    }

    #[test]
    fn default_metadata_names_payload() {
        let payload = Payload::from_bytes(b"x".to_vec()).content_type("text/plain").name("a.txt");
        assert_eq!(
            default_metadata(&payload),
            json!({"name": "a.txt", "mimeType": "text/plain"})
        );

        let unnamed = Payload::from_bytes(b"x".to_vec());
        assert_eq!(
            default_metadata(&unnamed),
            json!({"mimeType": "application/octet-stream"})
        );
    }
}
