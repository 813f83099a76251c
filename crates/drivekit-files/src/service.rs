use std::sync::Arc;

use drivekit_query::{Operator, Query, Term};
use drivekit_upload::{
    AccessToken, DEFAULT_BASE_URL, HttpClient, HttpRequest, HttpResponse, Method, Payload,
    RetryPolicy, UploadOptions, UploadTarget, Uploader,
};
use serde_json::{Map, Value, json};
use tracing::{debug, info};
use url::form_urlencoded;

use crate::error::{DriveError, Result};
use crate::model::{
    DriveFile, FOLDER_MIME_TYPE, FileContent, FileList, ListOptions, NewFile, SearchOptions,
    UpdateFile,
};

pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/drive/v3/files";

/// Chunk size for content uploads.
pub const DEFAULT_UPLOAD_CHUNK_SIZE: u64 = 20_000_000;

/// Metadata requested by [`DriveService::read`].
pub const FILE_INFO_FIELDS: &str = "id, name, mimeType, properties, description, parents";

/// Endpoints and upload settings of a [`DriveService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveConfig {
    /// Default: [`DEFAULT_API_BASE`]
    pub api_base: String,
    /// Default: the upload engine's session endpoint
    pub upload_base: String,
    /// Default: [`DEFAULT_UPLOAD_CHUNK_SIZE`]
    pub chunk_size: u64,
    pub retry: RetryPolicy,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            upload_base: DEFAULT_BASE_URL.to_string(),
            chunk_size: DEFAULT_UPLOAD_CHUNK_SIZE,
            retry: RetryPolicy::default(),
        }
    }
}

impl DriveConfig {
    #[must_use]
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    #[must_use]
    pub fn upload_base(mut self, upload_base: impl Into<String>) -> Self {
        self.upload_base = upload_base.into();
        self
    }

    #[must_use]
    pub fn chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    #[must_use]
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Client for the files API.
pub struct DriveService<C> {
    client: Arc<C>,
    token: AccessToken,
    config: DriveConfig,
}

impl<C: HttpClient> DriveService<C> {
    pub fn new(client: C, token: AccessToken) -> Self {
        Self {
            client: Arc::new(client),
            token,
            config: DriveConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: DriveConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DriveConfig {
        &self.config
    }

    /// Create a file in `folder` (no parent when `folder` is empty), then
    /// upload its content if it has any.
    pub async fn create(&self, file: NewFile, folder: &str) -> Result<DriveFile> {
        let mut metadata = Map::new();
        metadata.insert("name".to_string(), Value::from(file.name.as_str()));
        metadata.insert("mimeType".to_string(), Value::from(file.mime_type.as_str()));
        if let Some(properties) = &file.properties {
            metadata.insert("properties".to_string(), json!(properties));
        }
        if !folder.is_empty() {
            metadata.insert("parents".to_string(), json!([folder]));
        }

        let request = HttpRequest::new(Method::Post, self.config.api_base.clone())
            .header("Content-Type", "application/json; charset=UTF-8")
            .body(Value::Object(metadata).to_string());
        let created: DriveFile = parse(&self.call(request).await?)?;
        info!(id = %created.id, name = %file.name, "file created");

        if let Some(content) = &file.content {
            self.upload_content(&created.id, content, &file.mime_type).await?;
        }

        Ok(DriveFile {
            id: created.id,
            name: file.name,
            mime_type: file.mime_type,
            properties: file.properties,
            parents: if folder.is_empty() { Vec::new() } else { vec![folder.to_string()] },
            content: file.content,
            ..DriveFile::default()
        })
    }

    /// Fetch metadata and, unless `info_only` is set or the file is a
    /// folder, its content.
    pub async fn read(&self, id: &str, info_only: bool) -> Result<DriveFile> {
        let url = self.file_url(id, &[("fields", FILE_INFO_FIELDS)]);
        let mut file: DriveFile = parse(&self.call(HttpRequest::new(Method::Get, url)).await?)?;

        if !info_only && !file.is_folder() {
            let url = self.file_url(id, &[("alt", "media")]);
            let response = self.call(HttpRequest::new(Method::Get, url)).await?;
            file.content = Some(FileContent::decode(response.body, &file.mime_type)?);
        }
        Ok(file)
    }

    /// Apply metadata changes, then upload new content if given.
    pub async fn update(&self, update: UpdateFile) -> Result<DriveFile> {
        let mut metadata = Map::new();
        if let Some(name) = &update.name {
            metadata.insert("name".to_string(), Value::from(name.as_str()));
        }
        if let Some(mime_type) = &update.mime_type {
            metadata.insert("mimeType".to_string(), Value::from(mime_type.as_str()));
        }

        let request = HttpRequest::new(Method::Patch, self.file_url(&update.id, &[]))
            .header("Content-Type", "application/json; charset=UTF-8")
            .body(Value::Object(metadata).to_string());
        let mut updated: DriveFile = parse(&self.call(request).await?)?;

        if let Some(content) = &update.content {
            let mime_type = update
                .mime_type
                .as_deref()
                .unwrap_or(updated.mime_type.as_str())
                .to_string();
            self.upload_content(&update.id, content, &mime_type).await?;
        }
        updated.content = update.content;
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.call(HttpRequest::new(Method::Delete, self.file_url(id, &[])))
            .await?;
        info!(id, "file deleted");
        Ok(())
    }

    /// Put a file into `folder`.
    ///
    /// With `remove_from_all_others` the file ends up in `folder` only;
    /// otherwise `move_from` (if given) is replaced by `folder` and every
    /// other parent is kept. Returns the resulting parents.
    pub async fn add_to_folder(
        &self,
        id: &str,
        folder: &str,
        move_from: Option<&str>,
        remove_from_all_others: bool,
    ) -> Result<Vec<String>> {
        let current = self.read(id, true).await?.parents;
        let parents = next_parents(&current, folder, move_from, remove_from_all_others);

        let added: Vec<&str> = parents
            .iter()
            .filter(|p| !current.contains(p))
            .map(String::as_str)
            .collect();
        let removed: Vec<&str> = current
            .iter()
            .filter(|p| !parents.contains(p))
            .map(String::as_str)
            .collect();
        let (added, removed) = (added.join(","), removed.join(","));

        let mut params = Vec::new();
        if !added.is_empty() {
            params.push(("addParents", added.as_str()));
        }
        if !removed.is_empty() {
            params.push(("removeParents", removed.as_str()));
        }
        if params.is_empty() {
            return Ok(parents);
        }

        let request = HttpRequest::new(Method::Patch, self.file_url(id, &params))
            .header("Content-Type", "application/json; charset=UTF-8")
            .body("{}");
        self.call(request).await?;
        debug!(id, parents = ?parents, "parents updated");
        Ok(parents)
    }

    /// List the contents of a folder, folders first.
    pub async fn list(&self, options: &ListOptions) -> Result<FileList> {
        let in_folder: Query = Term::new("parents", options.folder.as_str())
            .operator(Operator::In)
            .into();
        let is_folder: Query = Term::new("mimeType", FOLDER_MIME_TYPE).into();

        let mime_type = non_empty(&options.mime_type);
        let extension = non_empty(&options.file_extension);
        let filter: Option<Query> = match (mime_type, extension) {
            (Some(mime_type), _) => Some(
                Term::new("mimeType", mime_type.replace('*', ""))
                    .operator(Operator::Contains)
                    .into(),
            ),
            (None, Some(extension)) => Some(Term::new("fileExtension", extension).into()),
            (None, None) => None,
        };
        let query = match filter {
            Some(filter) => Query::all([in_folder, Query::any([is_folder, filter])]),
            None => Query::group([in_folder]),
        };

        let mut search = SearchOptions::new(query)
            .fields(options.fields.clone())
            .page_size(options.page_size)
            .order_by(options.order_by.iter().cloned());
        search.page_token = options.page_token.clone();
        self.search(&search).await
    }

    /// Run a search and return one page of results.
    pub async fn search(&self, options: &SearchOptions) -> Result<FileList> {
        let q = options.query.render()?;
        let fields = options.fields.render();
        let order_by = options.order_by.join(",");
        let page_size = options.page_size.to_string();

        let mut params = vec![("q", q.as_str())];
        if !fields.is_empty() {
            params.push(("fields", fields.as_str()));
        }
        if !order_by.is_empty() {
            params.push(("orderBy", order_by.as_str()));
        }
        params.push(("pageSize", page_size.as_str()));
        if let Some(token) = &options.page_token {
            params.push(("pageToken", token.as_str()));
        }

        let url = format!("{}?{}", self.config.api_base, encode(&params));
        debug!(q = %q, "searching files");
        parse(&self.call(HttpRequest::new(Method::Get, url)).await?)
    }

    async fn upload_content(&self, id: &str, content: &FileContent, mime_type: &str) -> Result<()> {
        let payload = Payload::from_bytes(content.encode(mime_type)?).content_type(mime_type);
        let options = UploadOptions::default()
            .base_url(self.config.upload_base.clone())
            .chunk_size(self.config.chunk_size)
            .target(UploadTarget::replace(id))
            .retry(self.config.retry.clone());

        Uploader::new(Arc::clone(&self.client), self.token.clone())
            .upload(&payload, &options)
            .await?;
        Ok(())
    }

    async fn call(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!(method = %request.method, url = %request.url, "files API request");
        let request = request.header("Authorization", self.token.bearer());
        let response = self
            .client
            .send(request)
            .await
            .map_err(|e| DriveError::Transport(Box::new(e)))?;

        if !response.is_success() {
            return Err(DriveError::Api {
                status: response.status,
                body: response.text(),
            });
        }
        Ok(response)
    }

    fn file_url(&self, id: &str, params: &[(&str, &str)]) -> String {
        let id: String = form_urlencoded::byte_serialize(id.as_bytes()).collect();
        if params.is_empty() {
            format!("{}/{id}", self.config.api_base)
        } else {
            format!("{}/{id}?{}", self.config.api_base, encode(params))
        }
    }
}

fn encode(params: &[(&str, &str)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish()
}

fn parse<T: serde::de::DeserializeOwned>(response: &HttpResponse) -> Result<T> {
    if response.body.is_empty() {
        return Ok(serde_json::from_str("{}")?);
    }
    Ok(serde_json::from_slice(&response.body)?)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Parent set after moving a file into `folder`.
fn next_parents(
    current: &[String],
    folder: &str,
    move_from: Option<&str>,
    remove_from_all_others: bool,
) -> Vec<String> {
    if remove_from_all_others {
        return vec![folder.to_string()];
    }
    let mut parents: Vec<String> = current
        .iter()
        .filter(|p| Some(p.as_str()) != move_from.filter(|m| !m.is_empty()))
        .cloned()
        .collect();
    if !parents.iter().any(|p| p == folder) {
        parents.push(folder.to_string());
    }
    parents
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parents(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn adding_keeps_existing_parents() {
        assert_eq!(
            next_parents(&parents(&["a", "b"]), "c", None, false),
            parents(&["a", "b", "c"])
        );
    }

    #[test]
    fn moving_replaces_source_folder() {
        assert_eq!(
            next_parents(&parents(&["a", "b"]), "c", Some("a"), false),
            parents(&["b", "c"])
        );
        assert_eq!(
            next_parents(&parents(&["a"]), "c", Some(""), false),
            parents(&["a", "c"])
        );
    }

    #[test]
    fn exclusive_move_drops_everything_else() {
        assert_eq!(
            next_parents(&parents(&["a", "b"]), "c", Some("a"), true),
            parents(&["c"])
        );
    }

    #[test]
    fn already_present_folder_is_not_duplicated() {
        assert_eq!(next_parents(&parents(&["a"]), "a", None, false), parents(&["a"]));
    }

    #[test]
    fn empty_bodies_parse_as_empty_objects() {
        let file: DriveFile = parse(&HttpResponse::new(204)).unwrap();
        assert_eq!(file, DriveFile::default());
    }
}
