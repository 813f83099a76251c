//! Files API records and call options.

use std::collections::BTreeMap;

use bytes::Bytes;
use drivekit_query::Query;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fields::Fields;

pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";
pub const JSON_MIME_TYPE: &str = "application/json";
pub const ROOT_FOLDER: &str = "root";
pub const APP_DATA_FOLDER: &str = "appDataFolder";

/// File content, as sent or received.
#[derive(Debug, Clone, PartialEq)]
pub enum FileContent {
    Text(String),
    /// Written pretty-printed when the file's type is `application/json`.
    Json(Value),
    Bytes(Bytes),
}

impl FileContent {
    /// Wire form of the content for a file of type `mime_type`.
    pub fn encode(&self, mime_type: &str) -> serde_json::Result<Bytes> {
        Ok(match self {
            FileContent::Json(value) if mime_type == JSON_MIME_TYPE => {
                Bytes::from(serde_json::to_string_pretty(value)?)
            }
            FileContent::Json(value) => Bytes::from(value.to_string()),
            FileContent::Text(text) => Bytes::from(text.clone()),
            FileContent::Bytes(bytes) => bytes.clone(),
        })
    }

    /// Interpret a downloaded body. JSON files are parsed; other bodies are
    /// text when they are valid UTF-8.
    pub fn decode(body: Bytes, mime_type: &str) -> serde_json::Result<Self> {
        if mime_type == JSON_MIME_TYPE {
            return serde_json::from_slice(&body).map(FileContent::Json);
        }
        Ok(match String::from_utf8(body.to_vec()) {
            Ok(text) => FileContent::Text(text),
            Err(_) => FileContent::Bytes(body),
        })
    }
}

impl From<&str> for FileContent {
    fn from(text: &str) -> Self {
        FileContent::Text(text.to_string())
    }
}

impl From<String> for FileContent {
    fn from(text: String) -> Self {
        FileContent::Text(text)
    }
}

impl From<Value> for FileContent {
    fn from(value: Value) -> Self {
        FileContent::Json(value)
    }
}

impl From<Vec<u8>> for FileContent {
    fn from(bytes: Vec<u8>) -> Self {
        FileContent::Bytes(bytes.into())
    }
}

/// File metadata returned by the API. Unrequested fields stay at their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_view_link: Option<String>,
    /// Downloaded or uploaded content; never part of the metadata.
    #[serde(skip)]
    pub content: Option<FileContent>,
}

impl DriveFile {
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// A file to create.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFile {
    pub name: String,
    pub mime_type: String,
    pub properties: Option<BTreeMap<String, String>>,
    /// Uploaded after the metadata is created. `None` creates an empty file.
    pub content: Option<FileContent>,
}

impl Default for NewFile {
    fn default() -> Self {
        Self {
            name: String::new(),
            mime_type: DEFAULT_MIME_TYPE.to_string(),
            properties: None,
            content: None,
        }
    }
}

impl NewFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    #[must_use]
    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn content(mut self, content: impl Into<FileContent>) -> Self {
        self.content = Some(content.into());
        self
    }
}

/// Changes to an existing file. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateFile {
    pub id: String,
    pub name: Option<String>,
    pub mime_type: Option<String>,
    pub content: Option<FileContent>,
}

impl UpdateFile {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    #[must_use]
    pub fn content(mut self, content: impl Into<FileContent>) -> Self {
        self.content = Some(content.into());
        self
    }
}

/// Options for listing one folder.
#[derive(Debug, Clone, PartialEq)]
pub struct ListOptions {
    /// Default: [`ROOT_FOLDER`]
    pub folder: String,
    /// Keep folders and files whose type contains this, with `*` removed
    /// (`image/*` matches every image type).
    pub mime_type: Option<String>,
    /// Keep folders and files with this extension. Ignored when `mime_type` is set.
    pub file_extension: Option<String>,
    /// Default: [`DEFAULT_PAGE_SIZE`]
    pub page_size: u32,
    pub page_token: Option<String>,
    /// Default: `folder`, `name_natural`
    pub order_by: Vec<String>,
    /// Default: `nextPageToken` plus id, name, parents, type and links of each file.
    pub fields: Fields,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            folder: ROOT_FOLDER.to_string(),
            mime_type: None,
            file_extension: None,
            page_size: DEFAULT_PAGE_SIZE,
            page_token: None,
            order_by: vec!["folder".to_string(), "name_natural".to_string()],
            fields: Fields::new().field("nextPageToken").nested(
                "files",
                Fields::of([
                    "id",
                    "name",
                    "parents",
                    "mimeType",
                    "thumbnailLink",
                    "webViewLink",
                ]),
            ),
        }
    }
}

impl ListOptions {
    #[must_use]
    pub fn folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = folder.into();
        self
    }

    #[must_use]
    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    #[must_use]
    pub fn file_extension(mut self, file_extension: impl Into<String>) -> Self {
        self.file_extension = Some(file_extension.into());
        self
    }

    #[must_use]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn page_token(mut self, page_token: impl Into<String>) -> Self {
        self.page_token = Some(page_token.into());
        self
    }

    #[must_use]
    pub fn order_by<I, S>(mut self, order_by: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order_by = order_by.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn fields(mut self, fields: Fields) -> Self {
        self.fields = fields;
        self
    }
}

/// A raw search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub query: Query,
    pub fields: Fields,
    pub page_token: Option<String>,
    pub page_size: u32,
    pub order_by: Vec<String>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            query: Query::Group(Vec::new()),
            fields: Fields::new(),
            page_token: None,
            page_size: DEFAULT_PAGE_SIZE,
            order_by: Vec::new(),
        }
    }
}

impl SearchOptions {
    pub fn new(query: impl Into<Query>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn fields(mut self, fields: Fields) -> Self {
        self.fields = fields;
        self
    }

    #[must_use]
    pub fn page_token(mut self, page_token: impl Into<String>) -> Self {
        self.page_token = Some(page_token.into());
        self
    }

    #[must_use]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn order_by<I, S>(mut self, order_by: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order_by = order_by.into_iter().map(Into::into).collect();
        self
    }
}
