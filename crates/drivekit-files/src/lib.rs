//! Files API client: metadata CRUD, folder membership and search.
//!
//! Content is uploaded through the resumable engine in `drivekit-upload`, over
//! the same [`HttpClient`](drivekit_upload::HttpClient) transport used for the
//! metadata calls.
//!
//! ```no_run
//! use drivekit_files::{DriveService, ListOptions};
//! use drivekit_upload::{AccessToken, ReqwestClient};
//!
//! # async fn run() -> drivekit_files::Result<()> {
//! let drive = DriveService::new(ReqwestClient::new()?, AccessToken::new("ya29.token"));
//! let page = drive.list(&ListOptions::default().mime_type("image/*")).await?;
//! for file in page.files {
//!     println!("{} {}", file.id, file.name);
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod fields;
mod model;
mod service;

pub use error::{DriveError, Result};
pub use fields::Fields;
pub use model::{
    APP_DATA_FOLDER, DEFAULT_MIME_TYPE, DEFAULT_PAGE_SIZE, DriveFile, FOLDER_MIME_TYPE,
    FileContent, FileList, JSON_MIME_TYPE, ListOptions, NewFile, ROOT_FOLDER, SearchOptions,
    UpdateFile,
};
pub use service::{
    DEFAULT_API_BASE, DEFAULT_UPLOAD_CHUNK_SIZE, DriveConfig, DriveService, FILE_INFO_FIELDS,
};
