use std::future::Future;
use std::io::{self, SeekFrom};
use std::ops::Range;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Content type sent when the caller does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// An ordered byte source with a known length.
///
/// Uploads read it one range at a time and never write to it.
pub trait ByteSource: Send + Sync {
    /// Total number of bytes.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read exactly the bytes in `range`.
    ///
    /// # Errors
    ///
    /// Returns [`io::ErrorKind::InvalidInput`] when the range is not within
    /// `0..len()`, or the underlying I/O error.
    fn read_range(&self, range: Range<u64>) -> impl Future<Output = io::Result<Bytes>> + Send;
}

fn check_range(range: &Range<u64>, len: u64) -> io::Result<()> {
    if range.start > range.end || range.end > len {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("range {}..{} outside payload of {len} bytes", range.start, range.end),
        ));
    }
    Ok(())
}

impl ByteSource for Bytes {
    fn len(&self) -> u64 {
        Bytes::len(self) as u64
    }

    async fn read_range(&self, range: Range<u64>) -> io::Result<Bytes> {
        check_range(&range, ByteSource::len(self))?;
        Ok(self.slice(range.start as usize..range.end as usize))
    }
}

/// A file on disk, read range by range.
///
/// The length is captured when the source is opened; the file must not
/// change while an upload reads from it. Each range is read into a buffer of
/// its full length, so a chunk size of 0 loads the whole file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    len: u64,
}

impl FileSource {
    pub async fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let len = tokio::fs::metadata(&path).await?.len();
        Ok(Self { path, len })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for FileSource {
    fn len(&self) -> u64 {
        self.len
    }

    async fn read_range(&self, range: Range<u64>) -> io::Result<Bytes> {
        check_range(&range, self.len)?;
        let mut file = tokio::fs::File::open(&self.path).await?;
        file.seek(SeekFrom::Start(range.start)).await?;
        let mut buf = vec![0u8; (range.end - range.start) as usize];
        file.read_exact(&mut buf).await?;
        Ok(Bytes::from(buf))
    }
}

/// The content of an upload: a byte source plus its declared type and name.
#[derive(Debug, Clone)]
pub struct Payload<S = Bytes> {
    source: S,
    content_type: String,
    name: Option<String>,
}

impl<S: ByteSource> Payload<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            name: None,
        }
    }

    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn declared_type(&self) -> &str {
        &self.content_type
    }

    pub fn file_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn len(&self) -> u64 {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }
}

impl Payload<Bytes> {
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self::new(bytes.into())
    }
}

impl Payload<FileSource> {
    /// Open a file as a payload named after its final path component.
    pub async fn from_file(path: impl Into<PathBuf>) -> io::Result<Self> {
        let source = FileSource::open(path).await?;
        let name = source
            .path()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        let mut payload = Self::new(source);
        payload.name = name;
        Ok(payload)
    }
}
