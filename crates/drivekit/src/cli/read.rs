use std::io::Write;

use anyhow::{Context, Result};
use drivekit_files::{DriveService, FileContent};
use drivekit_upload::HttpClient;

/// Show a file's metadata and content.
#[derive(Debug, clap::Args)]
pub struct Read {
    id: String,

    /// Skip downloading the content.
    #[arg(long)]
    info_only: bool,
}

impl Read {
    pub async fn run<C: HttpClient>(self, drive: &DriveService<C>) -> Result<()> {
        let file = drive
            .read(&self.id, self.info_only)
            .await
            .with_context(|| format!("Failed to read {}", self.id))?;

        println!("{}", serde_json::to_string_pretty(&file)?);
        match &file.content {
            Some(FileContent::Text(text)) => println!("{text}"),
            Some(FileContent::Json(json)) => println!("{}", serde_json::to_string_pretty(json)?),
            Some(FileContent::Bytes(bytes)) => std::io::stdout().write_all(bytes)?,
            None => {}
        }
        Ok(())
    }
}
