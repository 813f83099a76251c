use anyhow::{Context, Result};
use drivekit_files::DriveService;
use drivekit_upload::HttpClient;

/// Delete a file permanently.
#[derive(Debug, clap::Args)]
#[clap(visible_alias = "rm")]
pub struct Delete {
    id: String,
}

impl Delete {
    pub async fn run<C: HttpClient>(self, drive: &DriveService<C>) -> Result<()> {
        drive
            .delete(&self.id)
            .await
            .with_context(|| format!("Failed to delete {}", self.id))?;
        println!("Deleted {}", self.id);
        Ok(())
    }
}
