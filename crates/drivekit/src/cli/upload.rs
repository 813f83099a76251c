use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use drivekit_upload::{
    AccessToken, Error, Payload, ReqwestClient, UploadOptions, UploadTarget, UploadedResource,
    Uploader,
};
use tracing::info;

use crate::env::DrivekitEnv;
use crate::ui::UploadTracker;

/// Upload a local file with the resumable protocol.
#[derive(Debug, clap::Args)]
pub struct Upload {
    path: PathBuf,

    /// Remote file name. Defaults to the local file name.
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub mime_type: Option<String>,

    /// Replace the content of this file instead of creating a new one.
    #[arg(long, value_name = "FILE_ID")]
    pub replace: Option<String>,

    /// Bytes per request. Each chunk is held in memory while it is sent.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub chunk_size: Option<u64>,

    /// Give up after this many consecutive transient failures.
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Give up retrying once the upload has run this long.
    #[arg(long)]
    pub deadline_secs: Option<u64>,
}

impl Upload {
    pub async fn run(self, env: &DrivekitEnv, token: AccessToken) -> Result<()> {
        let config = env.config();
        let mut payload = Payload::from_file(&self.path)
            .await
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        if let Some(name) = &self.name {
            payload = payload.name(name.clone());
        }
        if let Some(mime_type) = &self.mime_type {
            payload = payload.content_type(mime_type.clone());
        }

        let mut retry = config.retry.policy();
        if self.max_attempts.is_some() {
            retry = retry.max_attempts(self.max_attempts);
        }
        if let Some(secs) = self.deadline_secs {
            retry = retry.deadline(Some(Duration::from_secs(secs)));
        }

        let tracker = UploadTracker::new(payload.len(), "Uploading");
        let mut options = UploadOptions::default()
            .base_url(config.upload_base.clone())
            .chunk_size(self.chunk_size.unwrap_or(config.chunk_size))
            .retry(retry)
            .on_progress(tracker.observer());
        if let Some(id) = &self.replace {
            options = options.target(UploadTarget::replace(id.clone()));
        }

        let uploader = Uploader::new(ReqwestClient::new()?, token);
        let result = uploader.upload_until(&payload, &options, interrupted()).await;

        match result {
            Ok(resource) => {
                tracker.finish("done");
                info!(path = %self.path.display(), "upload finished");
                print_resource(&resource)
            }
            Err(Error::Cancelled) => {
                tracker.abandon("cancelled");
                anyhow::bail!("Upload of {} cancelled", self.path.display())
            }
            Err(e) => {
                tracker.abandon("failed");
                if let Some(response) = e.response() {
                    eprintln!("{}", response.text());
                }
                Err(e).with_context(|| format!("Failed to upload {}", self.path.display()))
            }
        }
    }
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

fn print_resource(resource: &UploadedResource) -> Result<()> {
    match resource {
        UploadedResource::Json(json) => println!("{}", serde_json::to_string_pretty(json)?),
        UploadedResource::Text(text) => println!("{text}"),
    }
    Ok(())
}
