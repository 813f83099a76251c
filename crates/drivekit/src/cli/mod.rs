use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use drivekit_files::DriveService;
use drivekit_upload::{AccessToken, ReqwestClient};

use crate::env::DrivekitEnv;

mod delete;
mod list;
mod read;
mod search;
mod upload;

#[derive(Debug, Parser)]
#[command(name = "drivekit", version, about = "Upload and manage files in cloud storage")]
pub struct Cli {
    /// OAuth access token.
    #[arg(long, global = true, env = "DRIVEKIT_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Upload(upload::Upload),
    Read(read::Read),
    Delete(delete::Delete),
    List(list::List),
    Search(search::Search),
}

impl Cli {
    pub async fn run(self, env: &DrivekitEnv) -> Result<()> {
        let token = self
            .token
            .map(AccessToken::new)
            .context("No access token: pass --token or set DRIVEKIT_TOKEN")?;

        match self.command {
            Command::Upload(cmd) => cmd.run(env, token).await,
            Command::Read(cmd) => cmd.run(&drive(env, token)?).await,
            Command::Delete(cmd) => cmd.run(&drive(env, token)?).await,
            Command::List(cmd) => cmd.run(&drive(env, token)?).await,
            Command::Search(cmd) => cmd.run(&drive(env, token)?).await,
        }
    }
}

fn drive(env: &DrivekitEnv, token: AccessToken) -> Result<DriveService<ReqwestClient>> {
    let client = ReqwestClient::new().context("Failed to build HTTP client")?;
    Ok(DriveService::new(client, token).with_config(env.config().drive_config()))
}
