use anyhow::{Context, Result};
use drivekit_files::{DriveService, Fields, SearchOptions};
use drivekit_query::Query;
use drivekit_upload::HttpClient;

use super::list::print_page;

/// Run a raw search expression, e.g. `name contains 'report' and trashed = false`.
#[derive(Debug, clap::Args)]
pub struct Search {
    query: String,

    #[arg(long)]
    order_by: Vec<String>,

    #[arg(long)]
    page_token: Option<String>,
}

impl Search {
    pub async fn run<C: HttpClient>(self, drive: &DriveService<C>) -> Result<()> {
        let mut options = SearchOptions::new(Query::raw(self.query.clone()))
            .fields(
                Fields::new()
                    .field("nextPageToken")
                    .nested("files", Fields::of(["id", "name", "mimeType"])),
            )
            .order_by(self.order_by);
        if let Some(token) = self.page_token {
            options = options.page_token(token);
        }

        let page = drive
            .search(&options)
            .await
            .with_context(|| format!("Search failed: {}", self.query))?;
        print_page(&page);
        Ok(())
    }
}
