use anyhow::{Context, Result};
use drivekit_files::{
    DEFAULT_PAGE_SIZE, DriveFile, DriveService, FileList, ListOptions, ROOT_FOLDER,
};
use drivekit_upload::HttpClient;

/// List a folder, folders first.
#[derive(Debug, clap::Args)]
#[clap(visible_alias = "ls")]
pub struct List {
    #[arg(long, default_value = ROOT_FOLDER)]
    folder: String,

    /// Only files whose type contains this; `*` is ignored (`image/*`).
    #[arg(long)]
    mime_type: Option<String>,

    /// Only files with this extension.
    #[arg(long)]
    ext: Option<String>,

    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: u32,

    #[arg(long)]
    page_token: Option<String>,
}

impl List {
    pub async fn run<C: HttpClient>(self, drive: &DriveService<C>) -> Result<()> {
        let mut options = ListOptions::default()
            .folder(self.folder.clone())
            .page_size(self.page_size);
        if let Some(mime_type) = self.mime_type {
            options = options.mime_type(mime_type);
        }
        if let Some(ext) = self.ext {
            options = options.file_extension(ext);
        }
        if let Some(token) = self.page_token {
            options = options.page_token(token);
        }

        let page = drive
            .list(&options)
            .await
            .with_context(|| format!("Failed to list {}", self.folder))?;
        print_page(&page);
        Ok(())
    }
}

pub(super) fn print_page(page: &FileList) {
    for file in &page.files {
        println!("{}", row(file));
    }
    if let Some(token) = &page.next_page_token {
        eprintln!("more results: --page-token {token}");
    }
}

fn row(file: &DriveFile) -> String {
    let kind = if file.is_folder() { "dir" } else { file.mime_type.as_str() };
    format!("{}\t{}\t{}", file.id, kind, file.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use drivekit_files::FOLDER_MIME_TYPE;

    #[test]
    fn folders_are_marked() {
        let folder = DriveFile {
            id: "1".to_string(),
            name: "docs".to_string(),
            mime_type: FOLDER_MIME_TYPE.to_string(),
            ..DriveFile::default()
        };
        assert_eq!(row(&folder), "1\tdir\tdocs");
    }
}
