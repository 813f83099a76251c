//! Files service tests against a replaying HTTP client.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use drivekit_files::{
    DriveConfig, DriveError, DriveService, FileContent, Fields, ListOptions, NewFile,
    SearchOptions, UpdateFile, FOLDER_MIME_TYPE, JSON_MIME_TYPE,
};
use drivekit_query::{Operator, Query, Term};
use drivekit_upload::{AccessToken, HttpClient, HttpRequest, HttpResponse, Method};
use serde_json::{Value, json};

const API: &str = "https://files.test/v3/files";
const UPLOAD: &str = "https://upload.test/v3/files/";

#[derive(Debug)]
struct TestError(String);

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for TestError {}

/// Answers requests in order and keeps what it was sent.
#[derive(Default)]
struct Replay {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl Replay {
    fn new(responses: impl IntoIterator<Item = HttpResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::default(),
        }
    }
}

impl HttpClient for Replay {
    type Error = TestError;

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TestError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TestError("no scripted response".to_string()))
    }
}

fn ok_json(value: Value) -> HttpResponse {
    HttpResponse::new(200).with_body(value.to_string())
}

fn service(replay: &Arc<Replay>) -> DriveService<Arc<Replay>> {
    DriveService::new(Arc::clone(replay), AccessToken::new("tok")).with_config(
        DriveConfig::default()
            .api_base(API)
            .upload_base(UPLOAD)
            .chunk_size(4),
    )
}

fn query_of(url: &str) -> Vec<(String, String)> {
    let (_, query) = url.split_once('?').unwrap_or((url, ""));
    url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

fn body_json(request: &HttpRequest) -> Value {
    serde_json::from_slice(&request.body).unwrap()
}

#[tokio::test]
async fn create_posts_metadata_then_uploads_content() {
    let replay = Arc::new(Replay::new([
        ok_json(json!({"id": "F1", "name": "notes.json"})),
        HttpResponse::new(200).with_header("Location", "https://upload.test/session/1"),
        HttpResponse::new(308).with_header("Range", "bytes=0-3"),
        HttpResponse::new(308).with_header("Range", "bytes=0-7"),
        ok_json(json!({"id": "F1"})),
    ]));

    let file = service(&replay)
        .create(
            NewFile::new("notes.json")
                .mime_type(JSON_MIME_TYPE)
                .property("kind", "note")
                .content(json!({"a": 1})),
            "folder-9",
        )
        .await
        .unwrap();

    assert_eq!(file.id, "F1");
    assert_eq!(file.parents, vec!["folder-9"]);
    assert_eq!(file.content, Some(FileContent::Json(json!({"a": 1}))));

    let requests = replay.requests.lock().unwrap();
    assert_eq!(requests[0].method, Method::Post);
    assert_eq!(requests[0].url, API);
    assert_eq!(requests[0].header_value("Authorization"), Some("Bearer tok"));
    assert_eq!(
        body_json(&requests[0]),
        json!({
            "name": "notes.json",
            "mimeType": JSON_MIME_TYPE,
            "properties": {"kind": "note"},
            "parents": ["folder-9"]
        })
    );

    assert_eq!(requests[1].method, Method::Patch);
    assert_eq!(requests[1].url, "https://upload.test/v3/files/F1?uploadType=resumable");
    // "{\n  \"a\": 1\n}" is 12 bytes, sent in chunks of 4
    assert_eq!(requests[1].header_value("X-Upload-Content-Length"), Some("12"));
    assert_eq!(requests[2].header_value("Content-Range"), Some("bytes 0-3/12"));
    assert_eq!(requests[4].header_value("Content-Range"), Some("bytes 8-11/12"));
    assert_eq!(requests.len(), 5);
}

#[tokio::test]
async fn create_without_content_or_folder() {
    let replay = Arc::new(Replay::new([ok_json(json!({"id": "F2"}))]));

    let file = service(&replay).create(NewFile::new("empty"), "").await.unwrap();

    assert_eq!(file.id, "F2");
    assert_eq!(file.mime_type, "application/octet-stream");
    let requests = replay.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        body_json(&requests[0]),
        json!({"name": "empty", "mimeType": "application/octet-stream"})
    );
}

#[tokio::test]
async fn read_fetches_metadata_and_parses_json_content() {
    let replay = Arc::new(Replay::new([
        ok_json(json!({
            "id": "F1",
            "name": "cfg",
            "mimeType": JSON_MIME_TYPE,
            "parents": ["root"]
        })),
        ok_json(json!({"theme": "dark"})),
    ]));

    let file = service(&replay).read("F1", false).await.unwrap();

    assert_eq!(file.name, "cfg");
    assert_eq!(file.content, Some(FileContent::Json(json!({"theme": "dark"}))));
    let requests = replay.requests.lock().unwrap();
    assert_eq!(
        query_of(&requests[0].url),
        vec![(
            "fields".to_string(),
            "id, name, mimeType, properties, description, parents".to_string()
        )]
    );
    assert_eq!(requests[1].url, format!("{API}/F1?alt=media"));
}

#[tokio::test]
async fn read_skips_content_for_folders_and_info_only() {
    let replay = Arc::new(Replay::new([
        ok_json(json!({"id": "D1", "mimeType": FOLDER_MIME_TYPE})),
        ok_json(json!({"id": "F1", "mimeType": "text/plain"})),
    ]));
    let drive = service(&replay);

    assert_eq!(drive.read("D1", false).await.unwrap().content, None);
    assert_eq!(drive.read("F1", true).await.unwrap().content, None);
    assert_eq!(replay.requests.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn update_patches_only_given_fields() {
    let replay = Arc::new(Replay::new([
        ok_json(json!({"id": "F1", "name": "renamed", "mimeType": "text/plain"})),
        HttpResponse::new(200).with_header("Location", "https://upload.test/session/2"),
        ok_json(json!({"id": "F1"})),
    ]));

    let file = service(&replay)
        .update(UpdateFile::new("F1").name("renamed").content("hey"))
        .await
        .unwrap();

    assert_eq!(file.name, "renamed");
    let requests = replay.requests.lock().unwrap();
    assert_eq!(requests[0].url, format!("{API}/F1"));
    assert_eq!(body_json(&requests[0]), json!({"name": "renamed"}));
    assert_eq!(requests[1].header_value("X-Upload-Content-Type"), Some("text/plain"));
    assert_eq!(requests[2].header_value("Content-Range"), Some("bytes 0-2/3"));
}

#[tokio::test]
async fn delete_and_api_errors() {
    let replay = Arc::new(Replay::new([
        HttpResponse::new(204),
        HttpResponse::new(404).with_body("File not found: F9"),
    ]));
    let drive = service(&replay);

    drive.delete("F1").await.unwrap();
    let err = drive.delete("F9").await.unwrap_err();

    assert!(matches!(&err, DriveError::Api { status: 404, body } if body.contains("F9")));
    assert_eq!(err.status(), Some(404));
    assert_eq!(replay.requests.lock().unwrap()[0].method, Method::Delete);
}

#[tokio::test]
async fn add_to_folder_moves_between_parents() {
    let replay = Arc::new(Replay::new([
        ok_json(json!({"id": "F1", "parents": ["A", "B"]})),
        ok_json(json!({"id": "F1"})),
    ]));

    let parents = service(&replay)
        .add_to_folder("F1", "C", Some("A"), false)
        .await
        .unwrap();

    assert_eq!(parents, vec!["B", "C"]);
    let requests = replay.requests.lock().unwrap();
    assert_eq!(requests[1].method, Method::Patch);
    assert_eq!(
        query_of(&requests[1].url),
        vec![
            ("addParents".to_string(), "C".to_string()),
            ("removeParents".to_string(), "A".to_string()),
        ]
    );
}

#[tokio::test]
async fn add_to_folder_exclusive() {
    let replay = Arc::new(Replay::new([
        ok_json(json!({"id": "F1", "parents": ["A", "B"]})),
        ok_json(json!({"id": "F1"})),
    ]));

    let parents = service(&replay).add_to_folder("F1", "C", None, true).await.unwrap();

    assert_eq!(parents, vec!["C"]);
    let requests = replay.requests.lock().unwrap();
    assert_eq!(
        query_of(&requests[1].url),
        vec![
            ("addParents".to_string(), "C".to_string()),
            ("removeParents".to_string(), "A,B".to_string()),
        ]
    );
}

#[tokio::test]
async fn list_filters_by_mime_type() {
    let replay = Arc::new(Replay::new([ok_json(json!({
        "files": [{"id": "1", "name": "a.png", "mimeType": "image/png"}],
        "nextPageToken": "p2"
    }))]));

    let page = service(&replay)
        .list(&ListOptions::default().folder("F").mime_type("image/*"))
        .await
        .unwrap();

    assert_eq!(page.files.len(), 1);
    assert_eq!(page.next_page_token.as_deref(), Some("p2"));
    let requests = replay.requests.lock().unwrap();
    let params = query_of(&requests[0].url);
    assert_eq!(
        params[0],
        (
            "q".to_string(),
            format!("'F' in parents and ( mimeType = '{FOLDER_MIME_TYPE}' or mimeType contains 'image/' )")
        )
    );
    assert_eq!(
        params[1].1,
        "nextPageToken, files(id, name, parents, mimeType, thumbnailLink, webViewLink)"
    );
    assert_eq!(params[2], ("orderBy".to_string(), "folder,name_natural".to_string()));
    assert_eq!(params[3], ("pageSize".to_string(), "100".to_string()));
}

#[tokio::test]
async fn list_filters_by_extension_and_pages() {
    let replay = Arc::new(Replay::new([ok_json(json!({"files": []}))]));

    service(&replay)
        .list(&ListOptions::default().file_extension("md").page_token("p2"))
        .await
        .unwrap();

    let requests = replay.requests.lock().unwrap();
    let params = query_of(&requests[0].url);
    assert_eq!(
        params[0].1,
        format!("'root' in parents and ( mimeType = '{FOLDER_MIME_TYPE}' or fileExtension = 'md' )")
    );
    assert_eq!(params.last().unwrap(), &("pageToken".to_string(), "p2".to_string()));
}

#[tokio::test]
async fn search_renders_query_and_fields() {
    let replay = Arc::new(Replay::new([ok_json(json!({"files": [{"id": "9"}]}))]));
    let query = Query::all([
        Term::new("name", "Project").operator(Operator::Contains).into(),
        Term::new("trashed", false).into(),
    ]);

    let page = service(&replay)
        .search(
            &SearchOptions::new(query)
                .fields(Fields::of(["files"]))
                .page_size(10),
        )
        .await
        .unwrap();

    assert_eq!(page.files[0].id, "9");
    let requests = replay.requests.lock().unwrap();
    assert_eq!(
        query_of(&requests[0].url),
        vec![
            ("q".to_string(), "name contains 'Project' and trashed = false".to_string()),
            ("fields".to_string(), "files".to_string()),
            ("pageSize".to_string(), "10".to_string()),
        ]
    );
}

#[tokio::test]
async fn invalid_query_never_reaches_the_network() {
    let replay = Arc::new(Replay::default());
    let query = Query::from(Term::new("properties", "x").operator(Operator::Has));

    let err = service(&replay).search(&SearchOptions::new(query)).await.unwrap_err();

    assert!(matches!(err, DriveError::Query(_)));
    assert!(replay.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn transport_failure_is_reported() {
    let replay = Arc::new(Replay::default());

    let err = service(&replay).delete("F1").await.unwrap_err();

    assert!(matches!(err, DriveError::Transport(_)));
}
