use std::fs::File;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::{AUTHORIZATION, CONTENT_RANGE, CONTENT_TYPE, LOCATION, RANGE};
use serde::Serialize;

use crate::foundation::error::{SpotDiffError, SpotDiffResult};
use crate::publish::credentials::Credentials;
use crate::publish::resumable::{ChunkOutcome, ResumableUpload, UploadTransport, next_offset_from_range};

pub const UPLOAD_URL: &str = "https://www.googleapis.com/upload/youtube/v3/videos";
/// "Education".
pub const CATEGORY_ID: &str = "24";
pub const DEFAULT_TITLE: &str = "脳トレ間違い探し";
pub const DEFAULT_TAGS: [&str; 3] = ["間違い探し", "脳トレ", "SpotTheDifference"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    #[default]
    Private,
    Unlisted,
    Public,
}

impl Privacy {
    /// Wire value for `privacyStatus`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Unlisted => "unlisted",
            Self::Public => "public",
        }
    }
}

impl FromStr for Privacy {
    type Err = SpotDiffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(Self::Private),
            "unlisted" => Ok(Self::Unlisted),
            "public" => Ok(Self::Public),
            other => Err(SpotDiffError::validation(format!(
                "privacy must be private, unlisted or public (got '{other}')"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub privacy: Privacy,
}

impl Default for VideoMetadata {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            description: String::new(),
            tags: DEFAULT_TAGS.iter().map(|t| t.to_string()).collect(),
            privacy: Privacy::Private,
        }
    }
}

impl VideoMetadata {
    /// `videos.insert` request body.
    pub fn to_request_body(&self) -> serde_json::Value {
        serde_json::json!({
            "snippet": {
                "title": self.title,
                "description": self.description,
                "tags": self.tags,
                "categoryId": CATEGORY_ID,
            },
            "status": {"privacyStatus": self.privacy.as_str()},
        })
    }
}

/// Something that can take a finished video file and return the platform's id for it.
pub trait Publisher {
    fn publish(&mut self, video: &Path, meta: &VideoMetadata) -> SpotDiffResult<String>;
}

/// Uploads through the YouTube Data API resumable protocol.
pub struct YouTubePublisher {
    credentials: Credentials,
    client: Client,
    upload: ResumableUpload,
}

impl YouTubePublisher {
    /// Create a publisher. No network traffic happens until [`Publisher::publish`].
    pub fn new(credentials: Credentials) -> SpotDiffResult<Self> {
        let client = Client::builder()
            // 308 here means "resume incomplete", not a redirect
            .redirect(reqwest::redirect::Policy::none())
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| SpotDiffError::publish(format!("build http client: {e}")))?;
        Ok(Self {
            credentials,
            client,
            upload: ResumableUpload::default(),
        })
    }

    /// A usable access token, refreshed when a refresh token is available.
    fn access_token(&self) -> SpotDiffResult<String> {
        let Some(refresh) = &self.credentials.token.refresh_token else {
            return Ok(self.credentials.token.token.clone());
        };
        let c = &self.credentials.client;
        let resp = self
            .client
            .post(&c.token_uri)
            .form(&[
                ("client_id", c.client_id.as_str()),
                ("client_secret", c.client_secret.as_str()),
                ("refresh_token", refresh.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .map_err(|e| SpotDiffError::publish(format!("token refresh request: {e}")))?;
        let body = json_body(expect_success(resp, "token refresh")?)?;
        body.get("access_token")
            .and_then(|v| v.as_str())
            .map(str::to_owned)
            .ok_or_else(|| SpotDiffError::publish("token refresh response has no access_token"))
    }

    fn start_session(&self, token: &str, meta: &VideoMetadata, total: u64) -> SpotDiffResult<String> {
        let resp = self
            .client
            .post(UPLOAD_URL)
            .query(&[("uploadType", "resumable"), ("part", "snippet,status")])
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header("X-Upload-Content-Type", "video/mp4")
            .header("X-Upload-Content-Length", total.to_string())
            .json(&meta.to_request_body())
            .send()
            .map_err(|e| SpotDiffError::publish(format!("start upload session: {e}")))?;
        let resp = expect_success(resp, "start upload session")?;
        resp.headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .ok_or_else(|| SpotDiffError::publish("upload session response has no Location header"))
    }
}

impl Publisher for YouTubePublisher {
    #[tracing::instrument(skip(self, meta), fields(title = %meta.title, privacy = meta.privacy.as_str()))]
    fn publish(&mut self, video: &Path, meta: &VideoMetadata) -> SpotDiffResult<String> {
        let mut file = File::open(video).map_err(|e| {
            SpotDiffError::publish(format!("open '{}': {e}", video.display()))
        })?;
        let total = file
            .metadata()
            .map_err(|e| SpotDiffError::publish(format!("stat '{}': {e}", video.display())))?
            .len();

        let token = self.access_token()?;
        let session_url = self.start_session(&token, meta, total)?;
        tracing::info!(bytes = total, "upload session started");

        let mut transport = HttpTransport {
            client: &self.client,
            session_url,
            token,
        };
        let body = self.upload.run(&mut file, total, &mut transport)?;
        let id = body
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| SpotDiffError::publish("upload response has no video id"))?;
        tracing::info!(video_id = id, "video published");
        Ok(id.to_string())
    }
}

struct HttpTransport<'a> {
    client: &'a Client,
    session_url: String,
    token: String,
}

impl HttpTransport<'_> {
    fn send(&self, content_range: String, body: Vec<u8>) -> SpotDiffResult<ChunkOutcome> {
        let sent = self
            .client
            .put(&self.session_url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(CONTENT_TYPE, "video/mp4")
            .header(CONTENT_RANGE, content_range)
            .body(body)
            .send();
        let resp = match sent {
            Ok(resp) => resp,
            Err(e) => return Ok(ChunkOutcome::Retryable(e.to_string())),
        };
        classify(resp)
    }
}

impl UploadTransport for HttpTransport<'_> {
    fn put_chunk(&mut self, offset: u64, bytes: &[u8], total: u64) -> SpotDiffResult<ChunkOutcome> {
        let end = offset + bytes.len() as u64 - 1;
        self.send(format!("bytes {offset}-{end}/{total}"), bytes.to_vec())
    }

    fn query_status(&mut self, total: u64) -> SpotDiffResult<ChunkOutcome> {
        self.send(format!("bytes */{total}"), Vec::new())
    }
}

fn classify(resp: Response) -> SpotDiffResult<ChunkOutcome> {
    let status = resp.status();
    if status == StatusCode::PERMANENT_REDIRECT {
        let range = resp.headers().get(RANGE).and_then(|v| v.to_str().ok());
        return Ok(ChunkOutcome::Incomplete {
            next_offset: next_offset_from_range(range)?,
        });
    }
    if status.is_success() {
        return Ok(ChunkOutcome::Complete(json_body(resp)?));
    }
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        return Ok(ChunkOutcome::Retryable(format!("http {status}")));
    }
    let text = resp.text().unwrap_or_default();
    Err(SpotDiffError::publish(format!("upload rejected with {status}: {text}")))
}

fn expect_success(resp: Response, what: &str) -> SpotDiffResult<Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let text = resp.text().unwrap_or_default();
    Err(SpotDiffError::publish(format!("{what} failed with {status}: {text}")))
}

fn json_body(resp: Response) -> SpotDiffResult<serde_json::Value> {
    resp.json()
        .map_err(|e| SpotDiffError::publish(format!("decode response body: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/publish/youtube.rs"]
mod tests;
