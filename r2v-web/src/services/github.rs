//! GitHub README fetching and rendering

use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use pulldown_cmark::{html, Options, Parser};
use regex::Regex;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

use super::api_client::{ApiClient, ClientError};

static REPO_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"github\.com/([^/?#]+/[^/?#]+)").expect("valid regex"));

/// README retrieval failures
#[derive(Debug, Error)]
pub enum ReadmeError {
    #[error("GitHub repository path not configured")]
    NotConfigured,

    #[error("Invalid GitHub repository URL format")]
    InvalidRepoUrl,

    #[error("Failed to fetch README: {0}")]
    Fetch(u16),

    #[error("Failed to load README: {0}")]
    Transport(String),

    #[error("README content could not be decoded: {0}")]
    Decode(String),
}

impl From<ClientError> for ReadmeError {
    fn from(err: ClientError) -> Self {
        match err.status() {
            Some(status) => ReadmeError::Fetch(status),
            None => ReadmeError::Transport(err.to_string()),
        }
    }
}

/// Rendered README
#[derive(Debug, Clone, Serialize)]
pub struct Readme {
    pub repo_url: String,
    pub markdown: String,
    pub html: String,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    content: String,
}

/// Normalize a configured repository into `owner/repo`
///
/// Accepts `owner/repo` as-is, or any URL containing `github.com/owner/repo`.
/// A trailing `.git` is dropped.
pub fn parse_repo_path(raw: &str) -> Result<String, ReadmeError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ReadmeError::NotConfigured);
    }

    let path = if raw.contains("github.com/") {
        REPO_URL_RE
            .captures(raw)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or(ReadmeError::InvalidRepoUrl)?
    } else {
        raw.trim_matches('/').to_string()
    };

    Ok(path.trim_end_matches(".git").to_string())
}

/// Decode the base64 `content` field of the contents API
///
/// GitHub wraps the payload at 60 columns; whitespace is ignored.
pub fn decode_content(encoded: &str) -> Result<String, ReadmeError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| ReadmeError::Decode(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ReadmeError::Decode(e.to_string()))
}

/// Render GitHub-flavoured markdown to sanitized HTML
///
/// Tables, strikethrough and task lists are enabled. Raw HTML in the source
/// passes through the sanitizer, which strips scripts, event handlers and
/// other unsafe markup.
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options);
    let mut unsafe_html = String::new();
    html::push_html(&mut unsafe_html, parser);

    ammonia::clean(&unsafe_html)
}

/// GitHub REST client for repository READMEs
pub struct GitHubClient {
    api: ApiClient,
}

impl GitHubClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Ok(Self {
            api: ApiClient::new(base_url)?,
        })
    }

    /// Fetch, decode and render the README of `repo`
    ///
    /// `repo` may be `None` when the service has no repository configured.
    pub async fn fetch_readme(&self, repo: Option<&str>) -> Result<Readme, ReadmeError> {
        let repo_path = parse_repo_path(repo.unwrap_or_default())?;
        let endpoint = format!("/repos/{}/readme", repo_path);
        debug!(repo = %repo_path, "Fetching README");

        let request = self
            .api
            .third_party(Method::GET, &endpoint)
            .header("Accept", "application/vnd.github+json");

        let response: ContentResponse = self.api.send_json(request).await.map_err(|e| {
            error!(repo = %repo_path, error = %e, "Error fetching README");
            ReadmeError::from(e)
        })?;

        let markdown = decode_content(&response.content)?;
        let html = render_markdown(&markdown);

        Ok(Readme {
            repo_url: format!("https://github.com/{}", repo_path),
            markdown,
            html,
        })
    }
}
