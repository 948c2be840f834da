//! HTTP collaborator clients for a companion reader service.
//!
//! Wire shapes follow the service's REST API: `/api/list-files`,
//! `/api/read-file`, `/api/summarize`, `/api/describe-image`. Any transport or
//! status failure surfaces as `CollabError::Unavailable`, which the engine
//! absorbs with a local fallback.

use crate::collab::{CollabError, DigestService, FileEntry, FileSource, LocalDigest};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Cap on text shipped to the remote summarizer.
const SUMMARIZE_CHAR_CAP: usize = 3000;

fn build_client() -> Result<reqwest::Client, CollabError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(20))
        .build()
        .map_err(|e| CollabError::Unavailable(e.to_string()))
}

#[derive(Debug, Deserialize)]
struct FileListing {
    files: Vec<RemoteFile>,
}

#[derive(Debug, Deserialize)]
struct RemoteFile {
    name: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Deserialize)]
struct TextResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    summary: String,
}

#[derive(Debug, Deserialize)]
struct DescriptionResponse {
    description: String,
}

/// Document listing and retrieval over HTTP.
#[derive(Debug, Clone)]
pub struct RemoteLibrary {
    base_url: String,
    client: reqwest::Client,
}

impl RemoteLibrary {
    pub fn new(base_url: impl Into<String>) -> Result<Self, CollabError> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: build_client()?,
        })
    }
}

#[async_trait]
impl FileSource for RemoteLibrary {
    async fn scan(&self) -> Result<Vec<FileEntry>, CollabError> {
        let url = format!("{}/api/list-files", self.base_url);
        let res = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CollabError::Unavailable(e.to_string()))?;
        if !res.status().is_success() {
            return Err(CollabError::Unavailable(format!(
                "list-files returned {}",
                res.status()
            )));
        }
        let listing: FileListing = res
            .json()
            .await
            .map_err(|e| CollabError::Unavailable(e.to_string()))?;
        Ok(listing
            .files
            .into_iter()
            .map(|f| FileEntry {
                name: f.name,
                kind: f.kind,
                icon: f.icon,
            })
            .collect())
    }

    async fn load_text(&self, name: &str) -> Result<String, CollabError> {
        let url = format!("{}/api/read-file", self.base_url);
        let res = self
            .client
            .get(&url)
            .query(&[("name", name)])
            .send()
            .await
            .map_err(|e| CollabError::Unavailable(e.to_string()))?;
        if res.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(CollabError::NotFound(name.to_string()));
        }
        if !res.status().is_success() {
            return Err(CollabError::Unavailable(format!(
                "read-file returned {}",
                res.status()
            )));
        }
        let body: TextResponse = res
            .json()
            .await
            .map_err(|e| CollabError::Unavailable(e.to_string()))?;
        Ok(body.text)
    }
}

/// Summaries and media descriptions over HTTP; the remaining digest verbs run
/// on the local heuristics, which the companion service does not expose.
pub struct RemoteDigest {
    base_url: String,
    client: reqwest::Client,
    local: LocalDigest,
}

impl RemoteDigest {
    pub fn new(base_url: impl Into<String>) -> Result<Self, CollabError> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: build_client()?,
            local: LocalDigest,
        })
    }
}

#[async_trait]
impl DigestService for RemoteDigest {
    async fn summarize(&self, text: &str, language: &str) -> Result<String, CollabError> {
        let url = format!("{}/api/summarize", self.base_url);
        let capped: String = text.chars().take(SUMMARIZE_CHAR_CAP).collect();
        let res = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "text": capped, "language": language }))
            .send()
            .await
            .map_err(|e| CollabError::Unavailable(e.to_string()))?;
        if !res.status().is_success() {
            return Err(CollabError::Unavailable(format!(
                "summarize returned {}",
                res.status()
            )));
        }
        let body: SummaryResponse = res
            .json()
            .await
            .map_err(|e| CollabError::Unavailable(e.to_string()))?;
        Ok(body.summary)
    }

    async fn explain(&self, text: &str) -> Result<String, CollabError> {
        self.local.explain(text).await
    }

    async fn key_points(&self, text: &str) -> Result<String, CollabError> {
        self.local.key_points(text).await
    }

    async fn describe_media(&self, kind: &str, context: &str) -> Result<String, CollabError> {
        let url = format!("{}/api/describe-image", self.base_url);
        let res = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "context": context }))
            .send()
            .await
            .map_err(|e| CollabError::Unavailable(e.to_string()))?;
        if !res.status().is_success() {
            return self.local.describe_media(kind, context).await;
        }
        let body: DescriptionResponse = res
            .json()
            .await
            .map_err(|e| CollabError::Unavailable(e.to_string()))?;
        Ok(body.description)
    }

    async fn answer(&self, question: &str, context: &str) -> Result<String, CollabError> {
        self.local.answer(question, context).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_listing_wire_shape() {
        let json = r#"{"files":[{"name":"Maths Notes","type":"PDF","icon":"📄"},{"name":"Loose"}]}"#;
        let listing: FileListing = serde_json::from_str(json).unwrap();
        assert_eq!(listing.files.len(), 2);
        assert_eq!(listing.files[0].kind, "PDF");
        assert_eq!(listing.files[1].kind, "");
    }

    #[test]
    fn summary_and_description_wire_shapes() {
        let s: SummaryResponse = serde_json::from_str(r#"{"summary":"short"}"#).unwrap();
        assert_eq!(s.summary, "short");
        let d: DescriptionResponse =
            serde_json::from_str(r#"{"description":"a chart"}"#).unwrap();
        assert_eq!(d.description, "a chart");
    }

    #[test]
    fn base_url_is_normalized() {
        let lib = RemoteLibrary::new("http://localhost:8000/").unwrap();
        assert_eq!(lib.base_url, "http://localhost:8000");
    }
}
