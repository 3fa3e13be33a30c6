//! Archive API client implementation.

use reqwest::Client;
use thiserror::Error;

use super::models::{EpisodeResult, SearchResponse};

/// API client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Client for the episode archive endpoints.
#[derive(Debug, Clone)]
pub struct ArchiveClient {
    /// HTTP client
    client: Client,

    /// Base server URL
    base_url: String,
}

impl ArchiveClient {
    /// Create a new API client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build the URL for an archive endpoint with query parameters.
    fn build_url(&self, endpoint: &str, params: &[(&str, &str)]) -> String {
        let mut url = format!("{}/asot/{}", self.base_url, endpoint);

        let query: Vec<String> = params
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect();

        if !query.is_empty() {
            url.push('?');
            url.push_str(&query.join("&"));
        }
        url
    }

    /// Search the episode index.
    ///
    /// The query travels in the URL; the endpoint expects POST with an
    /// empty body.
    pub async fn search(&self, query: &str) -> Result<(Vec<EpisodeResult>, usize), ClientError> {
        let url = self.build_url("search", &[("query", query)]);

        let response = self.client.post(&url).send().await?;
        let text = response.text().await?;

        let parsed: SearchResponse = serde_json::from_str(&text).map_err(|e| {
            ClientError::InvalidResponse(format!(
                "Failed to parse response: {}. Body: {}",
                e,
                &text[..text.len().min(500)]
            ))
        })?;

        Ok((parsed.results, parsed.count))
    }

    /// Fetch the newline-delimited tracklist for an episode hash.
    pub async fn tracklist(&self, hash: &str) -> Result<String, ClientError> {
        let url = self.build_url("tracklist", &[("hash", hash)]);

        let response = self.client.get(&url).send().await?;
        Ok(response.text().await?)
    }

    /// Get the audio stream URL for an episode number.
    pub fn audio_url(&self, episode: &str) -> String {
        self.build_url("audio", &[("episode", episode)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_url_addresses_episode() {
        let client = ArchiveClient::new("http://localhost:8080");
        assert_eq!(
            client.audio_url("950"),
            "http://localhost:8080/asot/audio?episode=950"
        );
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = ArchiveClient::new("http://localhost:8080/");
        assert_eq!(
            client.audio_url("12"),
            "http://localhost:8080/asot/audio?episode=12"
        );
    }

    #[test]
    fn query_parameters_are_encoded() {
        let client = ArchiveClient::new("http://localhost");
        let url = client.build_url("search", &[("query", "armin van buuren")]);
        assert_eq!(url, "http://localhost/asot/search?query=armin%20van%20buuren");
    }
}
