//! Archive API response models.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

/// Response body of the search endpoint.
///
/// `results` is mandatory: a body without it (the server writes a bare
/// error object on failure) must fail to parse so the UI can fall back
/// to its no-results message.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<EpisodeResult>,
    #[serde(default)]
    pub count: usize,
}

/// A single search result card.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeResult {
    pub title: String,
    pub episode_hash: String,
}

fn episode_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"(?i)ASOT\s+(\d+)").unwrap())
}

impl EpisodeResult {
    /// Extract the episode number from the result title.
    ///
    /// Only titles naming an episode (`ASOT <digits>`, case-insensitive)
    /// are offered a play control; the captured digit group is passed
    /// verbatim into the audio URL.
    pub fn episode_number(&self) -> Option<&str> {
        episode_regex()
            .captures(&self.title)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn episode_number_from_title() {
        let result = EpisodeResult {
            title: String::from("ASOT 950 - Tracklist"),
            episode_hash: String::from("abc123"),
        };
        assert_eq!(result.episode_number(), Some("950"));
    }

    #[test]
    fn episode_number_is_case_insensitive() {
        let result = EpisodeResult {
            title: String::from("asot 1005: Armin van Buuren"),
            episode_hash: String::new(),
        };
        assert_eq!(result.episode_number(), Some("1005"));
    }

    #[test]
    fn titles_without_episode_get_no_play_control() {
        let result = EpisodeResult {
            title: String::from("A State of Trance yearmix"),
            episode_hash: String::new(),
        };
        assert_eq!(result.episode_number(), None);
    }

    #[test]
    fn parses_search_response() {
        let body = r#"{"results":[{"title":"ASOT 950: Intro","episodeHash":"d4e5"}],"count":1}"#;
        let parsed: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.count, 1);
        assert_eq!(parsed.results[0].episode_hash, "d4e5");
        assert_eq!(parsed.results[0].episode_number(), Some("950"));
    }

    #[test]
    fn error_body_without_results_fails_to_parse() {
        // Shape the server writes when marshalling fails
        let body = r#"{"results":"Unable to marshal result: boom"}"#;
        assert!(serde_json::from_str::<SearchResponse>(body).is_err());
    }
}
