// Client for the hosted moderations API.
//
// POSTs the content with a bearer credential and maps the first result
// into the core OracleVerdict shape. The request timeout is fixed at
// construction; there are no retries.

use crate::core::moderation::{ModerationOracle, OracleError, OracleVerdict};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const REQUEST_TIMEOUT_SECS: u64 = 5;

pub struct OpenAiModerationClient {
    client: Client,
    api_key: String,
    base_url: String,
}

/// Wire shape of a moderations response. Each result element already
/// matches `OracleVerdict`.
#[derive(Debug, Deserialize)]
struct ModerationsResponse {
    results: Vec<OracleVerdict>,
}

impl OpenAiModerationClient {
    pub fn new(api_key: String) -> Result<Self, reqwest::Error> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point the client at a different endpoint, e.g. a local stub in tests.
    pub fn with_base_url(
        api_key: String,
        base_url: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl ModerationOracle for OpenAiModerationClient {
    async fn review(&self, content: &str) -> Result<OracleVerdict, OracleError> {
        let url = format!("{}/moderations", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&json!({ "input": content }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await?;
            return Err(format!("Moderations API error: {} - {}", status, text).into());
        }

        let body: ModerationsResponse = response.json().await?;

        body.results
            .into_iter()
            .next()
            .ok_or_else(|| "Moderations API returned no results".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_moderations_response() {
        let raw = r#"{
            "id": "modr-1234",
            "model": "text-moderation-007",
            "results": [{
                "flagged": true,
                "categories": {"harassment": true, "violence": false},
                "category_scores": {"harassment": 0.91, "violence": 0.02}
            }]
        }"#;

        let parsed: ModerationsResponse = serde_json::from_str(raw).unwrap();
        let verdict = &parsed.results[0];

        assert!(verdict.flagged);
        assert_eq!(verdict.categories.get("harassment"), Some(&true));
        assert_eq!(verdict.category_scores.get("harassment"), Some(&0.91));
    }

    #[test]
    fn missing_score_maps_default_to_empty() {
        let raw = r#"{"results": [{"flagged": false}]}"#;

        let parsed: ModerationsResponse = serde_json::from_str(raw).unwrap();

        assert!(!parsed.results[0].flagged);
        assert!(parsed.results[0].categories.is_empty());
        assert!(parsed.results[0].category_scores.is_empty());
    }
}
