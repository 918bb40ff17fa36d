use std::sync::OnceLock;
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::JudgmentConfig;
use crate::workflows::partners::sanitize::redact;

use super::prompts::{assessment_prompt, outreach_prompt, system_preamble};
use super::validation::{
    validate_judgment, validate_outreach, JudgmentValidationError, RawJudgment, RawOutreachDraft,
};
use super::{AssessmentRequest, JudgmentError, JudgmentSource, OutreachRequest};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_MAX_RETRIES: u32 = 4;
const MAX_BACKOFF: Duration = Duration::from_secs(16);
const ERROR_BODY_CHARS: usize = 300;

/// Chat-completions client in JSON mode.
///
/// Uses the blocking reqwest client, so calls must run off the async executor. The client is
/// built on first use for the same reason.
pub struct OpenAiJudgmentSource {
    client: OnceLock<Client>,
    api_key: String,
    model: String,
    base_url: String,
    max_retries: u32,
    backoff: Duration,
}

impl std::fmt::Debug for OpenAiJudgmentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiJudgmentSource")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl OpenAiJudgmentSource {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: OnceLock::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into(),
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: Duration::from_secs(1),
        }
    }

    /// Returns `None` when no API key is configured.
    pub fn from_config(config: &JudgmentConfig) -> Option<Self> {
        config
            .api_key
            .as_ref()
            .map(|key| Self::new(key.clone(), config.model.clone(), config.base_url.clone()))
    }

    /// Retry budget and the first backoff step; later steps double up to 16s.
    pub fn with_retries(mut self, max_retries: u32, backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.backoff = backoff;
        self
    }

    fn client(&self) -> Result<&Client, JudgmentError> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| JudgmentError::Transport(err.to_string()))?;
        Ok(self.client.get_or_init(|| client))
    }

    fn complete(&self, user: &str) -> Result<String, JudgmentError> {
        let body = json!({
            "model": self.model,
            "temperature": 0.2,
            "messages": [
                { "role": "system", "content": system_preamble() },
                { "role": "user", "content": user },
            ],
            "response_format": { "type": "json_object" },
        });

        let response = self
            .client()?
            .post(format!(
                "{}/chat/completions",
                self.base_url.trim_end_matches('/')
            ))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|err| JudgmentError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(JudgmentError::Backend {
                status: status.as_u16(),
                body: text.chars().take(ERROR_BODY_CHARS).collect(),
            });
        }

        let payload: Value = response
            .json()
            .map_err(|err| JudgmentError::Malformed(err.to_string()))?;
        payload
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| JudgmentError::Malformed("missing choices[0].message.content".to_string()))
    }

    /// Request, parse and check a payload, retrying with backoff until `check` accepts it.
    fn structured<T, F>(&self, prompt_name: &str, user: &str, check: F) -> Result<T, JudgmentError>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> Result<(), JudgmentValidationError>,
    {
        let mut attempt = 0;
        loop {
            let result = self
                .complete(user)
                .and_then(|text| parse_structured::<T>(&text))
                .and_then(|value| {
                    check(&value)?;
                    Ok(value)
                });
            match result {
                Ok(value) => {
                    debug!(prompt = prompt_name, attempt, model = %self.model, "judgment call succeeded");
                    return Ok(value);
                }
                Err(err) if attempt < self.max_retries => {
                    let delay = self
                        .backoff
                        .saturating_mul(2u32.saturating_pow(attempt))
                        .min(MAX_BACKOFF);
                    warn!(prompt = prompt_name, attempt, error = %err, "judgment call failed; retrying");
                    thread::sleep(delay);
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

fn parse_structured<T: DeserializeOwned>(text: &str) -> Result<T, JudgmentError> {
    let cleaned = redact(text);
    let cleaned = cleaned.trim();
    let candidate = extract_first_json(cleaned).unwrap_or(cleaned);
    let value: Value =
        serde_json::from_str(candidate).map_err(|err| JudgmentError::Malformed(err.to_string()))?;
    let value = match value {
        Value::Array(mut items) if items.len() == 1 => items.remove(0),
        other => other,
    };
    serde_json::from_value(value).map_err(|err| JudgmentError::Malformed(err.to_string()))
}

/// First balanced `{...}` or `[...]` block in `text`, ignoring any prose around it.
///
/// Bracket matching is naive: braces inside string literals are counted too.
pub fn extract_first_json(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return Some(trimmed);
    }

    let start = trimmed.find(['{', '['])?;
    let mut depth = 0usize;
    for (offset, ch) in trimmed[start..].char_indices() {
        match ch {
            '{' | '[' => depth += 1,
            '}' | ']' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if depth == 0 {
            return Some(&trimmed[start..start + offset + ch.len_utf8()]);
        }
    }
    None
}

impl JudgmentSource for OpenAiJudgmentSource {
    fn assess(&self, request: &AssessmentRequest) -> Result<RawJudgment, JudgmentError> {
        self.structured("score_candidate", &assessment_prompt(request), |raw: &RawJudgment| {
            validate_judgment(raw.clone()).map(drop)
        })
    }

    fn draft_outreach(&self, request: &OutreachRequest) -> Result<RawOutreachDraft, JudgmentError> {
        self.structured("outreach_draft", &outreach_prompt(request), |raw: &RawOutreachDraft| {
            validate_outreach(raw.clone()).map(drop)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::workflows::partners::domain::ProjectBrief;
    use crate::workflows::partners::judgment::baseline_judgment;

    fn request() -> AssessmentRequest {
        AssessmentRequest {
            brief: ProjectBrief::default(),
            candidate_name: "Klean Kanteen".to_string(),
            website: Some("https://www.kleankanteen.com/".to_string()),
            notes: Some("Quality reputation".to_string()),
            custom_data: BTreeMap::new(),
            evidence: Vec::new(),
        }
    }

    fn completion(content: &str) -> Value {
        json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] })
    }

    #[test]
    fn extracts_json_wrapped_in_prose() {
        assert_eq!(
            extract_first_json("Sure! {\"a\": {\"b\": 1}} trailing"),
            Some("{\"a\": {\"b\": 1}}")
        );
        assert_eq!(extract_first_json("[1, 2]"), Some("[1, 2]"));
        assert_eq!(extract_first_json("no json here"), None);
        assert_eq!(extract_first_json("open { never closed"), None);
    }

    #[test]
    fn parses_single_element_arrays() {
        let draft: RawOutreachDraft =
            parse_structured(r#"[{"subject": "Hi", "body": "Body text long enough"}]"#)
                .expect("parsed");
        assert_eq!(draft.subject, "Hi");
    }

    fn judgment_content(category_fit: i64) -> String {
        let mut raw = baseline_judgment();
        if let Some(scores) = raw.criterion_scores.as_mut() {
            scores.category_fit = Some(category_fit);
        }
        raw.next_step = Some("Email sales@kk.example about licensing".to_string());
        format!("Here you go: {}", serde_json::to_string(&raw).expect("serialise"))
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn assess_posts_chat_completion_and_parses_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(&judgment_content(5))))
            .expect(1)
            .mount(&server)
            .await;

        let source = OpenAiJudgmentSource::new("test-key", "gpt-4o-mini", format!("{}/v1", server.uri()))
            .with_retries(0, Duration::ZERO);
        let raw = tokio::task::spawn_blocking(move || source.assess(&request()))
            .await
            .expect("join")
            .expect("assessment");

        assert_eq!(
            raw.criterion_scores.and_then(|scores| scores.category_fit),
            Some(5)
        );
        assert_eq!(
            raw.next_step.as_deref(),
            Some("Email [REDACTED EMAIL] about licensing")
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn out_of_range_scores_are_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(&judgment_content(7))))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(&judgment_content(4))))
            .expect(1)
            .mount(&server)
            .await;

        let source = OpenAiJudgmentSource::new("test-key", "gpt-4o-mini", format!("{}/v1", server.uri()))
            .with_retries(2, Duration::ZERO);
        let raw = tokio::task::spawn_blocking(move || source.assess(&request()))
            .await
            .expect("join")
            .expect("assessment after retry");

        assert_eq!(
            raw.criterion_scores.and_then(|scores| scores.category_fit),
            Some(4)
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn rejected_payloads_surface_once_retries_run_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(&judgment_content(9))))
            .expect(2)
            .mount(&server)
            .await;

        let source = OpenAiJudgmentSource::new("test-key", "gpt-4o-mini", format!("{}/v1", server.uri()))
            .with_retries(1, Duration::ZERO);
        let error = tokio::task::spawn_blocking(move || source.assess(&request()))
            .await
            .expect("join")
            .expect_err("still out of range");

        assert!(matches!(
            error,
            JudgmentError::Rejected(JudgmentValidationError::ScoreOutOfRange { value: 9, .. })
        ));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn backend_errors_surface_after_retries() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .expect(2)
            .mount(&server)
            .await;

        let source = OpenAiJudgmentSource::new("test-key", "gpt-4o-mini", format!("{}/v1/", server.uri()))
            .with_retries(1, Duration::ZERO);
        let error = tokio::task::spawn_blocking(move || source.assess(&request()))
            .await
            .expect("join")
            .expect_err("backend failure");

        assert!(matches!(
            error,
            JudgmentError::Backend { status: 429, ref body } if body == "slow down"
        ));
    }
}
