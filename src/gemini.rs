//! Client for the Google Gemini generateContent API.
//!
//! One blocking request per call, with a configurable timeout and a bounded
//! retry policy for transient transport failures. Failures come back as
//! classified [`ApiErrorKind`] values so callers can branch without string
//! inspection.

use crate::{
    config::Config,
    error::{ApiErrorKind, Error, Result},
};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

const API_URL_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const SYSTEM_INSTRUCTION: &str = "You are an expert code reviewer and linter. Analyze the \
following multi-language codebase provided below. Identify high-level, cross-file patterns, \
potential areas for refactoring, and inconsistencies in coding style or logic. Do not suggest \
trivial fixes. Focus on architectural improvements or repeated code that could be abstracted. \
Provide 3-5 actionable suggestions. For each suggestion, specify the relevant file(s) and \
provide a clear explanation of the issue and your proposed improvement.";

const VALIDATION_PROMPT: &str =
    "Hello, can you respond with 'API key is working' if you receive this message?";

/// Fixed reply when there is nothing to send to the model.
pub const NO_CONTENT_MESSAGE: &str = "No code content provided for analysis.";

const RETRY_BASE_DELAY: Duration = Duration::from_millis(400);
const RETRY_MAX_DELAY: Duration = Duration::from_secs(8);

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,

    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,

    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateContentRequest {
    fn analysis(prompt: &str, temperature: f64) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            system_instruction: Some(Content {
                parts: vec![Part {
                    text: SYSTEM_INSTRUCTION.to_string(),
                }],
            }),
            generation_config: Some(GenerationConfig { temperature }),
        }
    }

    fn validation() -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: VALIDATION_PROMPT.to_string(),
                }],
            }],
            system_instruction: None,
            generation_config: None,
        }
    }
}

/// Blocking client for the Gemini generative-language endpoint.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    validation_model: String,
    temperature: f64,
    max_attempts: u32,
}

impl GeminiClient {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(15))
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                Error::api(
                    ApiErrorKind::Network,
                    format!("Failed to create HTTP client: {e}"),
                )
            })?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            validation_model: config.validation_model.clone(),
            temperature: config.temperature,
            max_attempts: config.max_attempts,
        })
    }

    /// Requests architectural suggestions for the aggregated codebase.
    ///
    /// Empty or whitespace-only input short-circuits with the fixed
    /// [`NO_CONTENT_MESSAGE`] and no network call is made.
    ///
    /// # Errors
    ///
    /// Returns a classified [`Error::Api`] on any transport, auth, quota or
    /// response-shape failure.
    pub fn get_suggestions(&self, code_context: &str) -> Result<String> {
        if code_context.trim().is_empty() {
            return Ok(NO_CONTENT_MESSAGE.to_string());
        }

        info!("Analyzing codebase with Gemini ({})...", self.model);

        let prompt = format!("Codebase: {code_context}");
        let request = GenerateContentRequest::analysis(&prompt, self.temperature);

        let text = self.query_with_retries(&self.model, &request)?;

        info!("Analysis complete");
        Ok(text)
    }

    /// Confirms the credential is accepted by the service.
    ///
    /// Makes one cheap call against the validation model variant; any
    /// failure, including an empty reply, yields `false`.
    #[must_use]
    pub fn validate_api_key(&self) -> bool {
        let request = GenerateContentRequest::validation();
        match self.query_once(&self.validation_model, &request) {
            Ok(text) => !text.trim().is_empty(),
            Err(e) => {
                debug!("API key validation failed: {}", e);
                false
            }
        }
    }

    /// Issues the request, retrying transient failures with exponential
    /// backoff up to the configured attempt limit.
    fn query_with_retries(&self, model: &str, request: &GenerateContentRequest) -> Result<String> {
        let mut attempt: u32 = 1;

        loop {
            match self.query_once(model, request) {
                Ok(text) => return Ok(text),
                Err(e) => {
                    if attempt >= self.max_attempts || !is_retryable(&e) {
                        return Err(e);
                    }

                    let delay = backoff_delay(attempt);
                    warn!(
                        "Transient API failure (attempt {}/{}), retrying in {:?}: {}",
                        attempt, self.max_attempts, delay, e
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
            }
        }
    }

    /// Single request attempt. No retries here.
    fn query_once(&self, model: &str, request: &GenerateContentRequest) -> Result<String> {
        let url = format!("{API_URL_BASE}/{model}:generateContent");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let kind = classify_http_failure(status, &body);
            return Err(Error::api(
                kind,
                format!("HTTP {status}: {}", self.censor(&body)),
            ));
        }

        let parsed: GenerateContentResponse = response.json().map_err(|e| {
            Error::api(
                ApiErrorKind::InvalidResponse,
                format!("Failed to parse Gemini response: {}", self.censor(&e.to_string())),
            )
        })?;

        extract_text(&parsed)
    }

    fn transport_error(&self, e: &reqwest::Error) -> Error {
        let kind = if e.is_connect() || e.is_timeout() {
            ApiErrorKind::Network
        } else {
            classify_message(&e.to_string())
        };
        Error::api(kind, self.censor(&e.to_string()))
    }

    /// Replaces the credential with a short suffix wherever it leaked into
    /// an error string.
    fn censor(&self, message: &str) -> String {
        if self.api_key.is_empty() {
            return message.to_string();
        }

        // Keep the last two characters, not bytes: the key may end in a
        // multi-byte character and slicing there would panic.
        let censored_key = match self.api_key.char_indices().nth_back(2) {
            Some((idx, c)) => format!("...{}", &self.api_key[idx + c.len_utf8()..]),
            None => "...".to_string(),
        };

        message.replace(&self.api_key, &censored_key)
    }
}

/// Concatenates the text parts of the first candidate.
fn extract_text(response: &GenerateContentResponse) -> Result<String> {
    let parts = response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|c| c.parts.as_slice())
        .ok_or_else(|| {
            Error::api(
                ApiErrorKind::InvalidResponse,
                "Could not find content parts in Gemini response.",
            )
        })?;

    let text: String = parts.iter().map(|p| p.text.as_str()).collect();

    if text.trim().is_empty() {
        return Err(Error::api(
            ApiErrorKind::EmptyResponse,
            "No response text received from Gemini API.",
        ));
    }

    Ok(text.trim().to_string())
}

/// Maps an HTTP failure to an error category.
///
/// Status codes take precedence; the keyword table from the error body is a
/// best-effort fallback, not structured classification.
fn classify_http_failure(status: StatusCode, body: &str) -> ApiErrorKind {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiErrorKind::Auth,
        StatusCode::TOO_MANY_REQUESTS => ApiErrorKind::Quota,
        _ => match classify_message(body) {
            ApiErrorKind::Http => ApiErrorKind::Http,
            kind => kind,
        },
    }
}

/// Keyword-based classification of an error message.
fn classify_message(message: &str) -> ApiErrorKind {
    let upper = message.to_uppercase();
    if upper.contains("API_KEY") || upper.contains("API KEY NOT VALID") {
        ApiErrorKind::Auth
    } else if upper.contains("QUOTA") {
        ApiErrorKind::Quota
    } else if upper.contains("NETWORK") {
        ApiErrorKind::Network
    } else {
        ApiErrorKind::Http
    }
}

/// Transient failures worth another attempt: connection-level problems and
/// the usual retryable status codes.
fn is_retryable(error: &Error) -> bool {
    match error {
        Error::Api {
            kind: ApiErrorKind::Network,
            ..
        } => true,
        Error::Api { message, .. } => ["HTTP 408", "HTTP 429", "HTTP 500", "HTTP 502", "HTTP 503", "HTTP 504"]
            .iter()
            .any(|prefix| message.starts_with(prefix)),
        _ => false,
    }
}

fn backoff_delay(attempt: u32) -> Duration {
    let exp = attempt.saturating_sub(1).min(6);
    let delay = RETRY_BASE_DELAY * 2u32.pow(exp);
    delay.min(RETRY_MAX_DELAY)
}
