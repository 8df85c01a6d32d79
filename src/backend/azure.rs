//! # Azure AI Language Backend
//!
//! HTTP client for the synchronous `analyze-text` sentiment task.
//!
//! Documents are submitted with their batch position as the document id. The
//! service answers with separate `documents` and `errors` lists, which are
//! stitched back into submission order; a position missing from both lists
//! fails the whole batch so it is retried on the next run.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

use super::{BackendError, BackendResult, SentimentBackend};
use crate::config::{BackendConfig, BackendCredentials};
use crate::error::{Result, SentimentError};
use crate::models::{AnalysisOutcome, ConfidenceScores, Sentiment};

/// Service limit on documents per synchronous sentiment request
pub const MAX_DOCUMENTS_PER_REQUEST: usize = 10;

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const ANALYZE_TEXT_PATH: &str = "language/:analyze-text";

/// Sentiment backend backed by Azure AI Language
pub struct AzureLanguageBackend {
    client: Client,
    analyze_url: Url,
    max_document_chars: usize,
    timeout_ms: u64,
}

impl std::fmt::Debug for AzureLanguageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureLanguageBackend")
            .field("analyze_url", &self.analyze_url.as_str())
            .field("max_document_chars", &self.max_document_chars)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl AzureLanguageBackend {
    /// Create a client for the given credentials and settings
    pub fn new(credentials: &BackendCredentials, config: &BackendConfig) -> Result<Self> {
        let analyze_url = build_analyze_url(&credentials.endpoint, &config.api_version)?;

        let mut key_value = HeaderValue::from_str(credentials.api_key.trim())
            .map_err(|e| SentimentError::config_error(format!("Invalid API key: {e}")))?;
        key_value.set_sensitive(true);

        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            HeaderName::from_static("ocp-apim-subscription-key"),
            key_value,
        );

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(format!("sentiment-batch/{}", env!("CARGO_PKG_VERSION")))
            .default_headers(default_headers)
            .build()
            .map_err(|e| {
                SentimentError::config_error(format!("Failed to create HTTP client: {e}"))
            })?;

        info!(
            analyze_url = %analyze_url,
            timeout_ms = config.timeout_ms,
            auth_header = SUBSCRIPTION_KEY_HEADER,
            "Created AzureLanguageBackend"
        );

        Ok(Self {
            client,
            analyze_url,
            max_document_chars: config.max_document_chars,
            timeout_ms: config.timeout_ms,
        })
    }

    pub fn analyze_url(&self) -> &Url {
        &self.analyze_url
    }
}

#[async_trait]
impl SentimentBackend for AzureLanguageBackend {
    async fn classify(
        &self,
        texts: &[String],
        language: &str,
    ) -> BackendResult<Vec<AnalysisOutcome>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = build_request(texts, language, self.max_document_chars);
        debug!(
            documents = texts.len(),
            url = %self.analyze_url,
            "Submitting sentiment batch"
        );

        let response = self
            .client
            .post(self.analyze_url.clone())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = service_error_message(&body);
            error!(status = status.as_u16(), message = %message, "Sentiment request failed");
            return Err(BackendError::api_error(status.as_u16(), message));
        }

        let parsed: AnalyzeTextResponse = serde_json::from_str(&body).map_err(|e| {
            BackendError::invalid_response(format!("Failed to parse response: {e}"))
        })?;

        assemble_outcomes(texts.len(), parsed.results)
    }

    fn max_batch_size(&self) -> Option<usize> {
        Some(MAX_DOCUMENTS_PER_REQUEST)
    }

    fn name(&self) -> &str {
        "azure-language"
    }
}

/// Cut `text` to at most `max_chars` characters, on a char boundary
pub fn truncate_text(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

fn build_analyze_url(endpoint: &str, api_version: &str) -> Result<Url> {
    let mut base = endpoint.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }

    let mut url = Url::parse(&base)
        .and_then(|base| base.join(ANALYZE_TEXT_PATH))
        .map_err(|e| SentimentError::config_error(format!("Invalid endpoint '{endpoint}': {e}")))?;
    url.query_pairs_mut().append_pair("api-version", api_version);
    Ok(url)
}

fn build_request<'a>(
    texts: &'a [String],
    language: &'a str,
    max_document_chars: usize,
) -> AnalyzeTextRequest<'a> {
    AnalyzeTextRequest {
        kind: "SentimentAnalysis",
        parameters: SentimentParameters {
            opinion_mining: false,
        },
        analysis_input: AnalysisInput {
            documents: texts
                .iter()
                .enumerate()
                .map(|(position, text)| InputDocument {
                    id: position.to_string(),
                    language,
                    text: truncate_text(text, max_document_chars),
                })
                .collect(),
        },
    }
}

/// Rebuild submission order from the service's split result lists
fn assemble_outcomes(
    expected: usize,
    results: SentimentResults,
) -> BackendResult<Vec<AnalysisOutcome>> {
    let mut slots: Vec<Option<AnalysisOutcome>> = vec![None; expected];

    let position = |id: &str| -> BackendResult<usize> {
        id.parse::<usize>()
            .ok()
            .filter(|&p| p < expected)
            .ok_or_else(|| BackendError::invalid_response(format!("Unexpected document id '{id}'")))
    };

    for document in results.documents {
        let idx = position(&document.id)?;
        slots[idx] = Some(AnalysisOutcome::success(
            document.sentiment,
            document.confidence_scores,
        ));
    }

    for failed in results.errors {
        let idx = position(&failed.id)?;
        let detail = failed.error.innermost();
        slots[idx] = Some(AnalysisOutcome::error(&detail.code, &detail.message));
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(idx, slot)| {
            slot.ok_or_else(|| {
                BackendError::invalid_response(format!("No result for document {idx}"))
            })
        })
        .collect()
}

fn service_error_message(body: &str) -> String {
    serde_json::from_str::<ServiceErrorEnvelope>(body)
        .map(|envelope| {
            let detail = envelope.error.innermost();
            format!("{}: {}", detail.code, detail.message)
        })
        .unwrap_or_else(|_| {
            if body.trim().is_empty() {
                "Unknown error".to_string()
            } else {
                body.trim().to_string()
            }
        })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeTextRequest<'a> {
    kind: &'static str,
    parameters: SentimentParameters,
    analysis_input: AnalysisInput<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SentimentParameters {
    opinion_mining: bool,
}

#[derive(Debug, Serialize)]
struct AnalysisInput<'a> {
    documents: Vec<InputDocument<'a>>,
}

#[derive(Debug, Serialize)]
struct InputDocument<'a> {
    id: String,
    language: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnalyzeTextResponse {
    results: SentimentResults,
}

#[derive(Debug, Default, Deserialize)]
struct SentimentResults {
    #[serde(default)]
    documents: Vec<DocumentSentiment>,
    #[serde(default)]
    errors: Vec<DocumentError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentSentiment {
    id: String,
    sentiment: Sentiment,
    #[serde(default)]
    confidence_scores: ConfidenceScores,
}

#[derive(Debug, Deserialize)]
struct DocumentError {
    id: String,
    error: ServiceError,
}

#[derive(Debug, Deserialize)]
struct ServiceErrorEnvelope {
    error: ServiceError,
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
    #[serde(default, alias = "innerError")]
    innererror: Option<Box<ServiceError>>,
}

impl ServiceError {
    /// The most specific error in the chain
    fn innermost(&self) -> &ServiceError {
        match &self.innererror {
            Some(inner) => inner.innermost(),
            None => self,
        }
    }
}
