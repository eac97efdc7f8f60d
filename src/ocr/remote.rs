//! `RemoteRecognizer` — HTTP client for an out-of-process OCR engine.
//!
//! Posts raw frame bytes to a configurable `/v1/recognize` endpoint and
//! reads the recognized text from a JSON response.  All connection details
//! come from [`OcrConfig`]; nothing is hardcoded.
//!
//! # Wire format
//!
//! Request: `POST {base_url}/v1/recognize?lang={language}` with an
//! `application/octet-stream` body of image bytes and an
//! `x-rotation-degrees` header carrying the capture orientation.
//!
//! Response: `{"text": "recognized text"}` — a blank `text` value is a
//! valid outcome (no legible text in the frame), not an error.

use async_trait::async_trait;

use crate::config::OcrConfig;
use crate::ocr::engine::{OcrError, RecognitionRequest, TextRecognizer};

impl From<reqwest::Error> for OcrError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            OcrError::Timeout
        } else {
            OcrError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// RemoteRecognizer
// ---------------------------------------------------------------------------

/// Calls a remote OCR service over HTTP.
///
/// The pipeline treats recognition as an opaque external engine with
/// unbounded latency; this implementation bounds each HTTP call with the
/// per-request timeout from `OcrConfig::timeout_secs` so a dead endpoint
/// surfaces as [`OcrError::Timeout`] instead of hanging the cycle forever.
pub struct RemoteRecognizer {
    client: reqwest::Client,
    config: OcrConfig,
}

impl RemoteRecognizer {
    /// Build a `RemoteRecognizer` from application config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout.  A
    /// default (no-timeout) client is used as a last-resort fallback if the
    /// builder fails (should never happen in practice).
    pub fn from_config(config: &OcrConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }
}

#[async_trait]
impl TextRecognizer for RemoteRecognizer {
    /// Send the frame bytes to the configured endpoint for recognition.
    ///
    /// The `Authorization: Bearer …` header is attached **only** when
    /// `config.api_key` is `Some(key)` and `key` is non-empty — safe for
    /// local engines that require no authentication.
    async fn recognize(&self, request: RecognitionRequest<'_>) -> Result<String, OcrError> {
        let url = format!("{}/v1/recognize", self.config.base_url);

        let mut req = self
            .client
            .post(&url)
            .query(&[("lang", self.config.language.as_str())])
            .header("content-type", "application/octet-stream")
            .header("x-rotation-degrees", request.rotation_degrees().to_string())
            .body(request.pixels().to_vec());

        // Attach Authorization header only when api_key is a non-empty string.
        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OcrError::Engine(format!(
                "endpoint returned HTTP {status}"
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| OcrError::Parse(e.to_string()))?;

        let text = json["text"]
            .as_str()
            .ok_or_else(|| OcrError::Parse("response has no `text` field".into()))?;

        Ok(text.trim().to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config(api_key: Option<&str>) -> OcrConfig {
        OcrConfig {
            base_url: "http://localhost:8080".into(),
            api_key: api_key.map(|s| s.to_string()),
            language: "en".into(),
            timeout_secs: 10,
        }
    }

    #[test]
    fn from_config_builds_without_panic() {
        let config = make_config(None);
        let _engine = RemoteRecognizer::from_config(&config);
    }

    #[test]
    fn from_config_accepts_empty_api_key() {
        let config = make_config(Some(""));
        let _engine = RemoteRecognizer::from_config(&config);
    }

    #[test]
    fn from_config_accepts_real_api_key() {
        let config = make_config(Some("sk-test-1234"));
        let _engine = RemoteRecognizer::from_config(&config);
    }

    /// Verify that `RemoteRecognizer` is usable as `dyn TextRecognizer`.
    #[test]
    fn recognizer_is_object_safe() {
        let config = make_config(None);
        let engine: Box<dyn TextRecognizer> = Box::new(RemoteRecognizer::from_config(&config));
        drop(engine);
    }
}
