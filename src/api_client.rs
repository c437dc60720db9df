use crate::app_url::{health_url, predict_url};
use crate::config::ControllerSettings;
use crate::errors::SubmitError;
use crate::models::{ApiErrorBody, HealthStatus, PredictionRequest, PredictionResult};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Certificate;
use std::env;
use std::fs;
use std::time::Duration;

const API_CA_CERT_ENV: &str = "PREDICTOR_API_CA_CERT";
const MAX_ERROR_BODY_CHARS: usize = 2048;

/// Backend collaborator behind the prediction form.
#[async_trait]
pub trait PredictionApi: Send + Sync {
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, SubmitError>;
}

fn env_path(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn load_ca_certificate() -> Result<Option<Certificate>> {
    let Some(path) = env_path(API_CA_CERT_ENV) else {
        return Ok(None);
    };
    let pem =
        fs::read(&path).with_context(|| format!("failed to read CA certificate from {}", path))?;
    let certificate = Certificate::from_pem(&pem)
        .with_context(|| format!("failed to parse CA certificate from {}", path))?;
    Ok(Some(certificate))
}

pub fn build_async_client(timeout: Option<Duration>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    if let Some(certificate) = load_ca_certificate()? {
        builder = builder.add_root_certificate(certificate);
    }
    builder.build().context("failed to build HTTP client")
}

pub struct HttpPredictionApi {
    http: reqwest::Client,
    base_url: String,
    fallback_message: String,
}

impl HttpPredictionApi {
    pub fn new(http: reqwest::Client, base_url: &str, fallback_message: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            fallback_message: fallback_message.to_string(),
        }
    }

    pub fn from_settings(settings: &ControllerSettings) -> Result<Self> {
        let http = build_async_client(settings.request_timeout)?;
        Ok(Self::new(
            http,
            &settings.api_base_url,
            &settings.messages.request_failed,
        ))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        let url = health_url(&self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("health check request to {} failed", url))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "health check returned {}: {}",
                status,
                truncate_for_log(&body, MAX_ERROR_BODY_CHARS)
            ));
        }
        response
            .json::<HealthStatus>()
            .await
            .context("failed to decode health check response")
    }

    fn request_error(&self, status: u16, body: &str) -> SubmitError {
        let detail = serde_json::from_str::<ApiErrorBody>(body)
            .ok()
            .and_then(|parsed| parsed.detail)
            .filter(|detail| !detail.trim().is_empty());
        if detail.is_none() {
            log::warn!(
                "Prediction API returned status={} without a detail message: {}",
                status,
                truncate_for_log(body, MAX_ERROR_BODY_CHARS)
            );
        }
        SubmitError::Request {
            status,
            message: detail.unwrap_or_else(|| self.fallback_message.clone()),
        }
    }
}

#[async_trait]
impl PredictionApi for HttpPredictionApi {
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, SubmitError> {
        let url = predict_url(&self.base_url);
        log::debug!(
            "POST {} ticker={} start={} end={}",
            url,
            request.ticker,
            request.start_date,
            request.end_date
        );

        let response = self.http.post(&url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(self.request_error(status.as_u16(), &body));
        }

        parse_prediction_body(&body)
    }
}

/// Decodes a success body. Non-JSON text is a transport failure; JSON with the
/// wrong shape is a malformed response.
pub fn parse_prediction_body(body: &str) -> Result<PredictionResult, SubmitError> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(|err| {
        SubmitError::Transport(format!("response body is not valid JSON: {}", err))
    })?;
    serde_json::from_value(value).map_err(|err| SubmitError::MalformedResponse(err.to_string()))
}

pub(crate) fn truncate_for_log(value: &str, max_chars: usize) -> String {
    let trimmed = value.trim();
    let mut iter = trimmed.chars();
    let mut out = String::new();
    for _ in 0..max_chars {
        let Some(ch) = iter.next() else {
            return trimmed.to_string();
        };
        out.push(ch);
    }
    if iter.next().is_some() {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> HttpPredictionApi {
        HttpPredictionApi::new(
            reqwest::Client::new(),
            "http://localhost:8000/",
            "Prediction request failed",
        )
    }

    #[test]
    fn detail_is_surfaced() {
        let err = api().request_error(404, r#"{"detail": "Ticker not found"}"#);
        match err {
            SubmitError::Request { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Ticker not found");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn detail_keeps_surrounding_whitespace() {
        match api().request_error(400, r#"{"detail": "  Not enough data (51 days minimum)\n"}"#) {
            SubmitError::Request { message, .. } => {
                assert_eq!(message, "  Not enough data (51 days minimum)\n")
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn missing_detail_falls_back() {
        for body in ["{}", "<html>502</html>", r#"{"detail": "  "}"#] {
            match api().request_error(502, body) {
                SubmitError::Request { message, .. } => {
                    assert_eq!(message, "Prediction request failed")
                }
                other => panic!("unexpected error {other:?}"),
            }
        }
    }

    #[test]
    fn body_classification() {
        assert!(matches!(
            parse_prediction_body("not json"),
            Err(SubmitError::Transport(_))
        ));
        assert!(matches!(
            parse_prediction_body(r#"{"ticker": "AAPL"}"#),
            Err(SubmitError::MalformedResponse(_))
        ));
    }

    #[test]
    fn truncation_marks_cut_bodies() {
        assert_eq!(truncate_for_log("  short ", 10), "short");
        assert_eq!(truncate_for_log("abcdef", 3), "abc…");
    }

    #[test]
    fn base_url_is_trimmed() {
        assert_eq!(api().base_url(), "http://localhost:8000");
    }
}
