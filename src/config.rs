use crate::app_url::{normalize_base_url, resolve_app_base_url};
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

const API_URL_KEY: &str = "PREDICTOR_API_URL";
const LOCALE_KEY: &str = "PREDICTOR_LOCALE";
const CURRENCY_PREFIX_KEY: &str = "PREDICTOR_CURRENCY_PREFIX";
const MODEL_DISCLOSURE_KEY: &str = "PREDICTOR_MODEL_DISCLOSURE";
const OVERLAP_POLICY_KEY: &str = "PREDICTOR_OVERLAP_POLICY";
const REQUEST_TIMEOUT_KEY: &str = "PREDICTOR_REQUEST_TIMEOUT_SECS";
const ENV_KEYS: [&str; 7] = [
    API_URL_KEY,
    LOCALE_KEY,
    CURRENCY_PREFIX_KEY,
    MODEL_DISCLOSURE_KEY,
    OVERLAP_POLICY_KEY,
    REQUEST_TIMEOUT_KEY,
    "DOMAIN",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    PtBr,
    EnUs,
}

impl Locale {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "pt-br" | "pt" => Ok(Self::PtBr),
            "en-us" | "en" => Ok(Self::EnUs),
            other => Err(anyhow!(
                "{} must be pt-BR or en-US (value: {})",
                LOCALE_KEY,
                other
            )),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::PtBr => "pt-BR",
            Self::EnUs => "en-US",
        }
    }

    /// chrono format string for calendar dates shown to the user.
    pub fn date_format(self) -> &'static str {
        match self {
            Self::PtBr => "%d/%m/%Y",
            Self::EnUs => "%m/%d/%Y",
        }
    }

    pub fn currency_prefix(self) -> &'static str {
        match self {
            Self::PtBr => "R$",
            Self::EnUs => "$",
        }
    }

    pub fn model_disclosure(self) -> &'static str {
        match self {
            Self::PtBr => "Modelo: LSTM de 2 camadas com 64 neurônios",
            Self::EnUs => "Model: 2-layer LSTM with 64 units",
        }
    }

    pub fn messages(self) -> Messages {
        match self {
            Self::PtBr => Messages {
                missing_fields: "Preencha todos os campos".to_string(),
                invalid_range: "Data inicial deve ser anterior à data final".to_string(),
                invalid_date: "Data inválida".to_string(),
                request_failed: "Erro ao fazer previsão".to_string(),
                malformed_response: "Resposta inválida do servidor".to_string(),
                success: "✅ Previsão concluída com sucesso!".to_string(),
                labels: SummaryLabels {
                    ticker: "Ação Analisada".to_string(),
                    period: "Período".to_string(),
                    period_joiner: "a".to_string(),
                    last_close: "Último preço de fechamento".to_string(),
                    next_price: "Próximo preço previsto".to_string(),
                    change: "Variação prevista".to_string(),
                    r2: "R² Score".to_string(),
                    r2_hint: "quanto mais próximo de 1, melhor".to_string(),
                    mae: "Erro Médio Absoluto (MAE)".to_string(),
                    data_points: "Total de dias analisados".to_string(),
                },
            },
            Self::EnUs => Messages {
                missing_fields: "Fill in all fields".to_string(),
                invalid_range: "Start date must be before end date".to_string(),
                invalid_date: "Invalid date".to_string(),
                request_failed: "Prediction request failed".to_string(),
                malformed_response: "Invalid response from server".to_string(),
                success: "✅ Prediction completed successfully!".to_string(),
                labels: SummaryLabels {
                    ticker: "Analyzed ticker".to_string(),
                    period: "Period".to_string(),
                    period_joiner: "to".to_string(),
                    last_close: "Last close".to_string(),
                    next_price: "Predicted next price".to_string(),
                    change: "Predicted change".to_string(),
                    r2: "R² Score".to_string(),
                    r2_hint: "closer to 1 is better".to_string(),
                    mae: "Mean Absolute Error (MAE)".to_string(),
                    data_points: "Total days analyzed".to_string(),
                },
            },
        }
    }
}

/// User-facing strings for one locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Messages {
    pub missing_fields: String,
    pub invalid_range: String,
    pub invalid_date: String,
    pub request_failed: String,
    pub malformed_response: String,
    pub success: String,
    pub labels: SummaryLabels,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryLabels {
    pub ticker: String,
    pub period: String,
    pub period_joiner: String,
    pub last_close: String,
    pub next_price: String,
    pub change: String,
    pub r2: String,
    pub r2_hint: String,
    pub mae: String,
    pub data_points: String,
}

/// What to do with a submit that arrives while another request is still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapPolicy {
    #[default]
    Allow,
    IgnoreWhileInFlight,
}

impl OverlapPolicy {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(Self::Allow),
            "ignore" | "ignore_while_in_flight" => Ok(Self::IgnoreWhileInFlight),
            other => Err(anyhow!(
                "{} must be allow or ignore (value: {})",
                OVERLAP_POLICY_KEY,
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub api_base_url: String,
    pub locale: Locale,
    pub currency_prefix: String,
    pub model_disclosure: String,
    pub overlap_policy: OverlapPolicy,
    pub request_timeout: Option<Duration>,
    pub messages: Messages,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::for_locale(Locale::default())
    }
}

impl ControllerSettings {
    pub fn for_locale(locale: Locale) -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            locale,
            currency_prefix: locale.currency_prefix().to_string(),
            model_disclosure: locale.model_disclosure().to_string(),
            overlap_policy: OverlapPolicy::default(),
            request_timeout: None,
            messages: locale.messages(),
        }
    }

    pub fn with_api_base_url<S: AsRef<str>>(mut self, base_url: S) -> Result<Self> {
        let raw = base_url.as_ref();
        self.api_base_url = normalize_base_url(Some(raw))
            .ok_or_else(|| anyhow!("API base URL must be an http(s) URL (value: {})", raw))?;
        Ok(self)
    }

    pub fn with_overlap_policy(mut self, policy: OverlapPolicy) -> Self {
        self.overlap_policy = policy;
        self
    }

    pub fn from_settings_map(settings: &HashMap<String, String>) -> Result<Self> {
        let locale = match optional_setting(settings, LOCALE_KEY) {
            Some(raw) => Locale::parse(raw)?,
            None => Locale::default(),
        };
        let mut resolved = Self::for_locale(locale);

        resolved.api_base_url = match optional_setting(settings, API_URL_KEY) {
            Some(raw) => normalize_base_url(Some(raw)).ok_or_else(|| {
                anyhow!(
                    "Setting {} must be an http(s) URL (value: {})",
                    API_URL_KEY,
                    raw
                )
            })?,
            None => resolve_app_base_url(settings)
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
        };
        if let Some(prefix) = optional_setting(settings, CURRENCY_PREFIX_KEY) {
            resolved.currency_prefix = prefix.to_string();
        }
        if let Some(disclosure) = optional_setting(settings, MODEL_DISCLOSURE_KEY) {
            resolved.model_disclosure = disclosure.to_string();
        }
        if let Some(raw) = optional_setting(settings, OVERLAP_POLICY_KEY) {
            resolved.overlap_policy = OverlapPolicy::parse(raw)?;
        }
        if optional_setting(settings, REQUEST_TIMEOUT_KEY).is_some() {
            let secs = require_setting_f64(settings, REQUEST_TIMEOUT_KEY, Some(0.001), None)?;
            resolved.request_timeout = Some(Duration::from_secs_f64(secs));
        }

        Ok(resolved)
    }

    pub fn from_env() -> Result<Self> {
        let settings: HashMap<String, String> = ENV_KEYS
            .iter()
            .filter_map(|key| std::env::var(key).ok().map(|value| (key.to_string(), value)))
            .collect();
        Self::from_settings_map(&settings)
    }
}

fn optional_setting<'a>(settings: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    settings
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn require_setting<'a>(settings: &'a HashMap<String, String>, key: &str) -> Result<&'a str> {
    optional_setting(settings, key).ok_or_else(|| anyhow!("Missing required setting {}", key))
}

fn require_setting_f64(
    settings: &HashMap<String, String>,
    key: &str,
    min: Option<f64>,
    max: Option<f64>,
) -> Result<f64> {
    let raw = require_setting(settings, key)?;
    let value = raw
        .parse::<f64>()
        .map_err(|_| anyhow!("Setting {} must be a number (value: {})", key, raw))?;
    if !value.is_finite() {
        return Err(anyhow!("Setting {} must be finite (value: {})", key, raw));
    }
    if let Some(min_value) = min {
        if value < min_value {
            return Err(anyhow!(
                "Setting {} must be >= {} (value: {})",
                key,
                min_value,
                raw
            ));
        }
    }
    if let Some(max_value) = max {
        if value > max_value {
            return Err(anyhow!(
                "Setting {} must be <= {} (value: {})",
                key,
                max_value,
                raw
            ));
        }
    }
    Ok(value)
}
