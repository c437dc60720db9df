use serde::{Deserialize, Serialize};

/// Body of `POST /api/predict`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub ticker: String,
    pub start_date: String,
    pub end_date: String,
}

impl PredictionRequest {
    pub fn new(ticker: &str, start_date: &str, end_date: &str) -> Self {
        Self {
            ticker: ticker.to_uppercase(),
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
        }
    }
}

/// Regression-quality metrics computed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionMetrics {
    #[serde(rename = "R2")]
    pub r2: f64,
    #[serde(rename = "MSE")]
    pub mse: f64,
    #[serde(rename = "MAE")]
    pub mae: f64,
    #[serde(rename = "RMSE")]
    pub rmse: f64,
    #[serde(rename = "MAPE", default, skip_serializing_if = "Option::is_none")]
    pub mape: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub ticker: String,
    pub start_date: String,
    pub end_date: String,
    pub last_close: f64,
    pub next_price: f64,
    pub price_change: f64,
    pub price_change_pct: f64,
    pub data_points: u64,
    pub metrics: PredictionMetrics,
    /// Chart reference: either a URL or a `data:` URI.
    pub plot: String,
}

impl PredictionResult {
    pub fn is_negative_change(&self) -> bool {
        self.price_change < 0.0
    }
}

/// Error payload returned by the backend on non-success statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}
