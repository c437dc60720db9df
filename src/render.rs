use crate::config::{ControllerSettings, Locale};
use crate::models::PredictionResult;
use crate::view::{PredictionView, Region, TextSlot};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

const MISSING_VALUE: &str = "-";

/// Fixed-point text with `places` decimals. Midpoints of the exact binary value
/// round away from zero, so `0.125` gives `0.13` and `-0.125` gives `-0.13`.
pub fn to_fixed(value: f64, places: u32) -> String {
    match Decimal::from_f64_retain(value) {
        Some(exact) => {
            let rounded =
                exact.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
            format!("{:.*}", places as usize, rounded)
        }
        None => format!("{:.*}", places as usize, value),
    }
}

pub fn format_money(prefix: &str, value: f64) -> String {
    format!("{} {}", prefix, to_fixed(value, 2))
}

pub fn format_change(prefix: &str, change: f64, change_pct: f64) -> String {
    format!(
        "{} ({}%)",
        format_money(prefix, change),
        to_fixed(change_pct, 2)
    )
}

/// Reformats an ISO `YYYY-MM-DD` date for display. The value is handled as a
/// plain calendar date, so no timezone offset can move it to another day.
/// Anything that does not parse is returned unchanged.
pub fn format_display_date(iso: &str, locale: Locale) -> String {
    match NaiveDate::parse_from_str(iso.trim(), "%Y-%m-%d") {
        Ok(date) => date.format(locale.date_format()).to_string(),
        Err(_) => iso.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryLine {
    pub label: String,
    pub value: String,
}

/// Human-readable summary shown under the metric cards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SummaryBlock {
    pub lines: Vec<SummaryLine>,
    pub disclosure: String,
}

impl SummaryBlock {
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(&line.label);
            out.push_str(": ");
            out.push_str(&line.value);
            out.push('\n');
        }
        if !self.disclosure.is_empty() {
            out.push('\n');
            out.push_str(&self.disclosure);
            out.push('\n');
        }
        out
    }

    pub fn render_html(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(&format!(
                "<p><strong>{}:</strong> {}</p>\n",
                escape_html(&line.label),
                escape_html(&line.value)
            ));
        }
        if !self.disclosure.is_empty() {
            out.push_str(&format!(
                "<p class=\"disclosure\"><em>{}</em></p>\n",
                escape_html(&self.disclosure)
            ));
        }
        out
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Everything the renderer writes for one result, computed before touching the page.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedResult {
    pub fields: Vec<(TextSlot, String)>,
    pub negative_change: bool,
    pub plot_source: String,
    pub summary: SummaryBlock,
}

pub fn project(result: &PredictionResult, settings: &ControllerSettings) -> RenderedResult {
    let prefix = settings.currency_prefix.as_str();
    let labels = &settings.messages.labels;
    let metrics = &result.metrics;

    let last_close = format_money(prefix, result.last_close);
    let next_price = format_money(prefix, result.next_price);
    let change = format_change(prefix, result.price_change, result.price_change_pct);
    let r2 = to_fixed(metrics.r2, 4);
    let mape = metrics
        .mape
        .map(|value| format!("{}%", to_fixed(value, 2)))
        .unwrap_or_else(|| MISSING_VALUE.to_string());

    let fields = vec![
        (TextSlot::LastClose, last_close.clone()),
        (TextSlot::NextPrice, next_price.clone()),
        (TextSlot::PriceChange, change.clone()),
        (TextSlot::DataPoints, result.data_points.to_string()),
        (TextSlot::R2Score, r2.clone()),
        (TextSlot::Mse, to_fixed(metrics.mse, 6)),
        (TextSlot::Mae, to_fixed(metrics.mae, 6)),
        (TextSlot::Rmse, to_fixed(metrics.rmse, 6)),
        (TextSlot::Mape, mape),
    ];

    let period = format!(
        "{} {} {}",
        format_display_date(&result.start_date, settings.locale),
        labels.period_joiner,
        format_display_date(&result.end_date, settings.locale)
    );
    let line = |label: &str, value: String| SummaryLine {
        label: label.to_string(),
        value,
    };
    let summary = SummaryBlock {
        lines: vec![
            line(&labels.ticker, result.ticker.clone()),
            line(&labels.period, period),
            line(&labels.last_close, last_close),
            line(&labels.next_price, next_price),
            line(&labels.change, change),
            line(&labels.r2, format!("{} ({})", r2, labels.r2_hint)),
            line(&labels.mae, format_money(prefix, metrics.mae)),
            line(&labels.data_points, result.data_points.to_string()),
        ],
        disclosure: settings.model_disclosure.clone(),
    };

    RenderedResult {
        fields,
        negative_change: result.is_negative_change(),
        plot_source: result.plot.clone(),
        summary,
    }
}

pub fn apply(view: &dyn PredictionView, rendered: &RenderedResult) {
    for (slot, text) in &rendered.fields {
        view.set_text(*slot, text);
    }
    view.set_active(Region::NegativeChange, rendered.negative_change);
    view.set_image_source(&rendered.plot_source);
    view.set_summary(&rendered.summary);
}

pub fn render_result(
    view: &dyn PredictionView,
    result: &PredictionResult,
    settings: &ControllerSettings,
) {
    apply(view, &project(result, settings));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PredictionMetrics;

    fn sample_result(price_change: f64) -> PredictionResult {
        PredictionResult {
            ticker: "VALE3".to_string(),
            start_date: "2023-06-15".to_string(),
            end_date: "2024-06-14".to_string(),
            last_close: 61.2,
            next_price: 61.2 + price_change,
            price_change,
            price_change_pct: price_change / 61.2 * 100.0,
            data_points: 197,
            metrics: PredictionMetrics {
                r2: 0.87654,
                mse: 0.0012345678,
                mae: 0.0271,
                rmse: 0.035136,
                mape: None,
            },
            plot: "data:image/png;base64,iVBORw0KGgo=".to_string(),
        }
    }

    fn field(rendered: &RenderedResult, slot: TextSlot) -> &str {
        rendered
            .fields
            .iter()
            .find(|(s, _)| *s == slot)
            .map(|(_, text)| text.as_str())
            .expect("slot rendered")
    }

    #[test]
    fn metrics_use_fixed_precision() {
        let rendered = project(&sample_result(1.0), &ControllerSettings::default());
        assert_eq!(field(&rendered, TextSlot::R2Score), "0.8765");
        assert_eq!(field(&rendered, TextSlot::Mse), "0.001235");
        assert_eq!(field(&rendered, TextSlot::Mae), "0.027100");
        assert_eq!(field(&rendered, TextSlot::Rmse), "0.035136");
        assert_eq!(field(&rendered, TextSlot::LastClose), "R$ 61.20");
        assert_eq!(field(&rendered, TextSlot::DataPoints), "197");
        assert_eq!(field(&rendered, TextSlot::Mape), "-");
    }

    #[test]
    fn negative_change_sets_visual_state() {
        let settings = ControllerSettings::default();
        let falling = project(&sample_result(-5.5), &settings);
        assert!(falling.negative_change);
        assert!(field(&falling, TextSlot::PriceChange).starts_with("R$ -5.50 ("));

        assert!(!project(&sample_result(5.5), &settings).negative_change);
        assert!(!project(&sample_result(0.0), &settings).negative_change);
    }

    #[test]
    fn ties_round_away_from_zero() {
        assert_eq!(to_fixed(0.125, 2), "0.13");
        assert_eq!(to_fixed(-0.125, 2), "-0.13");
        assert_eq!(to_fixed(2.5, 0), "3");
        assert_eq!(to_fixed(0.5, 2), "0.50");
        assert_eq!(to_fixed(0.87654, 4), "0.8765");
        assert_eq!(format_change("R$", -0.125, 1.005), "R$ -0.13 (1.00%)");

        let mut result = sample_result(1.0);
        result.metrics.mae = 0.125;
        let rendered = project(&result, &ControllerSettings::default());
        assert_eq!(rendered.summary.lines[6].value, "R$ 0.13");
        assert_eq!(field(&rendered, TextSlot::Mae), "0.125000");
    }

    #[test]
    fn display_dates_never_shift() {
        assert_eq!(format_display_date("2023-06-15", Locale::PtBr), "15/06/2023");
        assert_eq!(format_display_date("2023-06-15", Locale::EnUs), "06/15/2023");
        assert_eq!(format_display_date("not-a-date", Locale::PtBr), "not-a-date");
    }

    #[test]
    fn summary_carries_configured_disclosure() {
        let mut settings = ControllerSettings::default();
        settings.model_disclosure = "Model: 3-layer GRU".to_string();
        let rendered = project(&sample_result(1.0), &settings);
        assert_eq!(rendered.summary.disclosure, "Model: 3-layer GRU");
        assert_eq!(rendered.summary.lines[1].value, "15/06/2023 a 14/06/2024");
        assert_eq!(
            rendered.summary.lines[5].value,
            "0.8765 (quanto mais próximo de 1, melhor)"
        );
        assert_eq!(rendered.summary.lines[6].value, "R$ 0.03");
    }

    #[test]
    fn projection_is_idempotent() {
        let settings = ControllerSettings::default();
        let result = sample_result(-2.0);
        assert_eq!(project(&result, &settings), project(&result, &settings));
    }

    #[test]
    fn html_summary_escapes_server_text() {
        let mut result = sample_result(1.0);
        result.ticker = "<b>X</b>".to_string();
        let html = project(&result, &ControllerSettings::default())
            .summary
            .render_html();
        assert!(html.contains("&lt;b&gt;X&lt;/b&gt;"));
        assert!(!html.contains("<b>X</b>"));
    }
}
