use crate::api_client::HttpPredictionApi;
use crate::config::ControllerSettings;
use crate::controller::{PredictionFormController, SubmitOutcome};
use crate::page::InMemoryPage;
use crate::render::SummaryBlock;
use crate::view::{FormInput, PredictionView, UiEvent};
use anyhow::{anyhow, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::fs;
use std::path::Path;
use std::time::Duration;

const DATA_URI_PNG_PREFIX: &str = "data:image/png;base64,";

pub struct PredictArgs<'a> {
    pub ticker: &'a str,
    pub start_date: Option<&'a str>,
    pub end_date: Option<&'a str>,
    pub plot_out: Option<&'a Path>,
    pub summary_out: Option<&'a Path>,
}

/// Fills the form, submits it once and prints the resulting page.
/// Returns whether the submit ended in the success state.
pub async fn run(settings: ControllerSettings, args: PredictArgs<'_>) -> Result<bool> {
    info!(
        "Received predict command for ticker={} against {}",
        args.ticker, settings.api_base_url
    );
    let api = HttpPredictionApi::from_settings(&settings)?;
    let page = InMemoryPage::new();
    let controller = PredictionFormController::new(page.clone(), api, settings);

    controller.initialize();
    page.set_input_value(FormInput::Ticker, args.ticker);
    if let Some(start) = args.start_date {
        page.set_input_value(FormInput::StartDate, start);
    }
    if let Some(end) = args.end_date {
        page.set_input_value(FormInput::EndDate, end);
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .map_err(|err| anyhow!("invalid spinner template: {}", err))?,
    );
    spinner.set_message(format!("Predicting {}", args.ticker.to_uppercase()));
    spinner.enable_steady_tick(Duration::from_millis(100));
    let outcome = controller.handle_event(&UiEvent::PredictClicked).await;
    spinner.finish_and_clear();

    let snapshot = page.snapshot();
    print!("{}", snapshot.render_text());

    match outcome {
        Some(SubmitOutcome::Rendered(result)) => {
            if let Some(path) = args.plot_out {
                write_plot(&result.plot, path)?;
            }
            if let (Some(path), Some(summary)) = (args.summary_out, snapshot.summary.as_ref()) {
                write_summary_html(summary, path)?;
            }
            Ok(true)
        }
        Some(SubmitOutcome::Failed(err)) => {
            warn!("Prediction did not complete: {}", err);
            Ok(false)
        }
        Some(SubmitOutcome::Ignored) | None => Ok(false),
    }
}

pub fn decode_plot(plot: &str) -> Result<Vec<u8>> {
    let Some(encoded) = plot.trim().strip_prefix(DATA_URI_PNG_PREFIX) else {
        return Err(anyhow!(
            "plot is not an inline PNG data URI (starts with {:?})",
            plot.chars().take(24).collect::<String>()
        ));
    };
    STANDARD
        .decode(encoded)
        .context("failed to decode base64 plot image")
}

fn write_plot(plot: &str, path: &Path) -> Result<()> {
    let bytes = match decode_plot(plot) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!("Plot not written to {}: {}", path.display(), err);
            return Ok(());
        }
    };
    fs::write(path, &bytes)
        .with_context(|| format!("failed to write plot image to {}", path.display()))?;
    info!("Wrote plot image ({} bytes) to {}", bytes.len(), path.display());
    Ok(())
}

fn write_summary_html(summary: &SummaryBlock, path: &Path) -> Result<()> {
    let html = summary.render_html();
    fs::write(path, &html)
        .with_context(|| format!("failed to write summary to {}", path.display()))?;
    info!("Wrote summary ({} bytes) to {}", html.len(), path.display());
    Ok(())
}
