use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;
use predictor::{
    commands::{health, predict},
    config::ControllerSettings,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "predictor")]
#[command(about = "Submit stock price predictions to the LSTM prediction API")]
struct Cli {
    /// Base URL of the prediction API (overrides PREDICTOR_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill the prediction form and submit it once
    Predict {
        /// Ticker symbol to analyze (uppercased before sending)
        ticker: String,
        /// First day of the analyzed range, YYYY-MM-DD (defaults to one year ago)
        #[arg(long = "start", value_name = "DATE")]
        start_date: Option<String>,
        /// Last day of the analyzed range, YYYY-MM-DD (defaults to today)
        #[arg(long = "end", value_name = "DATE")]
        end_date: Option<String>,
        /// Write the returned plot image to this file when it is an inline PNG
        #[arg(long = "plot-out", value_name = "PATH")]
        plot_out: Option<PathBuf>,
        /// Write the rendered summary as an HTML fragment to this file on success
        #[arg(long = "summary-out", value_name = "PATH")]
        summary_out: Option<PathBuf>,
    },
    /// Check that the prediction API is reachable
    Health,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let Cli { api_url, command } = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut settings = ControllerSettings::from_env()?;
    if let Some(url) = api_url {
        settings = settings.with_api_base_url(url)?;
    }
    info!(
        "Using prediction API at {} (locale {})",
        settings.api_base_url,
        settings.locale.label()
    );

    match command {
        Commands::Predict {
            ticker,
            start_date,
            end_date,
            plot_out,
            summary_out,
        } => {
            let succeeded = predict::run(
                settings,
                predict::PredictArgs {
                    ticker: &ticker,
                    start_date: start_date.as_deref(),
                    end_date: end_date.as_deref(),
                    plot_out: plot_out.as_deref(),
                    summary_out: summary_out.as_deref(),
                },
            )
            .await?;
            if !succeeded {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Health => {
            health::run(&settings).await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
