use anyhow::Context;
use clap::{Parser, Subcommand};
use forecast_core::{Config, ForecastService, ProviderConfig};
use inquire::{CustomType, Password, PasswordDisplayMode, Text, required};
use std::{path::PathBuf, process::ExitCode};
use tracing::debug;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Multi-day city forecast with weather alerts")]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the forecast provider endpoint and credentials.
    Configure,

    /// Show the next days' forecast for one or more cities.
    Show {
        /// City names, e.g. "London".
        #[arg(required = true)]
        cities: Vec<String>,

        /// Print the raw response envelope as JSON.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        let path = match self.config {
            Some(path) => path,
            None => Config::config_file_path()?,
        };
        debug!("Using config file {}", path.display());

        match self.command {
            Command::Configure => {
                configure(&path)?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Show { cities, json } => {
                let config = Config::load_from(&path)?;
                let service = ForecastService::from_config(&config)?;

                let responses = service.forecast_many(&cities).await;

                if json {
                    let out = if responses.len() == 1 {
                        serde_json::to_string_pretty(&responses[0])
                    } else {
                        serde_json::to_string_pretty(&responses)
                    }
                    .context("Failed to serialize forecast response")?;
                    println!("{out}");
                } else {
                    for response in &responses {
                        print!("{}", render::response(response));
                    }
                }

                let all_ok = responses.iter().all(|r| r.is_success());
                Ok(if all_ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
            }
        }
    }
}

fn configure(path: &std::path::Path) -> anyhow::Result<()> {
    let mut config = Config::load_from(path)?;
    let current = config.provider.clone();

    let mut base_url = Text::new("Forecast endpoint URL:")
        .with_placeholder("https://api.openweathermap.org/data/2.5/forecast")
        .with_validator(required!());
    if let Some(current) = &current {
        base_url = base_url.with_default(&current.base_url);
    }
    let base_url = base_url.prompt().context("Failed to read endpoint URL")?;

    let api_key = Password::new("API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_validator(required!())
        .prompt()
        .context("Failed to read API key")?;

    let mut count = CustomType::<u32>::new("Samples per request (cnt):")
        .with_error_message("Please enter a positive whole number");
    if let Some(current) = &current {
        count = count.with_default(current.count);
    }
    let count = count.prompt().context("Failed to read sample count")?;

    let provider = ProviderConfig { base_url: base_url.trim().to_string(), api_key, count };
    provider.validate()?;

    config.set_provider(provider);
    config.save_to(path)?;

    println!("Saved configuration to {}", path.display());
    Ok(())
}
