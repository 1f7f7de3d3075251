use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select};
use weather_core::{Config, Locale};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather CLI")]
pub struct Cli {
    /// Log pipeline details (retries, icon fetch) to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the WeatherAPI.com key and display language.
    ///
    /// Prompts for anything not given as a flag.
    Configure {
        #[arg(long)]
        api_key: Option<String>,

        /// Display language, e.g. "pt" or "en".
        #[arg(long)]
        lang: Option<String>,
    },

    /// Show current conditions for a location.
    Show {
        /// City, optionally followed by a comma and the state/region.
        location: String,

        /// Skip downloading the conditions icon.
        #[arg(long)]
        no_icon: bool,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the path of the configuration file.
    ConfigPath,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { api_key, lang } => configure(api_key, lang),
            Command::Show { location, no_icon, json } => show(&location, no_icon, json).await,
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
                Ok(())
            }
        }
    }
}

fn configure(api_key: Option<String>, lang: Option<String>) -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = match api_key {
        Some(key) => key,
        None => Password::new("WeatherAPI.com API key:")
            .without_confirmation()
            .with_display_mode(PasswordDisplayMode::Masked)
            .prompt()
            .context("Failed to read API key")?,
    };

    let locale = match lang {
        Some(code) => Locale::try_from(code.as_str())?,
        None => Select::new("Display language:", Locale::all().to_vec())
            .prompt()
            .context("Failed to read display language")?,
    };

    config.set_api_key(api_key.trim().to_string());
    config.set_locale(locale);
    config.api_key()?;
    config.save()?;

    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(location: &str, no_icon: bool, json: bool) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    config.apply_env();
    if no_icon {
        config.fetch_icon = false;
    }

    let locale = config.locale()?;
    let fetcher = weather_core::fetcher_from_config(&config)?;

    match fetcher.fetch_weather(location).await {
        Ok(result) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", render::render_result(&result, locale, &chrono::Local));
            }
            Ok(())
        }
        Err(err) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&err)?);
            }
            Err(err.into())
        }
    }
}
