use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use farm_weather_core::{
    Config, DashboardApi, HistoryPage, HttpDashboardClient, SettingsForm, SubmitError,
    normalize_current, normalize_history, spawn_poller, validate_coordinates,
};
use inquire::{Confirm, Text};

use crate::render::{render_current, render_history, render_settings};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "farm-weather", version, about = "Farm weather dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show current conditions and recommendations.
    Current,

    /// Show recorded weather history.
    History {
        /// Rows per page (1-100); defaults to the configured history limit.
        #[arg(long)]
        limit: Option<u32>,

        #[arg(long, default_value_t = 0)]
        offset: u32,
    },

    /// Show or change farm settings.
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Keep current weather and history on screen, refreshing until Ctrl-C.
    Watch,

    /// Inspect or change local configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum SettingsAction {
    /// Print the settings stored on the server.
    Show,

    /// Update settings non-interactively.
    Set {
        /// Farm latitude, e.g. "-23.55" or "-23,55".
        #[arg(long, allow_hyphen_values = true)]
        lat: String,

        /// Farm longitude.
        #[arg(long, allow_hyphen_values = true)]
        lon: String,

        /// Enable or disable extreme weather alerts.
        #[arg(long)]
        alerts: Option<bool>,

        /// Enable or disable the daily report.
        #[arg(long)]
        daily_report: Option<bool>,
    },

    /// Edit settings through interactive prompts.
    Edit,
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration.
    Show,

    /// Point the dashboard at another backend.
    SetApiUrl { url: String },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;
        let api = HttpDashboardClient::new(config.api_base_url());
        tracing::debug!(base_url = api.base_url(), "using backend");

        match self.command {
            Command::Current => {
                let response = api.current_weather().await.context("Error loading weather data")?;
                println!("{}", render_current(&normalize_current(response, &config.snapshot_defaults())));
            }
            Command::History { limit, offset } => {
                let limit = limit.unwrap_or_else(|| config.history_page().limit());
                let response = api
                    .weather_history(HistoryPage::new(limit, offset))
                    .await
                    .context("Error loading weather history")?;
                println!("{}", render_history(&normalize_history(&response, &config.snapshot_defaults())));
            }
            Command::Settings { action } => settings(api, action).await?,
            Command::Watch => watch(api, &config).await?,
            Command::Config { action } => configure(&mut config, action)?,
        }

        Ok(())
    }
}

fn configure(config: &mut Config, action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            println!("Config file:   {}", Config::config_file_path()?.display());
            println!("API URL:       {}", config.api_base_url());
            println!("Poll interval: {}s", config.poll_interval().as_secs());
            println!("History limit: {}", config.history_page().limit());

            let location = config.snapshot_defaults().location;
            println!("Default location: {} ({}, {})", location.name, location.lat, location.lon);
        }
        ConfigAction::SetApiUrl { url } => {
            config.set_api_base_url(&url)?;
            config.save()?;
            println!("API URL set to {url}");
        }
    }

    Ok(())
}

async fn settings(api: HttpDashboardClient, action: SettingsAction) -> anyhow::Result<()> {
    let form = SettingsForm::new(api);
    let stored = form.load().await.context("Error loading settings")?;

    match action {
        SettingsAction::Show => {
            println!("{}", render_settings(&stored));
            return Ok(());
        }
        SettingsAction::Set { lat, lon, alerts, daily_report } => {
            form.edit(|draft| {
                draft.farm_latitude = lat;
                draft.farm_longitude = lon;
                if let Some(alerts) = alerts {
                    draft.extreme_weather_alerts = alerts;
                }
                if let Some(daily_report) = daily_report {
                    draft.daily_report = daily_report;
                }
            });
        }
        SettingsAction::Edit => prompt_draft(&form)?,
    }

    match form.submit().await {
        Ok(saved) => {
            println!("Settings saved.\n{}", render_settings(&saved));
            Ok(())
        }
        Err(SubmitError::Invalid(err)) => Err(anyhow!("Invalid coordinates: {err}")),
        Err(err) => Err(anyhow::Error::new(err).context("Failed to save settings")),
    }
}

/// Ask for every field, re-asking for coordinates until they validate.
fn prompt_draft<A: DashboardApi>(form: &SettingsForm<A>) -> anyhow::Result<()> {
    let current = form.draft();

    let (lat, lon) = loop {
        let lat = Text::new("Farm latitude:").with_default(&current.farm_latitude).prompt()?;
        let lon = Text::new("Farm longitude:").with_default(&current.farm_longitude).prompt()?;

        match validate_coordinates(&lat, &lon) {
            Ok(_) => break (lat, lon),
            Err(err) => eprintln!("Invalid coordinates: {err}"),
        }
    };

    let alerts = Confirm::new("Enable extreme weather alerts?")
        .with_default(current.extreme_weather_alerts)
        .prompt()?;
    let daily_report = Confirm::new("Send a daily weather report?")
        .with_default(current.daily_report)
        .prompt()?;

    form.edit(|draft| {
        draft.farm_latitude = lat;
        draft.farm_longitude = lon;
        draft.extreme_weather_alerts = alerts;
        draft.daily_report = daily_report;
    });

    Ok(())
}

async fn watch(api: HttpDashboardClient, config: &Config) -> anyhow::Result<()> {
    let every = config.poll_interval();
    let page = config.history_page();
    println!("Refreshing every {}s. Press Ctrl-C to stop.", every.as_secs());

    let client = api.clone();
    let defaults = config.snapshot_defaults();
    let current = spawn_poller(
        every,
        move || {
            let client = client.clone();
            async move { client.current_weather().await }
        },
        move |result| match result {
            Ok(response) => println!("\n{}", render_current(&normalize_current(response, &defaults))),
            Err(err) => eprintln!("\nError loading weather data: {err}"),
        },
    );

    let defaults = config.snapshot_defaults();
    let history = spawn_poller(
        every,
        move || {
            let client = api.clone();
            async move { client.weather_history(page).await }
        },
        move |result| match result {
            Ok(response) => println!("\n{}", render_history(&normalize_history(&response, &defaults))),
            Err(err) => eprintln!("\nError loading weather history: {err}"),
        },
    );

    tokio::signal::ctrl_c().await.context("Failed to listen for Ctrl-C")?;

    current.join().await;
    history.join().await;
    Ok(())
}
