use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use skyglance_core::{Config, Event, Tab, Widget, WidgetState, provider_from_config, render};

use crate::{configure, watch};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skyglance", version, about = "Current weather and forecast at a glance")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the API key, units and display preferences.
    Configure,

    /// Look up one location and print the widget.
    Show(ShowArgs),

    /// Interactive widget: type a place, switch tabs, clear.
    Watch {
        /// Tab to start on.
        #[arg(long, default_value = "daily", value_parser = parse_tab)]
        tab: Tab,
    },
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Place name, e.g. "London" or "Paris,FR".
    #[arg(required_unless_present = "lat", conflicts_with_all = ["lat", "lon"])]
    pub location: Option<String>,

    /// Latitude, used together with --lon instead of a place name.
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Longitude, used together with --lat.
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Which forecast tab to print.
    #[arg(long, default_value = "daily", value_parser = parse_tab)]
    pub tab: Tab,

    /// Override the configured hourly horizon (hours).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub horizon: Option<u32>,
}

impl ShowArgs {
    fn search_event(&self) -> Event {
        match (&self.location, self.lat, self.lon) {
            (_, Some(lat), Some(lon)) => Event::Locate { lat, lon },
            (location, _, _) => Event::InputChanged(location.clone().unwrap_or_default()),
        }
    }
}

fn parse_tab(value: &str) -> Result<Tab, String> {
    Tab::try_from(value).map_err(|e| e.to_string())
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => {
                let current = Config::load()?;
                let updated = configure::prompt(current)?;
                updated.save()?;
                println!("Saved configuration to {}", Config::config_file_path()?.display());
            }
            Command::Show(args) => {
                let mut config = load_config()?;
                if let Some(horizon) = args.horizon {
                    config.hourly_horizon_hours = horizon;
                }

                let mut widget = build_widget(&config)?;
                widget.dispatch(Event::SelectTab(args.tab));
                match args.search_event() {
                    event @ Event::Locate { .. } => widget.dispatch(event),
                    event => {
                        widget.dispatch(event);
                        widget.dispatch(Event::Submit);
                    }
                }
                widget.settle().await;

                print!("{}", render(widget.state()));
            }
            Command::Watch { tab } => {
                let config = load_config()?;
                let mut widget = build_widget(&config)?;
                widget.dispatch(Event::SelectTab(tab));
                watch::run(&mut widget).await?;
            }
        }

        Ok(())
    }
}

/// Config from disk with environment overrides applied.
fn load_config() -> anyhow::Result<Config> {
    let config = Config::load()?.with_env_overrides();
    tracing::debug!(
        units = %config.units,
        horizon = config.hourly_horizon_hours,
        policy = %config.error_policy,
        "configuration loaded"
    );
    Ok(config)
}

fn build_widget(config: &Config) -> anyhow::Result<Widget> {
    let provider = provider_from_config(config).context("Cannot reach the weather service")?;
    Ok(Widget::new(Arc::from(provider), WidgetState::from_config(config)))
}
