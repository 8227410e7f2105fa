use anyhow::Context;
use inquire::{
    CustomType, CustomUserError, Password, PasswordDisplayMode, Select,
    validator::{ErrorMessage, Validation},
};
use skyglance_core::{Config, ErrorPolicy, Units};

/// What the user typed during `skyglance configure`.
#[derive(Debug)]
struct Answers {
    api_key: String,
    units: Units,
    horizon: u32,
    error_policy: ErrorPolicy,
}

/// Ask for every setting, defaulting to the current values.
pub fn prompt(current: Config) -> anyhow::Result<Config> {
    let key_help = if current.api_key.is_some() {
        "Leave empty to keep the current key"
    } else {
        "Get one at https://home.openweathermap.org/api_keys"
    };
    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message(key_help)
        .prompt()
        .context("Failed to read API key")?;

    let units_cursor = Units::all().iter().position(|u| *u == current.units).unwrap_or(0);
    let units = Select::new("Units:", Units::all().to_vec())
        .with_starting_cursor(units_cursor)
        .prompt()
        .context("Failed to read units")?;

    let horizon = CustomType::<u32>::new("Hourly forecast horizon (hours):")
        .with_default(current.hourly_horizon_hours)
        .with_error_message("Please enter a whole number of hours")
        .with_validator(|v: &u32| -> Result<Validation, CustomUserError> {
            Ok(if *v >= 1 {
                Validation::Valid
            } else {
                Validation::Invalid(ErrorMessage::from("Must be at least 1"))
            })
        })
        .prompt()
        .context("Failed to read hourly horizon")?;

    let policies = vec![ErrorPolicy::Notify, ErrorPolicy::Silent];
    let policy_cursor = policies.iter().position(|p| *p == current.error_policy).unwrap_or(0);
    let error_policy = Select::new("When a lookup fails:", policies)
        .with_starting_cursor(policy_cursor)
        .prompt()
        .context("Failed to read error policy")?;

    Ok(apply(current, Answers { api_key, units, horizon, error_policy }))
}

fn apply(mut config: Config, answers: Answers) -> Config {
    let key = answers.api_key.trim();
    if !key.is_empty() {
        config.api_key = Some(key.to_string());
    }
    config.units = answers.units;
    config.hourly_horizon_hours = answers.horizon;
    config.error_policy = answers.error_policy;
    config
}
