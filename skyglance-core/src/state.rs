//! Widget state and the handler that applies events to it.

use chrono::NaiveDateTime;
use std::fmt;

use crate::{
    Config, FetchError,
    config::ErrorPolicy,
    forecast,
    model::{ForecastSample, LocationQuery, Snapshot, Units},
};

/// Shown after a failed fetch. Network, not-found and auth failures all read
/// the same to the user; the log has the details.
pub const FETCH_FAILED_NOTICE: &str = "Couldn't fetch the weather for that location.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Daily,
    Hourly,
}

impl Tab {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Daily => "daily",
            Tab::Hourly => "hourly",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Tab {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "daily" => Ok(Tab::Daily),
            "hourly" => Ok(Tab::Hourly),
            _ => Err(anyhow::anyhow!("Unknown tab '{value}'. Expected daily or hourly.")),
        }
    }
}

/// Identifies one user-initiated search. Strictly increasing per widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RequestId(u64);

impl RequestId {
    fn next(self) -> Self {
        RequestId(self.0 + 1)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything that can happen to the widget.
#[derive(Debug)]
pub enum Event {
    InputChanged(String),
    /// Search for the current input text.
    Submit,
    /// Search for a coordinate pair ("use my location").
    Locate { lat: f64, lon: f64 },
    /// Drop all results and hide the result panel.
    Clear,
    SelectTab(Tab),
    DismissNotice,
    CurrentLoaded {
        request: RequestId,
        outcome: Result<Snapshot, FetchError>,
    },
    ForecastLoaded {
        request: RequestId,
        outcome: Result<Vec<ForecastSample>, FetchError>,
        /// Wall clock when the response arrived; the hourly window is
        /// measured from here.
        received_at: NaiveDateTime,
    },
}

/// A search the dispatcher must run on behalf of the state.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchCommand {
    pub request: RequestId,
    pub query: LocationQuery,
}

#[derive(Debug, Clone)]
pub struct WidgetState {
    input: String,
    snapshot: Option<Snapshot>,
    forecast: Vec<ForecastSample>,
    hourly: Vec<ForecastSample>,
    show_results: bool,
    active_tab: Tab,
    notice: Option<String>,
    latest_request: RequestId,
    units: Units,
    horizon_hours: u32,
    error_policy: ErrorPolicy,
}

impl WidgetState {
    pub fn new(units: Units, horizon_hours: u32, error_policy: ErrorPolicy) -> Self {
        Self {
            input: String::new(),
            snapshot: None,
            forecast: Vec::new(),
            hourly: Vec::new(),
            show_results: false,
            active_tab: Tab::default(),
            notice: None,
            latest_request: RequestId::default(),
            units,
            horizon_hours,
            error_policy,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.units, config.hourly_horizon_hours, config.error_policy)
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn forecast(&self) -> &[ForecastSample] {
        &self.forecast
    }

    pub fn hourly(&self) -> &[ForecastSample] {
        &self.hourly
    }

    pub fn daily(&self) -> Vec<forecast::DailyEntry<'_>> {
        forecast::daily_view(&self.forecast)
    }

    pub fn show_results(&self) -> bool {
        self.show_results
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn latest_request(&self) -> RequestId {
        self.latest_request
    }

    pub fn units(&self) -> Units {
        self.units
    }

    pub fn horizon_hours(&self) -> u32 {
        self.horizon_hours
    }

    /// Apply one event. Returns the search to start, if the event asks for one.
    pub fn apply(&mut self, event: Event) -> Option<FetchCommand> {
        match event {
            Event::InputChanged(text) => {
                self.input = text;
                None
            }
            Event::Submit => {
                let text = std::mem::take(&mut self.input);
                Some(self.issue(LocationQuery::Name(text)))
            }
            Event::Locate { lat, lon } => {
                self.input.clear();
                Some(self.issue(LocationQuery::Coordinates { lat, lon }))
            }
            Event::Clear => {
                self.clear();
                None
            }
            Event::SelectTab(tab) => {
                self.active_tab = tab;
                None
            }
            Event::DismissNotice => {
                self.notice = None;
                None
            }
            Event::CurrentLoaded { request, outcome } => {
                if self.is_stale(request, "current") {
                    return None;
                }
                match outcome {
                    Ok(snapshot) => {
                        self.snapshot = Some(snapshot);
                        self.show_results = true;
                    }
                    Err(err) => self.fetch_failed(request, &err),
                }
                None
            }
            Event::ForecastLoaded { request, outcome, received_at } => {
                if self.is_stale(request, "forecast") {
                    return None;
                }
                match outcome {
                    Ok(series) => self.set_forecast(series, received_at),
                    Err(err) => self.fetch_failed(request, &err),
                }
                None
            }
        }
    }

    fn issue(&mut self, query: LocationQuery) -> FetchCommand {
        self.latest_request = self.latest_request.next();
        self.notice = None;
        tracing::debug!(request = %self.latest_request, %query, "issuing search");
        FetchCommand { request: self.latest_request, query }
    }

    /// Back to the pre-search baseline. Advancing the request id makes any
    /// response still in flight stale.
    fn clear(&mut self) {
        self.snapshot = None;
        self.forecast.clear();
        self.hourly.clear();
        self.show_results = false;
        self.notice = None;
        self.latest_request = self.latest_request.next();
    }

    fn set_forecast(&mut self, series: Vec<ForecastSample>, received_at: NaiveDateTime) {
        self.hourly = forecast::hourly_window(&series, received_at, self.horizon_hours);
        self.forecast = series;
    }

    fn is_stale(&self, request: RequestId, what: &str) -> bool {
        let stale = request != self.latest_request;
        if stale {
            tracing::debug!(
                %request,
                latest = %self.latest_request,
                "discarding stale {what} response"
            );
        }
        stale
    }

    fn fetch_failed(&mut self, request: RequestId, err: &FetchError) {
        tracing::warn!(%request, error = %err, "weather fetch failed");
        if self.error_policy == ErrorPolicy::Notify {
            self.notice = Some(FETCH_FAILED_NOTICE.to_string());
        }
    }
}

impl Default for WidgetState {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
