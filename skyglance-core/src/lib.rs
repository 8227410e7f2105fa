//! Core library for the `skyglance` weather widget.
//!
//! This crate defines:
//! - Configuration (API key, units, hourly horizon, error policy)
//! - The OpenWeather fetch adapter behind the `WeatherProvider` trait
//! - The forecast reducer (unique dates, daily view, hourly window)
//! - Widget state, its event handler and the async dispatcher
//! - A pure text renderer
//!
//! It is used by `skyglance-cli`, but the state machine and renderer do not
//! depend on any particular front-end.

pub mod config;
pub mod error;
pub mod forecast;
pub mod model;
pub mod provider;
pub mod render;
pub mod state;
pub mod widget;

pub use config::{Config, ErrorPolicy};
pub use error::FetchError;
pub use model::{Condition, ForecastSample, LocationQuery, Snapshot, Units};
pub use provider::{WeatherProvider, provider_from_config};
pub use render::render;
pub use state::{Event, RequestId, Tab, WidgetState};
pub use widget::Widget;
