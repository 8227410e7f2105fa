//! Plain-text rendering of the widget.

use std::fmt::Write;

use crate::{
    forecast::DailyEntry,
    model::{ForecastSample, Snapshot, Units},
    state::{Tab, WidgetState},
};

/// Render the widget. Pure: the same state always gives the same text.
pub fn render(state: &WidgetState) -> String {
    let mut out = String::new();

    if let Some(notice) = state.notice() {
        let _ = writeln!(out, "! {notice}");
    }

    if !state.show_results() {
        return out;
    }

    let units = state.units();
    if let Some(snapshot) = state.snapshot() {
        render_snapshot(&mut out, snapshot, units);
    }

    render_tabs(&mut out, state.active_tab());

    match state.active_tab() {
        Tab::Daily => render_daily(&mut out, &state.daily(), units),
        Tab::Hourly => render_hourly(&mut out, state.hourly(), units),
    }

    out
}

fn render_snapshot(out: &mut String, snapshot: &Snapshot, units: Units) {
    let temp = units.temperature_suffix();

    let _ = writeln!(out, "{}", snapshot.place_name);
    let _ = writeln!(out, "{} {}{temp}", snapshot.condition().glyph(), whole(snapshot.temperature));
    let _ = writeln!(out, "{}", snapshot.summary);
    let _ = writeln!(
        out,
        "Feels Like {}{temp} | Humidity {}% | Wind Speed {} {}",
        whole(snapshot.feels_like),
        snapshot.humidity_pct,
        whole(snapshot.wind_speed),
        units.wind_suffix(),
    );
    out.push('\n');
}

fn render_tabs(out: &mut String, active: Tab) {
    let label = |tab: Tab, name: &str| {
        if tab == active { format!("[{name}]") } else { format!(" {name} ") }
    };
    let _ = writeln!(
        out,
        "{}  {}",
        label(Tab::Daily, "Daily Forecast"),
        label(Tab::Hourly, "Hourly Forecast")
    );
    out.push('\n');
}

fn render_daily(out: &mut String, days: &[DailyEntry<'_>], units: Units) {
    let temp = units.temperature_suffix();
    for day in days {
        let sample = day.representative;
        let _ = writeln!(
            out,
            "{:<10} {} {:<14} {:>4}{temp} / {}{temp}",
            day.weekday,
            sample.condition().glyph(),
            sample.summary,
            whole(sample.temp_max),
            whole(sample.temp_min),
        );
    }
}

fn render_hourly(out: &mut String, hours: &[ForecastSample], units: Units) {
    let temp = units.temperature_suffix();
    for sample in hours {
        let _ = writeln!(
            out,
            "{} {} {:<14} {:>4}{temp}",
            sample.timestamp.format("%H:%M:%S"),
            sample.condition().glyph(),
            sample.summary,
            whole(sample.temperature),
        );
    }
}

/// Round to a whole number without printing "-0".
fn whole(value: f64) -> String {
    let rounded = value.round();
    if rounded == 0.0 { "0".to_string() } else { format!("{rounded:.0}") }
}
