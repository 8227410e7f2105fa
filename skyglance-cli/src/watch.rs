//! Interactive widget loop for `skyglance watch`.

use anyhow::Context;
use inquire::{InquireError, Text};
use skyglance_core::{Event, Tab, Widget, render};

const HELP: &str = "\
Type a place name and press Enter to search.
  :daily / :hourly      switch forecast tab
  :here <lat>,<lon>     search by coordinates
  :clear                clear results
  :help                 show this help
  :quit                 exit";

#[derive(Debug, PartialEq)]
enum Input {
    Search(String),
    Locate { lat: f64, lon: f64 },
    SelectTab(Tab),
    Clear,
    Help,
    Quit,
}

impl Input {
    fn into_events(self) -> Vec<Event> {
        match self {
            Input::Search(text) => vec![Event::InputChanged(text), Event::Submit],
            Input::Locate { lat, lon } => vec![Event::Locate { lat, lon }],
            Input::SelectTab(tab) => vec![Event::SelectTab(tab)],
            Input::Clear => vec![Event::Clear],
            Input::Help | Input::Quit => Vec::new(),
        }
    }
}

fn parse(line: &str) -> Result<Input, String> {
    let line = line.trim();
    let Some(command) = line.strip_prefix(':') else {
        return Ok(Input::Search(line.to_string()));
    };

    let (name, rest) = command.split_once(char::is_whitespace).unwrap_or((command, ""));
    match name {
        "daily" => Ok(Input::SelectTab(Tab::Daily)),
        "hourly" => Ok(Input::SelectTab(Tab::Hourly)),
        "clear" => Ok(Input::Clear),
        "help" | "h" => Ok(Input::Help),
        "quit" | "q" => Ok(Input::Quit),
        "here" => parse_coordinates(rest),
        other => Err(format!("Unknown command ':{other}'. Type :help for commands.")),
    }
}

fn parse_coordinates(text: &str) -> Result<Input, String> {
    let usage = || "Usage: :here <lat>,<lon>  (e.g. :here 51.5,-0.12)".to_string();
    let (lat, lon) = text.split_once(',').ok_or_else(usage)?;
    let lat: f64 = lat.trim().parse().map_err(|_| usage())?;
    let lon: f64 = lon.trim().parse().map_err(|_| usage())?;

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err("Latitude must be within ±90 and longitude within ±180.".to_string());
    }
    Ok(Input::Locate { lat, lon })
}

pub async fn run(widget: &mut Widget) -> anyhow::Result<()> {
    println!("{HELP}\n");

    loop {
        let answer = tokio::task::spawn_blocking(|| Text::new("Location:").prompt())
            .await
            .context("Input task failed")?;

        let line = match answer {
            Ok(line) => line,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e).context("Failed to read input"),
        };

        let input = match parse(&line) {
            Ok(Input::Quit) => break,
            Ok(Input::Help) => {
                println!("{HELP}\n");
                continue;
            }
            Ok(input) => input,
            Err(msg) => {
                println!("{msg}");
                continue;
            }
        };

        for event in input.into_events() {
            widget.dispatch(event);
        }
        widget.settle().await;

        println!("{}", render(widget.state()));
        // Notices are shown once.
        widget.dispatch(Event::DismissNotice);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_search() {
        assert_eq!(parse("  New York "), Ok(Input::Search("New York".into())));
        assert_eq!(parse(""), Ok(Input::Search(String::new())));
    }

    #[test]
    fn commands_are_recognised() {
        assert_eq!(parse(":hourly"), Ok(Input::SelectTab(Tab::Hourly)));
        assert_eq!(parse(":daily"), Ok(Input::SelectTab(Tab::Daily)));
        assert_eq!(parse(":clear"), Ok(Input::Clear));
        assert_eq!(parse(":q"), Ok(Input::Quit));
        assert!(parse(":weekly").is_err());
    }

    #[test]
    fn here_parses_coordinates() {
        assert_eq!(parse(":here 51.5, -0.12"), Ok(Input::Locate { lat: 51.5, lon: -0.12 }));
        assert!(parse(":here 51.5").is_err());
        assert!(parse(":here north,south").is_err());
        assert!(parse(":here 91,0").is_err());
    }

    #[test]
    fn search_expands_to_input_then_submit() {
        let events = Input::Search("Oslo".into()).into_events();
        assert!(matches!(events.as_slice(), [Event::InputChanged(s), Event::Submit] if s == "Oslo"));
    }
}
