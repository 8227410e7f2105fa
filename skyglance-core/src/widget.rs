//! Event dispatcher: applies events to the state and runs the searches it
//! asks for.
//!
//! Fetches run as tokio tasks and report back through a channel, so
//! [`Widget::dispatch`] never waits on the network. Only the widget mutates
//! the state.

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::{
    provider::WeatherProvider,
    state::{Event, FetchCommand, WidgetState},
};

#[derive(Debug)]
pub struct Widget {
    provider: Arc<dyn WeatherProvider>,
    state: WidgetState,
    tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
    in_flight: usize,
}

impl Widget {
    pub fn new(provider: Arc<dyn WeatherProvider>, state: WidgetState) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { provider, state, tx, rx, in_flight: 0 }
    }

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    /// Number of fetches whose responses have not been dispatched yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Apply an event; start the fetches it triggers without waiting for them.
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&mut self, event: Event) {
        if matches!(event, Event::CurrentLoaded { .. } | Event::ForecastLoaded { .. }) {
            self.in_flight = self.in_flight.saturating_sub(1);
        }

        if let Some(command) = self.state.apply(event) {
            self.spawn_fetch(command);
        }
    }

    /// Dispatch fetch results as they arrive until none are outstanding.
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            match self.rx.recv().await {
                Some(event) => self.dispatch(event),
                None => break,
            }
        }
    }

    fn spawn_fetch(&mut self, command: FetchCommand) {
        let FetchCommand { request, query } = command;
        let query = Arc::new(query);
        self.in_flight += 2;

        let provider = Arc::clone(&self.provider);
        let tx = self.tx.clone();
        let current_query = Arc::clone(&query);
        tokio::spawn(async move {
            let outcome = provider.current(&current_query).await;
            let _ = tx.send(Event::CurrentLoaded { request, outcome });
        });

        let provider = Arc::clone(&self.provider);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = provider.forecast(&query).await;
            let received_at = Utc::now().naive_utc();
            let _ = tx.send(Event::ForecastLoaded { request, outcome, received_at });
        });
    }
}
