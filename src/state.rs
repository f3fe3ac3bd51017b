use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::engine::booking::{BookingEngine, EngineSettings};
use crate::engine::dispatch::{DriverDispatcher, MockDispatcher};
use crate::geo::gazetteer::{Gazetteer, LocationResolver};
use crate::models::event::BookingEvent;
use crate::observability::metrics::Metrics;

pub struct AppState {
    pub sessions: DashMap<String, BookingEngine>,
    pub settings: EngineSettings,
    pub dispatcher: Arc<dyn DriverDispatcher>,
    pub resolver: Arc<dyn LocationResolver>,
    pub booking_events_tx: broadcast::Sender<BookingEvent>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(settings: EngineSettings, event_buffer_size: usize) -> Self {
        Self::with_collaborators(
            settings,
            event_buffer_size,
            Arc::new(MockDispatcher::default()),
            Arc::new(Gazetteer::bangalore()),
        )
    }

    pub fn with_collaborators(
        settings: EngineSettings,
        event_buffer_size: usize,
        dispatcher: Arc<dyn DriverDispatcher>,
        resolver: Arc<dyn LocationResolver>,
    ) -> Self {
        let (booking_events_tx, _unused_rx) = broadcast::channel(event_buffer_size);

        Self {
            sessions: DashMap::new(),
            settings,
            dispatcher,
            resolver,
            booking_events_tx,
            metrics: Metrics::new(),
        }
    }

    /// The booking engine for `user_id`, created on first use.
    pub fn session(&self, user_id: &str) -> BookingEngine {
        if let Some(engine) = self.sessions.get(user_id) {
            return engine.value().clone();
        }

        self.sessions
            .entry(user_id.to_string())
            .or_insert_with(|| {
                tracing::info!(user_id, "booking session opened");
                BookingEngine::new(
                    user_id,
                    self.settings.clone(),
                    self.dispatcher.clone(),
                    self.booking_events_tx.clone(),
                    self.metrics.clone(),
                )
            })
            .value()
            .clone()
    }

    /// Existing session only; lookups never open one.
    pub fn existing_session(&self, user_id: &str) -> Option<BookingEngine> {
        self.sessions.get(user_id).map(|engine| engine.value().clone())
    }
}
