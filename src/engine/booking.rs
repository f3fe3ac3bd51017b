use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tokio::task::AbortHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::engine::dispatch::DriverDispatcher;
use crate::engine::fare::FareConfig;
use crate::error::AppError;
use crate::models::booking::{Booking, BookingStatus, BookingUpdate, Location};
use crate::models::event::{BookingEvent, BookingEventKind};
use crate::observability::metrics::Metrics;

/// What cancel/update do with an id that is not in the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownBookingPolicy {
    Reject,
    Ignore,
}

/// What create does while the current slot still holds a live booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveBookingPolicy {
    Reject,
    Replace,
}

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub fare: FareConfig,
    pub booking_latency: Duration,
    pub cancel_latency: Duration,
    pub confirmation_delay: Duration,
    pub unknown_booking: UnknownBookingPolicy,
    pub active_booking: ActiveBookingPolicy,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            fare: FareConfig::default(),
            booking_latency: Duration::from_millis(2_000),
            cancel_latency: Duration::from_millis(1_000),
            confirmation_delay: Duration::from_millis(3_000),
            unknown_booking: UnknownBookingPolicy::Reject,
            active_booking: ActiveBookingPolicy::Reject,
        }
    }
}

/// Current slot, history and scheduled confirmations, always mutated together.
#[derive(Default)]
struct Ledger {
    current: Option<String>,
    /// Oldest first.
    history: Vec<Booking>,
    confirmations: HashMap<String, AbortHandle>,
}

impl Ledger {
    fn find(&self, id: &str) -> Option<&Booking> {
        self.history.iter().find(|booking| booking.id == id)
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut Booking> {
        self.history.iter_mut().find(|booking| booking.id == id)
    }

    fn current(&self) -> Option<&Booking> {
        self.current.as_deref().and_then(|id| self.find(id))
    }

    fn active(&self) -> Option<&Booking> {
        self.current().filter(|booking| !booking.status.is_terminal())
    }
}

struct Shared {
    user_id: String,
    settings: EngineSettings,
    dispatcher: Arc<dyn DriverDispatcher>,
    ledger: Mutex<Ledger>,
    current_tx: watch::Sender<Option<Booking>>,
    events_tx: broadcast::Sender<BookingEvent>,
    metrics: Metrics,
    in_flight: AtomicUsize,
}

/// Booking lifecycle for one user session.
///
/// Cloning is cheap and every clone drives the same session.
#[derive(Clone)]
pub struct BookingEngine {
    shared: Arc<Shared>,
}

impl BookingEngine {
    pub fn new(
        user_id: impl Into<String>,
        settings: EngineSettings,
        dispatcher: Arc<dyn DriverDispatcher>,
        events_tx: broadcast::Sender<BookingEvent>,
        metrics: Metrics,
    ) -> Self {
        let (current_tx, _unused_rx) = watch::channel(None);

        Self {
            shared: Arc::new(Shared {
                user_id: user_id.into(),
                settings,
                dispatcher,
                ledger: Mutex::new(Ledger::default()),
                current_tx,
                events_tx,
                metrics,
                in_flight: AtomicUsize::new(0),
            }),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.shared.user_id
    }

    /// Prices the trip, records it as the current booking in `pending` and
    /// schedules the simulated driver assignment.
    pub async fn create_booking(
        &self,
        pickup: Location,
        dropoff: Location,
        scheduled_time: DateTime<Utc>,
    ) -> Result<Booking, AppError> {
        let _in_flight = InFlight::enter(&self.shared.in_flight);

        simulate_latency(self.shared.settings.booking_latency).await;

        let quote = match self.shared.settings.fare.quote(&pickup, &dropoff) {
            Ok(quote) => quote,
            Err(err) => {
                self.record_outcome("invalid");
                return Err(err);
            }
        };

        let booking = Booking {
            id: format!("booking_{}", Uuid::new_v4().simple()),
            user_id: self.shared.user_id.clone(),
            pickup_location: pickup,
            dropoff_location: dropoff,
            scheduled_time,
            distance_km: quote.distance_km,
            fare: quote.fare,
            estimated_duration_minutes: quote.estimated_duration_minutes,
            status: BookingStatus::Pending,
            driver_info: None,
            created_at: Utc::now(),
        };

        let mut ledger = self.ledger();

        if self.shared.settings.active_booking == ActiveBookingPolicy::Reject {
            if let Some(active) = ledger.active() {
                let message = format!("booking {} is still {}", active.id, active.status);
                self.record_outcome("rejected");
                return Err(AppError::Conflict(message));
            }
        }

        ledger.history.push(booking.clone());
        ledger.current = Some(booking.id.clone());

        let handle = self.schedule_confirmation(booking.id.clone());
        ledger.confirmations.insert(booking.id.clone(), handle);
        self.shared.metrics.pending_confirmations.inc();

        self.record_outcome("created");
        self.shared.metrics.booking_fare.observe(f64::from(booking.fare));
        self.publish(&ledger, BookingEventKind::Created, booking.clone());

        info!(
            user_id = %self.shared.user_id,
            booking_id = %booking.id,
            distance_km = booking.distance_km,
            fare = booking.fare,
            "booking created"
        );

        Ok(booking)
    }

    /// Cancels as soon as it is called; the caller then waits out the
    /// simulated latency before seeing the result.
    pub async fn cancel_booking(&self, booking_id: &str) -> Result<(), AppError> {
        let result = self.cancel_now(booking_id);

        simulate_latency(self.shared.settings.cancel_latency).await;

        result
    }

    fn cancel_now(&self, booking_id: &str) -> Result<(), AppError> {
        let mut ledger = self.ledger();
        let cancelled = self.transition(&mut ledger, booking_id, BookingStatus::Cancelled)?;
        if let Some(booking) = cancelled {
            info!(user_id = %self.shared.user_id, booking_id, "booking cancelled");
            self.publish(&ledger, BookingEventKind::Cancelled, booking);
        }

        Ok(())
    }

    /// Moves a booking along the lifecycle on behalf of an external caller.
    pub fn update_booking_status(
        &self,
        booking_id: &str,
        status: BookingStatus,
    ) -> Result<(), AppError> {
        let mut ledger = self.ledger();
        if let Some(booking) = self.transition(&mut ledger, booking_id, status)? {
            info!(
                user_id = %self.shared.user_id,
                booking_id,
                status = %status,
                "booking status updated"
            );
            let kind = if status == BookingStatus::Cancelled {
                BookingEventKind::Cancelled
            } else {
                BookingEventKind::StatusChanged
            };
            self.publish(&ledger, kind, booking);
        }

        Ok(())
    }

    /// Every booking of the session, most recent first.
    pub fn booking_history(&self) -> Vec<Booking> {
        self.ledger().history.iter().rev().cloned().collect()
    }

    pub fn history_len(&self) -> usize {
        self.ledger().history.len()
    }

    pub fn booking(&self, booking_id: &str) -> Option<Booking> {
        self.ledger().find(booking_id).cloned()
    }

    pub fn current_booking(&self) -> Option<Booking> {
        self.ledger().current().cloned()
    }

    pub fn subscribe_current(&self) -> watch::Receiver<Option<Booking>> {
        self.shared.current_tx.subscribe()
    }

    /// True while a create call is waiting out its simulated latency.
    pub fn is_booking(&self) -> bool {
        self.shared.in_flight.load(Ordering::SeqCst) > 0
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.shared
            .ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn transition(
        &self,
        ledger: &mut Ledger,
        booking_id: &str,
        to: BookingStatus,
    ) -> Result<Option<Booking>, AppError> {
        let Some(booking) = ledger.find_mut(booking_id) else {
            return match self.shared.settings.unknown_booking {
                UnknownBookingPolicy::Reject => {
                    Err(AppError::NotFound(format!("booking {booking_id} not found")))
                }
                UnknownBookingPolicy::Ignore => {
                    debug!(booking_id, "ignoring update for unknown booking");
                    Ok(None)
                }
            };
        };

        let from = booking.status;
        if from == to {
            return Ok(None);
        }
        if !from.can_transition_to(to) {
            return Err(AppError::InvalidTransition { from, to });
        }

        let update = if to == BookingStatus::Confirmed {
            BookingUpdate::confirmed_with(self.shared.dispatcher.assign(booking)?)
        } else {
            BookingUpdate::status(to)
        };
        booking.apply(update);
        let updated = booking.clone();

        if from == BookingStatus::Pending {
            if let Some(handle) = ledger.confirmations.remove(booking_id) {
                handle.abort();
                self.shared.metrics.pending_confirmations.dec();
            }
        }
        if to.is_terminal() && ledger.current.as_deref() == Some(booking_id) {
            ledger.current = None;
        }

        self.shared
            .metrics
            .booking_transitions_total
            .with_label_values(&[to.as_str()])
            .inc();

        Ok(Some(updated))
    }

    fn schedule_confirmation(&self, booking_id: String) -> AbortHandle {
        let engine = Arc::downgrade(&self.shared);
        let delay = self.shared.settings.confirmation_delay;

        tokio::spawn(async move {
            sleep(delay).await;
            confirm(engine, &booking_id);
        })
        .abort_handle()
    }

    fn record_outcome(&self, outcome: &str) {
        self.shared
            .metrics
            .bookings_total
            .with_label_values(&[outcome])
            .inc();
    }

    fn publish(&self, ledger: &Ledger, kind: BookingEventKind, booking: Booking) {
        self.shared.current_tx.send_replace(ledger.current().cloned());

        let _ = self.shared.events_tx.send(BookingEvent {
            user_id: self.shared.user_id.clone(),
            kind,
            booking,
        });
    }
}

/// Attaches a driver, but only to a booking still waiting in `pending`.
fn confirm(shared: Weak<Shared>, booking_id: &str) {
    let Some(shared) = shared.upgrade() else {
        return;
    };
    let engine = BookingEngine { shared };
    let mut ledger = engine.ledger();

    if ledger.confirmations.remove(booking_id).is_some() {
        engine.shared.metrics.pending_confirmations.dec();
    }

    let Some(booking) = ledger.find_mut(booking_id) else {
        return;
    };

    if booking.status != BookingStatus::Pending {
        debug!(booking_id, status = %booking.status, "skipping confirmation");
        return;
    }

    let driver = match engine.shared.dispatcher.assign(booking) {
        Ok(driver) => driver,
        Err(err) => {
            warn!(booking_id, error = %err, "driver assignment failed; booking stays pending");
            return;
        }
    };

    booking.apply(BookingUpdate::confirmed_with(driver));
    let confirmed = booking.clone();

    engine
        .shared
        .metrics
        .booking_transitions_total
        .with_label_values(&[BookingStatus::Confirmed.as_str()])
        .inc();

    info!(
        user_id = %engine.shared.user_id,
        booking_id,
        driver = %confirmed.driver_info.as_ref().map(|d| d.name.as_str()).unwrap_or_default(),
        "booking confirmed"
    );

    engine.publish(&ledger, BookingEventKind::Confirmed, confirmed);
}

async fn simulate_latency(latency: Duration) {
    if !latency.is_zero() {
        sleep(latency).await;
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
