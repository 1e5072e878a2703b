use std::io;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use log::{debug, error, info};
use serde::Deserialize;

use crate::clock::{Clock, SystemClock};
use crate::config::{ClientConfig, FailurePolicy};
use crate::error::{FetchError, FetchResult};
use crate::snapshot::{EventTimeSnapshot, EventTimesPayload};
use crate::time_utils::{parse_date, to_iso};

// Body of GET /returnUTC
#[derive(Deserialize)]
struct ServerTimePayload {
    #[serde(rename = "serverDate", default)]
    server_date: Option<String>,
}

/// Fetches event times and server time, and holds the latest event snapshot.
///
/// All methods take `&self`; wrap the client in an `Arc` to share it between
/// threads. A failed fetch never touches the stored snapshot.
pub struct EventTimeClient {
    config: ClientConfig,
    agent: ureq::Agent,
    clock: Box<dyn Clock>,
    state: Mutex<EventTimeSnapshot>,
}

impl EventTimeClient {
    /// Client on the wall clock.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    /// Client whose "now" defaults come from `clock`.
    pub fn with_clock(config: ClientConfig, clock: impl Clock + 'static) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let initial = EventTimeSnapshot::at(clock.now());

        EventTimeClient {
            config,
            agent: builder.build(),
            clock: Box::new(clock),
            state: Mutex::new(initial),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Copy of the current snapshot.
    pub fn snapshot(&self) -> EventTimeSnapshot {
        *self.lock_state()
    }

    /// GET the event times for `event_id` and replace the snapshot with them.
    /// On error the previous snapshot is kept and the error is returned.
    pub fn fetch_event_times(&self, event_id: &str) -> FetchResult<EventTimeSnapshot> {
        let url = self.config.event_times_url();
        debug!("GET {}?eventId={}", url, event_id);

        let resp = self.agent.get(&url).query("eventId", event_id).call()?;
        let raw: serde_json::Value = resp.into_json().map_err(body_error)?;
        debug!("Raw event times response: {}", raw);

        let payload: EventTimesPayload = serde_json::from_value(raw)?;
        let snapshot = payload.into_snapshot(
            self.config.date_policy,
            self.config.fallback_offset,
            self.clock.now(),
        )?;

        // Swap in all six fields at once
        *self.lock_state() = snapshot;
        info!("Event times updated for {}", event_id);
        Ok(snapshot)
    }

    /// `fetch_event_times` for the configured default event id.
    pub fn fetch_event_times_default(&self) -> FetchResult<EventTimeSnapshot> {
        self.fetch_event_times(&self.config.default_event_id)
    }

    /// Silent-default variant: logs any error and returns the retained snapshot.
    pub fn fetch_event_times_or_retain(&self, event_id: &str) -> EventTimeSnapshot {
        match self.fetch_event_times(event_id) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!("Error fetching event times for {}: {}", event_id, e);
                self.snapshot()
            }
        }
    }

    /// Refresh the default event under the configured failure policy.
    pub fn refresh(&self) -> FetchResult<EventTimeSnapshot> {
        match self.config.failure_policy {
            FailurePolicy::Propagate => self.fetch_event_times_default(),
            FailurePolicy::SilentDefault => {
                Ok(self.fetch_event_times_or_retain(&self.config.default_event_id))
            }
        }
    }

    /// GET the server's current time. Nothing is stored.
    pub fn fetch_server_time(&self) -> FetchResult<DateTime<Utc>> {
        let url = self.config.server_time_url();
        debug!("GET {}", url);

        let resp = self.agent.get(&url).call()?;
        let raw: serde_json::Value = resp.into_json().map_err(body_error)?;
        debug!("Server time response: {}", raw);

        let payload: ServerTimePayload = serde_json::from_value(raw)?;
        let server_date = payload
            .server_date
            .filter(|s| !s.trim().is_empty())
            .ok_or(FetchError::MissingField("serverDate"))?;

        let parsed = parse_date(&server_date, self.config.fallback_offset)?;
        debug!("Parsed server time: {}", to_iso(&parsed));
        Ok(parsed)
    }

    /// Silent-default variant: logs any error and falls back to the clock's now.
    pub fn fetch_server_time_or_now(&self) -> DateTime<Utc> {
        self.fetch_server_time().unwrap_or_else(|e| {
            error!("Error fetching server time: {}", e);
            self.clock.now()
        })
    }

    /// Server time under the configured failure policy.
    pub fn server_time(&self) -> FetchResult<DateTime<Utc>> {
        match self.config.failure_policy {
            FailurePolicy::Propagate => self.fetch_server_time(),
            FailurePolicy::SilentDefault => Ok(self.fetch_server_time_or_now()),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, EventTimeSnapshot> {
        // Plain data: a panic elsewhere cannot leave it half-written
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// Body read failures: bad JSON is a parse error, a broken stream is transport
fn body_error(e: io::Error) -> FetchError {
    match e.kind() {
        io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => {
            FetchError::Parse(format!("Failed to parse JSON: {}", e))
        }
        _ => FetchError::Transport(format!("Failed to read response body: {}", e)),
    }
}
