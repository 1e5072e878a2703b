use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::{DatePolicy, MissingField};
use crate::error::{FetchError, FetchResult};
use crate::time_utils::{parse_date, to_iso};

// The six lifecycle milestones of one event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTimeSnapshot {
    pub event_start: DateTime<Utc>,
    pub event_end: DateTime<Utc>,
    pub cutoff: DateTime<Utc>,
    pub countdown_timer: DateTime<Utc>,
    pub walk_in_start: DateTime<Utc>,
    pub button_start: DateTime<Utc>,
}

impl EventTimeSnapshot {
    /// Every field set to `now` (the state before any successful fetch).
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            event_start: now,
            event_end: now,
            cutoff: now,
            countdown_timer: now,
            walk_in_start: now,
            button_start: now,
        }
    }

    /// Fields paired with their wire names, in display order.
    pub fn fields(&self) -> [(&'static str, DateTime<Utc>); 6] {
        [
            ("eventStart", self.event_start),
            ("eventEnd", self.event_end),
            ("cutoff", self.cutoff),
            ("countdownTimer", self.countdown_timer),
            ("walkInStart", self.walk_in_start),
            ("buttonStart", self.button_start),
        ]
    }
}

impl fmt::Display for EventTimeSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.fields() {
            writeln!(f, "{}: {}", name, to_iso(&value))?;
        }
        Ok(())
    }
}

/// Body of `GET /eventTimes`. Both observed naming schemes are accepted
/// (`eventStart`/`eventEnd` and `start`/`end`).
#[derive(Debug, Default, Deserialize)]
pub struct EventTimesPayload {
    #[serde(rename = "eventStart", alias = "start", default)]
    pub event_start: Option<String>,
    #[serde(rename = "eventEnd", alias = "end", default)]
    pub event_end: Option<String>,
    #[serde(default)]
    pub cutoff: Option<String>,
    #[serde(rename = "countdownTimer", default)]
    pub countdown_timer: Option<String>,
    #[serde(rename = "walkInStart", default)]
    pub walk_in_start: Option<String>,
    #[serde(rename = "buttonStart", default)]
    pub button_start: Option<String>,
}

impl EventTimesPayload {
    /// Convert every field under `policy`. Fails as a whole: either all six
    /// fields are produced or none are.
    pub fn into_snapshot(
        self,
        policy: DatePolicy,
        fallback: FixedOffset,
        now: DateTime<Utc>,
    ) -> FetchResult<EventTimeSnapshot> {
        let convert = |name: &'static str, raw: Option<String>| -> FetchResult<DateTime<Utc>> {
            debug!("{}: {:?}", name, raw);
            // null, "" and whitespace all count as missing
            match raw.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
                Some(s) => {
                    let parsed = policy.adjustment.apply(parse_date(s, fallback)?)?;
                    debug!("{} parsed: {}", name, to_iso(&parsed));
                    Ok(parsed)
                }
                None => match policy.missing {
                    MissingField::FetchTime => {
                        warn!("{} missing, using fetch time {}", name, to_iso(&now));
                        Ok(now)
                    }
                    MissingField::Reject => Err(FetchError::MissingField(name)),
                },
            }
        };

        Ok(EventTimeSnapshot {
            event_start: convert("eventStart", self.event_start)?,
            event_end: convert("eventEnd", self.event_end)?,
            cutoff: convert("cutoff", self.cutoff)?,
            countdown_timer: convert("countdownTimer", self.countdown_timer)?,
            walk_in_start: convert("walkInStart", self.walk_in_start)?,
            button_start: convert("buttonStart", self.button_start)?,
        })
    }
}
