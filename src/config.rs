use std::time::Duration;

use chrono::{DateTime, FixedOffset, Offset, TimeDelta, Utc};

use crate::error::{ConfigError, FetchError, FetchResult};
use crate::time_utils::parse_offset;

pub const DEFAULT_EVENT_TIMES_BASE_URL: &str =
    "https://wzun0tc594.execute-api.us-west-2.amazonaws.com";
pub const DEFAULT_SERVER_TIME_BASE_URL: &str =
    "https://s6ivtaeizj.execute-api.us-west-2.amazonaws.com";
pub const DEFAULT_EVENT_ID: &str = "testEvent5";
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

// Environment variables read by `ClientConfig::from_env`
pub const ENV_EVENT_TIMES_BASE_URL: &str = "EVENT_TIMES_BASE_URL";
pub const ENV_SERVER_TIME_BASE_URL: &str = "SERVER_TIME_BASE_URL";
pub const ENV_EVENT_ID: &str = "EVENT_TIMES_EVENT_ID";
pub const ENV_TIMEOUT_SECS: &str = "EVENT_TIMES_TIMEOUT_SECS";
pub const ENV_DATE_POLICY: &str = "EVENT_TIMES_DATE_POLICY";
pub const ENV_FALLBACK_OFFSET: &str = "EVENT_TIMES_FALLBACK_OFFSET";
pub const ENV_FAILURE_POLICY: &str = "EVENT_TIMES_FAILURE_POLICY";

/// Correction applied to every parsed event time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateAdjustment {
    None,
    SubtractHours(i64),
}

impl DateAdjustment {
    /// Fails when the shifted instant falls outside the representable range.
    pub fn apply(self, dt: DateTime<Utc>) -> FetchResult<DateTime<Utc>> {
        match self {
            DateAdjustment::None => Ok(dt),
            DateAdjustment::SubtractHours(h) => TimeDelta::try_hours(h)
                .and_then(|delta| dt.checked_sub_signed(delta))
                .ok_or_else(|| {
                    FetchError::Parse(format!(
                        "date out of range after adjustment: {} minus {}h",
                        dt, h
                    ))
                }),
        }
    }
}

/// What a missing event-time field turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    FetchTime, // clock "now" at fetch time
    Reject,    // the whole fetch fails with FetchError::MissingField
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatePolicy {
    pub adjustment: DateAdjustment,
    pub missing: MissingField,
}

impl DatePolicy {
    /// Dates as parsed; missing fields are an error.
    pub fn strict() -> Self {
        Self {
            adjustment: DateAdjustment::None,
            missing: MissingField::Reject,
        }
    }

    /// Six hours subtracted from every date; missing fields become fetch time.
    pub fn legacy() -> Self {
        Self {
            adjustment: DateAdjustment::SubtractHours(6),
            missing: MissingField::FetchTime,
        }
    }
}

impl Default for DatePolicy {
    fn default() -> Self {
        Self::strict()
    }
}

/// How `EventTimeClient::refresh` and the binary treat a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    #[default]
    Propagate,
    SilentDefault,
}

// Client configuration: where to fetch from and how to interpret the answers
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub event_times_base_url: String,
    pub server_time_base_url: String,
    pub default_event_id: String,
    pub timeout: Option<Duration>,      // None = transport default (no limit)
    pub date_policy: DatePolicy,
    pub fallback_offset: FixedOffset,   // for date strings without a zone
    pub failure_policy: FailurePolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            event_times_base_url: DEFAULT_EVENT_TIMES_BASE_URL.to_string(),
            server_time_base_url: DEFAULT_SERVER_TIME_BASE_URL.to_string(),
            default_event_id: DEFAULT_EVENT_ID.to_string(),
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            date_policy: DatePolicy::default(),
            fallback_offset: Utc.fix(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl ClientConfig {
    pub fn with_event_times_base_url(mut self, url: impl Into<String>) -> Self {
        self.event_times_base_url = url.into();
        self
    }

    pub fn with_server_time_base_url(mut self, url: impl Into<String>) -> Self {
        self.server_time_base_url = url.into();
        self
    }

    pub fn with_default_event_id(mut self, id: impl Into<String>) -> Self {
        self.default_event_id = id.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_date_policy(mut self, policy: DatePolicy) -> Self {
        self.date_policy = policy;
        self
    }

    pub fn with_fallback_offset(mut self, offset: FixedOffset) -> Self {
        self.fallback_offset = offset;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Full URL of the event-times endpoint (without the query string).
    pub fn event_times_url(&self) -> String {
        format!("{}/eventTimes", self.event_times_base_url.trim_end_matches('/'))
    }

    /// Full URL of the server-time endpoint.
    pub fn server_time_url(&self) -> String {
        format!("{}/returnUTC", self.server_time_base_url.trim_end_matches('/'))
    }

    /// Defaults overridden by whichever `EVENT_TIMES_*` variables are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as `from_env`, but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        // Blank values count as unset
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(url) = get(ENV_EVENT_TIMES_BASE_URL) {
            cfg.event_times_base_url = url;
        }
        if let Some(url) = get(ENV_SERVER_TIME_BASE_URL) {
            cfg.server_time_base_url = url;
        }
        if let Some(id) = get(ENV_EVENT_ID) {
            cfg.default_event_id = id;
        }
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw
                .parse()
                .map_err(|e| invalid(ENV_TIMEOUT_SECS, &raw, format!("{}", e)))?;
            cfg.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(raw) = get(ENV_DATE_POLICY) {
            cfg.date_policy = match raw.to_ascii_lowercase().as_str() {
                "strict" => DatePolicy::strict(),
                "legacy" => DatePolicy::legacy(),
                _ => return Err(invalid(ENV_DATE_POLICY, &raw, "expected strict or legacy")),
            };
        }
        if let Some(raw) = get(ENV_FALLBACK_OFFSET) {
            cfg.fallback_offset = parse_offset(&raw).ok_or_else(|| {
                invalid(ENV_FALLBACK_OFFSET, &raw, "expected +HH:MM, -HHMM or a zone abbreviation")
            })?;
        }
        if let Some(raw) = get(ENV_FAILURE_POLICY) {
            cfg.failure_policy = match raw.to_ascii_lowercase().as_str() {
                "propagate" => FailurePolicy::Propagate,
                "silent" => FailurePolicy::SilentDefault,
                _ => return Err(invalid(ENV_FAILURE_POLICY, &raw, "expected propagate or silent")),
            };
        }

        Ok(cfg)
    }
}

fn invalid(var: &'static str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        var,
        value: value.to_string(),
        reason: reason.into(),
    }
}
