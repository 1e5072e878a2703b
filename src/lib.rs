// Central module file that makes other modules available to the project.

// Fetches event times and server time, holds the latest snapshot
pub mod client;

// Endpoint URLs, timeout and date/failure policies
pub mod config;

// Fetch and configuration errors
pub mod error;

// Source of "now" (swappable in tests)
pub mod clock;

// Parsing date strings with explicit zones
pub mod time_utils;

// The six event milestones and the JSON payload they come from
pub mod snapshot;

pub use client::EventTimeClient;
pub use config::{ClientConfig, DateAdjustment, DatePolicy, FailurePolicy, MissingField};
pub use error::{ConfigError, ErrorKind, FetchError};
pub use snapshot::EventTimeSnapshot;
