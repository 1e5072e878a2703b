// src/main.rs
use std::env;
use std::error::Error;

use event_times::time_utils::to_iso;
use event_times::{ClientConfig, EventTimeClient};

fn init_logging() {
    let (global_level, my_code_level) = if cfg!(debug_assertions) {
        (log::LevelFilter::Warn, log::LevelFilter::Info)
    } else {
        (log::LevelFilter::Error, log::LevelFilter::Warn)
    };

    // RUST_LOG, when set, takes precedence over the defaults above
    env_logger::Builder::new()
        .filter(None, global_level)
        .filter(Some("event_times"), my_code_level)
        .parse_default_env()
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logging();

    let config = ClientConfig::from_env()?;
    // Usage: event_times [--json] [EVENT_ID]
    let mut json = false;
    let mut event_id = None;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            _ => event_id = Some(arg),
        }
    }
    let config = match event_id {
        Some(id) => config.with_default_event_id(id),
        None => config,
    };
    let client = EventTimeClient::new(config);

    let server_time = client.server_time()?;
    let snapshot = client.refresh()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!("=== Event times: {} ===", client.config().default_event_id);
    print!("{}", snapshot);
    println!("Server time: {}", to_iso(&server_time));
    Ok(())
}
