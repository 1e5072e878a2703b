//! Tiny mock HTTP server built with `std::net::TcpListener`.
//! No extra dependencies required.
#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Start a server that accepts exactly `connections` connections, one after
/// another, answering each with `handler(request_line)`. If `delay` is set the
/// server sleeps that long before writing.
///
/// Returns the base URL (e.g. "http://127.0.0.1:54321") and a join handle that
/// yields every request line seen, in arrival order.
pub fn start_mock_server<F>(
    connections: usize,
    delay: Option<Duration>,
    handler: F,
) -> (String, thread::JoinHandle<Vec<String>>)
where
    F: Fn(&str) -> String + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().unwrap();
    let url = format!("http://{}", addr);

    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        for _ in 0..connections {
            let Ok((mut stream, _peer)) = listener.accept() else {
                break;
            };

            // Read the request head so the client doesn't block on write
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => head.extend_from_slice(&buf[..n]),
                }
            }
            let text = String::from_utf8_lossy(&head);
            let request_line = text.lines().next().unwrap_or_default().to_string();

            if let Some(d) = delay {
                thread::sleep(d);
            }

            let response = handler(&request_line);
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.flush();
            seen.push(request_line);
        }
        seen
    });

    (url, handle)
}

/// One connection, always the same answer.
pub fn one_shot(response: String) -> (String, thread::JoinHandle<Vec<String>>) {
    start_mock_server(1, None, move |_| response.clone())
}

/// Complete HTTP/1.1 response with a JSON body.
pub fn json_response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n\
         {}",
        status,
        body.len(),
        body
    )
}

pub fn ok_json(body: &str) -> String {
    json_response("200 OK", body)
}

/// A base URL nothing listens on.
pub fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub fn utc(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

/// Instant used as "now" by the fixed test clock.
pub fn t0() -> DateTime<Utc> {
    utc("2025-01-01T00:00:00Z")
}
