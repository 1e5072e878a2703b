// Date-string parsing for event and server timestamps.
//
// Accepted shapes:
//   2025-04-29T21:33:00Z                 (RFC 3339)
//   Tue, 29 Apr 2025 15:33:00 -0600      (RFC 2822)
//   April 29, 2025 15:33:00 MDT          (named zone abbreviation)
//   2025-04-29 15:33:00 +02:00           (numeric offset)
//   April 29, 2025 15:33:00              (no zone: caller's fallback offset)
use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, TimeZone, Utc};

use crate::error::{FetchError, FetchResult};

// Date/time layouts tried once the zone token (if any) has been split off.
const NAIVE_FORMATS: &[&str] = &[
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse a date string into a UTC instant.
/// Zone information in the string wins; `fallback` is only used when the
/// string carries none.
pub fn parse_date(input: &str, fallback: FixedOffset) -> FetchResult<DateTime<Utc>> {
    let s = input.trim();
    if s.is_empty() {
        return Err(FetchError::Parse("empty date string".into()));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    // Trailing zone token, e.g. "MDT" or "-06:00"
    if let Some((head, tail)) = s.rsplit_once(char::is_whitespace) {
        if let Some(offset) = parse_offset(tail) {
            if let Some(naive) = parse_naive(head.trim_end()) {
                return localize(naive, offset, input);
            }
        }
    }

    match parse_naive(s) {
        Some(naive) => localize(naive, fallback, input),
        None => Err(FetchError::Parse(format!("unrecognized date: '{}'", input))),
    }
}

/// Resolve a zone token: a known abbreviation (case-insensitive) or a numeric
/// offset such as `+0200`, `-06:00` or `+05`.
pub fn parse_offset(token: &str) -> Option<FixedOffset> {
    let hours = match token.to_ascii_uppercase().as_str() {
        "UTC" | "GMT" | "UT" | "Z" => 0,
        "EST" => -5,
        "EDT" => -4,
        "CST" => -6,
        "CDT" => -5,
        "MST" => -7,
        "MDT" => -6,
        "PST" => -8,
        "PDT" => -7,
        "AKST" => -9,
        "AKDT" => -8,
        "HST" => -10,
        _ => return parse_numeric_offset(token),
    };
    FixedOffset::east_opt(hours * 3600)
}

fn parse_numeric_offset(token: &str) -> Option<FixedOffset> {
    let sign = match token.as_bytes().first()? {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let rest = &token[1..];
    let digits: String = match rest.split_once(':') {
        Some((h, m)) if h.len() == 2 && m.len() == 2 => format!("{}{}", h, m),
        Some(_) => return None,
        None => rest.to_string(),
    };
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let (h, m): (i32, i32) = match digits.len() {
        2 => (digits.parse().ok()?, 0),
        4 => (digits[..2].parse().ok()?, digits[2..].parse().ok()?),
        _ => return None,
    };
    if h > 23 || m > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (h * 3600 + m * 60))
}

fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

fn localize(naive: NaiveDateTime, offset: FixedOffset, input: &str) -> FetchResult<DateTime<Utc>> {
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| FetchError::Parse(format!("date out of range: '{}'", input)))
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
pub fn to_iso(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn no_offset() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn rfc3339_is_taken_as_is() {
        let got = parse_date("2025-04-29T21:33:00Z", no_offset()).unwrap();
        assert_eq!(got, utc("2025-04-29T21:33:00Z"));
    }

    #[test]
    fn named_abbreviation_is_honoured() {
        let got = parse_date("April 29, 2025 15:33:00 MDT", no_offset()).unwrap();
        assert_eq!(got, utc("2025-04-29T21:33:00Z"));

        let got = parse_date("Jan 5, 2025 08:00 est", no_offset()).unwrap();
        assert_eq!(got, utc("2025-01-05T13:00:00Z"));
    }

    #[test]
    fn numeric_offset_is_honoured() {
        let got = parse_date("2025-04-29 15:33:00 +02:00", no_offset()).unwrap();
        assert_eq!(got, utc("2025-04-29T13:33:00Z"));

        let got = parse_date("Tue, 29 Apr 2025 15:33:00 -0600", no_offset()).unwrap();
        assert_eq!(got, utc("2025-04-29T21:33:00Z"));
    }

    #[test]
    fn zoneless_string_uses_fallback() {
        let mountain = FixedOffset::west_opt(7 * 3600).unwrap();
        let got = parse_date("April 29, 2025 15:33:00", mountain).unwrap();
        assert_eq!(got, utc("2025-04-29T22:33:00Z"));

        // "15:33:00" must not be mistaken for a zone token
        let got = parse_date("2025-04-29 15:33:00", no_offset()).unwrap();
        assert_eq!(got, utc("2025-04-29T15:33:00Z"));
    }

    #[test]
    fn garbage_and_empty_are_parse_errors() {
        assert!(matches!(parse_date("not a date", no_offset()), Err(FetchError::Parse(_))));
        assert!(matches!(parse_date("   ", no_offset()), Err(FetchError::Parse(_))));
        assert!(matches!(
            parse_date("April 29, 2025 15:33:00 XYZ", no_offset()),
            Err(FetchError::Parse(_))
        ));
    }

    #[test]
    fn offsets_reject_bad_tokens() {
        assert_eq!(parse_offset("-0600"), FixedOffset::west_opt(6 * 3600));
        assert_eq!(parse_offset("+05"), FixedOffset::east_opt(5 * 3600));
        assert_eq!(parse_offset("+2400"), None);
        assert_eq!(parse_offset("+0:600"), None);
        assert_eq!(parse_offset("15:33:00"), None);
    }

    #[test]
    fn iso_output_has_millis_and_z() {
        assert_eq!(to_iso(&utc("2025-04-29T21:33:00Z")), "2025-04-29T21:33:00.000Z");
    }
}
