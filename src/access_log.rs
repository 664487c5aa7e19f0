//! Apache/Nginx access-log fast path (Common and Combined Log Format).
//!
//! Format: `host ident authuser [date] "request" status bytes ["referer" "user-agent"]`
//! Example: `127.0.0.1 - frank [10/Oct/2000:13:55:36 -0700] "GET /apache_pb.gif HTTP/1.0" 200 2326`

use std::sync::LazyLock;

use regex::Regex;

use crate::entry::{LogEntry, Metadata, insert_first};
use crate::fields;
use crate::level::Level;
use crate::timestamp;

static ACCESS_LOG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(\S+) (\S+) (\S+) \[([^\]]+)\] "([^"]*)" (\d{3}) (\S+)(?: "([^"]*)" "([^"]*)")?\s*$"#,
    )
    .unwrap_or_else(|_| unreachable!())
});

/// Parse an access-log line into a record; `None` if the line does not match.
pub fn parse_line(line: &str) -> Option<LogEntry> {
    let caps = ACCESS_LOG.captures(line.trim())?;
    let field = |i: usize| caps.get(i).map_or("", |m| m.as_str());

    let request = field(5);
    let mut parts = request.splitn(3, ' ');
    let method = parts.next().unwrap_or_default();
    let path = parts.next().unwrap_or_default();
    let protocol = parts.next().unwrap_or_default();

    let status: u16 = field(6).parse().ok()?;
    let level = match status {
        500.. => Level::Error,
        400..=499 => Level::Warn,
        _ => Level::Info,
    };

    let mut metadata = Metadata::new();
    for (key, value) in [
        ("ip", field(1)),
        ("ident", field(2)),
        ("user", field(3)),
        ("method", method),
        ("path", path),
        ("protocol", protocol),
        ("status", field(6)),
        ("size", field(7)),
        ("referer", field(8)),
        ("user_agent", field(9)),
    ] {
        if !value.is_empty() && value != "-" {
            insert_first(&mut metadata, key, value);
        }
    }
    insert_first(&mut metadata, fields::PARSING_METHOD, fields::ACCESS_LOG_FAST_PATH);

    Some(LogEntry {
        timestamp: Some(timestamp::normalize(field(4))),
        level: Some(level),
        message: request.to_string(),
        metadata,
        raw_data: line.to_string(),
        inherited: Default::default(),
    })
}
