use axum::http::{header, HeaderMap, HeaderValue};
use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};

/// `IMF-fixdate`, the only date format HTTP/1.1 senders may generate.
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Outcome of a conditional GET check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    /// The client copy is current; answer `304` without a body.
    NotModified,
    /// Render the page, attaching `Last-Modified` when present.
    Modified(Option<HeaderValue>),
}

impl Freshness {
    pub fn is_not_modified(&self) -> bool {
        matches!(self, Freshness::NotModified)
    }

    /// The `Last-Modified` header to send along with a fresh render.
    pub fn last_modified(&self) -> Option<(header::HeaderName, HeaderValue)> {
        match self {
            Freshness::Modified(Some(value)) => Some((header::LAST_MODIFIED, value.clone())),
            _ => None,
        }
    }
}

pub fn format_http_date(time: DateTime<Utc>) -> String {
    time.format(HTTP_DATE_FORMAT).to_string()
}

pub fn parse_http_date(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw.trim(), HTTP_DATE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Compare `If-Modified-Since` against the entity's last modification time.
///
/// HTTP dates carry whole seconds only, so anything modified before the
/// header time plus one second counts as unchanged. With `dev_mode` set the
/// check is skipped entirely and no validator is sent.
pub fn check_last_modified(
    headers: &HeaderMap,
    modified: NaiveDateTime,
    dev_mode: bool,
) -> Freshness {
    if dev_mode {
        return Freshness::Modified(None);
    }

    let modified = modified.and_utc();
    let since = headers
        .get(header::IF_MODIFIED_SINCE)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_http_date);

    if let Some(since) = since {
        if modified < since + TimeDelta::seconds(1) {
            return Freshness::NotModified;
        }
    }

    Freshness::Modified(HeaderValue::from_str(&format_http_date(modified)).ok())
}
