//! Debug logging of raw HTTP traffic.
//!
//! When debug mode is on, the client hands a dump of every request and
//! response to a [`DebugLogger`]. The default, [`TracingLogger`], emits them
//! as `tracing` events, so they end up wherever the process-wide subscriber
//! writes (stderr for the CLI).

use reqwest::header::HeaderMap;
use reqwest::{Request, StatusCode};
use url::Url;

use crate::client::TOKEN_PARAM;

/// Target used for HTTP dumps emitted by [`TracingLogger`].
pub const HTTP_LOG_TARGET: &str = "circleci_project::http";

const REDACTED: &str = "REDACTED";

/// Sink for debug messages.
///
/// Implemented for any `Fn(&str)` closure, which makes it easy to capture
/// output in tests.
pub trait DebugLogger: Send + Sync {
    fn log(&self, message: &str);
}

/// Logs through `tracing` at DEBUG level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl DebugLogger for TracingLogger {
    fn log(&self, message: &str) {
        tracing::debug!(target: HTTP_LOG_TARGET, "{message}");
    }
}

impl<F> DebugLogger for F
where
    F: Fn(&str) + Send + Sync,
{
    fn log(&self, message: &str) {
        self(message)
    }
}

/// Copy of `url` with the auth token replaced.
pub(crate) fn redact_url(url: &Url) -> Url {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            let value = if key == TOKEN_PARAM {
                REDACTED.to_string()
            } else {
                value.into_owned()
            };
            (key.into_owned(), value)
        })
        .collect();

    let mut redacted = url.clone();
    if !pairs.is_empty() {
        redacted.query_pairs_mut().clear().extend_pairs(pairs);
    }
    redacted
}

fn dump_headers(headers: &HeaderMap, out: &mut String) {
    for (name, value) in headers {
        out.push_str(name.as_str());
        out.push_str(": ");
        out.push_str(value.to_str().unwrap_or("<non-utf8>"));
        out.push('\n');
    }
}

pub(crate) fn dump_request(request: &Request) -> String {
    let mut out = format!("{} {}\n", request.method(), redact_url(request.url()));
    dump_headers(request.headers(), &mut out);

    if let Some(body) = request.body().and_then(|b| b.as_bytes()) {
        out.push('\n');
        out.push_str(&String::from_utf8_lossy(body));
    }
    out
}

pub(crate) fn dump_response(status: StatusCode, headers: &HeaderMap, body: &[u8]) -> String {
    let mut out = format!("HTTP {status}\n");
    dump_headers(headers, &mut out);

    if !body.is_empty() {
        out.push('\n');
        out.push_str(&String::from_utf8_lossy(body));
    }
    out
}
