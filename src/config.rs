//! # Diagnostic Configuration
//!
//! Process-wide knobs that shape failure messages. Only one exists today: how
//! many characters of a dumped request or response end up in a report.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Characters of a request/response dump kept before the rest is replaced
/// with `...`.
pub const DEFAULT_TRUNCATE_LENGTH: usize = 512;

/// Environment variable that seeds the truncation length on first use.
pub const TRUNCATE_LENGTH_ENV: &str = "HTEST_TRUNCATE_LENGTH";

static TRUNCATE_LENGTH: OnceLock<AtomicUsize> = OnceLock::new();

fn cell() -> &'static AtomicUsize {
    TRUNCATE_LENGTH.get_or_init(|| {
        let raw = std::env::var(TRUNCATE_LENGTH_ENV).ok();
        AtomicUsize::new(parse_truncate_length(raw.as_deref()))
    })
}

/// Current truncation length for request and response dumps.
pub fn truncate_length() -> usize {
    cell().load(Ordering::Relaxed)
}

/// Override the truncation length for the rest of the process.
pub fn set_truncate_length(length: usize) {
    cell().store(length, Ordering::Relaxed);
}

/// Interpret a raw setting, falling back to [`DEFAULT_TRUNCATE_LENGTH`] when
/// it is missing or not a number.
pub fn parse_truncate_length(raw: Option<&str>) -> usize {
    match raw.map(str::trim) {
        Some(value) => match value.parse::<usize>() {
            Ok(length) => length,
            Err(err) => {
                tracing::warn!("ignoring {TRUNCATE_LENGTH_ENV}=`{value}`: {err}");
                DEFAULT_TRUNCATE_LENGTH
            }
        },
        None => DEFAULT_TRUNCATE_LENGTH,
    }
}
