mod primitive_tests;
mod record_tests;

use crate::{CookieRecord, Timestamp};

/// 2023-11-14T22:13:20Z
pub(crate) const T: f64 = 1_700_000_000.0;

pub(crate) fn cookie(domain: &str, name: &str, path: &str, value: &str) -> CookieRecord {
    CookieRecord {
        domain: domain.to_string(),
        name: name.to_string(),
        path: path.to_string(),
        value: value.to_string(),
        created: Timestamp::from_unix_seconds(T),
        expires: Timestamp::from_unix_seconds(T + 3600.0),
    }
}

pub(crate) fn sample() -> CookieRecord {
    cookie("example.com", "id", "/", "123")
}
