//! Timestamp rendering

use chrono::{SecondsFormat, Utc};

/// Current time as an `xsd:dateTime` lexical value (UTC, second precision)
pub(crate) fn xsd_date_time_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
