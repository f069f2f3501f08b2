use chrono::{DateTime, SecondsFormat, Utc};

pub fn now_iso() -> String {
    format_iso(Utc::now())
}

pub fn format_iso(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}
