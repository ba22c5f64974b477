use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};

/// Parses a date-only (`YYYY-MM-DD`) or RFC 3339 string into a UTC instant.
///
/// Date-only values are anchored at midnight UTC.
pub fn parse_date_time(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }

    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn deserialize_date_time<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_date_time(&s)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid date \"{}\"", s)))
}

/// An absent or `null` value is `None`; a blank string is rejected like any
/// other unparseable date.
pub fn deserialize_optional_date_time<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt {
        Some(s) => parse_date_time(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date \"{}\"", s))),
        None => Ok(None),
    }
}

/// Trims surrounding whitespace so a blank value fails a `length(min = 1)` rule.
pub fn deserialize_trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(s.trim().to_string())
}

pub fn deserialize_optional_trimmed<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.map(|s| s.trim().to_string()))
}
