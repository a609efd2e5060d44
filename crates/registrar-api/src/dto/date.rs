//! Calendar dates in request bodies (`YYYY-MM-DD`, midnight UTC)

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer};

use registrar_shared::constants::DATE_FORMAT;

pub fn parse_date(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let date = NaiveDate::parse_from_str(value, DATE_FORMAT)?;
    Ok(date.and_time(NaiveTime::MIN).and_utc())
}

/// `null`, a missing field and `""` all read as "not provided".
pub fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(value) if !value.is_empty() => parse_date(&value)
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid date '{}': {}", value, e))),
        _ => Ok(None),
    }
}
