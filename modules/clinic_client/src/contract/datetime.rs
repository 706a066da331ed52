//! Wire format for the API's local date-times (`fechaHora`, `fechaConsulta`,
//! `fechaRegistro`). The server emits zone-less timestamps with or without
//! seconds; we always send `YYYY-MM-DDTHH:MM:SS`.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serializer};

const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const ACCEPTED: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a local date-time in any of the formats the API is known to use.
/// Offset-carrying timestamps keep their wall-clock time.
pub fn parse(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    let raw = raw.trim();
    let mut last_err = None;
    for fmt in ACCEPTED {
        match NaiveDateTime::parse_from_str(raw, fmt) {
            Ok(dt) => return Ok(dt),
            Err(e) => last_err = Some(e),
        }
    }
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Ok(dt.naive_local()),
        Err(e) => Err(last_err.unwrap_or(e)),
    }
}

pub fn format(dt: &NaiveDateTime) -> String {
    dt.format(WIRE_FORMAT).to_string()
}

pub mod required {
    use super::*;

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format(dt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }
}

pub mod optional {
    use super::*;

    pub fn serialize<S: Serializer>(dt: &Option<NaiveDateTime>, s: S) -> Result<S::Ok, S::Error> {
        match dt {
            Some(dt) => s.serialize_str(&format(dt)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(raw) if !raw.trim().is_empty() => {
                parse(&raw).map(Some).map_err(serde::de::Error::custom)
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn accepts_minute_precision_from_form_input() {
        assert_eq!(parse("2025-03-14T09:30").unwrap(), at(9, 30, 0));
    }

    #[test]
    fn accepts_seconds_and_fractions() {
        assert_eq!(parse("2025-03-14T09:30:15").unwrap(), at(9, 30, 15));
        let frac = parse("2025-03-14T09:30:15.123456").unwrap();
        assert_eq!(frac.format("%H:%M:%S").to_string(), "09:30:15");
    }

    #[test]
    fn accepts_offset_timestamps_as_wall_clock() {
        assert_eq!(parse("2025-03-14T09:30:00-05:00").unwrap(), at(9, 30, 0));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse("mañana a las diez").is_err());
    }

    #[test]
    fn formats_with_seconds() {
        assert_eq!(format(&at(16, 5, 0)), "2025-03-14T16:05:00");
    }
}
