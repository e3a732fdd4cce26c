//! Time-of-day and weekday utilities shared by the conflict and recurrence
//! engines.
//!
//! All meeting times are same-day `HH:MM` or `HH:MM:SS` strings compared at
//! minute granularity as half-open `[start, end)` intervals. Malformed time
//! strings are a programmer error: callers validate section shape before
//! handing times to this layer, so these functions panic rather than
//! propagate a recoverable error.

use chrono::Weekday;

/// Converts an `HH:MM` or `HH:MM:SS` time string to minutes since midnight.
///
/// Panics on malformed input (see module docs).
pub fn minutes_since_midnight(time: &str) -> u32 {
    let mut parts = time.split(':');
    let (Some(hh), Some(mm)) = (parts.next(), parts.next()) else {
        panic!("malformed time string: {time:?}");
    };
    let hours = parse_component(hh, time);
    let minutes = parse_component(mm, time);
    if let Some(ss) = parts.next() {
        // Seconds are validated but ignored; meetings align to minutes.
        parse_component(ss, time);
    }
    assert!(
        parts.next().is_none() && hours < 24 && minutes < 60,
        "time out of range: {time:?}"
    );
    hours * 60 + minutes
}

fn parse_component(raw: &str, time: &str) -> u32 {
    raw.parse()
        .unwrap_or_else(|_| panic!("malformed time string: {time:?}"))
}

/// Returns true iff the two half-open time ranges intersect.
///
/// Back-to-back meetings (one ending exactly when the other starts) do not
/// overlap.
pub fn time_ranges_overlap(start1: &str, end1: &str, start2: &str, end2: &str) -> bool {
    let s1 = minutes_since_midnight(start1);
    let e1 = minutes_since_midnight(end1);
    let s2 = minutes_since_midnight(start2);
    let e2 = minutes_since_midnight(end2);
    s1 < e2 && s2 < e1
}

/// Day-of-week number with Sunday = 0, matching the host calendar numbering.
pub fn weekday_index(day: Weekday) -> u32 {
    day.num_days_from_sunday()
}

/// Inverse of [`weekday_index`]. Panics outside `0..=6` (programmer error).
pub fn weekday_from_index(index: u32) -> Weekday {
    match index {
        0 => Weekday::Sun,
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        6 => Weekday::Sat,
        _ => panic!("weekday index out of range: {index}"),
    }
}

/// Full English name of a weekday, as used in catalog documents.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "Sunday",
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
    }
}

/// Serde helper for weekday lists serialized as full day names.
pub mod weekday_names {
    use chrono::Weekday;
    use serde::de::Error as _;
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(days: &[Weekday], ser: S) -> Result<S::Ok, S::Error> {
        let mut seq = ser.serialize_seq(Some(days.len()))?;
        for day in days {
            seq.serialize_element(super::weekday_name(*day))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<Weekday>, D::Error> {
        let names = Vec::<String>::deserialize(de)?;
        names
            .iter()
            .map(|name| {
                name.parse::<Weekday>()
                    .map_err(|_| D::Error::custom(format!("unknown weekday name: {name}")))
            })
            .collect()
    }
}
