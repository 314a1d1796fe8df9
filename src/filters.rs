use chrono::NaiveDateTime;

use crate::models::{Event, GeoData};

// Bounding box around Neustadt-Neuschönefeld and Volkmarsdorf.
const MIN_LAT: f64 = 51.338207;
const MAX_LAT: f64 = 51.349078;
const MIN_LON: f64 = 12.392771;
const MAX_LON: f64 = 12.422404;

/// True iff the entity carries geodata and both coordinates fall inside the
/// neighborhood box, boundaries inclusive. Entities without geodata are
/// filtered out, not errors.
pub fn is_in_location_bounds(geodata: Option<&GeoData>) -> bool {
    geodata.map_or(false, |geo| {
        (MIN_LAT..=MAX_LAT).contains(&geo.lat) && (MIN_LON..=MAX_LON).contains(&geo.lon)
    })
}

/// True iff at least one occurrence is still current relative to `today`
/// (the run date at midnight). An occurrence with no end date counts as
/// current no matter how far in the past it started.
pub fn is_current_or_upcoming(event: &Event, today: NaiveDateTime) -> bool {
    event
        .occurrences
        .iter()
        .any(|occurrence| {
            is_today_or_later(Some(occurrence.start), today)
                || is_today_or_later(occurrence.end, today)
        })
}

fn is_today_or_later(date: Option<NaiveDateTime>, today: NaiveDateTime) -> bool {
    date.map_or(true, |date| date >= today)
}
