//! Calendar text <-> model conversion on top of the `icalendar` crate.

use crate::error::{Error, Result};
use crate::model::EventRecord;
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use icalendar::{Calendar, CalendarComponent, CalendarDateTime, Component, DatePerhapsTime};
use log::debug;

/// How far past a DST gap [`first_valid`] looks, in quarter hours.
const GAP_STEPS: i64 = 8;

pub fn parse(text: &str) -> Result<Calendar> {
    let calendar: Calendar = text.parse().map_err(Error::Parse)?;
    Ok(calendar)
}

pub fn serialize(calendar: &Calendar) -> String {
    calendar.to_string()
}

/// Every VEVENT of `calendar`, in document order.
///
/// A malformed DTSTART only affects its own record (its `start` is `None`).
pub fn events(calendar: &Calendar) -> Vec<EventRecord> {
    calendar
        .components
        .iter()
        .filter_map(|component| match component {
            CalendarComponent::Event(e) => {
                let start = e.get_start().and_then(resolve_start);
                if start.is_none() {
                    debug!(
                        "Event {:?} has no usable start time",
                        e.get_summary().unwrap_or_default()
                    );
                }
                Some(EventRecord::new(e.clone(), start))
            }
            _ => None,
        })
        .collect()
}

/// Builds a fresh calendar from `template`'s properties and non-event
/// components (time zones etc.) followed by `records`.
pub fn rebuild(template: &Calendar, records: &[EventRecord]) -> Calendar {
    let mut out = template.clone();
    out.components
        .retain(|c| !matches!(c, CalendarComponent::Event(_)));
    for rec in records {
        out.push(rec.raw.clone());
    }
    out
}

/// Best-effort conversion of a DTSTART value to an instant.
///
/// Floating times and all-day dates are read in the local zone. An unknown
/// TZID also falls back to the local zone.
pub fn resolve_start(value: DatePerhapsTime) -> Option<DateTime<Utc>> {
    match value {
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => Some(dt),
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => local_instant(&naive),
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
            match tzid.parse::<Tz>() {
                Ok(tz) => first_valid(&tz, date_time).map(|dt| dt.with_timezone(&Utc)),
                Err(_) => {
                    debug!("Unknown TZID {:?}, reading as local time", tzid);
                    local_instant(&date_time)
                }
            }
        }
        DatePerhapsTime::Date(date) => start_of_day(date),
    }
}

/// Local midnight of `date` as an instant.
pub fn start_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    local_instant(&date.and_hms_opt(0, 0, 0)?)
}

fn local_instant(naive: &NaiveDateTime) -> Option<DateTime<Utc>> {
    first_valid(&Local, *naive).map(|dt| dt.with_timezone(&Utc))
}

/// `naive` read as a wall-clock time in `tz`. Ambiguous times take the
/// earlier instant; a time skipped by a DST gap (e.g. a midnight that never
/// happens) resolves to the first valid time after it.
fn first_valid<Z: TimeZone>(tz: &Z, naive: NaiveDateTime) -> Option<DateTime<Z>> {
    (0..=GAP_STEPS).find_map(|step| {
        tz.from_local_datetime(&(naive + Duration::minutes(15 * step)))
            .earliest()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = "BEGIN:VCALENDAR\r
VERSION:2.0\r
PRODID:-//Test//EN\r
BEGIN:VEVENT\r
UID:1\r
SUMMARY:Seminar\r
DESCRIPTION:Room 4\r
DTSTART:20300101T090000Z\r
END:VEVENT\r
BEGIN:VEVENT\r
UID:2\r
SUMMARY:Sport\r
DTSTART;TZID=Europe/Berlin:20300102T100000\r
END:VEVENT\r
BEGIN:VEVENT\r
UID:3\r
SUMMARY:Broken\r
DTSTART:not-a-date\r
END:VEVENT\r
END:VCALENDAR\r
";

    #[test]
    fn test_events_in_document_order() {
        let cal = parse(FEED).unwrap();
        let evs = events(&cal);
        let titles: Vec<_> = evs.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Seminar", "Sport", "Broken"]);
        assert_eq!(evs[0].description, "Room 4");
    }

    #[test]
    fn test_start_resolution() {
        let cal = parse(FEED).unwrap();
        let evs = events(&cal);
        assert_eq!(
            evs[0].start,
            Some(Utc.with_ymd_and_hms(2030, 1, 1, 9, 0, 0).unwrap())
        );
        // 10:00 CET is 09:00 UTC
        assert_eq!(
            evs[1].start,
            Some(Utc.with_ymd_and_hms(2030, 1, 2, 9, 0, 0).unwrap())
        );
        assert_eq!(evs[2].start, None);
    }

    #[test]
    fn test_rebuild_keeps_only_given_events() {
        let cal = parse(FEED).unwrap();
        let evs = events(&cal);
        let kept: Vec<_> = evs.into_iter().filter(|e| e.title != "Sport").collect();

        let out = rebuild(&cal, &kept);
        let text = serialize(&out);
        let reparsed = events(&parse(&text).unwrap());
        let titles: Vec<_> = reparsed.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Seminar", "Broken"]);
    }

    #[test]
    fn test_utc_passthrough() {
        let dt = Utc.with_ymd_and_hms(2030, 5, 5, 5, 5, 5).unwrap();
        assert_eq!(
            resolve_start(DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt))),
            Some(dt)
        );
    }

    #[test]
    fn test_midnight_in_dst_gap_moves_forward() {
        // Sao Paulo skipped 2018-11-04 00:00..01:00 (-03 -> -02)
        let midnight = NaiveDate::from_ymd_opt(2018, 11, 4)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let tz = chrono_tz::America::Sao_Paulo;
        assert!(tz.from_local_datetime(&midnight).earliest().is_none());

        let expected = Utc.with_ymd_and_hms(2018, 11, 4, 3, 0, 0).unwrap();
        assert_eq!(
            first_valid(&tz, midnight).map(|dt| dt.with_timezone(&Utc)),
            Some(expected)
        );
        assert_eq!(
            resolve_start(DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone {
                date_time: midnight,
                tzid: "America/Sao_Paulo".to_string(),
            })),
            Some(expected)
        );
    }

    #[test]
    fn test_ambiguous_time_takes_earlier_instant() {
        // 02:30 happens twice in Berlin on 2030-10-27; the first is CEST
        let naive = NaiveDate::from_ymd_opt(2030, 10, 27)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        assert_eq!(
            first_valid(&chrono_tz::Europe::Berlin, naive).map(|dt| dt.with_timezone(&Utc)),
            Some(Utc.with_ymd_and_hms(2030, 10, 27, 0, 30, 0).unwrap())
        );
    }
}
